//! Pixel to table coordinate transforms
//!
//! The camera looks straight down on the table so the mapping is a per-axis
//! scale about the calibrated origin pixel, followed by optional sign flips.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arm_if::geom::{PixelPoint, TablePoint};
use nalgebra::Vector2;
use std::ops::RangeInclusive;

use crate::calib::{CalibError, CalibrationProfile};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a pixel into table coordinates.
pub fn pixel_to_table(
    pixel: PixelPoint,
    profile: &CalibrationProfile,
) -> Result<TablePoint, CalibError> {
    profile.validate()?;

    let origin = profile.origin();

    let offset_px = Vector2::new(
        pixel.x as f64 - origin.x as f64,
        pixel.y as f64 - origin.y as f64,
    );
    let table_m = apply_flips(
        offset_px.component_mul(&Vector2::new(profile.scale_x, profile.scale_y)),
        profile,
    );

    Ok(TablePoint::new(table_m.x, table_m.y))
}

/// Convert a table point into the pixel it lies under.
///
/// Pixel coordinates are truncated towards zero.
pub fn table_to_pixel(
    point: TablePoint,
    profile: &CalibrationProfile,
) -> Result<PixelPoint, CalibError> {
    profile.validate()?;

    let origin = profile.origin();

    // Flips are their own inverse but must be undone before unscaling
    let table_m = apply_flips(Vector2::new(point.x_m, point.y_m), profile);
    let pixel = Vector2::new(origin.x as f64, origin.y as f64)
        + table_m.component_div(&Vector2::new(profile.scale_x, profile.scale_y));

    Ok(PixelPoint::new(pixel.x as i32, pixel.y as i32))
}

/// Table coordinates of a square grid of pixels around the origin.
///
/// The grid has `2 * half_count + 1` points per side spaced `step_px` apart,
/// points outside the `frame_width_px` by `frame_height_px` frame are left out.
/// Used to draw reference labels over the camera image during calibration.
pub fn reference_grid(
    profile: &CalibrationProfile,
    frame_width_px: i32,
    frame_height_px: i32,
    step_px: i32,
    half_count: i32,
) -> Result<Vec<(PixelPoint, TablePoint)>, CalibError> {
    if step_px <= 0 {
        return Err(CalibError::ConfigInvalid {
            field: "grid_step_px",
            reason: "must be greater than zero",
        });
    }
    if half_count < 0 {
        return Err(CalibError::ConfigInvalid {
            field: "grid_half_count",
            reason: "must not be negative",
        });
    }

    let origin = profile.origin();

    // Only visit grid indices which land inside the frame. Worked in i64 so
    // extreme origins and steps can't overflow.
    let cols = in_frame_indices(origin.x, frame_width_px, step_px, half_count);
    let rows = in_frame_indices(origin.y, frame_height_px, step_px, half_count);

    let mut grid = Vec::new();

    for i in cols {
        for j in rows.clone() {
            let x = origin.x as i64 + i * step_px as i64;
            let y = origin.y as i64 + j * step_px as i64;

            // In frame, so both fit in an i32
            let pixel = PixelPoint::new(x as i32, y as i32);
            grid.push((pixel, pixel_to_table(pixel, profile)?));
        }
    }

    Ok(grid)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Grid indices `i` in `[-half_count, half_count]` for which
/// `origin_px + i * step_px` lies in `[0, frame_px)`.
fn in_frame_indices(
    origin_px: i32,
    frame_px: i32,
    step_px: i32,
    half_count: i32,
) -> RangeInclusive<i64> {
    let (origin_px, frame_px, step_px, half_count) = (
        origin_px as i64,
        frame_px as i64,
        step_px as i64,
        half_count as i64,
    );

    // Smallest i with origin + i * step >= 0
    let first = -(origin_px.div_euclid(step_px));
    // Largest i with origin + i * step <= frame - 1
    let last = (frame_px - 1 - origin_px).div_euclid(step_px);

    first.max(-half_count)..=last.min(half_count)
}

fn apply_flips(mut v: Vector2<f64>, profile: &CalibrationProfile) -> Vector2<f64> {
    if profile.flip_x {
        v.x = -v.x;
    }
    if profile.flip_y {
        v.y = -v.y;
    }
    v
}
