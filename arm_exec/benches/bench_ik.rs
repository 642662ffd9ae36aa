//! # Inverse Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_if::geom::PixelPoint;
use arm_lib::{
    arm_ctrl::{angles_to_servo, solve_ik},
    calib::CalibrationProfile,
    coord::pixel_to_table,
};

fn ik_benchmark(c: &mut Criterion) {
    let profile = CalibrationProfile::default();

    // Reachable target in front of the arm
    c.bench_function("solve_ik::reachable", |b| {
        b.iter(|| solve_ik(black_box(0.12), black_box(-0.05), black_box(0.02), &profile).unwrap())
    });

    // Target which has to be clamped onto the reach boundary
    c.bench_function("solve_ik::clamped", |b| {
        b.iter(|| solve_ik(black_box(1.0), black_box(0.3), black_box(0.02), &profile).unwrap())
    });

    // Full chain from a detected pixel to servo demands
    c.bench_function("pixel_to_servo", |b| {
        b.iter(|| {
            let target = pixel_to_table(black_box(PixelPoint::new(400, 180)), &profile).unwrap();
            let solution = solve_ik(target.x_m, target.y_m, 0.02, &profile).unwrap();
            angles_to_servo(&solution.angles)
        })
    });
}

criterion_group!(benches, ik_benchmark);
criterion_main!(benches);
