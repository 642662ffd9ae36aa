//! Calibration store
//!
//! Owns the process's current [`CalibrationProfile`] and its persisted copy.
//!
//! The current profile is held behind an `Arc` which is swapped as a whole on
//! load, save or replace. Readers clone the `Arc` and keep a consistent
//! snapshot for as long as they need it, a later swap never changes a
//! snapshot that has already been handed out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

// Internal
use super::{CalibError, CalibrationProfile};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration store backed by a JSON file.
#[derive(Debug)]
pub struct CalibStore {
    path: PathBuf,

    current: RwLock<Option<Arc<CalibrationProfile>>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CalibStore {
    /// Create a store for the given calibration file.
    ///
    /// Nothing is read until [`CalibStore::load`] or [`CalibStore::current`] is called.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Path of the persisted calibration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted profile and make it current.
    ///
    /// A missing, unreadable or invalid file is reported as a warning and the
    /// default profile is used instead, this function never fails.
    pub fn load(&self) -> Arc<CalibrationProfile> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        let profile = Arc::new(self.read_or_default());
        *current = Some(profile.clone());

        profile
    }

    /// Validate the profile, write it to the calibration file and make it current.
    ///
    /// On failure the error is logged and returned, and the current profile is
    /// left untouched.
    pub fn save(&self, profile: CalibrationProfile) -> Result<Arc<CalibrationProfile>, CalibError> {
        // Held across the write and the install so concurrent saves can't
        // share the temporary file or leave the cache out of step with the file
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = profile.validate().and_then(|_| self.write(&profile)) {
            warn!("Calibration not saved: {}", e);
            return Err(e);
        }

        info!("Calibration saved to {:?}", self.path);

        let profile = Arc::new(profile);
        *current = Some(profile.clone());

        Ok(profile)
    }

    /// Validate the profile and make it current without writing it.
    pub fn replace(&self, profile: CalibrationProfile) -> Result<Arc<CalibrationProfile>, CalibError> {
        profile.validate()?;

        Ok(self.install(profile))
    }

    /// Get the current profile, loading it if this store hasn't loaded one yet.
    pub fn current(&self) -> Arc<CalibrationProfile> {
        if let Some(profile) = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return profile.clone();
        }

        // Re-check under the write lock in case another caller loaded first
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        match current.as_ref() {
            Some(profile) => profile.clone(),
            None => {
                let profile = Arc::new(self.read_or_default());
                *current = Some(profile.clone());
                profile
            }
        }
    }

    /// Read and validate the persisted profile.
    pub fn read(&self) -> Result<CalibrationProfile, CalibError> {
        let json =
            fs::read_to_string(&self.path).map_err(|e| CalibError::ReadError(self.path.clone(), e))?;

        let profile: CalibrationProfile =
            serde_json::from_str(&json).map_err(|e| CalibError::ParseError(self.path.clone(), e))?;

        profile.validate()?;

        Ok(profile)
    }

    fn read_or_default(&self) -> CalibrationProfile {
        match self.read() {
            Ok(p) => {
                info!("Loaded calibration from {:?}", self.path);
                p
            }
            Err(e) => {
                warn!("{}, using default calibration", e);
                CalibrationProfile::default()
            }
        }
    }

    fn write(&self, profile: &CalibrationProfile) -> Result<(), CalibError> {
        let json = serde_json::to_string_pretty(profile).map_err(CalibError::SerialiseError)?;

        // Write next to the target then rename so the file is never seen half written
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CalibError::WriteError(self.path.clone(), e))?;
            }
        }

        fs::write(&tmp_path, json).map_err(|e| CalibError::WriteError(tmp_path.clone(), e))?;

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            // Best effort, the rename error is the one worth reporting
            let _ = fs::remove_file(&tmp_path);
            return Err(CalibError::WriteError(self.path.clone(), e));
        }

        Ok(())
    }

    fn install(&self, profile: CalibrationProfile) -> Arc<CalibrationProfile> {
        let profile = Arc::new(profile);

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(profile.clone());

        profile
    }
}
