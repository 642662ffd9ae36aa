//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (ARM_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$ARM_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    // Get the params dir
    let mut path = crate::host::get_arm_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, Q>(path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>,
{
    let params_str = read_to_string(path).map_err(LoadError::FileLoadError)?;

    toml::from_str(params_str.as_str()).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        name: String,
        gain: f64,
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("util_params_{}.toml", std::process::id()));
        std::fs::write(&path, "name = \"arm\"\ngain = 0.5\n").unwrap();

        let params: TestParams = load_from_path(&path).unwrap();
        assert_eq!(
            params,
            TestParams {
                name: "arm".into(),
                gain: 0.5
            }
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_errors() {
        let missing: Result<TestParams, _> = load_from_path("/definitely/not/here.toml");
        assert!(matches!(missing, Err(LoadError::FileLoadError(_))));

        let path = std::env::temp_dir().join(format!("util_params_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "name = ").unwrap();
        let bad: Result<TestParams, _> = load_from_path(&path);
        assert!(matches!(bad, Err(LoadError::DeserialiseError(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
