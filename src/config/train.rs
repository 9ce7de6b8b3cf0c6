//! Loading training specifications from YAML

use super::schema::AcganSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parse a specification from YAML text without validating it
pub fn parse_spec(yaml: &str) -> Result<AcganSpec> {
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
}

/// Parse and validate a specification from YAML text
pub fn parse_config(yaml: &str) -> Result<AcganSpec> {
    let spec = parse_spec(yaml)?;
    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}

/// Read a specification file without validating it
///
/// Callers that patch the spec afterwards (CLI overrides) validate the result themselves.
pub fn read_config<P: AsRef<Path>>(config_path: P) -> Result<AcganSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;
    parse_spec(&yaml_content)
}

/// Load and validate a training specification from a YAML file
///
/// # Example
///
/// ```no_run
/// use acgan::config::load_config;
///
/// let spec = load_config("acgan.yaml")?;
/// println!("{} epochs of batch {}", spec.training.epochs, spec.training.batch_size);
/// # Ok::<(), acgan::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<AcganSpec> {
    let spec = read_config(config_path)?;
    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().expect("temp file creation should succeed");
        writeln!(file, "training:\n  epochs: 3\n  runs: 1").expect("write should succeed");

        let spec = load_config(file.path()).expect("config should load");
        assert_eq!(spec.training.epochs, 3);
        assert_eq!(spec.training.runs, 1);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config("/nonexistent/acgan.yaml").expect_err("missing file must fail");
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(err.to_string().contains("/nonexistent/acgan.yaml"));
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = parse_config("training: [unclosed").expect_err("bad yaml must fail");
        assert!(err.to_string().contains("Failed to parse YAML config"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = parse_config("optimizer:\n  lr: 0\n").expect_err("zero lr must fail");
        assert!(err.to_string().contains("Invalid learning rate"));
    }
    #[test]
    fn test_nan_values_are_rejected() {
        let err = parse_config("optimizer:\n  lr: .nan\n").expect_err("NaN lr must fail");
        assert!(err.to_string().contains("Invalid learning rate"));
    }

    #[test]
    fn test_read_config_defers_validation() {
        let mut file = NamedTempFile::new().expect("temp file creation should succeed");
        writeln!(file, "training:\n  epochs: 0").expect("write should succeed");

        let spec = read_config(file.path()).expect("unvalidated read should succeed");
        assert_eq!(spec.training.epochs, 0);
        assert!(load_config(file.path()).is_err());
    }
}
