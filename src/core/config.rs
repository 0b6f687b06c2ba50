//! Configuration management for unmask.

use crate::core::error::{Error, Result};
use crate::core::types::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan-related settings
    pub scan: ScanConfig,
    /// Report output settings
    pub report: ReportConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigLoad(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigLoad(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigSave(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, contents).map_err(|e| {
            Error::ConfigSave(format!("Failed to write config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Nothing is written: a missing file yields the defaults. A file that
    /// fails to load also yields the defaults, and the error is handed back so
    /// it can be logged once logging is up.
    pub fn load_or_default() -> (Self, Option<Error>) {
        Self::load_or_default_from(&Self::default_config_path())
    }

    /// Same as [`Config::load_or_default`] for an explicit path.
    pub fn load_or_default_from(path: &Path) -> (Self, Option<Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }

        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Get the application data directory.
    pub fn data_dir() -> PathBuf {
        #[cfg(windows)]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData"))
                .join("unmask")
        }

        #[cfg(not(windows))]
        {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("unmask")
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.scan.workers == 0 || self.scan.workers > MAX_WORKERS {
            return Err(Error::ConfigInvalid {
                field: "scan.workers".to_string(),
                message: format!("Must be between 1 and {}", MAX_WORKERS),
            });
        }

        if self.scan.sniff_bytes < MIN_SNIFF_BYTES {
            return Err(Error::ConfigInvalid {
                field: "scan.sniff_bytes".to_string(),
                message: format!("Must be at least {}", MIN_SNIFF_BYTES),
            });
        }

        let base = self.report.base_name.trim();
        if base.is_empty() || base.contains(['/', '\\']) {
            return Err(Error::ConfigInvalid {
                field: "report.base_name".to_string(),
                message: "Must be a non-empty file name without path separators".to_string(),
            });
        }

        if self.logging.keep_logs_days == 0 {
            return Err(Error::ConfigInvalid {
                field: "logging.keep_logs_days".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Upper bound for the analysis worker pool.
pub const MAX_WORKERS: usize = 64;

/// Smallest header window that covers every signature the classifier knows.
pub const MIN_SNIFF_BYTES: usize = 512;

/// Scan-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of files analyzed concurrently (1 = strictly sequential)
    pub workers: usize,
    /// Per-file analysis timeout in seconds (0 = no timeout)
    pub file_timeout_secs: u64,
    /// Bytes read from the head of a file for signature detection
    pub sniff_bytes: usize,
    /// Walk subdirectories of directory arguments
    pub recursive: bool,
    /// Descend into symlinked directories (symlinked files are always listed)
    pub follow_symlinks: bool,
    /// Include dot-files found in directories
    pub include_hidden: bool,
    /// Treat extensions of the same format (jpg/jpeg) as equal
    pub match_extension_aliases: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus().clamp(1, 8),
            file_timeout_secs: 60,
            sniff_bytes: 8192,
            recursive: false,
            follow_symlinks: false,
            include_hidden: true,
            match_extension_aliases: true,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory that receives report artifacts
    pub output_dir: PathBuf,
    /// File name stem; artifacts are named `<base_name>_<n>.<ext>`
    pub base_name: String,
    /// Default artifact format
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            base_name: "disguise_report".to_string(),
            format: ReportFormat::Html,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Also write log records to a file
    pub log_to_file: bool,
    /// Path for log files
    pub log_path: Option<PathBuf>,
    /// Days to keep log files
    pub keep_logs_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
            log_path: None,
            keep_logs_days: 30,
        }
    }
}

impl LoggingConfig {
    /// Get the effective log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("logs"))
    }
}

/// Get the number of CPUs, with a reasonable default.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.output_dir, PathBuf::from("reports"));
        assert_eq!(config.report.format, ReportFormat::Html);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.scan.workers = 3;
        config.report.format = ReportFormat::Csv;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.scan.workers, 3);
        assert_eq!(loaded.report.format, ReportFormat::Csv);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "scan": { "recursive": true } }"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.scan.recursive);
        assert_eq!(loaded.scan.sniff_bytes, 8192);
        assert_eq!(loaded.report.base_name, "disguise_report");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = Config::default();
        config.scan.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.base_name = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.sniff_bytes = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_config_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::ConfigLoad(_))));
    }

    #[test]
    fn test_missing_config_is_not_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unmask").join("config.json");

        let (config, error) = Config::load_or_default_from(&path);
        assert!(error.is_none());
        assert_eq!(config.report.base_name, "disguise_report");
        assert!(!path.exists());
        assert!(!dir.path().join("unmask").exists());
    }

    #[test]
    fn test_malformed_config_falls_back_with_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "scan": { "workers": 0 } }"#).unwrap();

        let (config, error) = Config::load_or_default_from(&path);
        assert!(matches!(error, Some(Error::ConfigInvalid { .. })));
        assert!(config.validate().is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{ "scan": { "workers": 0 } }"#);
    }
}
