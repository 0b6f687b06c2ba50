//! Logging infrastructure for unmask.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "unmask.log";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level
    pub level: LevelFilter,
    /// Also write records to `file_path`
    pub file: bool,
    /// Log file path
    pub file_path: Option<PathBuf>,
    /// Show timestamps
    pub timestamps: bool,
    /// Show module path
    pub module_path: bool,
    /// Colour the level tag
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file: false,
            file_path: None,
            timestamps: true,
            module_path: false,
            color: true,
        }
    }
}

impl LogConfig {
    /// Create a log config from application config.
    pub fn from_config(config: &Config) -> Self {
        let level = parse_level(&config.logging.log_level);
        let file = config.logging.log_to_file;

        Self {
            level,
            file,
            file_path: file.then(|| config.logging.log_dir().join(LOG_FILE_NAME)),
            timestamps: true,
            module_path: level >= LevelFilter::Debug,
            // Escape codes would end up in the log file.
            color: !file,
        }
    }

    /// Create a verbose log config for CLI.
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Debug,
            module_path: true,
            ..Self::default()
        }
    }

    /// Create a quiet log config (errors only).
    pub fn quiet() -> Self {
        Self {
            level: LevelFilter::Error,
            timestamps: false,
            ..Self::default()
        }
    }

    /// Apply `--verbose` / `--quiet` on top of this config. The file target
    /// and colour choice are kept.
    pub fn with_verbosity(self, verbose: bool, quiet: bool) -> Self {
        let preset = if verbose {
            Self::verbose()
        } else if quiet {
            Self::quiet()
        } else {
            return self;
        };

        Self {
            file: self.file,
            file_path: self.file_path,
            color: self.color,
            ..preset
        }
    }
}

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Writer that copies every record to stderr and a log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initialize the logging system.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(config.level);

    let timestamps = config.timestamps;
    let module_path = config.module_path;
    let color = config.color;

    builder.format(move |buf, record| {
        let mut output = String::new();

        if timestamps {
            output.push_str(&format!("{} ", Local::now().format("%Y-%m-%d %H:%M:%S")));
        }

        let level_str = match (record.level(), color) {
            (log::Level::Error, true) => "\x1b[31mERROR\x1b[0m",
            (log::Level::Warn, true) => "\x1b[33mWARN\x1b[0m ",
            (log::Level::Info, true) => "\x1b[32mINFO\x1b[0m ",
            (log::Level::Debug, true) => "\x1b[34mDEBUG\x1b[0m",
            (log::Level::Trace, true) => "\x1b[35mTRACE\x1b[0m",
            (log::Level::Error, false) => "ERROR",
            (log::Level::Warn, false) => "WARN ",
            (log::Level::Info, false) => "INFO ",
            (log::Level::Debug, false) => "DEBUG",
            (log::Level::Trace, false) => "TRACE",
        };
        output.push_str(&format!("[{}] ", level_str));

        if module_path {
            if let Some(path) = record.module_path() {
                output.push_str(&format!("{}: ", path));
            }
        }

        output.push_str(&format!("{}", record.args()));

        writeln!(buf, "{}", output)
    });

    if config.file {
        if let Some(path) = &config.file_path {
            let file = open_log_file(path)?;
            builder.target(Target::Pipe(Box::new(TeeWriter { file })));
        }
    }

    builder
        .try_init()
        .map_err(|e| Error::Internal(format!("Logger already initialized: {}", e)))?;

    log::debug!("Logging initialized with level: {:?}", config.level);
    if let Some(path) = config.file_path.filter(|_| config.file) {
        log::debug!("Log file: {}", path.display());
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::DirectoryAccess {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::file_access(path, e))
}

/// Clean up old log files.
pub fn cleanup_old_logs(log_dir: &Path, keep_days: u32) -> Result<u32> {
    use std::time::{Duration, SystemTime};

    let cutoff = SystemTime::now() - Duration::from_secs(keep_days as u64 * 24 * 60 * 60);
    let mut deleted = 0u32;

    if !log_dir.exists() {
        return Ok(0);
    }

    let entries = fs::read_dir(log_dir).map_err(|e| Error::DirectoryAccess {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "log") {
            if let Ok(metadata) = entry.metadata() {
                if let Ok(modified) = metadata.modified() {
                    if modified < cutoff && fs::remove_file(&path).is_ok() {
                        log::debug!("Deleted old log file: {:?}", path);
                        deleted += 1;
                    }
                }
            }
        }
    }

    if deleted > 0 {
        log::info!("Cleaned up {} old log file(s)", deleted);
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LevelFilter::Info);
        assert!(!config.file);
        assert!(config.color);
    }

    #[test]
    fn test_log_config_verbose() {
        let config = LogConfig::verbose();
        assert_eq!(config.level, LevelFilter::Debug);
        assert!(config.module_path);
    }

    #[test]
    fn test_log_config_quiet() {
        let config = LogConfig::quiet();
        assert_eq!(config.level, LevelFilter::Error);
        assert!(!config.timestamps);
    }

    #[test]
    fn test_log_config_from_config() {
        let mut app = Config::default();
        app.logging.log_level = "warning".to_string();
        app.logging.log_to_file = true;
        app.logging.log_path = Some(PathBuf::from("/var/log/unmask"));

        let config = LogConfig::from_config(&app);
        assert_eq!(config.level, LevelFilter::Warn);
        assert_eq!(
            config.file_path,
            Some(PathBuf::from("/var/log/unmask").join(LOG_FILE_NAME))
        );
        assert!(!config.color);

        let verbose = config.clone().with_verbosity(true, false);
        assert_eq!(verbose.level, LevelFilter::Debug);
        assert!(verbose.module_path);
        assert!(verbose.file);
        assert!(!verbose.color);

        let quiet = config.clone().with_verbosity(false, true);
        assert_eq!(quiet.level, LevelFilter::Error);
        assert!(!quiet.timestamps);
        assert_eq!(quiet.file_path, config.file_path);

        let unchanged = config.clone().with_verbosity(false, false);
        assert_eq!(unchanged.level, LevelFilter::Warn);
    }

    #[test]
    fn test_cleanup_keeps_recent_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("recent.log"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let deleted = cleanup_old_logs(dir.path(), 30).unwrap();
        assert_eq!(deleted, 0);
        assert!(dir.path().join("recent.log").exists());

        assert_eq!(cleanup_old_logs(&dir.path().join("absent"), 30).unwrap(), 0);
    }
}
