//! Command-line interface definition.

use crate::core::types::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// unmask: find files whose extension lies about their content
#[derive(Parser, Debug)]
#[command(name = "unmask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check files against their content signatures and write a report
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory that receives the report
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Report format
        #[arg(short = 'f', long = "format", value_enum)]
        report_format: Option<ReportFormat>,

        /// Walk subdirectories of directory arguments
        #[arg(short, long)]
        recursive: bool,

        /// Number of files analyzed concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-file timeout in seconds (0 disables)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show application information
    Info,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::try_parse_from([
            "unmask", "scan", "a.txt", "photos", "-o", "out", "-f", "csv", "-r", "-w", "3",
            "--timeout", "5",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Scan {
                paths,
                output_dir,
                report_format,
                recursive,
                workers,
                timeout,
            }) => {
                assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("photos")]);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(report_format, Some(ReportFormat::Csv));
                assert!(recursive);
                assert_eq!(workers, Some(3));
                assert_eq!(timeout, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_path() {
        assert!(Cli::try_parse_from(["unmask", "scan"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["unmask", "info", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Info)));

        assert!(Cli::try_parse_from(["unmask", "-v", "-q", "info"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["unmask", "config", "reset"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Reset
            })
        ));
    }
}
