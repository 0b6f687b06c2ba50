//! unmask: find files whose extension disguises their real content.
//!
//! This is the main entry point for the CLI application.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use unmask::core::config::Config;
use unmask::core::error::{Error, Result};
use unmask::core::types::{BatchReport, DisguiseStatus, ReportFormat, ScanStatus};
use unmask::scanner::{collect_paths, BatchScanner, ConsoleProgressReporter, FileAnalyzer};
use unmask::ui::cli::{Cli, Commands, ConfigAction};
use unmask::ui::report::{format_bytes, ReportWriter};
use unmask::utils::logging::{cleanup_old_logs, init_logging, LogConfig};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("[{}] {:?}", e.category(), e);
            eprintln!("Error: {}", e);
            if let Some(hint) = e.suggestion() {
                eprintln!("Hint: {}", hint);
            }
            if e.is_cancelled() {
                // Conventional status for a run stopped by SIGINT
                ExitCode::from(130)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    let (config, config_error) = Config::load_or_default();

    init_logging(LogConfig::from_config(&config).with_verbosity(cli.verbose, cli.quiet))?;
    log::debug!("unmask v{}", env!("CARGO_PKG_VERSION"));

    if let Some(e) = config_error {
        log::warn!("[{}] {}; using defaults", e.category(), e);
    }

    if config.logging.log_to_file {
        if let Err(e) = cleanup_old_logs(&config.logging.log_dir(), config.logging.keep_logs_days) {
            log::warn!("Log cleanup failed: {}", e);
        }
    }

    // Handle commands
    match cli.command {
        Some(Commands::Scan {
            paths,
            output_dir,
            report_format,
            recursive,
            workers,
            timeout,
        }) => {
            let mut config = config;
            apply_scan_overrides(&mut config, output_dir, report_format, recursive, workers, timeout)?;
            run_scan(Arc::new(config), paths, cli.verbose, cli.quiet).await
        }
        Some(Commands::Config { action }) => run_config(action, &config),
        Some(Commands::Info) => run_info(&config),
        None => {
            // No command specified, show help
            println!("unmask - find files whose extension disguises their content");
            println!();
            println!("Use --help for usage information");
            println!();
            println!("Quick start:");
            println!("  unmask scan ~/Downloads         Scan a folder");
            println!("  unmask scan a.pdf b.jpg -f csv  Scan files, write a CSV report");
            println!("  unmask info                     Show paths and settings");
            Ok(())
        }
    }
}

/// Apply per-invocation flags on top of the stored configuration.
fn apply_scan_overrides(
    config: &mut Config,
    output_dir: Option<PathBuf>,
    report_format: Option<ReportFormat>,
    recursive: bool,
    workers: Option<usize>,
    timeout: Option<u64>,
) -> Result<()> {
    if let Some(dir) = output_dir {
        config.report.output_dir = dir;
    }
    if let Some(format) = report_format {
        config.report.format = format;
    }
    if recursive {
        config.scan.recursive = true;
    }
    if let Some(workers) = workers {
        config.scan.workers = workers;
    }
    if let Some(secs) = timeout {
        config.scan.file_timeout_secs = secs;
    }
    config.validate()
}

/// Scan the given paths, print a summary and write the report.
async fn run_scan(config: Arc<Config>, paths: Vec<PathBuf>, verbose: bool, quiet: bool) -> Result<()> {
    let files = collect_paths(&paths, &config.scan)?;
    let scanner = Arc::new(BatchScanner::new(Arc::clone(&config)));

    if !quiet {
        let reporter = if verbose {
            ConsoleProgressReporter::new().verbose()
        } else {
            ConsoleProgressReporter::new()
        };
        scanner.set_progress_callback(move |progress| reporter.report(&progress));
    }

    let interrupt_scanner = Arc::clone(&scanner);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing files already in progress");
            interrupt_scanner.cancel();
        }
    });

    let report = scanner.scan(files).await;
    interrupt.abort();
    let report = report?;

    if !quiet {
        print_summary(&report);
    }

    let writer = ReportWriter::from_config(&config);
    let path = writer.render(&report)?;
    println!("{}", path.display());

    if report.status == ScanStatus::Cancelled {
        return Err(Error::ScanCancelled);
    }
    if report.all_failed() {
        return Err(Error::AllFilesFailed {
            count: report.failed(),
        });
    }

    Ok(())
}

/// Print a human summary of a scan to stderr.
fn print_summary(report: &BatchReport) {
    eprintln!();
    eprintln!("=== Scan {} ===", report.status);
    eprintln!("Report ID:      {}", report.report_id);
    eprintln!("Processed:      {} of {}", report.processed(), report.requested);
    eprintln!("Normal:         {}", report.count(DisguiseStatus::Normal));
    eprintln!("Disguised:      {}", report.count(DisguiseStatus::Disguised));
    eprintln!("Unverifiable:   {}", report.count(DisguiseStatus::Unverifiable));
    eprintln!("Failed:         {}", report.failed());
    eprintln!("Data analyzed:  {}", format_bytes(report.total_bytes()));
    if let Some(duration) = report.duration_secs() {
        eprintln!("Duration:       {:.2} seconds", duration);
    }

    let disguised: Vec<_> = report.disguised().collect();
    if !disguised.is_empty() {
        eprintln!();
        eprintln!("Disguised files:");
        for result in disguised {
            eprintln!(
                "  {} (declared .{}, content is {})",
                result.path.display(),
                result.declared_extension,
                result.detected_extension
            );
        }
    }
    eprintln!();
}

/// Handle configuration commands.
fn run_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigAction::Reset => {
            log::info!("Resetting configuration to defaults...");
            Config::default().save(&Config::default_config_path())?;
            println!("Configuration reset to defaults.");
        }
    }
    Ok(())
}

/// Show application information.
fn run_info(config: &Config) -> Result<()> {
    let analyzer = FileAnalyzer::from_config(config);

    println!("unmask - file disguise detector");
    println!();
    println!("Version:          {}", env!("CARGO_PKG_VERSION"));
    println!("Config Path:      {}", Config::default_config_path().display());
    println!("Data Directory:   {}", Config::data_dir().display());
    println!("Report Directory: {}", config.report.output_dir.display());
    println!("Log Directory:    {}", config.logging.log_dir().display());
    println!();
    println!("Scan Settings:");
    println!("  Classifier:     {}", analyzer.classifier_name());
    println!("  Workers:        {}", config.scan.workers);
    println!("  Sniff Bytes:    {}", config.scan.sniff_bytes);
    println!("  File Timeout:   {}s", config.scan.file_timeout_secs);
    println!("  Recursive:      {}", config.scan.recursive);
    println!("  Aliases:        {}", config.scan.match_extension_aliases);
    println!();
    println!("Report Settings:");
    println!("  Format:         {}", config.report.format);
    println!("  Base Name:      {}", config.report.base_name);
    Ok(())
}
