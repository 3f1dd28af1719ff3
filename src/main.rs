//! Media Dater - organize photos and videos by capture date
//!
//! A CLI tool that reads capture timestamps through exiftool and files
//! media into date-structured folders.

use anyhow::Result;
use clap::Parser;
use media_dater::{Cli, Config, ExifToolProvider, Processor};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored console output for the end of a run

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use media_dater::{FileEvent, Reporter, RunStats, TracingReporter};
    use std::io::stdout;
    use std::path::PathBuf;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.len()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(&format!(
            "{}{} {} {}\n\n",
            left_pad,
            "╔".bold(),
            title.bold(),
            "╗".bold(),
        )));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str, value_color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(value_color)));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_stat(key: &str, value: usize, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value.to_string()).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print a processing result line
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(dest_or_msg).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }

    /// Reporter that logs every decision and prints a colored summary.
    ///
    /// Per-file lines are printed only in verbose mode; failures are always
    /// listed at the end.
    pub struct ConsoleReporter {
        verbose: bool,
        dry_run: bool,
        log: TracingReporter,
        failures: Vec<(PathBuf, String)>,
    }

    impl ConsoleReporter {
        pub fn new(verbose: bool, dry_run: bool) -> Self {
            Self {
                verbose,
                dry_run,
                log: TracingReporter,
                failures: Vec::new(),
            }
        }

        fn print_event(event: &FileEvent) {
            match event {
                FileEvent::Transferred {
                    source,
                    target,
                    dry_run,
                    ..
                } => print_result(
                    if *dry_run { "~" } else { "✓" },
                    if *dry_run {
                        CliTheme::ACCENT
                    } else {
                        CliTheme::SUCCESS
                    },
                    &source.display().to_string(),
                    &format!("→ {}", target.display()),
                ),
                FileEvent::Sidecar { source, target, .. } => print_result(
                    "+",
                    CliTheme::SUCCESS,
                    &source.display().to_string(),
                    &format!("→ {}", target.display()),
                ),
                FileEvent::Duplicate {
                    source, existing, ..
                } => print_result(
                    "≡",
                    CliTheme::ACCENT,
                    &source.display().to_string(),
                    &format!("duplicate of {}", existing.display()),
                ),
                FileEvent::Skipped { source, reason } => print_result(
                    "⊘",
                    CliTheme::WARNING,
                    &source.display().to_string(),
                    &format!("skipped, {}", reason),
                ),
                FileEvent::Failed { source, error } => print_result(
                    "✗",
                    CliTheme::ERROR,
                    &source.display().to_string(),
                    error,
                ),
            }
        }
    }

    impl Reporter for ConsoleReporter {
        fn file_event(&mut self, event: &FileEvent) {
            self.log.file_event(event);

            if let FileEvent::Failed { source, error } = event {
                self.failures.push((source.clone(), error.clone()));
            }
            if self.verbose {
                Self::print_event(event);
            }
        }

        fn run_finished(&mut self, stats: &RunStats) {
            self.log.run_finished(stats);

            print_separator();
            print_title("Processing complete");
            print_separator();

            print_blank();
            print_stat("Processed", stats.processed, CliTheme::SUCCESS);
            print_stat("  Images", stats.images, CliTheme::SUCCESS);
            print_stat("  Videos", stats.videos, CliTheme::SUCCESS);
            print_stat("  Unknown", stats.unknown, CliTheme::SUCCESS);
            print_stat("Sidecars", stats.sidecars, CliTheme::SUCCESS);
            print_stat("Duplicates", stats.duplicates, CliTheme::ACCENT);
            print_stat("Skipped", stats.skipped, CliTheme::WARNING);
            print_stat("Failed", stats.failed, CliTheme::ERROR);
            print_blank();

            if !self.failures.is_empty() {
                print_separator();
                print_error(&format!("Failed files: {}", self.failures.len()));
                print_blank();
                for (source, error) in &self.failures {
                    print_key_value(&source.display().to_string(), error, CliTheme::ERROR);
                }
            }

            if self.dry_run {
                print_separator();
                print_warning("Dry run: no files were changed");
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Media Dater starting");

    if let Some(ref path) = cli.init_config {
        Config::write_sample(path)?;
        info!(path = %path.display(), "Sample configuration written");
        return Ok(());
    }

    let config = load_config(&cli)?;
    if let Some(ref path) = cli.save_config {
        config.save_to_file(path)?;
        info!(path = %path.display(), "Configuration saved");
        return Ok(());
    }
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }
    validate_config(&config)?;

    let provider = ExifToolProvider::new(config.exiftool.clone());
    if let Err(e) = provider.ensure_available() {
        error!(error = %e, "Dependency check failed");
        cli_output::print_error(&e.to_string());
        std::process::exit(1);
    }

    let mut reporter = cli_output::ConsoleReporter::new(cli.verbose, config.dry_run);
    let mut processor = Processor::new(config)?;

    match processor.run(&provider, &mut reporter) {
        Ok(stats) => {
            if let Some(ref log_file) = cli.log_file {
                info!(log_file = %log_file.display(), "Processing complete. Log saved to");
            }
            if stats.failed > 0 {
                warn!(failed = stats.failed, "Some files could not be processed");
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            cli_output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Resolve config path - accepts the name without `.toml`
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }

    let with_extension = config_path.with_extension("toml");
    if with_extension.exists() {
        with_extension
    } else {
        config_path.to_path_buf()
    }
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    Ok(config)
}

/// Setup logging: console always, file when requested
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(ref log_path) = cli.log_file else {
        subscriber.init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    let Some(ref input_dir) = config.input_dir else {
        anyhow::bail!("No input directory given. Pass INPUT or set input_dir in the config file");
    };
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    if config.output.enabled().next().is_none() {
        anyhow::bail!(
            "No output directory given. Pass OUTPUT, one of --images-output, \
             --videos-output, --unknown-output, or set [output] in the config file"
        );
    }

    if let Some(ref pattern) = config.date_pattern()? {
        let missing = pattern.missing_groups();
        if !missing.is_empty() {
            cli_output::print_warning(&format!(
                "Date regex is missing the groups {}; file names will never match",
                missing.join(", ")
            ));
        }
    }

    for (category, root) in config.output.enabled() {
        if root != input_dir.as_path() && root.starts_with(input_dir) {
            warn!(%category, root = %root.display(), "Output root is inside the input directory and will not be scanned");
        }
    }

    Ok(())
}
