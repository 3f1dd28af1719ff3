//! CLI argument parsing with clap

use crate::config::{Config, OutputRoots, TransferStrategy};
use crate::time::parse_date_format;
use clap::Parser;
use std::path::PathBuf;

/// Media Dater - organize photos and videos by capture date
///
/// Reads capture timestamps with exiftool (or from file names) and files
/// every image and video into a date-based folder layout. Files without a
/// usable date go to a separate "unknown" folder.
#[derive(Parser, Debug, Default)]
#[command(name = "media-dater")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory scanned recursively for media files
    pub input: Option<PathBuf>,

    /// Output root for images and videos; unknown files go to OUTPUT/unknown
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Output root for images (overrides OUTPUT)
    #[arg(long)]
    pub images_output: Option<PathBuf>,

    /// Output root for videos (overrides OUTPUT)
    #[arg(long)]
    pub videos_output: Option<PathBuf>,

    /// Output root for files without a usable date (overrides OUTPUT/unknown)
    #[arg(long)]
    pub unknown_output: Option<PathBuf>,

    /// Only process images; videos are skipped
    #[arg(short = 'i', long, conflicts_with = "only_videos")]
    pub only_images: bool,

    /// Only process videos; images are skipped
    #[arg(short = 'v', long)]
    pub only_videos: bool,

    /// Folder layout shorthand, e.g. YYYY/MM/DD or YYYY/M
    ///
    /// Tokens: YYYY, YY (year), MM (month), M (month name), m (short month
    /// name), DDD (day of year), DD (day).
    #[arg(short, long, conflicts_with = "dir_format")]
    pub date: Option<String>,

    /// Folder layout as a raw strftime template
    #[arg(long)]
    pub dir_format: Option<String>,

    /// strftime template for output file names
    #[arg(short = 'o', long = "output-name")]
    pub file_name_format: Option<String>,

    /// Regex with named groups year, month, day, hour, minute and second used
    /// to read dates from file names
    #[arg(short, long)]
    pub regex: Option<String>,

    /// Move files instead of copying them
    #[arg(short, long = "move", conflicts_with = "link")]
    pub move_files: bool,

    /// Hard link files instead of copying them
    #[arg(short, long)]
    pub link: bool,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, env = "MEDIA_DATER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Write the log file as JSON
    #[arg(long, requires = "log_file")]
    pub json_log: bool,

    /// Write a commented sample configuration file and exit
    #[arg(long, value_name = "PATH", conflicts_with = "save_config")]
    pub init_config: Option<PathBuf>,

    /// Save the effective configuration (file merged with flags) and exit
    #[arg(long, value_name = "PATH")]
    pub save_config: Option<PathBuf>,
}

impl Cli {
    /// Transfer strategy selected by flags, if any
    pub fn strategy(&self) -> Option<TransferStrategy> {
        if self.move_files {
            Some(TransferStrategy::Move)
        } else if self.link {
            Some(TransferStrategy::Link)
        } else {
            None
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref input) = self.input {
            config.input_dir = Some(input.clone());
        }
        if let Some(ref output) = self.output {
            config.output = OutputRoots::under(output);
        }
        if let Some(ref images) = self.images_output {
            config.output.images = Some(images.clone());
        }
        if let Some(ref videos) = self.videos_output {
            config.output.videos = Some(videos.clone());
        }
        if let Some(ref unknown) = self.unknown_output {
            config.output.unknown = Some(unknown.clone());
        }
        if self.only_images {
            config.output.videos = None;
        }
        if self.only_videos {
            config.output.images = None;
        }
        if let Some(ref date) = self.date {
            config.dir_format = parse_date_format(date);
        }
        if let Some(ref dir_format) = self.dir_format {
            config.dir_format = dir_format.clone();
        }
        if let Some(ref file_name_format) = self.file_name_format {
            config.file_name_format = file_name_format.clone();
        }
        if let Some(ref regex) = self.regex {
            config.date_regex = Some(regex.clone());
        }
        if let Some(strategy) = self.strategy() {
            config.strategy = strategy;
        }
        if self.dry_run {
            config.dry_run = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
