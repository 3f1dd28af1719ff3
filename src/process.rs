//! Main file processor
//!
//! Handles the core logic of:
//! - Checking and creating output roots
//! - Walking the input directory in a stable order
//! - Resolving each file's category, timestamp and destination
//! - Resolving collisions and transferring the file and its sidecar
//!
//! Files are processed one at a time. The file system is the only shared
//! state: each candidate name is checked right before it is written.

use crate::collision::{CollisionOutcome, resolve_collision};
use crate::config::{Config, TransferStrategy};
use crate::error::{Error, Result};
use crate::media::{MediaCategory, classify};
use crate::metadata::{MetadataProvider, MetadataRecord};
use crate::path::{PathBuilder, Route, SkipReason, TargetLocation};
use crate::report::{FileEvent, Reporter, RunStats};
use crate::sidecar::{self, is_sidecar};
use crate::time::{DatePattern, Resolution, resolve};
use crate::transfer::is_source_missing;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, trace, warn};
use walkdir::WalkDir;

/// Everything known about one source file while it is being handled
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub filename: OsString,
    pub metadata: Option<MetadataRecord>,
    pub category: MediaCategory,
    pub resolution: Resolution,
    pub route: Route,
}

impl SourceFile {
    /// Extract metadata and decide where the file belongs.
    ///
    /// A failed extraction is treated exactly like a file without metadata.
    pub fn inspect(
        path: &Path,
        provider: &dyn MetadataProvider,
        pattern: Option<&DatePattern>,
        builder: &PathBuilder,
    ) -> Self {
        let filename = path.file_name().map(OsStr::to_os_string).unwrap_or_default();

        let metadata = match provider.extract(path) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(?path, error = %e, "No metadata available");
                None
            }
        };

        let category = classify(metadata.as_ref().and_then(|m| m.mime_type()));
        let resolution = match category {
            MediaCategory::Unknown => Resolution::Unresolved,
            _ => resolve(metadata.as_ref(), &filename.to_string_lossy(), pattern),
        };
        let route = builder.build(category, resolution.timestamp(), &filename);

        Self {
            path: path.to_path_buf(),
            filename,
            metadata,
            category,
            resolution,
            route,
        }
    }
}

/// Main processor for organizing media files
pub struct Processor {
    config: Config,
    builder: PathBuilder,
    pattern: Option<DatePattern>,
    stats: RunStats,
}

impl Processor {
    /// Create a new processor with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let pattern = config.date_pattern()?;
        if let Some(ref pattern) = pattern {
            let missing = pattern.missing_groups();
            if !missing.is_empty() {
                warn!(
                    pattern = pattern.as_str(),
                    missing = ?missing,
                    "Date pattern lacks required groups and will never match"
                );
            }
        }

        Ok(Self {
            builder: PathBuilder::from_config(&config),
            config,
            pattern,
            stats: RunStats::new(),
        })
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the processing pipeline over the configured input directory
    pub fn run(
        &mut self,
        provider: &dyn MetadataProvider,
        reporter: &mut dyn Reporter,
    ) -> Result<RunStats> {
        let _span = span!(Level::INFO, "processor_run").entered();

        let input = self
            .config
            .input_dir
            .clone()
            .ok_or_else(|| Error::InputMissing(PathBuf::new()))?;
        if !input.is_dir() {
            return Err(Error::InputMissing(input));
        }

        info!("Checking directories...");
        self.check_directories()?;

        info!(input = ?input, "Processing files...");
        self.stats = RunStats::new();
        for path in self.collect_files(&input) {
            self.process_file(&path, provider, reporter);
        }

        if self.config.strategy == TransferStrategy::Move
            && self.config.remove_empty_dirs
            && !self.config.dry_run
        {
            remove_empty_dirs(&input);
        }

        reporter.run_finished(&self.stats);
        info!("All files are processed.");
        Ok(self.stats.clone())
    }

    /// Create every enabled output root. Failure aborts the run.
    fn check_directories(&self) -> Result<()> {
        for (category, root) in self.builder.roots().enabled() {
            if root.is_dir() {
                continue;
            }
            if self.config.dry_run {
                info!(%category, root = ?root, "Output directory does not exist (dry run, not creating)");
                continue;
            }
            info!(%category, root = ?root, "Output directory does not exist, creating now");
            fs::create_dir_all(root).map_err(|e| Error::OutputUnwritable {
                category,
                path: root.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Collect candidate files in a deterministic, name-sorted order
    fn collect_files(&self, input: &Path) -> Vec<PathBuf> {
        let roots: Vec<&Path> = self.builder.roots().enabled().map(|(_, root)| root).collect();

        WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Never descend into an output root nested in the input
                e.depth() == 0 || !e.file_type().is_dir() || !roots.contains(&e.path())
            })
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    None
                }
            })
            .filter(|e| !e.file_type().is_dir())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                if self.config.is_ignored(&name) {
                    trace!(path = ?e.path(), "Ignored file");
                    return false;
                }
                // Sidecars travel with their primary file
                !is_sidecar(e.path())
            })
            .map(|e| e.into_path())
            .collect()
    }

    /// Process a single file, reporting exactly one primary decision
    pub fn process_file(
        &mut self,
        path: &Path,
        provider: &dyn MetadataProvider,
        reporter: &mut dyn Reporter,
    ) {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();

        let source = SourceFile::inspect(path, provider, self.pattern.as_ref(), &self.builder);
        let location = match source.route {
            Route::Target(ref location) => location.clone(),
            Route::Skipped(ref reason) => {
                self.emit(
                    reporter,
                    FileEvent::Skipped {
                        source: source.path.clone(),
                        reason: reason.clone(),
                    },
                );
                return;
            }
        };

        if let Err(event) = self.place(&source, &location, reporter) {
            self.emit(reporter, event);
        }
    }

    /// Resolve the final name and transfer. Errors come back as the event
    /// to report.
    fn place(
        &mut self,
        source: &SourceFile,
        location: &TargetLocation,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<(), FileEvent> {
        let path = source.path.as_path();
        let failed = |error: String| FileEvent::Failed {
            source: path.to_path_buf(),
            error,
        };
        let vanished = |detail: String| FileEvent::Skipped {
            source: path.to_path_buf(),
            reason: SkipReason::SourceVanished(detail),
        };

        if !path.exists() {
            return Err(vanished(path.display().to_string()));
        }

        let dry_run = self.config.dry_run;
        let strategy = self.config.strategy;

        if !dry_run {
            fs::create_dir_all(&location.directory).map_err(|e| {
                failed(format!(
                    "cannot create {}: {}",
                    location.directory.display(),
                    e
                ))
            })?;
        }

        let outcome = resolve_collision(path, &location.path()).map_err(|e| failed(e.to_string()))?;

        let target = match &outcome {
            CollisionOutcome::DuplicateOf(existing) => {
                let removed = if dry_run {
                    false
                } else {
                    strategy
                        .discard_duplicate(path)
                        .map_err(|e| failed(e.to_string()))?
                };
                self.emit(
                    reporter,
                    FileEvent::Duplicate {
                        source: path.to_path_buf(),
                        existing: existing.clone(),
                        category: source.category,
                        removed,
                    },
                );
                return Ok(());
            }
            CollisionOutcome::AlreadyInPlace(_) => {
                return Err(FileEvent::Skipped {
                    source: path.to_path_buf(),
                    reason: SkipReason::AlreadyInPlace,
                });
            }
            CollisionOutcome::UseDirectly(target)
            | CollisionOutcome::UseSuffixed { path: target, .. } => target.clone(),
        };

        if !dry_run {
            strategy.transfer(path, &target).map_err(|e| {
                if is_source_missing(&e) {
                    vanished(e.to_string())
                } else {
                    failed(e.to_string())
                }
            })?;
        }

        self.emit(
            reporter,
            FileEvent::Transferred {
                source: path.to_path_buf(),
                target,
                category: source.category,
                timestamp: source.resolution.timestamp().cloned(),
                dry_run,
            },
        );

        self.place_sidecar(path, location, outcome.suffix(), reporter);
        Ok(())
    }

    /// Transfer the sidecar of an already placed primary file
    fn place_sidecar(
        &mut self,
        path: &Path,
        location: &TargetLocation,
        suffix: u32,
        reporter: &mut dyn Reporter,
    ) {
        let Some(plan) = sidecar::pair(path, &location.filename, suffix, &location.directory)
        else {
            return;
        };

        let event = if plan.target.exists() {
            FileEvent::Failed {
                source: plan.source,
                error: format!("sidecar target {} already exists", plan.target.display()),
            }
        } else if self.config.dry_run {
            FileEvent::Sidecar {
                source: plan.source,
                target: plan.target,
                dry_run: true,
            }
        } else {
            match self.config.strategy.transfer(&plan.source, &plan.target) {
                Ok(()) => FileEvent::Sidecar {
                    source: plan.source,
                    target: plan.target,
                    dry_run: false,
                },
                Err(e) => FileEvent::Failed {
                    source: plan.source,
                    error: e.to_string(),
                },
            }
        };
        self.emit(reporter, event);
    }

    fn emit(&mut self, reporter: &mut dyn Reporter, event: FileEvent) {
        self.stats.record(&event);
        reporter.file_event(&event);
    }
}

/// Remove directories below `input` that are empty, deepest first
fn remove_empty_dirs(input: &Path) {
    let dirs: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();

    for dir in dirs {
        let is_empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            match fs::remove_dir(&dir) {
                Ok(()) => info!(dir = ?dir, "Deleted empty directory"),
                Err(e) => warn!(dir = ?dir, error = %e, "Failed to delete empty directory"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputRoots;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const CAMERA_PATTERN: &str = r".*[_-](?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})[_-]?(?P<hour>\d{2})(?P<minute>\d{2})(?P<second>\d{2})";

    /// Metadata keyed by file name; unknown names fail extraction
    #[derive(Default)]
    struct FakeProvider(HashMap<String, MetadataRecord>);

    impl FakeProvider {
        fn with(mut self, filename: &str, pairs: &[(&str, &str)]) -> Self {
            self.0
                .insert(filename.to_string(), pairs.iter().copied().collect());
            self
        }
    }

    impl MetadataProvider for FakeProvider {
        fn extract(&self, path: &Path) -> Result<MetadataRecord> {
            let name = path.file_name().unwrap().to_string_lossy();
            self.0
                .get(name.as_ref())
                .cloned()
                .ok_or_else(|| Error::MetadataExtraction {
                    path: path.to_path_buf(),
                    message: "no fake metadata".into(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<FileEvent>,
        finished: Option<RunStats>,
    }

    impl Reporter for RecordingReporter {
        fn file_event(&mut self, event: &FileEvent) {
            self.events.push(event.clone());
        }

        fn run_finished(&mut self, stats: &RunStats) {
            self.finished = Some(stats.clone());
        }
    }

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let input = dir.path().join("input");
            let output = dir.path().join("output");
            fs::create_dir_all(&input).unwrap();
            Self {
                _dir: dir,
                input,
                output,
            }
        }

        fn write(&self, relative: &str, content: &[u8]) -> PathBuf {
            let path = self.input.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
            path
        }

        fn config(&self) -> Config {
            Config {
                input_dir: Some(self.input.clone()),
                output: OutputRoots::under(&self.output),
                dir_format: "%Y/%m/%d".into(),
                ..Config::default()
            }
        }

        fn dated(&self, name: &str) -> PathBuf {
            self.output.join("2017/01/01").join(name)
        }
    }

    fn run(config: Config, provider: &FakeProvider) -> (RunStats, RecordingReporter) {
        let mut reporter = RecordingReporter::default();
        let mut processor = Processor::new(config).unwrap();
        let stats = processor.run(provider, &mut reporter).unwrap();
        (stats, reporter)
    }

    const JPEG_2017: &[(&str, &str)] = &[
        ("CreateDate", "2017-01-01 01:01:01"),
        ("MIMEType", "image/jpeg"),
    ];

    #[test]
    fn test_image_with_create_date() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);

        let (stats, reporter) = run(fx.config(), &provider);

        assert!(fx.dated("20170101-010101.jpg").is_file());
        assert!(fx.input.join("exif.jpg").exists());
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.images, 1);
        assert_eq!(reporter.finished, Some(stats));
    }

    #[test]
    fn test_subseconds_in_filename() {
        let fx = Fixture::new();
        fx.write("sub.JPG", b"jpeg");
        let provider = FakeProvider::default().with(
            "sub.JPG",
            &[
                ("CreateDate", "2017-01-01 01:01:01.20"),
                ("MIMEType", "image/jpeg"),
            ],
        );

        run(fx.config(), &provider);
        assert!(fx.dated("20170101-01010120.jpg").is_file());
    }

    #[test]
    fn test_video_from_filename_pattern() {
        let fx = Fixture::new();
        fx.write("VID_20170101_010101.mp4", b"mp4");
        let provider =
            FakeProvider::default().with("VID_20170101_010101.mp4", &[("MIMEType", "video/mp4")]);
        let config = Config {
            date_regex: Some(CAMERA_PATTERN.into()),
            ..fx.config()
        };

        let (stats, _) = run(config, &provider);
        assert!(fx.dated("20170101-010101.mp4").is_file());
        assert_eq!(stats.videos, 1);
    }

    #[test]
    fn test_invalid_date_goes_to_unknown() {
        let fx = Fixture::new();
        fx.write("Invalid.JPG", b"jpeg");
        let provider = FakeProvider::default().with(
            "Invalid.JPG",
            &[("CreateDate", "Invalid"), ("MIMEType", "image/jpeg")],
        );

        let (stats, _) = run(fx.config(), &provider);
        assert!(fx.output.join("unknown").join("Invalid.JPG").is_file());
        assert_eq!(stats.images, 1);
    }

    #[test]
    fn test_no_metadata_goes_to_unknown() {
        let fx = Fixture::new();
        fx.write("notes.txt", b"text");

        let (stats, _) = run(fx.config(), &FakeProvider::default());
        assert!(fx.output.join("unknown").join("notes.txt").is_file());
        assert_eq!(stats.unknown, 1);
    }

    #[test]
    fn test_disabled_images_root_skips() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);
        let mut config = fx.config();
        config.output.images = None;

        let (stats, reporter) = run(config, &provider);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.processed, 0);
        assert!(!fx.output.join("unknown").join("exif.jpg").exists());
        assert_eq!(
            reporter.events,
            vec![FileEvent::Skipped {
                source: fx.input.join("exif.jpg"),
                reason: SkipReason::CategoryDisabled(MediaCategory::Image),
            }]
        );
    }

    #[test]
    fn test_duplicate_is_not_copied_twice() {
        let fx = Fixture::new();
        fx.write("a/exif.jpg", b"jpeg");
        fx.write("b/exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);

        let (stats, reporter) = run(fx.config(), &provider);

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.duplicates, 1);
        assert!(fx.dated("20170101-010101.jpg").is_file());
        assert!(!fx.dated("20170101-010101-001.jpg").exists());
        assert!(matches!(
            reporter.events.last(),
            Some(FileEvent::Duplicate { removed: false, .. })
        ));
        assert!(fx.input.join("b/exif.jpg").exists());
    }

    #[test]
    fn test_move_deletes_duplicate_source() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);
        fs::create_dir_all(fx.dated("")).unwrap();
        fs::write(fx.dated("20170101-010101.jpg"), b"jpeg").unwrap();

        let config = Config {
            strategy: TransferStrategy::Move,
            ..fx.config()
        };
        let (stats, _) = run(config, &provider);

        assert_eq!(stats.duplicates, 1);
        assert!(!fx.input.join("exif.jpg").exists());
        assert!(!fx.dated("20170101-010101-001.jpg").exists());
    }

    #[test]
    fn test_same_date_different_files_get_suffixes() {
        let fx = Fixture::new();
        for i in 0..3 {
            fx.write(&format!("img{}.jpg", i), format!("content {}", i).as_bytes());
        }
        let provider = FakeProvider::default()
            .with("img0.jpg", JPEG_2017)
            .with("img1.jpg", JPEG_2017)
            .with("img2.jpg", JPEG_2017);

        let (stats, _) = run(fx.config(), &provider);

        assert_eq!(stats.processed, 3);
        assert_eq!(fs::read(fx.dated("20170101-010101.jpg")).unwrap(), b"content 0");
        assert_eq!(fs::read(fx.dated("20170101-010101-001.jpg")).unwrap(), b"content 1");
        assert_eq!(fs::read(fx.dated("20170101-010101-002.jpg")).unwrap(), b"content 2");
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);

        run(fx.config(), &provider);
        let (stats, _) = run(fx.config(), &provider);

        assert_eq!(stats.processed, 0);
        assert_eq!(stats.duplicates, 1);
        let files: Vec<_> = fs::read_dir(fx.dated("")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_sidecars_follow_primary() {
        let fx = Fixture::new();
        fx.write("xmp.jpg", b"one");
        fx.write("xmp.jpg.xmp", b"meta one");
        fx.write("xmp_noext.jpg", b"two");
        fx.write("xmp_noext.xmp", b"meta two");
        let provider = FakeProvider::default()
            .with("xmp.jpg", JPEG_2017)
            .with("xmp_noext.jpg", JPEG_2017);

        let (stats, _) = run(fx.config(), &provider);

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.sidecars, 2);
        assert_eq!(fs::read(fx.dated("20170101-010101.jpg")).unwrap(), b"one");
        assert_eq!(fs::read(fx.dated("20170101-010101.jpg.xmp")).unwrap(), b"meta one");
        assert_eq!(fs::read(fx.dated("20170101-010101-001.jpg")).unwrap(), b"two");
        assert_eq!(fs::read(fx.dated("20170101-010101-1.xmp")).unwrap(), b"meta two");
    }

    #[test]
    fn test_move_with_pattern_moves_sidecar_and_cleans_up() {
        let fx = Fixture::new();
        fx.write("nested/tmp_20170101_010101.jpg", b"img");
        fx.write("nested/tmp_20170101_010101.xmp", b"meta");
        let provider = FakeProvider::default()
            .with("tmp_20170101_010101.jpg", &[("MIMEType", "image/jpeg")]);
        let config = Config {
            strategy: TransferStrategy::Move,
            date_regex: Some(CAMERA_PATTERN.into()),
            ..fx.config()
        };

        run(config, &provider);

        assert!(fx.dated("20170101-010101.jpg").is_file());
        assert!(fx.dated("20170101-010101.xmp").is_file());
        assert!(!fx.input.join("nested").exists());
        assert!(fx.input.exists());
    }

    #[test]
    fn test_link_keeps_sources() {
        let fx = Fixture::new();
        fx.write("tmp_20170101_010101.jpg", b"img");
        fx.write("tmp_20170101_010101.xmp", b"meta");
        let provider = FakeProvider::default()
            .with("tmp_20170101_010101.jpg", &[("MIMEType", "image/jpeg")]);
        let config = Config {
            strategy: TransferStrategy::Link,
            date_regex: Some(CAMERA_PATTERN.into()),
            ..fx.config()
        };

        run(config, &provider);

        assert!(fx.input.join("tmp_20170101_010101.jpg").exists());
        assert!(fx.input.join("tmp_20170101_010101.xmp").exists());
        assert!(fx.dated("20170101-010101.jpg").is_file());
        assert!(fx.dated("20170101-010101.xmp").is_file());
    }

    #[test]
    fn test_ignored_files_and_lone_sidecars() {
        let fx = Fixture::new();
        fx.write(".DS_Store", b"junk");
        fx.write("Thumbs.db", b"junk");
        fx.write("orphan.xmp", b"meta");

        let (stats, reporter) = run(fx.config(), &FakeProvider::default());

        assert!(reporter.events.is_empty());
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);
        let config = Config {
            dry_run: true,
            strategy: TransferStrategy::Move,
            ..fx.config()
        };

        let (stats, reporter) = run(config, &provider);

        assert_eq!(stats.processed, 1);
        assert!(!fx.output.exists());
        assert!(fx.input.join("exif.jpg").exists());
        assert!(matches!(
            reporter.events.as_slice(),
            [FileEvent::Transferred { dry_run: true, .. }]
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink(fx.input.join("missing.jpg"), fx.input.join("link.jpg"))
            .unwrap();
        let provider = FakeProvider::default().with("link.jpg", JPEG_2017);

        let (stats, reporter) = run(fx.config(), &provider);

        assert_eq!(stats.skipped, 1);
        assert!(matches!(
            reporter.events.as_slice(),
            [FileEvent::Skipped {
                reason: SkipReason::SourceVanished(_),
                ..
            }]
        ));
    }

    #[test]
    fn test_output_inside_input_is_not_walked() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        let provider = FakeProvider::default().with("exif.jpg", JPEG_2017);
        let output = fx.input.join("sorted");
        let config = Config {
            output: OutputRoots::under(&output),
            ..fx.config()
        };

        let (stats, _) = run(config.clone(), &provider);
        assert_eq!(stats.processed, 1);

        let (stats, _) = run(config, &provider);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.processed, 0);
    }

    #[test]
    fn test_move_in_place_keeps_sorted_file() {
        let fx = Fixture::new();
        let sorted = fx.write("2017/01/01/20170101-010101.jpg", b"jpeg");
        let provider = FakeProvider::default().with("20170101-010101.jpg", JPEG_2017);
        let config = Config {
            strategy: TransferStrategy::Move,
            output: OutputRoots::under(&fx.input),
            ..fx.config()
        };

        let (stats, reporter) = run(config, &provider);

        assert!(sorted.is_file());
        assert_eq!(fs::read(&sorted).unwrap(), b"jpeg");
        assert_eq!(stats.duplicates, 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(
            reporter.events,
            vec![FileEvent::Skipped {
                source: sorted,
                reason: SkipReason::AlreadyInPlace,
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_reaches_unknown_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let fx = Fixture::new();
        let name = OsStr::from_bytes(b"IMG_\xff.bin");
        fs::write(fx.input.join(name), b"raw").unwrap();
        fs::write(fx.input.join(OsStr::from_bytes(b"IMG_\xfe.bin")), b"other").unwrap();

        let (stats, _) = run(fx.config(), &FakeProvider::default());

        assert_eq!(stats.unknown, 2);
        let unknown = fx.output.join("unknown");
        assert_eq!(fs::read(unknown.join(name)).unwrap(), b"raw");
        assert_eq!(
            fs::read(unknown.join(OsStr::from_bytes(b"IMG_\xfe.bin"))).unwrap(),
            b"other"
        );
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let fx = Fixture::new();
        let config = Config {
            input_dir: Some(fx.input.join("nope")),
            ..fx.config()
        };
        let mut processor = Processor::new(config).unwrap();
        let result = processor.run(&FakeProvider::default(), &mut RecordingReporter::default());
        assert!(matches!(result, Err(Error::InputMissing(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_output_aborts() {
        let fx = Fixture::new();
        fx.write("exif.jpg", b"jpeg");
        // A regular file where the output root should be
        let blocker = fx.input.parent().unwrap().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let config = Config {
            output: OutputRoots::under(&blocker.join("out")),
            ..fx.config()
        };

        let mut processor = Processor::new(config).unwrap();
        let mut reporter = RecordingReporter::default();
        let result = processor.run(&FakeProvider::default(), &mut reporter);

        assert!(matches!(
            result,
            Err(Error::OutputUnwritable {
                category: MediaCategory::Image,
                ..
            })
        ));
        assert!(reporter.events.is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = Config {
            date_regex: Some("(unclosed".into()),
            ..Config::default()
        };
        assert!(matches!(Processor::new(config), Err(Error::Regex(_))));
    }
}
