use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs::{self, DirEntry, Metadata};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use globset::GlobSet;
use tracing::{debug, error, info};

use super::progress::{
    FoundItem, ItemKind, ProgressThrottle, ScanMessage, ScanProgress, ScanSummary,
};
use crate::cancel::CancellationToken;
use crate::error::{DelveError, Result};
use crate::matcher::WordMatcher;
use crate::outcome::OutcomeKind;
use crate::params::ScanParameters;

/// Default minimum spacing between progress snapshots
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Breadth-first folder scanner
pub struct FolderScanner {
    params: ScanParameters,
    cancel_token: CancellationToken,
    progress_interval: Duration,
}

/// Live counters, owned by the worker. Consumers only ever see snapshots.
struct RunningCounters {
    progress: ScanProgress,
    started: Instant,
}

impl RunningCounters {
    fn new() -> Self {
        Self {
            progress: ScanProgress::default(),
            started: Instant::now(),
        }
    }

    fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            elapsed: self.started.elapsed(),
            ..self.progress.clone()
        }
    }
}

/// Filters compiled once per run
struct Filters {
    name_globs: Option<GlobSet>,
    include_words: WordMatcher,
    exclude_words: WordMatcher,
    exclude_file_patterns: Vec<String>,
    exclude_folder_patterns: Vec<String>,
}

impl Filters {
    fn compile(params: &ScanParameters) -> Result<Self> {
        let normalize = |patterns: &[String]| -> Vec<String> {
            patterns
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| {
                    if params.match_case {
                        p.clone()
                    } else {
                        p.to_lowercase()
                    }
                })
                .collect()
        };

        Ok(Self {
            name_globs: params.compile_name_filters()?,
            include_words: WordMatcher::all(&params.search_words, params.match_case),
            exclude_words: WordMatcher::any(&params.exclusion_words, params.match_case),
            exclude_file_patterns: normalize(&params.exclude_file_name_patterns),
            exclude_folder_patterns: normalize(&params.exclude_folder_name_patterns),
        })
    }
}

impl FolderScanner {
    pub fn new(params: ScanParameters) -> Self {
        Self {
            params,
            cancel_token: CancellationToken::new(),
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Validate the parameters, then scan on a dedicated worker thread.
    ///
    /// Configuration errors are returned here, before anything is spawned.
    pub fn scan(self) -> Result<(Receiver<ScanMessage>, JoinHandle<ScanSummary>)> {
        self.params.validate()?;
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("delve-scan".to_string())
            .spawn(move || self.scan_sync(&tx))
            .map_err(DelveError::WorkerSpawn)?;

        Ok((rx, handle))
    }

    /// Run the scan on the current thread.
    ///
    /// Always ends by sending exactly one `Completed` or `Cancelled`. A panic
    /// inside the walk is caught here and reported as `Cancelled`.
    pub fn scan_sync(&self, tx: &Sender<ScanMessage>) -> ScanSummary {
        let mut counters = RunningCounters::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.walk(tx, &mut counters)));

        let kind = match result {
            Ok(Ok(kind)) => kind,
            Ok(Err(e)) => {
                error!(root = %self.params.root_path.display(), error = %e, "scan rejected");
                OutcomeKind::Cancelled
            }
            Err(_) => {
                error!(root = %self.params.root_path.display(), "scan worker panicked");
                OutcomeKind::Cancelled
            }
        };

        let progress = counters.snapshot();
        let _ = tx.send(ScanMessage::Progress(progress.clone()));
        let _ = tx.send(match kind {
            OutcomeKind::Completed | OutcomeKind::CompletedWithErrors => ScanMessage::Completed,
            OutcomeKind::Cancelled => ScanMessage::Cancelled,
        });

        info!(
            outcome = ?kind,
            found = progress.items_found(),
            visited = progress.items_visited,
            errors = progress.errors,
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "scan finished"
        );

        ScanSummary { kind, progress }
    }

    fn walk(&self, tx: &Sender<ScanMessage>, counters: &mut RunningCounters) -> Result<OutcomeKind> {
        let filters = Filters::compile(&self.params)?;
        let root = self.params.root_path.clone();
        let mut throttle = ProgressThrottle::new(self.progress_interval);

        info!(root = %root.display(), "scan started");

        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
        queue.push_back((root.clone(), 0));

        while let Some((dir, depth)) = queue.pop_front() {
            if self.cancel_token.is_cancelled() {
                return Ok(OutcomeKind::Cancelled);
            }

            counters.progress.current_path = Some(dir.clone());

            let entries = match list_dir(&dir, &mut counters.progress.errors) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "cannot list directory");
                    counters.progress.errors += 1;
                    continue;
                }
            };

            for entry in &entries {
                if entry.kind == ItemKind::Directory
                    && self.params.max_depth.is_none_or(|max| depth < max)
                    && !(entry.hidden && self.params.exclude_hidden)
                    && !self.folder_excluded(&filters, &entry.path)
                {
                    queue.push_back((entry.path.clone(), depth + 1));
                }
            }

            for entry in &entries {
                if self.cancel_token.is_cancelled() {
                    return Ok(OutcomeKind::Cancelled);
                }

                counters.progress.items_visited += 1;
                if entry.kind == ItemKind::File {
                    counters.progress.bytes_visited += entry.size;
                }

                if let Some(item) = self.evaluate(&filters, entry, counters) {
                    counters.progress.record_match(&item);
                    let _ = tx.send(ScanMessage::ItemFound(item));
                }

                if throttle.ready() {
                    let _ = tx.send(ScanMessage::Progress(counters.snapshot()));
                }
            }
        }

        Ok(OutcomeKind::Completed)
    }

    /// Apply exclusion, then inclusion, to one listed entry
    fn evaluate(
        &self,
        filters: &Filters,
        entry: &ListedEntry,
        counters: &mut RunningCounters,
    ) -> Option<FoundItem> {
        let params = &self.params;

        // Listing: hidden entries, enumeration mask, name globs
        if entry.hidden && (params.exclude_hidden || !params.item_types.hidden) {
            return None;
        }
        let listed = match entry.kind {
            ItemKind::File => params.item_types.files,
            ItemKind::Directory => params.item_types.directories,
            ItemKind::Symlink => params.item_types.symlinks,
        };
        if !listed {
            return None;
        }
        if let Some(globs) = &filters.name_globs
            && !globs.is_match(&entry.name)
        {
            return None;
        }

        // Exclusion by name
        match entry.kind {
            ItemKind::Directory => {
                if self.folder_excluded(filters, &entry.path) {
                    return None;
                }
            }
            ItemKind::File | ItemKind::Symlink => {
                if contains_pattern(
                    &entry.name.to_string_lossy(),
                    &filters.exclude_file_patterns,
                    params.match_case,
                ) {
                    return None;
                }
            }
        }

        let included = match entry.kind {
            ItemKind::File => params.include_files,
            ItemKind::Directory => params.include_folders,
            ItemKind::Symlink => params.include_symlinks,
        };
        if !included {
            return None;
        }

        // Content exclusion, then content inclusion
        if entry.kind == ItemKind::File {
            if !filters.exclude_words.is_empty() {
                match filters.exclude_words.matches_file(&entry.path, &self.cancel_token) {
                    Ok(true) => return None,
                    Ok(false) => {}
                    Err(e) => {
                        debug!(path = %entry.path.display(), error = %e, "cannot read file");
                        counters.progress.errors += 1;
                        return None;
                    }
                }
            }
            if !filters.include_words.is_empty() {
                match filters.include_words.matches_file(&entry.path, &self.cancel_token) {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => {
                        debug!(path = %entry.path.display(), error = %e, "cannot read file");
                        counters.progress.errors += 1;
                        return None;
                    }
                }
            }
            // A read cut short by a stop request proves nothing either way
            if self.cancel_token.is_cancelled() {
                return None;
            }
        }

        Some(FoundItem {
            path: entry.path.clone(),
            kind: entry.kind,
            size: entry.size,
        })
    }

    /// Folder patterns are matched against the path relative to the root
    fn folder_excluded(&self, filters: &Filters, path: &Path) -> bool {
        if filters.exclude_folder_patterns.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.params.root_path).unwrap_or(path);
        contains_pattern(
            &relative.to_string_lossy(),
            &filters.exclude_folder_patterns,
            self.params.match_case,
        )
    }
}

/// A directory entry with everything the filters need
struct ListedEntry {
    path: PathBuf,
    name: std::ffi::OsString,
    kind: ItemKind,
    size: u64,
    hidden: bool,
}

/// List a directory, sorted by name. Entries that cannot be read or stat'ed
/// are skipped and added to `skipped`.
fn list_dir(dir: &Path, skipped: &mut u64) -> std::io::Result<Vec<ListedEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "skipping unreadable entry");
                *skipped += 1;
                continue;
            }
        };
        match listed_entry(&entry) {
            Ok(listed) => entries.push(listed),
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping entry");
                *skipped += 1;
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn listed_entry(entry: &DirEntry) -> std::io::Result<ListedEntry> {
    // DirEntry::metadata does not follow symlinks
    let metadata = entry.metadata()?;
    let kind = ItemKind::from_file_type(&metadata.file_type());
    let name = entry.file_name();
    let size = if kind == ItemKind::File {
        metadata.len()
    } else {
        0
    };
    let hidden = is_hidden(&name, &metadata);

    Ok(ListedEntry {
        path: entry.path(),
        name,
        kind,
        size,
        hidden,
    })
}

fn contains_pattern(haystack: &str, patterns: &[String], match_case: bool) -> bool {
    if patterns.is_empty() {
        return false;
    }
    if match_case {
        patterns.iter().any(|p| haystack.contains(p.as_str()))
    } else {
        let haystack = haystack.to_lowercase();
        patterns.iter().any(|p| haystack.contains(p.as_str()))
    }
}

#[cfg(windows)]
fn is_hidden(name: &OsStr, metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
        || name.to_string_lossy().starts_with('.')
}

#[cfg(not(windows))]
fn is_hidden(name: &OsStr, _metadata: &Metadata) -> bool {
    name.to_string_lossy().starts_with('.')
}
