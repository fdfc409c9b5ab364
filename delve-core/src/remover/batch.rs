use std::collections::VecDeque;
use std::fs::{self, Metadata};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use jwalk::WalkDir;
use tracing::{debug, error, info};

use super::progress::{RemovalMessage, RemovedItem};
use super::selection::SelectionEntry;
use crate::cancel::CancellationToken;
use crate::error::{DelveError, Result};
use crate::outcome::{OutcomeKind, RemovalOutcome};

/// How selected directories are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Files and symlinks are deleted, directories lose their whole subtree
    Unlimited,
    /// Directories are emptied at most `max_depth` levels down (None =
    /// unlimited) and removed only if that left them empty
    Limited { max_depth: Option<usize> },
}

impl RemovalPolicy {
    /// Depth-limited policy from a signed depth, negative meaning unlimited
    pub fn limited(max_depth: i64) -> Self {
        RemovalPolicy::Limited {
            max_depth: usize::try_from(max_depth).ok(),
        }
    }
}

/// Batch remover for a user selection
pub struct BatchRemover {
    policy: RemovalPolicy,
    cancel_token: CancellationToken,
}

/// Batch counters, owned by the worker
#[derive(Debug, Default)]
struct RemovalCounters {
    items_removed: u64,
    bytes_freed: u64,
    failed_entries: u64,
    processed_entries: u64,
    /// Entries still present after being processed
    retained_entries: u64,
}

impl RemovalCounters {
    fn outcome(&self, kind: OutcomeKind, requested: usize) -> RemovalOutcome {
        let kind = match kind {
            OutcomeKind::Completed if self.failed_entries > 0 => OutcomeKind::CompletedWithErrors,
            other => other,
        };
        RemovalOutcome {
            kind,
            items_removed: self.items_removed,
            bytes_freed: self.bytes_freed,
            failed_entries: self.failed_entries,
            all_removed: kind == OutcomeKind::Completed
                && self.processed_entries == requested as u64
                && self.retained_entries == 0,
        }
    }
}

/// What deleting one path achieved
#[derive(Debug, Default, Clone, Copy)]
struct Removed {
    items: u64,
    bytes: u64,
    failed: bool,
}

impl Removed {
    fn absorb(&mut self, other: Removed) {
        self.items += other.items;
        self.bytes += other.bytes;
        self.failed |= other.failed;
    }
}

/// Size and entry count of a directory tree
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeSize {
    pub bytes: u64,
    /// Entries in the tree, the root included
    pub items: u64,
}

enum Flow {
    Continue,
    Cancelled,
}

impl BatchRemover {
    pub fn new(policy: RemovalPolicy) -> Self {
        Self {
            policy,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(RemovalPolicy::Unlimited)
    }

    pub fn limited(max_depth: i64) -> Self {
        Self::new(RemovalPolicy::limited(max_depth))
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn policy(&self) -> RemovalPolicy {
        self.policy
    }

    /// Remove the selection on a dedicated worker thread
    pub fn remove(
        self,
        selection: Vec<SelectionEntry>,
    ) -> Result<(Receiver<RemovalMessage>, JoinHandle<RemovalOutcome>)> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("delve-remove".to_string())
            .spawn(move || self.remove_sync(&selection, &tx))
            .map_err(DelveError::WorkerSpawn)?;

        Ok((rx, handle))
    }

    /// Run the batch on the current thread.
    ///
    /// Always ends by sending exactly one `Completed` or `Cancelled`. A panic
    /// inside the batch is caught here and reported as `CompletedWithErrors`.
    pub fn remove_sync(
        &self,
        selection: &[SelectionEntry],
        tx: &Sender<RemovalMessage>,
    ) -> RemovalOutcome {
        let mut counters = RemovalCounters::default();

        info!(
            entries = selection.len(),
            policy = ?self.policy,
            "removal started"
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| match self.policy {
            RemovalPolicy::Unlimited => self.run_unlimited(selection, tx, &mut counters),
            RemovalPolicy::Limited { max_depth } => {
                self.run_limited(selection, max_depth, tx, &mut counters)
            }
        }));

        let outcome = match result {
            Ok(Flow::Continue) => counters.outcome(OutcomeKind::Completed, selection.len()),
            Ok(Flow::Cancelled) => counters.outcome(OutcomeKind::Cancelled, selection.len()),
            Err(_) => {
                error!("removal worker panicked");
                counters.failed_entries += 1;
                counters.outcome(OutcomeKind::CompletedWithErrors, selection.len())
            }
        };

        let _ = tx.send(match outcome.kind {
            OutcomeKind::Cancelled => RemovalMessage::Cancelled(outcome),
            _ => RemovalMessage::Completed(outcome),
        });

        info!(
            outcome = ?outcome.kind,
            items_removed = outcome.items_removed,
            bytes_freed = outcome.bytes_freed,
            failed = outcome.failed_entries,
            "removal finished"
        );

        outcome
    }

    fn run_unlimited(
        &self,
        selection: &[SelectionEntry],
        tx: &Sender<RemovalMessage>,
        counters: &mut RemovalCounters,
    ) -> Flow {
        for entry in selection {
            if self.cancel_token.is_cancelled() {
                return Flow::Cancelled;
            }
            let removed = remove_entry(&entry.path);
            report(entry, removed, !removed.failed, tx, counters);
        }
        Flow::Continue
    }

    /// Phase 1 deletes files and symlinks; phase 2 empties directories bottom-up
    fn run_limited(
        &self,
        selection: &[SelectionEntry],
        max_depth: Option<usize>,
        tx: &Sender<RemovalMessage>,
        counters: &mut RemovalCounters,
    ) -> Flow {
        let mut directories: Vec<&SelectionEntry> = Vec::new();

        for entry in selection {
            if self.cancel_token.is_cancelled() {
                return Flow::Cancelled;
            }
            match fs::symlink_metadata(&entry.path) {
                Ok(meta) if meta.is_dir() => directories.push(entry),
                Ok(meta) => {
                    let removed = remove_leaf(&entry.path, &meta);
                    report(entry, removed, !removed.failed, tx, counters);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    report(entry, Removed::default(), true, tx, counters);
                }
                Err(e) => {
                    debug!(path = %entry.path.display(), error = %e, "cannot stat entry");
                    let removed = Removed {
                        failed: true,
                        ..Removed::default()
                    };
                    report(entry, removed, false, tx, counters);
                }
            }
        }

        for entry in directories {
            if self.cancel_token.is_cancelled() {
                return Flow::Cancelled;
            }
            // Partial work is reported even when the walk was cut short
            let (removed, flow) = self.empty_directory(&entry.path, max_depth);
            let gone = !entry.path.exists();
            report(entry, removed, gone, tx, counters);
            if let Flow::Cancelled = flow {
                return Flow::Cancelled;
            }
        }

        Flow::Continue
    }

    /// Delete files up to `max_depth` levels below `root`, then remove every
    /// visited directory that ended up empty.
    ///
    /// On cancellation the walk stops, emptied directories are left in place
    /// and whatever was deleted so far is returned with `Flow::Cancelled`.
    fn empty_directory(&self, root: &Path, max_depth: Option<usize>) -> (Removed, Flow) {
        let mut removed = Removed::default();
        let mut visited: Vec<PathBuf> = Vec::new();
        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
        queue.push_back((root.to_path_buf(), 0));

        while let Some((dir, depth)) = queue.pop_front() {
            if self.cancel_token.is_cancelled() {
                return (removed, Flow::Cancelled);
            }
            // Files in a directory at `depth` sit `depth + 1` levels below root
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            let read_dir = match fs::read_dir(&dir) {
                Ok(read_dir) => read_dir,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "cannot list directory");
                    removed.failed = true;
                    continue;
                }
            };
            visited.push(dir);

            for child in read_dir {
                let child = match child {
                    Ok(child) => child,
                    Err(e) => {
                        debug!(error = %e, "skipping unreadable entry");
                        removed.failed = true;
                        continue;
                    }
                };
                let path = child.path();
                match child.metadata() {
                    Ok(meta) if meta.is_dir() => queue.push_back((path, depth + 1)),
                    Ok(meta) => removed.absorb(remove_leaf(&path, &meta)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "cannot stat entry");
                        removed.failed = true;
                    }
                }
            }
        }

        // Breadth-first order reversed puts children before their parents
        for dir in visited.iter().rev() {
            if !is_empty_dir(dir) {
                continue;
            }
            match fs::remove_dir(dir) {
                Ok(()) => removed.items += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "cannot remove directory");
                    removed.failed = true;
                }
            }
        }

        (removed, Flow::Continue)
    }
}

/// Update counters and emit the per-entry message
fn report(
    entry: &SelectionEntry,
    removed: Removed,
    gone: bool,
    tx: &Sender<RemovalMessage>,
    counters: &mut RemovalCounters,
) {
    counters.items_removed += removed.items;
    counters.bytes_freed += removed.bytes;
    counters.processed_entries += 1;
    if removed.failed {
        counters.failed_entries += 1;
    } else if !gone {
        counters.retained_entries += 1;
    }

    let _ = tx.send(RemovalMessage::ItemRemoved(RemovedItem {
        id: entry.id,
        path: entry.path.clone(),
        success: !removed.failed,
        bytes_freed: removed.bytes,
        removed_count: counters.items_removed,
        processed_entries: counters.processed_entries,
    }));
}

/// Delete one selection entry, whatever it is. Missing paths are a no-op.
fn remove_entry(path: &Path) -> Removed {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Removed::default(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot stat entry");
            return Removed {
                failed: true,
                ..Removed::default()
            };
        }
    };

    if !meta.is_dir() {
        return remove_leaf(path, &meta);
    }

    // Size has to be taken before the tree is gone
    let before = directory_size(path);
    match ignore_missing(fs::remove_dir_all(path)) {
        Ok(()) => Removed {
            items: before.items,
            bytes: before.bytes,
            failed: false,
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot remove directory tree");
            let after = directory_size(path);
            Removed {
                items: before.items.saturating_sub(after.items),
                bytes: before.bytes.saturating_sub(after.bytes),
                failed: true,
            }
        }
    }
}

/// Delete a file or symlink
fn remove_leaf(path: &Path, meta: &Metadata) -> Removed {
    let bytes = if meta.is_file() { meta.len() } else { 0 };

    let result = match fs::remove_file(path) {
        // Directory symlinks on Windows need remove_dir
        Err(e) if meta.is_symlink() && e.kind() != io::ErrorKind::NotFound => {
            fs::remove_dir(path).map_err(|_| e)
        }
        other => other,
    };

    match result {
        Ok(()) => Removed {
            items: 1,
            bytes,
            failed: false,
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Removed::default(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot remove file");
            Removed {
                failed: true,
                ..Removed::default()
            }
        }
    }
}

/// Total file bytes and entry count under `path` (symlinks not followed)
pub fn directory_size(path: &Path) -> TreeSize {
    let mut size = TreeSize::default();

    for entry in WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false)
    {
        let Ok(entry) = entry else {
            continue;
        };
        size.items += 1;
        if entry.file_type().is_file()
            && let Ok(meta) = entry.metadata()
        {
            size.bytes += meta.len();
        }
    }

    size
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
