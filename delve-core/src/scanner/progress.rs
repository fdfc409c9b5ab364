use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::outcome::OutcomeKind;

/// Kind of a filesystem entry. A symlink is always a symlink, even when it
/// points at a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    File,
    Directory,
    Symlink,
}

impl ItemKind {
    pub fn from_file_type(file_type: &std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            ItemKind::Symlink
        } else if file_type.is_dir() {
            ItemKind::Directory
        } else {
            ItemKind::File
        }
    }
}

/// One entry matching the scan criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundItem {
    pub path: PathBuf,
    pub kind: ItemKind,
    /// File size in bytes (0 for directories and symlinks)
    pub size: u64,
}

/// Message sent from the scan worker
#[derive(Debug, Clone)]
pub enum ScanMessage {
    /// An entry matched
    ItemFound(FoundItem),
    /// Throttled counters snapshot
    Progress(ScanProgress),
    /// Scan ran to the end
    Completed,
    /// Scan stopped on request
    Cancelled,
}

/// Immutable snapshot of the scan counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Matched directories
    pub dirs_found: u64,
    /// Matched files
    pub files_found: u64,
    /// Total size of matched files
    pub file_bytes: u64,
    /// Matched symlinks
    pub symlinks_found: u64,
    /// Every entry looked at, matched or not
    pub items_visited: u64,
    /// Total size of every file looked at
    pub bytes_visited: u64,
    /// Entries skipped because of filesystem errors
    pub errors: u64,
    /// Time since the scan started
    pub elapsed: Duration,
    /// Directory being listed when the snapshot was taken
    pub current_path: Option<PathBuf>,
}

impl ScanProgress {
    pub fn items_found(&self) -> u64 {
        self.dirs_found + self.files_found + self.symlinks_found
    }

    pub(crate) fn record_match(&mut self, item: &FoundItem) {
        match item.kind {
            ItemKind::Directory => self.dirs_found += 1,
            ItemKind::Symlink => self.symlinks_found += 1,
            ItemKind::File => {
                self.files_found += 1;
                self.file_bytes += item.size;
            }
        }
    }
}

/// Final result returned by the scan worker
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub kind: OutcomeKind,
    pub progress: ScanProgress,
}

/// Rate limiter for progress snapshots
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True at most once per interval; the first call always passes
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_limits_rate() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(throttle.ready());
        assert!(!throttle.ready());
        assert!(!throttle.ready());
    }

    #[test]
    fn test_zero_interval_always_ready() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!(throttle.ready());
        assert!(throttle.ready());
    }

    #[test]
    fn test_record_match_by_kind() {
        let mut progress = ScanProgress::default();
        progress.record_match(&FoundItem {
            path: PathBuf::from("a.txt"),
            kind: ItemKind::File,
            size: 10,
        });
        progress.record_match(&FoundItem {
            path: PathBuf::from("dir"),
            kind: ItemKind::Directory,
            size: 0,
        });
        progress.record_match(&FoundItem {
            path: PathBuf::from("link"),
            kind: ItemKind::Symlink,
            size: 0,
        });

        assert_eq!(progress.files_found, 1);
        assert_eq!(progress.file_bytes, 10);
        assert_eq!(progress.dirs_found, 1);
        assert_eq!(progress.symlinks_found, 1);
        assert_eq!(progress.items_found(), 3);
    }
}
