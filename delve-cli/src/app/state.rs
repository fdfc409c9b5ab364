use std::collections::HashSet;
use std::path::{Path, PathBuf};

use delve_core::{
    EntryId, FoundItem, ItemKind, OutcomeKind, RemovalMessage, RemovalOutcome, RemovalPolicy,
    RemovedItem, ScanMessage, ScanProgress, SelectionEntry, dedup_nested, format_size,
};

/// Statistics tracked during the session
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// Total bytes freed by removals
    pub bytes_freed: u64,
    /// Number of filesystem items removed
    pub items_removed: u64,
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Scan running, results streaming in
    Scanning,
    /// Browsing results
    Browsing,
    /// Showing help overlay
    Help,
    /// Showing removal confirmation dialog
    ConfirmRemove,
    /// Removal in progress with progress overlay
    Removing,
}

/// One found item as displayed in the results list
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// Stable identifier handed to the remover
    pub id: EntryId,
    pub path: PathBuf,
    pub relative_path: String,
    pub kind: ItemKind,
    pub size: u64,
}

/// Removal waiting for confirmation
#[derive(Debug, Clone)]
pub struct PendingRemoval {
    pub entries: Vec<SelectionEntry>,
    pub total_size: u64,
    pub policy: RemovalPolicy,
}

/// Progress tracker for a running removal
#[derive(Debug, Clone)]
pub struct RemovalProgress {
    pub total: usize,
    pub completed: u64,
    pub removed_count: u64,
    pub bytes_freed: u64,
    pub failures: Vec<PathBuf>,
    pub policy: RemovalPolicy,
    pub stopping: bool,
}

/// Application state
pub struct AppState {
    /// Current mode
    pub mode: AppMode,
    /// Root path being searched
    pub root_path: PathBuf,
    /// Found items in arrival order
    pub rows: Vec<ResultRow>,
    /// Latest scan progress snapshot
    pub progress: ScanProgress,
    /// Whether a scan is still running
    pub scanning: bool,
    /// How the last scan ended
    pub scan_outcome: Option<OutcomeKind>,
    /// Cursor index in the results list
    pub selected_index: usize,
    /// Scroll offset for the results list
    pub scroll_offset: usize,
    /// Visible area height (set by UI)
    pub visible_height: usize,
    /// Rows marked for removal
    pub marked: HashSet<EntryId>,
    /// Whether app should quit
    pub should_quit: bool,
    /// Spinner frame for animation
    pub spinner_frame: usize,
    /// Message to display in the status line
    pub error_message: Option<String>,
    /// Removal waiting for confirmation
    pub pending_removal: Option<PendingRemoval>,
    /// Removal in progress
    pub removal_progress: Option<RemovalProgress>,
    /// Session statistics (removed items, freed space)
    pub session_stats: SessionStats,
    /// Depth used by the limited removal policy (negative = unlimited)
    pub remove_depth: i64,
    next_id: EntryId,
}

impl AppState {
    pub fn new(root_path: PathBuf, remove_depth: i64) -> Self {
        Self {
            mode: AppMode::Scanning,
            root_path,
            rows: Vec::new(),
            progress: ScanProgress::default(),
            scanning: true,
            scan_outcome: None,
            selected_index: 0,
            scroll_offset: 0,
            visible_height: 20,
            marked: HashSet::new(),
            should_quit: false,
            spinner_frame: 0,
            error_message: None,
            pending_removal: None,
            removal_progress: None,
            session_stats: SessionStats::default(),
            remove_depth,
            next_id: 0,
        }
    }

    /// Reset results for a fresh scan
    pub fn begin_scan(&mut self) {
        self.rows.clear();
        self.marked.clear();
        self.progress = ScanProgress::default();
        self.scanning = true;
        self.scan_outcome = None;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.error_message = None;
        self.mode = AppMode::Scanning;
    }

    /// Fold one scanner message into the state
    pub fn apply_scan_message(&mut self, msg: ScanMessage) {
        match msg {
            ScanMessage::ItemFound(item) => self.push_row(item),
            ScanMessage::Progress(progress) => self.progress = progress,
            ScanMessage::Completed => self.finish_scan(OutcomeKind::Completed),
            ScanMessage::Cancelled => self.finish_scan(OutcomeKind::Cancelled),
        }
    }

    fn push_row(&mut self, item: FoundItem) {
        let relative_path = item
            .path
            .strip_prefix(&self.root_path)
            .unwrap_or(&item.path)
            .to_string_lossy()
            .to_string();
        self.rows.push(ResultRow {
            id: self.next_id,
            path: item.path,
            relative_path,
            kind: item.kind,
            size: item.size,
        });
        self.next_id += 1;
    }

    fn finish_scan(&mut self, outcome: OutcomeKind) {
        self.scanning = false;
        self.scan_outcome = Some(outcome);
        if self.mode == AppMode::Scanning {
            self.mode = AppMode::Browsing;
        }
    }

    /// Largest file size among the rows (for relative bars)
    pub fn largest_size(&self) -> u64 {
        self.rows.iter().map(|r| r.size).max().unwrap_or(0)
    }

    /// Advance spinner animation
    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 10;
    }

    pub fn selected_row(&self) -> Option<&ResultRow> {
        self.rows.get(self.selected_index)
    }

    /// Ensure the cursor is visible within the scroll viewport
    fn ensure_visible(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + self.visible_height {
            self.scroll_offset = self.selected_index + 1 - self.visible_height.max(1);
        }
    }

    /// Move cursor up
    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.ensure_visible();
    }

    /// Move cursor down
    pub fn move_down(&mut self) {
        if self.selected_index < self.rows.len().saturating_sub(1) {
            self.selected_index += 1;
        }
        self.ensure_visible();
    }

    /// Move cursor up by a page
    pub fn page_up(&mut self) {
        let page_size = self.visible_height.saturating_sub(2).max(1);
        self.selected_index = self.selected_index.saturating_sub(page_size);
        self.ensure_visible();
    }

    /// Move cursor down by a page
    pub fn page_down(&mut self) {
        let page_size = self.visible_height.saturating_sub(2).max(1);
        self.selected_index =
            (self.selected_index + page_size).min(self.rows.len().saturating_sub(1));
        self.ensure_visible();
    }

    /// Go to first row
    pub fn go_to_first(&mut self) {
        self.selected_index = 0;
        self.ensure_visible();
    }

    /// Go to last row
    pub fn go_to_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
        self.ensure_visible();
    }

    /// Mark or unmark the cursor row, then advance
    pub fn toggle_mark(&mut self) {
        if let Some(id) = self.selected_row().map(|r| r.id) {
            if !self.marked.remove(&id) {
                self.marked.insert(id);
            }
            self.move_down();
        }
    }

    pub fn mark_all(&mut self) {
        self.marked = self.rows.iter().map(|r| r.id).collect();
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    /// Marked rows (or the cursor row) as a de-duplicated removal selection
    pub fn selection_entries(&self) -> Vec<SelectionEntry> {
        let entries: Vec<SelectionEntry> = if self.marked.is_empty() {
            self.selected_row()
                .map(|r| SelectionEntry::new(r.id, r.path.clone()))
                .into_iter()
                .collect()
        } else {
            self.rows
                .iter()
                .filter(|r| self.marked.contains(&r.id))
                .map(|r| SelectionEntry::new(r.id, r.path.clone()))
                .collect()
        };
        dedup_nested(entries)
    }

    /// Show the confirmation dialog for removing the selection
    pub fn request_removal(&mut self, policy: RemovalPolicy) {
        // Guard: only from the results list, with no scan or removal running
        if self.mode != AppMode::Browsing || self.scanning || self.removal_progress.is_some() {
            return;
        }

        let entries = self.selection_entries();
        if entries.is_empty() {
            return;
        }

        let ids: HashSet<EntryId> = entries.iter().map(|e| e.id).collect();
        let total_size = self
            .rows
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| r.size)
            .sum();

        self.pending_removal = Some(PendingRemoval {
            entries,
            total_size,
            policy,
        });
        self.mode = AppMode::ConfirmRemove;
    }

    /// Confirm the pending removal; the caller hands the result to the session
    pub fn confirm_removal(&mut self) -> Option<(Vec<SelectionEntry>, RemovalPolicy)> {
        let pending = self.pending_removal.take()?;

        self.removal_progress = Some(RemovalProgress {
            total: pending.entries.len(),
            completed: 0,
            removed_count: 0,
            bytes_freed: 0,
            failures: Vec::new(),
            policy: pending.policy,
            stopping: false,
        });
        self.mode = AppMode::Removing;

        Some((pending.entries, pending.policy))
    }

    /// Cancel the pending removal
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
        self.mode = AppMode::Browsing;
    }

    pub fn mark_removal_stopping(&mut self) {
        if let Some(progress) = &mut self.removal_progress {
            progress.stopping = true;
        }
    }

    /// Fold one remover message into the state
    pub fn apply_removal_message(&mut self, msg: RemovalMessage) {
        match msg {
            RemovalMessage::ItemRemoved(item) => self.record_removed(item),
            RemovalMessage::Completed(outcome) => self.finish_removal(outcome),
            RemovalMessage::Cancelled(outcome) => self.finish_removal(outcome),
        }
    }

    fn record_removed(&mut self, item: RemovedItem) {
        if let Some(progress) = &mut self.removal_progress {
            progress.completed = item.processed_entries;
            progress.removed_count = item.removed_count;
            progress.bytes_freed += item.bytes_freed;
            if !item.success {
                progress.failures.push(item.path.clone());
            }
        }
        self.session_stats.bytes_freed += item.bytes_freed;
        self.prune_removed(&item.path);
    }

    /// Drop rows at or under `removed` that no longer exist on disk
    fn prune_removed(&mut self, removed: &Path) {
        let mut gone = Vec::new();
        self.rows.retain(|row| {
            let keep = !row.path.starts_with(removed) || row.path.symlink_metadata().is_ok();
            if !keep {
                gone.push(row.id);
            }
            keep
        });
        for id in gone {
            self.marked.remove(&id);
        }

        self.selected_index = self.selected_index.min(self.rows.len().saturating_sub(1));
        self.ensure_visible();
    }

    fn finish_removal(&mut self, outcome: RemovalOutcome) {
        self.session_stats.items_removed += outcome.items_removed;

        let failures = self
            .removal_progress
            .take()
            .map(|p| p.failures)
            .unwrap_or_default();

        self.error_message = match outcome.kind {
            OutcomeKind::Cancelled => Some(format!(
                "Removal stopped: {} freed before stopping",
                format_size(outcome.bytes_freed)
            )),
            OutcomeKind::CompletedWithErrors => Some(match failures.as_slice() {
                [only] => format!("Remove failed: {}", only.display()),
                [first, ..] => format!(
                    "{} removals failed (first: {})",
                    failures.len(),
                    first.display()
                ),
                [] => "Removal finished with errors".to_string(),
            }),
            OutcomeKind::Completed if !outcome.all_removed => {
                Some("Some folders were kept: content beyond the removal depth".to_string())
            }
            OutcomeKind::Completed => None,
        };

        self.mode = AppMode::Browsing;
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        if matches!(self.mode, AppMode::Scanning | AppMode::Browsing) {
            self.mode = AppMode::Help;
        }
    }

    /// Hide help overlay
    pub fn hide_help(&mut self) {
        if self.mode == AppMode::Help {
            self.mode = if self.scanning {
                AppMode::Scanning
            } else {
                AppMode::Browsing
            };
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    /// Quit application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
