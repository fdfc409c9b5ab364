use serde::Serialize;

/// How a scan or removal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    /// Ran to the end without per-item failures
    Completed,
    /// Stopped early by a cancellation request (or a caught worker fault)
    Cancelled,
    /// Removal ran to the end but at least one item failed
    CompletedWithErrors,
}

/// Terminal result of a removal batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub kind: OutcomeKind,
    /// Filesystem items deleted (files, symlinks and directories)
    pub items_removed: u64,
    /// Bytes freed by those deletions
    pub bytes_freed: u64,
    /// Selection entries whose removal failed
    pub failed_entries: u64,
    /// Every requested entry was processed and removed
    pub all_removed: bool,
}
