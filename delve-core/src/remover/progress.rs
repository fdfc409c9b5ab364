use std::path::PathBuf;

use serde::Serialize;

use super::selection::EntryId;
use crate::outcome::RemovalOutcome;

/// Result of processing one selection entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedItem {
    /// Identifier handed in with the selection, returned unchanged
    pub id: EntryId,
    pub path: PathBuf,
    /// False if any deletion for this entry failed
    pub success: bool,
    /// Bytes freed by this entry
    pub bytes_freed: u64,
    /// Filesystem items deleted so far in the whole batch
    pub removed_count: u64,
    /// Selection entries processed so far, this one included
    pub processed_entries: u64,
}

/// Message sent from the removal worker
#[derive(Debug, Clone)]
pub enum RemovalMessage {
    /// One selection entry was processed
    ItemRemoved(RemovedItem),
    /// Batch ran to the end (possibly with failures)
    Completed(RemovalOutcome),
    /// Batch stopped on request; carries what was done before stopping
    Cancelled(RemovalOutcome),
}
