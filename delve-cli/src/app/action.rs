/// User actions that can be performed in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move cursor up
    MoveUp,
    /// Move cursor down
    MoveDown,
    /// Move cursor up by a page
    PageUp,
    /// Move cursor down by a page
    PageDown,
    /// Go to first row
    GoToFirst,
    /// Go to last row
    GoToLast,
    /// Mark or unmark the row under the cursor
    ToggleMark,
    /// Mark every row
    MarkAll,
    /// Clear all marks
    ClearMarks,
    /// Stop the running scan, keeping what was found
    StopScan,
    /// Start the scan again from scratch
    Rescan,
    /// Ask to remove marked rows, whole subtrees
    RemoveUnlimited,
    /// Ask to remove marked rows, depth-limited
    RemoveLimited,
    /// Confirm pending removal
    ConfirmRemove,
    /// Cancel pending removal
    CancelRemove,
    /// Stop the running removal
    StopRemoval,
    /// Show help overlay
    ShowHelp,
    /// Hide help overlay
    HideHelp,
    /// Quit the application
    Quit,
    /// No action (for tick events)
    Tick,
}
