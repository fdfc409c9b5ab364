mod progress;
mod walker;

pub use progress::{FoundItem, ItemKind, ProgressThrottle, ScanMessage, ScanProgress, ScanSummary};
pub use walker::FolderScanner;
