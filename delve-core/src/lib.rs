pub mod cancel;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod params;
pub mod remover;
pub mod scanner;
pub mod session;
pub mod size;

pub use cancel::CancellationToken;
pub use error::{DelveError, Result};
pub use matcher::{
    WordMatcher, WordMode, contains_all_words, contains_any_word, file_contains_all_words,
    file_contains_any_word,
};
pub use outcome::{OutcomeKind, RemovalOutcome};
pub use params::{ItemTypeMask, ScanParameters};
pub use remover::{
    BatchRemover, EntryId, RemovalMessage, RemovalPolicy, RemovedItem, SelectionEntry,
    dedup_nested,
};
pub use scanner::{FolderScanner, FoundItem, ItemKind, ScanMessage, ScanProgress, ScanSummary};
pub use session::{OperationHandle, RemovalHandle, STOP_GRACE, ScanHandle, Session};
pub use size::{format_count, format_size};
