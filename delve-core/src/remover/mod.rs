mod batch;
mod progress;
mod selection;

pub use batch::{BatchRemover, RemovalPolicy, TreeSize, directory_size};
pub use progress::{RemovalMessage, RemovedItem};
pub use selection::{EntryId, SelectionEntry, dedup_nested};
