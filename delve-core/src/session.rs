//! Lifecycle of scan and removal workers.
//!
//! A [`Session`] runs at most one scan and one removal at a time. Starting a
//! new operation of the same kind stops the old one and waits for it, up to a
//! grace period, before the replacement is spawned.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryIter};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::outcome::RemovalOutcome;
use crate::params::ScanParameters;
use crate::remover::{BatchRemover, RemovalMessage, RemovalPolicy, SelectionEntry};
use crate::scanner::{FolderScanner, ScanMessage, ScanSummary};

/// How long a replaced worker gets to exit before it is detached
pub const STOP_GRACE: Duration = Duration::from_secs(2);

const JOIN_POLL: Duration = Duration::from_millis(10);

/// A running worker: its event stream, stop flag and thread
pub struct OperationHandle<M, T> {
    receiver: Receiver<M>,
    cancel_token: CancellationToken,
    thread: Option<JoinHandle<T>>,
}

pub type ScanHandle = OperationHandle<ScanMessage, ScanSummary>;
pub type RemovalHandle = OperationHandle<RemovalMessage, RemovalOutcome>;

impl<M, T> OperationHandle<M, T> {
    fn new(receiver: Receiver<M>, cancel_token: CancellationToken, thread: JoinHandle<T>) -> Self {
        Self {
            receiver,
            cancel_token,
            thread: Some(thread),
        }
    }

    pub fn receiver(&self) -> &Receiver<M> {
        &self.receiver
    }

    /// Messages already delivered, without blocking
    pub fn try_iter(&self) -> TryIter<'_, M> {
        self.receiver.try_iter()
    }

    /// Request cooperative cancellation. Returns immediately.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Whether the worker thread has exited (or was already joined)
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait up to `timeout` for the worker to exit.
    ///
    /// Returns the worker's result the first time it is observed; later calls,
    /// or a timeout, return None.
    pub fn join(&mut self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(JOIN_POLL);
        }
        self.thread.take()?.join().ok()
    }
}

/// Owner of the active scan and removal workers
pub struct Session {
    scan: Option<ScanHandle>,
    removal: Option<RemovalHandle>,
    stop_grace: Duration,
    progress_interval: Option<Duration>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            scan: None,
            removal: None,
            stop_grace: STOP_GRACE,
            progress_interval: None,
        }
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Start a scan, replacing any active one.
    ///
    /// Parameters are validated first; a rejected start leaves the current
    /// scan untouched.
    pub fn start_scan(&mut self, params: ScanParameters) -> Result<&mut ScanHandle> {
        params.validate()?;

        if let Some(old) = self.scan.take() {
            self.retire(old, "scan");
        }

        let token = CancellationToken::new();
        let mut scanner = FolderScanner::new(params).with_cancellation(token.clone());
        if let Some(interval) = self.progress_interval {
            scanner = scanner.with_progress_interval(interval);
        }
        let (rx, thread) = scanner.scan()?;

        Ok(self.scan.insert(OperationHandle::new(rx, token, thread)))
    }

    /// Start a removal batch, replacing any active one
    pub fn start_removal(
        &mut self,
        selection: Vec<SelectionEntry>,
        policy: RemovalPolicy,
    ) -> Result<&mut RemovalHandle> {
        if let Some(old) = self.removal.take() {
            self.retire(old, "removal");
        }

        let token = CancellationToken::new();
        let (rx, thread) = BatchRemover::new(policy)
            .with_cancellation(token.clone())
            .remove(selection)?;

        Ok(self.removal.insert(OperationHandle::new(rx, token, thread)))
    }

    pub fn scan(&self) -> Option<&ScanHandle> {
        self.scan.as_ref()
    }

    pub fn scan_mut(&mut self) -> Option<&mut ScanHandle> {
        self.scan.as_mut()
    }

    pub fn removal(&self) -> Option<&RemovalHandle> {
        self.removal.as_ref()
    }

    pub fn stop_scan(&self) {
        if let Some(scan) = &self.scan {
            scan.stop();
        }
    }

    pub fn stop_removal(&self) {
        if let Some(removal) = &self.removal {
            removal.stop();
        }
    }

    /// Stop both workers and wait for them within the grace period
    pub fn shutdown(&mut self) {
        if let Some(scan) = self.scan.take() {
            self.retire(scan, "scan");
        }
        if let Some(removal) = self.removal.take() {
            self.retire(removal, "removal");
        }
    }

    fn retire<M, T>(&self, mut handle: OperationHandle<M, T>, what: &str) {
        handle.stop();
        if handle.join(self.stop_grace).is_some() || handle.is_finished() {
            debug!(operation = what, "worker stopped");
        } else {
            // Dropping the JoinHandle detaches the thread; its stop flag stays set
            warn!(
                operation = what,
                grace_ms = self.stop_grace.as_millis() as u64,
                "worker did not stop in time, detaching"
            );
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_scan();
        self.stop_removal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DelveError;
    use crate::outcome::OutcomeKind;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(30);

    fn wide_tree(temp: &TempDir, dirs: usize) {
        for i in 0..dirs {
            let dir = temp.path().join(format!("dir{i:03}"));
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("file.txt"), "hello").unwrap();
        }
    }

    fn drain_scan(handle: &ScanHandle) -> (u64, ScanMessage) {
        let mut found = 0;
        for msg in handle.receiver().iter() {
            match msg {
                ScanMessage::ItemFound(_) => found += 1,
                ScanMessage::Completed | ScanMessage::Cancelled => return (found, msg),
                ScanMessage::Progress(_) => {}
            }
        }
        panic!("scan ended without a terminal message");
    }

    #[test]
    fn test_scan_through_session() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 3);

        let mut session = Session::new();
        let handle = session.start_scan(ScanParameters::new(temp.path())).unwrap();
        let (found, terminal) = drain_scan(handle);

        assert_eq!(found, 6);
        assert!(matches!(terminal, ScanMessage::Completed));
        let summary = handle.join(WAIT).unwrap();
        assert_eq!(summary.kind, OutcomeKind::Completed);
        assert!(handle.join(WAIT).is_none());
    }

    #[test]
    fn test_rejected_start_keeps_current_scan() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 2);

        let mut session = Session::new();
        session.start_scan(ScanParameters::new(temp.path())).unwrap();

        let result = session.start_scan(ScanParameters::new(temp.path().join("missing")));
        assert!(matches!(result, Err(DelveError::RootNotFound(_))));

        let handle = session.scan_mut().unwrap();
        assert!(!handle.is_stop_requested());
        let (found, _) = drain_scan(handle);
        assert_eq!(found, 4);
    }

    #[test]
    fn test_replacing_scan_runs_new_one() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 50);
        let other = TempDir::new().unwrap();
        wide_tree(&other, 1);

        let mut session = Session::new();
        session.start_scan(ScanParameters::new(temp.path())).unwrap();
        let handle = session.start_scan(ScanParameters::new(other.path())).unwrap();

        let (found, terminal) = drain_scan(handle);
        assert_eq!(found, 2);
        assert!(matches!(terminal, ScanMessage::Completed));
    }

    #[test]
    fn test_stop_mid_scan_without_deadlock() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 200);
        let params = ScanParameters {
            search_words: vec!["hello".to_string()],
            ..ScanParameters::new(temp.path())
        };

        let mut session = Session::new();
        let handle = session.start_scan(params).unwrap();

        let mut found = 0;
        let mut terminal = None;
        for msg in handle.receiver().iter() {
            match msg {
                ScanMessage::ItemFound(_) => {
                    found += 1;
                    handle.stop();
                }
                ScanMessage::Completed | ScanMessage::Cancelled => {
                    terminal = Some(msg);
                    break;
                }
                ScanMessage::Progress(_) => {}
            }
        }
        let summary = handle.join(WAIT).unwrap();

        assert!(matches!(terminal, Some(ScanMessage::Cancelled)));
        assert_eq!(summary.kind, OutcomeKind::Cancelled);
        assert!(found >= 1);
        assert!(found < 400);
    }

    #[test]
    fn test_replacement_does_not_wait_past_grace() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 200);
        let other = TempDir::new().unwrap();
        wide_tree(&other, 1);

        let mut session = Session::new().with_stop_grace(Duration::ZERO);
        session.start_scan(ScanParameters::new(temp.path())).unwrap();
        let handle = session.start_scan(ScanParameters::new(other.path())).unwrap();

        let (found, terminal) = drain_scan(handle);
        assert_eq!(found, 2);
        assert!(matches!(terminal, ScanMessage::Completed));
        assert!(handle.join(WAIT).is_some());
    }

    #[test]
    fn test_removal_through_session() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 2);
        let selection = vec![
            SelectionEntry::new(10, temp.path().join("dir000")),
            SelectionEntry::new(11, temp.path().join("dir001/file.txt")),
        ];

        let mut session = Session::new();
        let handle = session
            .start_removal(selection, RemovalPolicy::Unlimited)
            .unwrap();

        let mut ids = Vec::new();
        let mut outcome = None;
        for msg in handle.receiver().iter() {
            match msg {
                RemovalMessage::ItemRemoved(item) => ids.push(item.id),
                RemovalMessage::Completed(o) | RemovalMessage::Cancelled(o) => {
                    outcome = Some(o);
                    break;
                }
            }
        }

        assert_eq!(ids, vec![10, 11]);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Completed);
        assert_eq!(outcome.bytes_freed, 10);
        assert!(!temp.path().join("dir000").exists());
        assert!(temp.path().join("dir001").exists());
    }

    #[test]
    fn test_shutdown_clears_handles() {
        let temp = TempDir::new().unwrap();
        wide_tree(&temp, 2);

        let mut session = Session::new();
        session.start_scan(ScanParameters::new(temp.path())).unwrap();
        session.shutdown();

        assert!(session.scan().is_none());
        assert!(session.removal().is_none());
    }
}
