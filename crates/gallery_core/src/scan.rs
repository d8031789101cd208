//! Scan submission and status polling
//!
//! Full scans and partial rescans share the same lifecycle: submit the
//! request, then poll the status endpoint on a fixed interval until the
//! backend reports it is no longer scanning. The poll loop is an owned
//! future; dropping it (view teardown, navigation) releases the interval,
//! so no timers outlive their owner.

use crate::{CoreError, ScanControl};
use gallery_proto::ScanStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Lifecycle of a scan request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    /// Submission request in flight
    Requesting,
    /// Background scan running, status being polled
    Polling,
    /// Submission failed; a new request resets this
    Failed,
}

/// Terminal result of a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Backend reported completion; `processed` files were handled
    Completed { processed: u64 },
    /// The configured poll budget ran out while the backend was still
    /// scanning. The scan itself keeps running server-side.
    TimedOut,
}

/// Drives scans against a `ScanControl` backend and publishes progress.
pub struct ScanMonitor {
    control: Arc<dyn ScanControl>,
    poll_interval: Duration,
    poll_timeout: Duration,
    status_tx: watch::Sender<ScanStatus>,
    phase_tx: watch::Sender<ScanPhase>,
}

impl ScanMonitor {
    pub fn new(control: Arc<dyn ScanControl>, poll_interval: Duration, poll_timeout: Duration) -> Self {
        let (status_tx, _) = watch::channel(ScanStatus::default());
        let (phase_tx, _) = watch::channel(ScanPhase::Idle);
        Self {
            control,
            poll_interval,
            poll_timeout,
            status_tx,
            phase_tx,
        }
    }

    /// Latest scan progress (for progress bars)
    pub fn subscribe_status(&self) -> watch::Receiver<ScanStatus> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ScanPhase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase_tx.borrow()
    }

    /// Start a full-library scan and poll it to completion
    pub async fn run_full_scan(&self) -> Result<ScanOutcome, CoreError> {
        self.submit(None).await
    }

    /// Start a partial rescan of the given leaf folders and poll it to
    /// completion. Fails with `EmptySelection` before any network call
    /// when the list is empty.
    pub async fn run_partial_rescan(&self, leaves: Vec<String>) -> Result<ScanOutcome, CoreError> {
        if leaves.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        self.submit(Some(leaves)).await
    }

    async fn submit(&self, leaves: Option<Vec<String>>) -> Result<ScanOutcome, CoreError> {
        self.phase_tx.send_replace(ScanPhase::Requesting);

        let submitted = match leaves {
            Some(folders) => {
                tracing::info!(count = folders.len(), "requesting partial rescan");
                self.control.start_partial_scan(folders).await
            }
            None => {
                tracing::info!("requesting full scan");
                self.control.start_scan().await
            }
        };

        if let Err(e) = submitted {
            self.phase_tx.send_replace(ScanPhase::Failed);
            return Err(e.into());
        }

        self.phase_tx.send_replace(ScanPhase::Polling);
        let outcome = self.poll_until_idle().await;
        self.phase_tx.send_replace(ScanPhase::Idle);
        Ok(outcome)
    }

    /// Poll `scan_status` until the backend goes idle or the poll budget
    /// runs out. Transient poll errors keep the loop going; the status
    /// endpoint is read-only and the scan continues regardless.
    async fn poll_until_idle(&self) -> ScanOutcome {
        let deadline = Instant::now() + self.poll_timeout;
        // First tick after one full interval: the background task needs a
        // moment to flip is_scanning on.
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);

        loop {
            ticker.tick().await;

            match self.control.scan_status().await {
                Ok(status) => {
                    let done = !status.is_scanning;
                    let processed = status.processed;
                    self.status_tx.send_replace(status);
                    if done {
                        tracing::info!(processed, "scan finished");
                        return ScanOutcome::Completed { processed };
                    }
                }
                Err(e) => {
                    tracing::warn!("scan status poll failed, retrying: {}", e);
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    timeout_secs = self.poll_timeout.as_secs(),
                    "scan poll budget exhausted"
                );
                return ScanOutcome::TimedOut;
            }
        }
    }
}
