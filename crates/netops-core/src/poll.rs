// ── Alert polling ──
//
// One background task per polled resource. Each tick issues a fetch tagged
// with a sequence number; a tick that fires while a fetch is still in
// flight drops it and issues a fresh one. Applied lists are published on a
// watch channel and newly seen critical alerts go to a notifier.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Alert, EntityId};
use crate::stream::{EntityStream, SharedList};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Produces one fetch of the alert list per call.
pub type AlertFetch = Arc<dyn Fn() -> BoxFuture<Result<Vec<Alert>, CoreError>> + Send + Sync>;

/// Receives newly raised critical alerts. Delivery is best-effort: the
/// poller never waits on or retries a notification.
pub trait AlertNotifier: Send + Sync + 'static {
    fn notify(&self, alert: &Alert);
}

// ── Sequence gate ──────────────────────────────────────────────────

/// Orders responses: only a response newer than the last applied one wins.
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: u64,
    applied: u64,
}

impl SequenceGate {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `true` and records `seq` if it is newer than anything applied.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}

// ── Stall tracking ─────────────────────────────────────────────────

/// Consecutive superseded fetches before the poller warns.
pub const STALL_WARN_AFTER: u32 = 3;

/// Counts consecutive fetches dropped by the next tick before they settled.
#[derive(Debug, Default)]
pub struct StallTracker {
    streak: u32,
}

impl StallTracker {
    /// Record a superseded fetch. Returns `true` once per streak, when it
    /// reaches [`STALL_WARN_AFTER`].
    pub fn superseded(&mut self) -> bool {
        self.streak = self.streak.saturating_add(1);
        self.streak == STALL_WARN_AFTER
    }

    /// A fetch settled; the streak is over.
    pub fn settled(&mut self) {
        self.streak = 0;
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }
}

// ── New-alert detection ────────────────────────────────────────────

/// Tracks alert ids across polls. The first observed list only primes the
/// seen set; later lists report critical alerts whose id was not seen.
#[derive(Debug, Default)]
pub struct NewAlertDetector {
    seen: Option<HashSet<EntityId>>,
}

impl NewAlertDetector {
    pub fn observe<'a>(&mut self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        let current: HashSet<EntityId> = alerts.iter().map(|a| a.id.clone()).collect();
        let fresh = match &self.seen {
            None => Vec::new(),
            Some(seen) => alerts
                .iter()
                .filter(|a| a.is_critical() && !seen.contains(&a.id))
                .collect(),
        };
        self.seen = Some(current);
        fresh
    }
}

// ── Poller task ────────────────────────────────────────────────────

/// Handle to a running poller. Dropping it cancels the task.
pub struct AlertPoller {
    cancel: CancellationToken,
    receiver: watch::Receiver<SharedList<Alert>>,
    handle: Option<JoinHandle<()>>,
}

impl AlertPoller {
    pub fn spawn(fetch: AlertFetch, interval: Duration, notifier: Arc<dyn AlertNotifier>) -> Self {
        let cancel = CancellationToken::new();
        let (tx, receiver) = watch::channel(Arc::new(Vec::new()));
        let handle = tokio::spawn(run(fetch, interval, tx, notifier, cancel.clone()));
        Self {
            cancel,
            receiver,
            handle: Some(handle),
        }
    }

    pub fn subscribe(&self) -> EntityStream<Alert> {
        EntityStream::new(self.receiver.clone())
    }

    /// Cancel the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "alert poller task panicked");
            }
        }
    }
}

impl Drop for AlertPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

type InFlight = (u64, BoxFuture<Result<Vec<Alert>, CoreError>>);

async fn settle(slot: &mut Option<InFlight>) -> (u64, Result<Vec<Alert>, CoreError>) {
    match slot {
        Some((seq, fut)) => (*seq, fut.await),
        None => std::future::pending().await,
    }
}

async fn run(
    fetch: AlertFetch,
    interval: Duration,
    tx: watch::Sender<SharedList<Alert>>,
    notifier: Arc<dyn AlertNotifier>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut gate = SequenceGate::default();
    let mut detector = NewAlertDetector::default();
    let mut stalls = StallTracker::default();
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Some((stale, _)) = in_flight.take() {
                    debug!(seq = stale, "alert fetch superseded by next tick");
                    if stalls.superseded() {
                        warn!(
                            superseded = stalls.streak(),
                            interval_secs = interval.as_secs(),
                            "alert fetches keep outlasting the poll interval; list is not refreshing"
                        );
                    }
                }
                in_flight = Some((gate.issue(), fetch()));
            }
            (seq, result) = settle(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                stalls.settled();
                if !gate.accept(seq) {
                    debug!(seq, "discarding out-of-order alert response");
                    continue;
                }
                match result {
                    Ok(alerts) => {
                        for alert in detector.observe(&alerts) {
                            notifier.notify(alert);
                        }
                        debug!(seq, count = alerts.len(), "alerts refreshed");
                        tx.send_replace(Arc::new(alerts.into_iter().map(Arc::new).collect()));
                    }
                    Err(e) => warn!(error = %e, "alert poll failed"),
                }
            }
        }
    }
    debug!("alert poller stopped");
}
