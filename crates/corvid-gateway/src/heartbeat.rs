//! Heartbeating and zombie-connection detection.
//!
//! The server announces a heartbeat interval in Hello; a beat that never
//! receives its ACK marks the connection as a zombie, and the run loop
//! replaces the socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::protocol::{self, GatewayPayload};

/// Tracks whether the latest heartbeat has been acknowledged.
///
/// Shared between the beat task (which sets the outstanding flag) and
/// the read loop (which clears it on ACK).
#[derive(Default)]
pub(crate) struct AckTracker(AtomicBool);

impl AckTracker {
    /// The read loop saw a heartbeat ACK.
    pub(crate) fn ack(&self) {
        self.0.store(false, Ordering::SeqCst);
        trace!("Heartbeat ACK received");
    }

    /// Claim the next beat. `false` means the previous beat is still
    /// unacknowledged.
    fn begin_beat(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// The periodic heartbeat task for one socket.
pub(crate) struct Heartbeater {
    /// Last dispatch sequence, echoed in every beat.
    pub(crate) sequence: Arc<Mutex<Option<u64>>>,
    pub(crate) acks: Arc<AckTracker>,
    pub(crate) outbound_tx: mpsc::Sender<GatewayPayload>,
}

impl Heartbeater {
    /// Beat until shutdown or a missed ACK.
    ///
    /// The first beat lands a random fraction of the interval after
    /// start, so a fleet restarting together does not heartbeat in
    /// lockstep; every later beat follows at the full interval. On a
    /// missed ACK, `zombie_tx` fires and the task ends.
    pub(crate) async fn run(
        self,
        interval_ms: u64,
        zombie_tx: oneshot::Sender<()>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let period = Duration::from_millis(interval_ms);
        let first_beat = Instant::now()
            .checked_add(period.mul_f64(fastrand::f64()))
            .unwrap_or_else(Instant::now);
        let mut ticks = tokio::time::interval_at(first_beat, period);

        debug!(interval_ms, "Heartbeat task started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    debug!("Heartbeat task shutting down");
                    return;
                }
                _ = ticks.tick() => {
                    if !self.pulse().await {
                        let _ = zombie_tx.send(());
                        return;
                    }
                }
            }
        }
    }

    /// Send one beat. `false` when the previous beat was never
    /// acknowledged or the writer task is gone.
    async fn pulse(&self) -> bool {
        if !self.acks.begin_beat() {
            warn!("Heartbeat ACK missed; zombie connection detected");
            return false;
        }
        let seq = *self.sequence.lock().await;
        trace!(seq = ?seq, "Sending heartbeat");
        self.outbound_tx.send(protocol::heartbeat(seq)).await.is_ok()
    }
}
