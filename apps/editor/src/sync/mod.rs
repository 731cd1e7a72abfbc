//! Sync controller: moves the draft between Clean, Dirty, Saving and Error.
//!
//! At most one flush is in flight at a time. A flush requested while another
//! one is running is coalesced into a single follow-up that runs as soon as
//! the current one resolves, so only the newest snapshot is ever sent next.
//! Whether a successful response may clear the dirty state is decided by the
//! save-token captured when the flush was dispatched.

pub mod status;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};

use crate::backend::{Credential, ResumeBackend};
use crate::draft::dirty::Acknowledgement;
use crate::draft::{PendingFlush, SharedDraft};
use crate::errors::EditorError;
use crate::models::wire::ResumePayload;

pub use status::{FlushOutcome, FlushTrigger, SaveStatus, SyncState};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

pub struct SyncController {
    draft: SharedDraft,
    backend: Arc<dyn ResumeBackend>,
    credential: Credential,
    autosave_interval: Duration,
    /// Single-slot in-flight guard.
    gate: tokio::sync::Mutex<()>,
    follow_up: AtomicBool,
    in_flight: AtomicBool,
    last_error: Mutex<Option<EditorError>>,
    last_saved_at: Mutex<Option<DateTime<Utc>>>,
    state_tx: watch::Sender<SyncState>,
}

impl SyncController {
    pub fn new(
        draft: SharedDraft,
        backend: Arc<dyn ResumeBackend>,
        credential: Credential,
        autosave_interval: Duration,
    ) -> Self {
        let initial = if draft.lock().is_dirty() {
            SyncState::Dirty
        } else {
            SyncState::Clean
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            draft,
            backend,
            credential,
            autosave_interval,
            gate: tokio::sync::Mutex::new(()),
            follow_up: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
            last_saved_at: Mutex::new(None),
            state_tx,
        }
    }

    pub fn state(&self) -> SyncState {
        if self.in_flight.load(Ordering::SeqCst) {
            SyncState::Saving
        } else if self.last_error.lock().is_some() {
            SyncState::Error
        } else if self.draft.lock().is_dirty() {
            SyncState::Dirty
        } else {
            SyncState::Clean
        }
    }

    pub fn save_status(&self) -> SaveStatus {
        self.state().save_status()
    }

    /// Receives every state change, including the ones caused by edits once
    /// the view calls [`SyncController::refresh`].
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    pub fn last_error(&self) -> Option<EditorError> {
        self.last_error.lock().clone()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        *self.last_saved_at.lock()
    }

    /// Resolves with the failure the next time `states` reports
    /// `SyncState::Error`, or `None` once the controller is gone.
    pub async fn failed(&self, states: &mut watch::Receiver<SyncState>) -> Option<EditorError> {
        loop {
            states.changed().await.ok()?;
            if *states.borrow_and_update() != SyncState::Error {
                continue;
            }
            if let Some(error) = self.last_error() {
                return Some(error);
            }
        }
    }

    /// True while the draft holds changes the service has not acknowledged.
    /// A failed flush leaves this set, so the next tick retries.
    pub fn needs_flush(&self) -> bool {
        self.draft.lock().is_dirty()
    }

    /// Re-publishes the derived state; call after mutating the draft.
    pub fn refresh(&self) {
        let state = self.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Sends the current snapshot if the draft is dirty. If another flush is
    /// in flight this returns `Coalesced` at once and the running flush goes
    /// round again when it finishes.
    ///
    /// Never returns an error: failures are recorded, published as
    /// `SyncState::Error` and returned inside the outcome.
    pub async fn flush(&self, trigger: FlushTrigger) -> FlushOutcome {
        let guard = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.follow_up.store(true, Ordering::SeqCst);
                // the holder may have released between the failed try_lock and the store
                match self.gate.try_lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        debug!("Flush ({trigger}) coalesced into the in-flight save");
                        return FlushOutcome::Coalesced;
                    }
                }
            }
        };
        self.run_gated(guard, trigger).await
    }

    /// Like [`SyncController::flush`], but waits for an in-flight flush to
    /// finish and then sends whatever is still unsaved. Use this when the
    /// caller's next step depends on the service holding the latest edits.
    pub async fn flush_and_wait(&self, trigger: FlushTrigger) -> FlushOutcome {
        let guard = self.gate.lock().await;
        self.run_gated(guard, trigger).await
    }

    async fn run_gated(
        &self,
        mut guard: tokio::sync::MutexGuard<'_, ()>,
        trigger: FlushTrigger,
    ) -> FlushOutcome {
        let mut outcome = FlushOutcome::Skipped;
        loop {
            let drained = self.drain(trigger).await;
            if drained != FlushOutcome::Skipped {
                outcome = drained;
            }
            drop(guard);

            // A request coalesced after the last check must not be stranded
            if outcome.is_failure() || !self.follow_up.load(Ordering::SeqCst) {
                break;
            }
            guard = match self.gate.try_lock() {
                Ok(guard) => guard,
                // the new holder sees the flag itself
                Err(_) => break,
            };
        }

        self.refresh();
        outcome
    }

    /// Flushes until the draft is clean or no follow-up was requested.
    /// Callers hold the gate.
    async fn drain(&self, trigger: FlushTrigger) -> FlushOutcome {
        let mut outcome = FlushOutcome::Skipped;
        loop {
            self.follow_up.store(false, Ordering::SeqCst);
            let pending = self.draft.lock().begin_flush();
            let Some(pending) = pending else {
                break;
            };

            outcome = self.send(pending, trigger).await;
            if outcome.is_failure() || !self.follow_up.load(Ordering::SeqCst) {
                break;
            }
            debug!("Running coalesced follow-up flush");
        }
        outcome
    }

    async fn send(&self, pending: PendingFlush, trigger: FlushTrigger) -> FlushOutcome {
        let PendingFlush { snapshot, token } = pending;
        let payload = ResumePayload::from_document(&snapshot);

        self.in_flight.store(true, Ordering::SeqCst);
        self.refresh();
        debug!(
            "Flushing revision {} ({trigger}, {})",
            token.revision(),
            if snapshot.id().is_some() { "update" } else { "create" }
        );

        let result = match snapshot.id() {
            Some(id) => self.backend.update(&self.credential, id, &payload).await,
            None => self.backend.create(&self.credential, &payload).await,
        };
        self.in_flight.store(false, Ordering::SeqCst);

        let stored = match result {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Flush of revision {} failed: {e}", token.revision());
                *self.last_error.lock() = Some(e.clone());
                return FlushOutcome::Failed(e);
            }
        };

        let acknowledgement = {
            let mut draft = self.draft.lock();
            draft.bind_identifier(stored.id.clone());
            draft.acknowledge(token)
        };
        *self.last_error.lock() = None;
        *self.last_saved_at.lock() = Some(Utc::now());

        match acknowledgement {
            Acknowledgement::Clean => {
                info!("Saved revision {} as resume {}", token.revision(), stored.id);
                FlushOutcome::Saved { id: stored.id }
            }
            Acknowledgement::Stale { acked, current } => {
                info!("Saved revision {acked} but draft is at {current}; still dirty");
                FlushOutcome::Stale {
                    id: stored.id,
                    acked,
                    current,
                }
            }
        }
    }

    /// Starts the periodic autosave. The first tick fires one full interval
    /// after the call; ticks only flush while there is something to save.
    pub fn spawn_autosave(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let period = self.autosave_interval;
        let span = tracing::Span::current();

        tokio::spawn(
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                info!("Autosave every {}s", period.as_secs());
                loop {
                    ticker.tick().await;
                    if controller.needs_flush() {
                        controller.flush(FlushTrigger::Timer).await;
                    }
                }
            }
            .instrument(span),
        )
    }
}
