use std::fmt;

use serde::Serialize;

use crate::errors::EditorError;
use crate::models::resume::ResumeId;

/// Controller state as seen by the editing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Clean,
    Dirty,
    Saving,
    Error,
}

impl SyncState {
    /// Collapses the state onto the three-valued status indicator.
    /// Pending edits keep showing the last save until a flush starts.
    pub fn save_status(self) -> SaveStatus {
        match self {
            SyncState::Clean | SyncState::Dirty => SaveStatus::Saved,
            SyncState::Saving => SaveStatus::Saving,
            SyncState::Error => SaveStatus::Error,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Clean => "clean",
            SyncState::Dirty => "dirty",
            SyncState::Saving => "saving",
            SyncState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Three-valued save indicator. `Saved` means no save is in progress and
/// the last one did not fail; it does not mean every edit has been sent.
/// Check `SyncState::Dirty` for unsent edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Saved,
    Saving,
    Error,
}

/// What asked for a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    Timer,
    /// Leaving a text field, opening the preview, exporting.
    Explicit,
    Shutdown,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlushTrigger::Timer => "timer",
            FlushTrigger::Explicit => "explicit",
            FlushTrigger::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Result of one `SyncController::flush` call. Failures are captured here,
/// never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to save.
    Skipped,
    /// Another flush was in flight; it will run again once it finishes.
    Coalesced,
    Saved { id: ResumeId },
    /// The save landed but edits arrived while it was in flight.
    Stale { id: ResumeId, acked: u64, current: u64 },
    Failed(EditorError),
}

impl FlushOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FlushOutcome::Failed(_))
    }
}
