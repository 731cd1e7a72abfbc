/// Marker captured when a flush is dispatched: the revision the flush covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaveToken(u64);

impl SaveToken {
    pub fn revision(&self) -> u64 {
        self.0
    }
}

/// Result of acknowledging a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// No mutation happened after the token was issued.
    Clean,
    /// Mutations arrived while the save was in flight; the draft stays dirty.
    Stale { acked: u64, current: u64 },
}

/// Tracks divergence between the draft and the last persisted state.
///
/// Every mutation bumps `revision`. A successful save only moves `persisted`
/// up to the revision its token captured, so a response for an older
/// snapshot can never hide a newer mutation.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    revision: u64,
    persisted: u64,
}

impl DirtyTracker {
    pub fn mark(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision > self.persisted
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn token(&self) -> SaveToken {
        SaveToken(self.revision)
    }

    pub fn acknowledge(&mut self, token: SaveToken) -> Acknowledgement {
        self.persisted = self.persisted.max(token.0);
        if self.is_dirty() {
            Acknowledgement::Stale {
                acked: token.0,
                current: self.revision,
            }
        } else {
            Acknowledgement::Clean
        }
    }
}
