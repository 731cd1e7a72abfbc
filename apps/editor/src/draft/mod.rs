//! Draft store: the single owned copy of the résumé being edited.
//!
//! `get()` hands out immutable `Arc<Document>` snapshots; mutators copy on
//! write, so a snapshot held by an in-flight flush is never disturbed by later
//! edits. Every successful mutation bumps the dirty tracker's revision.

pub mod dirty;
pub mod list_editor;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::draft::dirty::{Acknowledgement, DirtyTracker, SaveToken};
use crate::draft::list_editor::{CollectionChange, CollectionOp};
use crate::errors::EditorError;
use crate::models::resume::{
    CollectionKind, Document, Entry, EntryKey, FieldPath, ResumeId, StyleId, DEFAULT_TITLE,
};
use crate::models::wire::StoredResume;

/// The draft store as shared between the editing view and the sync controller.
/// The lock is never held across an `.await`.
pub type SharedDraft = Arc<Mutex<DraftStore>>;

/// Result of a successful collection mutation.
#[derive(Debug, Clone)]
pub struct Applied {
    pub snapshot: Arc<Document>,
    pub change: CollectionChange,
}

/// A snapshot captured for a flush together with the revision it covers.
#[derive(Debug, Clone)]
pub struct PendingFlush {
    pub snapshot: Arc<Document>,
    pub token: SaveToken,
}

#[derive(Debug)]
pub struct DraftStore {
    document: Arc<Document>,
    dirty: DirtyTracker,
    next_key: u64,
}

impl DraftStore {
    /// Starts an unsaved draft. It is clean until the first mutation.
    pub fn new_draft(title: impl Into<String>, style: StyleId) -> Self {
        Self {
            document: Arc::new(Document::new(title, style)),
            dirty: DirtyTracker::default(),
            next_key: 0,
        }
    }

    /// Builds a clean store from a persisted record; the identifier is bound immediately.
    pub fn from_stored(stored: &StoredResume) -> Self {
        let title = stored
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let style = stored
            .template_name
            .as_deref()
            .map(StyleId::from_name)
            .unwrap_or_default();

        let mut document = Document::new(title, style);
        document.id = Some(stored.id.clone());
        document.personal = stored.personal();

        let mut next_key = 0;
        for kind in CollectionKind::ALL {
            let list = document.collection_mut(kind);
            for fields in stored.collection_rows(kind) {
                next_key += 1;
                list.push(Entry::new(EntryKey::from_raw(next_key), fields));
            }
        }

        info!("Loaded resume {} into draft store", stored.id);
        Self {
            document: Arc::new(document),
            dirty: DirtyTracker::default(),
            next_key,
        }
    }

    pub fn into_shared(self) -> SharedDraft {
        Arc::new(Mutex::new(self))
    }

    /// Current immutable snapshot for rendering.
    pub fn get(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    pub fn id(&self) -> Option<ResumeId> {
        self.document.id.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn revision(&self) -> u64 {
        self.dirty.revision()
    }

    /// Assigns a scalar field. Values are free text; blank is legal.
    pub fn mutate_field(&mut self, path: FieldPath, value: impl Into<String>) -> Arc<Document> {
        let value = value.into();
        let document = Arc::make_mut(&mut self.document);
        match path {
            FieldPath::Title => document.title = value,
            FieldPath::Style => document.style = StyleId::from_name(&value),
            FieldPath::Personal(field) => *document.personal.slot_mut(field) = value,
        }
        let revision = self.dirty.mark();
        debug!("Field {path:?} changed (revision {revision})");
        self.get()
    }

    /// Applies a list-editor operation. Invalid positions are rejected before
    /// the model changes, and the revision only moves on success.
    pub fn mutate_collection(
        &mut self,
        kind: CollectionKind,
        op: CollectionOp,
    ) -> Result<Applied, EditorError> {
        let document = Arc::make_mut(&mut self.document);
        let change = list_editor::apply(document, kind, op, &mut self.next_key)?;
        let revision = self.dirty.mark();
        debug!(
            "{kind} {} at {} (revision {revision})",
            if change.structural { "restructured" } else { "updated" },
            change.position
        );
        Ok(Applied {
            snapshot: self.get(),
            change,
        })
    }

    /// Captures the snapshot and save-token for a flush, or `None` when clean.
    pub fn begin_flush(&self) -> Option<PendingFlush> {
        if !self.dirty.is_dirty() {
            return None;
        }
        Some(PendingFlush {
            snapshot: self.get(),
            token: self.dirty.token(),
        })
    }

    pub fn acknowledge(&mut self, token: SaveToken) -> Acknowledgement {
        self.dirty.acknowledge(token)
    }

    /// Binds the durable identifier. A bound identifier is never replaced;
    /// returns `false` if the service tried to hand out a different one.
    pub fn bind_identifier(&mut self, id: ResumeId) -> bool {
        match &self.document.id {
            Some(existing) if *existing == id => true,
            Some(existing) => {
                warn!("Ignoring identifier {id}: draft is already bound to {existing}");
                false
            }
            None => {
                info!("Draft bound to resume {id}");
                Arc::make_mut(&mut self.document).id = Some(id);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalField;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_mutate_field_marks_dirty_and_returns_snapshot() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        assert!(!store.is_dirty());

        let snapshot =
            store.mutate_field(FieldPath::Personal(PersonalField::FullName), "Ada Lovelace");

        assert!(store.is_dirty());
        assert_eq!(snapshot.personal.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        let before = store.mutate_field(FieldPath::Title, "First");
        store.mutate_field(FieldPath::Title, "Second");

        assert_eq!(before.title, "First");
        assert_eq!(store.get().title, "Second");
    }

    #[test]
    fn test_style_path_parses_name() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        let snapshot = store.mutate_field(FieldPath::Style, "dark");
        assert_eq!(snapshot.style, StyleId::Dark);
    }

    #[test]
    fn test_begin_flush_only_when_dirty() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        assert!(store.begin_flush().is_none());

        store.mutate_field(FieldPath::Title, "T");
        let pending = store.begin_flush().unwrap();
        assert_eq!(pending.token.revision(), 1);
        assert_eq!(store.acknowledge(pending.token), Acknowledgement::Clean);
        assert!(store.begin_flush().is_none());
    }

    #[test]
    fn test_identifier_is_never_reassigned() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        assert!(store.bind_identifier(ResumeId::from("r1")));
        assert!(store.bind_identifier(ResumeId::from("r1")));
        assert!(!store.bind_identifier(ResumeId::from("r2")));
        assert_eq!(store.id(), Some(ResumeId::from("r1")));
    }

    #[test]
    fn test_binding_does_not_mark_dirty() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        store.bind_identifier(ResumeId::from("r1"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_from_stored_is_clean_and_bound() {
        let stored: StoredResume = serde_json::from_value(json!({
            "id": 7,
            "title": "Backend CV",
            "template_name": "professional",
            "email": "ada@example.com",
            "skills": [{ "name": "Rust", "order": 0 }, { "name": "SQL", "order": 1 }],
        }))
        .unwrap();

        let mut store = DraftStore::from_stored(&stored);
        let doc = store.get();
        assert!(!store.is_dirty());
        assert_eq!(doc.id().map(ResumeId::as_str), Some("7"));
        assert_eq!(doc.style, StyleId::Professional);
        assert_eq!(doc.personal.email, "ada@example.com");
        assert_eq!(doc.collection(CollectionKind::Skills).len(), 2);

        // keys allocated after load must not collide with loaded entries
        let applied = store
            .append(CollectionKind::Skills, BTreeMap::new())
            .unwrap();
        let keys: Vec<_> = applied
            .snapshot
            .collection(CollectionKind::Skills)
            .iter()
            .map(Entry::key)
            .collect();
        assert_eq!(keys.len(), 3);
        assert!(keys[2] > keys[1]);
    }
}
