//! Positional CRUD over the five entry collections.
//!
//! Positions are dense and zero-based. `Remove` shifts every later entry down
//! by one, so callers must treat positions as valid for a single render only;
//! the returned `CollectionChange::structural` flag tells the view to rebuild
//! the whole collection instead of patching one row.

use std::collections::BTreeMap;

use tracing::error;

use crate::draft::{Applied, DraftStore};
use crate::errors::EditorError;
use crate::models::resume::{CollectionKind, Document, Entry, EntryKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOp {
    Append {
        defaults: BTreeMap<String, String>,
    },
    UpdateField {
        index: usize,
        field: String,
        value: String,
    },
    Remove {
        index: usize,
    },
}

/// What a collection operation did, for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChange {
    pub kind: CollectionKind,
    /// Position touched: the new entry, the updated entry, or the removed slot.
    pub position: usize,
    pub key: EntryKey,
    /// Append/remove shift positions; field updates do not.
    pub structural: bool,
}

/// Applies `op` to `document`. Rejects out-of-range positions before touching anything.
pub(crate) fn apply(
    document: &mut Document,
    kind: CollectionKind,
    op: CollectionOp,
    next_key: &mut u64,
) -> Result<CollectionChange, EditorError> {
    let list = document.collection_mut(kind);
    match op {
        CollectionOp::Append { defaults } => {
            let mut fields: BTreeMap<String, String> = kind
                .default_fields()
                .iter()
                .map(|f| (f.to_string(), String::new()))
                .collect();
            fields.extend(defaults);

            *next_key += 1;
            let key = EntryKey::from_raw(*next_key);
            let position = list.push(Entry::new(key, fields));
            Ok(CollectionChange {
                kind,
                position,
                key,
                structural: true,
            })
        }
        CollectionOp::UpdateField {
            index,
            field,
            value,
        } => {
            let len = list.len();
            let entry = list
                .get_mut(index)
                .ok_or_else(|| out_of_range(kind, index, len))?;
            entry.set(&field, value);
            Ok(CollectionChange {
                kind,
                position: index,
                key: entry.key(),
                structural: false,
            })
        }
        CollectionOp::Remove { index } => {
            let len = list.len();
            if index >= len {
                return Err(out_of_range(kind, index, len));
            }
            let removed = list.remove(index);
            Ok(CollectionChange {
                kind,
                position: index,
                key: removed.key(),
                structural: true,
            })
        }
    }
}

fn out_of_range(kind: CollectionKind, index: usize, len: usize) -> EditorError {
    error!("Rejected {kind} access at index {index} (length {len})");
    EditorError::OutOfRange { kind, index, len }
}

// ────────────────────────────────────────────────────────────────────────────
// List editor API
// ────────────────────────────────────────────────────────────────────────────

impl DraftStore {
    /// Pushes a new entry; returns its position (== new length - 1).
    pub fn append(
        &mut self,
        kind: CollectionKind,
        defaults: BTreeMap<String, String>,
    ) -> Result<Applied, EditorError> {
        self.mutate_collection(kind, CollectionOp::Append { defaults })
    }

    pub fn update_field(
        &mut self,
        kind: CollectionKind,
        index: usize,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Applied, EditorError> {
        self.mutate_collection(
            kind,
            CollectionOp::UpdateField {
                index,
                field: field.into(),
                value: value.into(),
            },
        )
    }

    pub fn remove(&mut self, kind: CollectionKind, index: usize) -> Result<Applied, EditorError> {
        self.mutate_collection(kind, CollectionOp::Remove { index })
    }

    /// Resolves a rendered handle to the entry's current position.
    pub fn resolve(&self, kind: CollectionKind, key: EntryKey) -> Result<usize, EditorError> {
        self.get()
            .collection(kind)
            .position_of(key)
            .ok_or(EditorError::StaleHandle { kind, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::StyleId;
    use proptest::prelude::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_append_returns_last_position() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        let first = store
            .append(CollectionKind::Skills, fields(&[("name", "Rust")]))
            .unwrap();
        let second = store
            .append(CollectionKind::Skills, fields(&[("name", "Go")]))
            .unwrap();

        assert_eq!(first.change.position, 0);
        assert_eq!(second.change.position, 1);
        assert!(second.change.structural);
        assert_eq!(second.snapshot.collection(CollectionKind::Skills).len(), 2);
    }

    #[test]
    fn test_append_seeds_default_fields() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        let applied = store
            .append(CollectionKind::Experiences, fields(&[("company", "Acme")]))
            .unwrap();
        let entry = applied
            .snapshot
            .collection(CollectionKind::Experiences)
            .get(0)
            .unwrap();

        assert_eq!(entry.get("company"), "Acme");
        assert!(entry.fields().contains_key("position"));
        assert_eq!(entry.get("position"), "");
    }

    #[test]
    fn test_update_out_of_range_is_rejected_without_mutation() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        store.append(CollectionKind::Projects, BTreeMap::new()).unwrap();
        let revision = store.revision();

        let err = store
            .update_field(CollectionKind::Projects, 1, "name", "x")
            .unwrap_err();

        assert_eq!(
            err,
            EditorError::OutOfRange {
                kind: CollectionKind::Projects,
                index: 1,
                len: 1
            }
        );
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_update_is_not_structural() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        store.append(CollectionKind::Education, BTreeMap::new()).unwrap();
        let applied = store
            .update_field(CollectionKind::Education, 0, "degree", "BSc")
            .unwrap();

        assert!(!applied.change.structural);
        assert_eq!(
            applied
                .snapshot
                .collection(CollectionKind::Education)
                .get(0)
                .unwrap()
                .get("degree"),
            "BSc"
        );
    }

    #[test]
    fn test_remove_first_of_two_shifts_second_down() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        store
            .append(CollectionKind::Experiences, fields(&[("company", "Acme")]))
            .unwrap();
        store
            .append(CollectionKind::Experiences, fields(&[("company", "Beta")]))
            .unwrap();

        let applied = store.remove(CollectionKind::Experiences, 0).unwrap();
        let list = applied.snapshot.collection(CollectionKind::Experiences);

        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().get("company"), "Beta");
        assert!(store
            .update_field(CollectionKind::Experiences, 1, "company", "Gamma")
            .is_err());
    }

    #[test]
    fn test_removed_key_no_longer_resolves() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        let a = store.append(CollectionKind::Skills, BTreeMap::new()).unwrap();
        let b = store.append(CollectionKind::Skills, BTreeMap::new()).unwrap();

        store.remove(CollectionKind::Skills, 0).unwrap();

        assert!(matches!(
            store.resolve(CollectionKind::Skills, a.change.key),
            Err(EditorError::StaleHandle { .. })
        ));
        assert_eq!(store.resolve(CollectionKind::Skills, b.change.key).unwrap(), 0);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Append,
        Remove(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![Just(Step::Append), (0usize..8).prop_map(Step::Remove)]
    }

    proptest! {
        #[test]
        fn test_positions_stay_dense(steps in proptest::collection::vec(step(), 0..40)) {
            let mut store = DraftStore::new_draft("CV", StyleId::Modern);
            let mut expected_len = 0usize;

            for s in steps {
                match s {
                    Step::Append => {
                        store.append(CollectionKind::Certifications, BTreeMap::new()).unwrap();
                        expected_len += 1;
                    }
                    Step::Remove(index) => {
                        let result = store.remove(CollectionKind::Certifications, index);
                        if index < expected_len {
                            prop_assert!(result.is_ok());
                            expected_len -= 1;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                }

                let snapshot = store.get();
                let list = snapshot.collection(CollectionKind::Certifications);
                prop_assert_eq!(list.len(), expected_len);
                for (position, entry) in list.iter().enumerate() {
                    prop_assert_eq!(list.position_of(entry.key()), Some(position));
                }
            }
        }
    }
}
