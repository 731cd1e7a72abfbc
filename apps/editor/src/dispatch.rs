//! Single event dispatcher between the view and the draft store.
//!
//! Views never call store mutators directly: they emit an `EditorEvent`
//! naming the element (collection kind plus a key or position) and get back
//! the new snapshot and how much of the view to redraw.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::draft::DraftStore;
use crate::errors::EditorError;
use crate::models::resume::{CollectionKind, Document, EntryKey, FieldPath};
use crate::sync::FlushTrigger;

/// How the view addresses a collection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    /// Stable handle taken from a rendered item.
    Key(EntryKey),
    /// Position in the most recent render.
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    SetField {
        path: FieldPath,
        value: String,
    },
    AddEntry {
        kind: CollectionKind,
        defaults: BTreeMap<String, String>,
    },
    EditEntry {
        kind: CollectionKind,
        target: EntryRef,
        field: String,
        value: String,
    },
    RemoveEntry {
        kind: CollectionKind,
        target: EntryRef,
    },
    /// Focus left a text field.
    Blur,
}

/// How much of the view must be redrawn after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDirective {
    None,
    /// A field of one entry changed; positions are unchanged.
    Patch {
        kind: CollectionKind,
        key: EntryKey,
        position: usize,
    },
    /// Positions shifted; every row of the collection must be rebuilt.
    Rebuild(CollectionKind),
    /// Title, style or a personal field changed.
    Full,
}

#[derive(Debug, Clone)]
pub struct Dispatched {
    pub snapshot: Option<Arc<Document>>,
    pub directive: RenderDirective,
    pub flush: Option<FlushTrigger>,
}

impl Dispatched {
    fn mutated(snapshot: Arc<Document>, directive: RenderDirective) -> Self {
        Self {
            snapshot: Some(snapshot),
            directive,
            flush: None,
        }
    }
}

/// Applies one event. Rejected events leave the store untouched.
pub fn dispatch(store: &mut DraftStore, event: EditorEvent) -> Result<Dispatched, EditorError> {
    debug!("Dispatching {event:?}");
    match event {
        EditorEvent::SetField { path, value } => {
            let snapshot = store.mutate_field(path, value);
            Ok(Dispatched::mutated(snapshot, RenderDirective::Full))
        }
        EditorEvent::AddEntry { kind, defaults } => {
            let applied = store.append(kind, defaults)?;
            Ok(Dispatched::mutated(
                applied.snapshot,
                RenderDirective::Rebuild(kind),
            ))
        }
        EditorEvent::EditEntry {
            kind,
            target,
            field,
            value,
        } => {
            let index = locate(store, kind, target)?;
            let applied = store.update_field(kind, index, field, value)?;
            let directive = RenderDirective::Patch {
                kind,
                key: applied.change.key,
                position: applied.change.position,
            };
            Ok(Dispatched::mutated(applied.snapshot, directive))
        }
        EditorEvent::RemoveEntry { kind, target } => {
            let index = locate(store, kind, target)?;
            let applied = store.remove(kind, index)?;
            Ok(Dispatched::mutated(
                applied.snapshot,
                RenderDirective::Rebuild(kind),
            ))
        }
        EditorEvent::Blur => Ok(Dispatched {
            snapshot: None,
            directive: RenderDirective::None,
            flush: store.is_dirty().then_some(FlushTrigger::Explicit),
        }),
    }
}

fn locate(store: &DraftStore, kind: CollectionKind, target: EntryRef) -> Result<usize, EditorError> {
    match target {
        EntryRef::Key(key) => store.resolve(kind, key),
        EntryRef::Position(index) => Ok(index),
    }
}
