//! One editing session: the explicitly owned draft store together with its
//! sync controller, request pipeline and the current preview.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::backend::{Credential, ExportFormat, ResumeBackend};
use crate::dispatch::{self, EditorEvent, RenderDirective};
use crate::draft::{DraftStore, SharedDraft};
use crate::errors::EditorError;
use crate::models::resume::{ResumeId, StyleId, DEFAULT_TITLE};
use crate::pipeline::{ExportArtifact, RequestPipeline, ScoreAssessment};
use crate::preview::{self, DisplayTree};
use crate::sync::{
    FlushOutcome, FlushTrigger, SaveStatus, SyncController, SyncState, DEFAULT_AUTOSAVE_INTERVAL,
};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub autosave_interval: Duration,
    pub style: StyleId,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            style: StyleId::default(),
        }
    }
}

/// Snapshot of the save indicator shown next to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: SyncState,
    pub save_status: SaveStatus,
    pub resume_id: Option<ResumeId>,
    pub revision: u64,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct EditorSession {
    session_id: Uuid,
    span: Span,
    draft: SharedDraft,
    sync: Arc<SyncController>,
    pipeline: RequestPipeline,
    preview: DisplayTree,
    autosave: JoinHandle<()>,
}

impl EditorSession {
    /// Starts a session on a fresh, unsaved draft.
    pub fn start(
        backend: Arc<dyn ResumeBackend>,
        credential: Credential,
        options: SessionOptions,
    ) -> Self {
        let store = DraftStore::new_draft(DEFAULT_TITLE, options.style);
        Self::assemble(store, backend, credential, &options)
    }

    /// Starts a session on a persisted résumé.
    pub async fn open(
        backend: Arc<dyn ResumeBackend>,
        credential: Credential,
        id: &ResumeId,
        options: SessionOptions,
    ) -> Result<Self, EditorError> {
        let stored = backend.load(&credential, id).await?;
        let store = DraftStore::from_stored(&stored);
        Ok(Self::assemble(store, backend, credential, &options))
    }

    fn assemble(
        store: DraftStore,
        backend: Arc<dyn ResumeBackend>,
        credential: Credential,
        options: &SessionOptions,
    ) -> Self {
        let session_id = Uuid::new_v4();
        let span = info_span!("session", id = %session_id);
        let entered = span.enter();

        let document = store.get();
        let preview = preview::render(&document, document.style);
        let draft = store.into_shared();
        let sync = Arc::new(SyncController::new(
            Arc::clone(&draft),
            Arc::clone(&backend),
            credential.clone(),
            options.autosave_interval,
        ));
        let pipeline = RequestPipeline::new(Arc::clone(&draft), backend, credential);
        let autosave = sync.spawn_autosave();
        info!(
            "Editing session started ({})",
            document.id().map_or("unsaved draft", ResumeId::as_str)
        );
        drop(entered);

        Self {
            session_id,
            span,
            draft,
            sync,
            pipeline,
            preview,
            autosave,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn preview(&self) -> &DisplayTree {
        &self.preview
    }

    pub fn preview_html(&self) -> String {
        preview::markup::to_html(&self.preview)
    }

    pub fn sync(&self) -> &Arc<SyncController> {
        &self.sync
    }

    /// Routes one view event through the dispatcher and re-renders the
    /// preview synchronously. An explicit flush trigger is started in the
    /// background so input keeps flowing while it is in flight.
    pub fn apply(&mut self, event: EditorEvent) -> Result<RenderDirective, EditorError> {
        let _entered = self.span.enter();
        let dispatched = dispatch::dispatch(&mut self.draft.lock(), event)?;

        if let Some(snapshot) = &dispatched.snapshot {
            self.preview = preview::render(snapshot, snapshot.style);
            self.sync.refresh();
        }
        if let Some(trigger) = dispatched.flush {
            self.spawn_flush(trigger);
        }
        Ok(dispatched.directive)
    }

    fn spawn_flush(&self, trigger: FlushTrigger) {
        let sync = Arc::clone(&self.sync);
        tokio::spawn(
            async move {
                sync.flush(trigger).await;
            }
            .instrument(self.span.clone()),
        );
    }

    /// Flushes now and waits for the result. A save already in flight is
    /// waited out first, so the outcome covers every edit made before the call.
    pub async fn flush(&self, trigger: FlushTrigger) -> FlushOutcome {
        self.sync
            .flush_and_wait(trigger)
            .instrument(self.span.clone())
            .await
    }

    /// Opening the preview is an explicit flush trigger.
    pub async fn open_preview(&self) -> &DisplayTree {
        self.flush(FlushTrigger::Explicit).await;
        &self.preview
    }

    /// Flushes pending edits, then exports. A draft that has never been
    /// saved still fails with `NotPersisted` if the flush did not bind it.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportArtifact, EditorError> {
        self.flush(FlushTrigger::Explicit).await;
        self.pipeline
            .export(format)
            .instrument(self.span.clone())
            .await
    }

    pub async fn score(&self, job_description: Option<&str>) -> Result<ScoreAssessment, EditorError> {
        self.pipeline
            .score(job_description)
            .instrument(self.span.clone())
            .await
    }

    pub fn status(&self) -> StatusReport {
        let (resume_id, revision) = {
            let draft = self.draft.lock();
            (draft.id(), draft.revision())
        };
        let state = self.sync.state();
        StatusReport {
            state,
            save_status: state.save_status(),
            resume_id,
            revision,
            last_saved_at: self.sync.last_saved_at(),
            last_error: self.sync.last_error().map(|e| e.to_string()),
        }
    }

    /// Stops autosave and sends whatever is still unsaved.
    pub async fn close(self) -> FlushOutcome {
        self.autosave.abort();
        let outcome = self.flush(FlushTrigger::Shutdown).await;
        let _entered = self.span.enter();
        info!("Editing session closed ({})", self.sync.state());
        outcome
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.autosave.abort();
    }
}
