//! Request pipeline for export and score checks.
//!
//! Both operations need a bound identifier and fail fast with
//! `EditorError::NotPersisted` before touching the network when there is
//! none. They run independently of the flush queue and are never retried.

pub mod export;
pub mod scoring;

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{Credential, ExportFormat, ResumeBackend};
use crate::draft::SharedDraft;
use crate::errors::EditorError;
use crate::models::resume::ResumeId;

pub use export::ExportArtifact;
pub use scoring::{ScoreAssessment, ScoreTier};

#[derive(Clone)]
pub struct RequestPipeline {
    draft: SharedDraft,
    backend: Arc<dyn ResumeBackend>,
    credential: Credential,
}

impl RequestPipeline {
    pub fn new(draft: SharedDraft, backend: Arc<dyn ResumeBackend>, credential: Credential) -> Self {
        Self {
            draft,
            backend,
            credential,
        }
    }

    /// Reads the identifier at call time, after any completed first save.
    fn bound_id(&self) -> Result<ResumeId, EditorError> {
        self.draft.lock().id().ok_or(EditorError::NotPersisted)
    }

    pub async fn export(&self, format: ExportFormat) -> Result<ExportArtifact, EditorError> {
        let id = self.bound_id()?;
        let title = self.draft.lock().get().title.clone();

        let bytes = self
            .backend
            .export(&self.credential, &id, format)
            .await
            .inspect_err(|e| warn!("Export of {id} as {format} failed: {e}"))?;

        let artifact = ExportArtifact::new(&title, format, bytes);
        info!(
            "Exported {id} as {} ({} bytes)",
            artifact.file_name,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    pub async fn score(&self, job_description: Option<&str>) -> Result<ScoreAssessment, EditorError> {
        let id = self.bound_id()?;
        let job_description = job_description.map(str::trim).filter(|jd| !jd.is_empty());

        let report = self
            .backend
            .score_check(&self.credential, &id, job_description)
            .await
            .inspect_err(|e| warn!("Score check for {id} failed: {e}"))?;

        let assessment = ScoreAssessment::from_report(report);
        info!(
            "Score check for {id}: {} ({})",
            assessment.score,
            assessment.tier.label()
        );
        Ok(assessment)
    }
}
