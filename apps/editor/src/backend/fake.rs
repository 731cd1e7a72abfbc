//! In-memory `ResumeBackend` for tests: records every call, can hold a save
//! response open until released, and can fail the next save on demand.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::backend::{Credential, ExportFormat, ResumeBackend};
use crate::errors::EditorError;
use crate::models::resume::ResumeId;
use crate::models::wire::{AtsReport, ResumePayload, StoredResume};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(ResumePayload),
    Update(ResumeId, ResumePayload),
    Load(ResumeId),
    Export(ResumeId, ExportFormat),
    ScoreCheck(ResumeId, Option<String>),
}

pub(crate) struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    held_saves: Mutex<VecDeque<oneshot::Receiver<()>>>,
    failing_saves: Mutex<VecDeque<EditorError>>,
    created_id: String,
    score: Mutex<f64>,
    record: Mutex<Value>,
}

impl FakeBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            held_saves: Mutex::new(VecDeque::new()),
            failing_saves: Mutex::new(VecDeque::new()),
            created_id: "r1".to_string(),
            score: Mutex::new(85.0),
            record: Mutex::new(json!({ "title": "Loaded" })),
        })
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn save_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create(_) | Call::Update(..)))
            .collect()
    }

    /// The next save blocks after being recorded until the sender fires.
    pub(crate) fn hold_next_save(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_saves.lock().push_back(rx);
        tx
    }

    pub(crate) fn fail_next_save(&self, error: EditorError) {
        self.failing_saves.lock().push_back(error);
    }

    pub(crate) fn set_score(&self, score: f64) {
        *self.score.lock() = score;
    }

    pub(crate) fn set_record(&self, record: Value) {
        *self.record.lock() = record;
    }

    /// Yields to the scheduler until at least `n` calls have been recorded.
    pub(crate) async fn wait_for_calls(&self, n: usize) {
        for _ in 0..10_000 {
            if self.calls.lock().len() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {n} backend calls, saw {:?}", self.calls());
    }

    async fn save(&self, call: Call, id: &str, payload: &ResumePayload) -> Result<StoredResume, EditorError> {
        self.calls.lock().push(call);

        let held = self.held_saves.lock().pop_front();
        if let Some(release) = held {
            let _ = release.await;
        }
        let failure = self.failing_saves.lock().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let mut record = serde_json::to_value(payload).expect("payload serializes");
        record["id"] = json!(id);
        Ok(serde_json::from_value(record).expect("record deserializes"))
    }
}

#[async_trait]
impl ResumeBackend for FakeBackend {
    async fn create(
        &self,
        _credential: &Credential,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError> {
        let id = self.created_id.clone();
        self.save(Call::Create(payload.clone()), &id, payload).await
    }

    async fn update(
        &self,
        _credential: &Credential,
        id: &ResumeId,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError> {
        self.save(Call::Update(id.clone(), payload.clone()), id.as_str(), payload)
            .await
    }

    async fn load(
        &self,
        _credential: &Credential,
        id: &ResumeId,
    ) -> Result<StoredResume, EditorError> {
        self.calls.lock().push(Call::Load(id.clone()));
        let mut record = self.record.lock().clone();
        record["id"] = json!(id.as_str());
        Ok(serde_json::from_value(record).expect("record deserializes"))
    }

    async fn export(
        &self,
        _credential: &Credential,
        id: &ResumeId,
        format: ExportFormat,
    ) -> Result<Bytes, EditorError> {
        self.calls.lock().push(Call::Export(id.clone(), format));
        Ok(Bytes::from(format!("{format} bytes")))
    }

    async fn score_check(
        &self,
        _credential: &Credential,
        id: &ResumeId,
        job_description: Option<&str>,
    ) -> Result<AtsReport, EditorError> {
        self.calls.lock().push(Call::ScoreCheck(
            id.clone(),
            job_description.map(str::to_string),
        ));
        let score = *self.score.lock();
        Ok(serde_json::from_value(json!({ "overall_score": score })).expect("report deserializes"))
    }
}
