//! Persistence / export / scoring boundary.
//!
//! The editor core only talks to the résumé service through `ResumeBackend`.
//! `HttpBackend` is the production implementation; tests swap in a fake.

#[cfg(test)]
pub(crate) mod fake;
pub mod http;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::EditorError;
use crate::models::resume::ResumeId;
use crate::models::wire::{AtsReport, ResumePayload, StoredResume};

pub use http::HttpBackend;

/// Opaque bearer credential supplied by the surrounding session.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Png,
}

impl ExportFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The résumé service contract. Every call carries the credential; a
/// rejected credential surfaces as `EditorError::Authorization`.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn create(
        &self,
        credential: &Credential,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError>;

    async fn update(
        &self,
        credential: &Credential,
        id: &ResumeId,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError>;

    async fn load(&self, credential: &Credential, id: &ResumeId)
        -> Result<StoredResume, EditorError>;

    async fn export(
        &self,
        credential: &Credential,
        id: &ResumeId,
        format: ExportFormat,
    ) -> Result<Bytes, EditorError>;

    async fn score_check(
        &self,
        credential: &Credential,
        id: &ResumeId,
        job_description: Option<&str>,
    ) -> Result<AtsReport, EditorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_metadata() {
        assert_eq!(ExportFormat::parse("PDF"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("odt"), None);
        assert_eq!(ExportFormat::Png.content_type(), "image/png");
        assert_eq!(ExportFormat::Docx.extension(), "docx");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::bearer("secret-token");
        assert!(!format!("{credential:?}").contains("secret"));
    }
}
