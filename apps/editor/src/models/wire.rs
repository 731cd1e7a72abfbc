//! Wire shapes exchanged with the résumé service.
//!
//! The service wraps every body in `{ "success": bool, "data": ..., "error": ... }`.
//! Records carry their collections inline; entry order travels as an `order` column.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::resume::{CollectionKind, Document, PersonalField, PersonalInfo, ResumeId};

/// Columns the service adds to stored entries that are not user content.
const BOOKKEEPING_COLUMNS: &[&str] = &[
    "id",
    "resume_id",
    "order",
    "created_at",
    "updated_at",
    "ai_enhanced",
];

// ────────────────────────────────────────────────────────────────────────────
// Envelope
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeData {
    pub resume: StoredResume,
}

// ────────────────────────────────────────────────────────────────────────────
// Outgoing: full document fields
// ────────────────────────────────────────────────────────────────────────────

/// Full document fields sent on Create and Update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumePayload {
    pub title: String,
    pub template_name: String,
    #[serde(flatten)]
    pub personal: PersonalInfo,
    pub experiences: Vec<Map<String, Value>>,
    pub education: Vec<Map<String, Value>>,
    pub skills: Vec<Map<String, Value>>,
    pub projects: Vec<Map<String, Value>>,
    pub certifications: Vec<Map<String, Value>>,
}

impl ResumePayload {
    pub fn from_document(document: &Document) -> Self {
        let rows = |kind: CollectionKind| -> Vec<Map<String, Value>> {
            document
                .collection(kind)
                .iter()
                .enumerate()
                .map(|(position, entry)| {
                    let mut row: Map<String, Value> = entry
                        .fields()
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    row.insert("order".to_string(), Value::from(position));
                    row
                })
                .collect()
        };

        Self {
            title: document.title.clone(),
            template_name: document.style.as_str().to_string(),
            personal: document.personal.clone(),
            experiences: rows(CollectionKind::Experiences),
            education: rows(CollectionKind::Education),
            skills: rows(CollectionKind::Skills),
            projects: rows(CollectionKind::Projects),
            certifications: rows(CollectionKind::Certifications),
        }
    }

    pub fn collection(&self, kind: CollectionKind) -> &[Map<String, Value>] {
        match kind {
            CollectionKind::Experiences => &self.experiences,
            CollectionKind::Education => &self.education,
            CollectionKind::Skills => &self.skills,
            CollectionKind::Projects => &self.projects,
            CollectionKind::Certifications => &self.certifications,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Incoming: stored record
// ────────────────────────────────────────────────────────────────────────────

/// A record as returned by Create, Update and Load.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredResume {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: ResumeId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    experiences: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    education: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    skills: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    projects: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    certifications: Option<Vec<Map<String, Value>>>,
    #[serde(flatten)]
    rest: HashMap<String, Value>,
}

impl StoredResume {
    pub fn personal(&self) -> PersonalInfo {
        let mut info = PersonalInfo::default();
        for field in PersonalField::ALL {
            if let Some(text) = self.rest.get(field.as_str()).and_then(value_to_text) {
                *info.slot_mut(field) = text;
            }
        }
        info
    }

    /// Entry field maps for `kind`, sorted by their `order` column.
    pub fn collection_rows(&self, kind: CollectionKind) -> Vec<BTreeMap<String, String>> {
        let raw = match kind {
            CollectionKind::Experiences => &self.experiences,
            CollectionKind::Education => &self.education,
            CollectionKind::Skills => &self.skills,
            CollectionKind::Projects => &self.projects,
            CollectionKind::Certifications => &self.certifications,
        };
        let mut rows: Vec<(i64, BTreeMap<String, String>)> = raw
            .iter()
            .flatten()
            .map(|row| {
                let order = row.get("order").and_then(Value::as_i64).unwrap_or(0);
                (order, entry_fields(row))
            })
            .collect();
        // stable: equal orders keep service order
        rows.sort_by_key(|(order, _)| *order);
        rows.into_iter().map(|(_, fields)| fields).collect()
    }
}

fn entry_fields(row: &Map<String, Value>) -> BTreeMap<String, String> {
    row.iter()
        .filter(|(k, _)| !BOOKKEEPING_COLUMNS.contains(&k.as_str()))
        .filter_map(|(k, v)| value_to_text(v).map(|text| (k.clone(), text)))
        .collect()
}

/// Scalars become text; nulls and nested values are dropped.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<ResumeId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => ResumeId::new(n.to_string()),
        RawId::Text(s) => ResumeId::new(s),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// ATS check
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AtsCheckRequest<'a> {
    pub resume_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Report returned by ScoreCheck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub overall_score: f64,
    #[serde(default)]
    pub section_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<AtsSuggestion>,
    #[serde(default)]
    pub formatting_issues: Vec<FormattingIssue>,
}
