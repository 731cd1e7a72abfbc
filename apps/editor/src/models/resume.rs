use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

/// Durable identifier assigned by the persistence service on first create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeId(String);

impl ResumeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResumeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Client-side stable handle for a collection entry.
///
/// Keys are allocated by the draft store and never reused within a session.
/// They are never sent to the persistence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryKey(u64);

impl EntryKey {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleId {
    #[default]
    Modern,
    Professional,
    Creative,
    Ats,
    Dark,
}

impl StyleId {
    pub const ALL: [StyleId; 5] = [
        StyleId::Modern,
        StyleId::Professional,
        StyleId::Creative,
        StyleId::Ats,
        StyleId::Dark,
    ];

    /// Resolves a template name. Unknown names fall back to `Modern`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "professional" => StyleId::Professional,
            "creative" => StyleId::Creative,
            "ats" => StyleId::Ats,
            "dark" => StyleId::Dark,
            _ => StyleId::Modern,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleId::Modern => "modern",
            StyleId::Professional => "professional",
            StyleId::Creative => "creative",
            StyleId::Ats => "ats",
            StyleId::Dark => "dark",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Personal fields
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Address,
    City,
    Country,
    Linkedin,
    Github,
    Portfolio,
    Website,
    AvatarUrl,
    Summary,
}

impl PersonalField {
    pub const ALL: [PersonalField; 12] = [
        PersonalField::FullName,
        PersonalField::Email,
        PersonalField::Phone,
        PersonalField::Address,
        PersonalField::City,
        PersonalField::Country,
        PersonalField::Linkedin,
        PersonalField::Github,
        PersonalField::Portfolio,
        PersonalField::Website,
        PersonalField::AvatarUrl,
        PersonalField::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalField::FullName => "full_name",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::Address => "address",
            PersonalField::City => "city",
            PersonalField::Country => "country",
            PersonalField::Linkedin => "linkedin",
            PersonalField::Github => "github",
            PersonalField::Portfolio => "portfolio",
            PersonalField::Website => "website",
            PersonalField::AvatarUrl => "avatar_url",
            PersonalField::Summary => "summary",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Scalar personal fields. All values are free text; blank is legal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub website: String,
    pub avatar_url: String,
    pub summary: String,
}

impl PersonalInfo {
    pub fn get(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::FullName => &self.full_name,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::Address => &self.address,
            PersonalField::City => &self.city,
            PersonalField::Country => &self.country,
            PersonalField::Linkedin => &self.linkedin,
            PersonalField::Github => &self.github,
            PersonalField::Portfolio => &self.portfolio,
            PersonalField::Website => &self.website,
            PersonalField::AvatarUrl => &self.avatar_url,
            PersonalField::Summary => &self.summary,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: PersonalField) -> &mut String {
        match field {
            PersonalField::FullName => &mut self.full_name,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::Address => &mut self.address,
            PersonalField::City => &mut self.city,
            PersonalField::Country => &mut self.country,
            PersonalField::Linkedin => &mut self.linkedin,
            PersonalField::Github => &mut self.github,
            PersonalField::Portfolio => &mut self.portfolio,
            PersonalField::Website => &mut self.website,
            PersonalField::AvatarUrl => &mut self.avatar_url,
            PersonalField::Summary => &mut self.summary,
        }
    }
}

/// Scalar paths accepted by `DraftStore::mutate_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Title,
    Style,
    Personal(PersonalField),
}

impl FieldPath {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(FieldPath::Title),
            "style" | "template" | "template_name" => Some(FieldPath::Style),
            other => PersonalField::parse(other).map(FieldPath::Personal),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Experiences,
    Education,
    Skills,
    Projects,
    Certifications,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Experiences,
        CollectionKind::Education,
        CollectionKind::Skills,
        CollectionKind::Projects,
        CollectionKind::Certifications,
    ];

    /// The key under which the persistence service stores this collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Experiences => "experiences",
            CollectionKind::Education => "education",
            CollectionKind::Skills => "skills",
            CollectionKind::Projects => "projects",
            CollectionKind::Certifications => "certifications",
        }
    }

    /// Accepts both plural and singular spellings.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "experiences" | "experience" => Some(CollectionKind::Experiences),
            "education" | "educations" => Some(CollectionKind::Education),
            "skills" | "skill" => Some(CollectionKind::Skills),
            "projects" | "project" => Some(CollectionKind::Projects),
            "certifications" | "certification" => Some(CollectionKind::Certifications),
            _ => None,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            CollectionKind::Experiences => "Experience",
            CollectionKind::Education => "Education",
            CollectionKind::Skills => "Skills",
            CollectionKind::Projects => "Projects",
            CollectionKind::Certifications => "Certifications",
        }
    }

    /// Field names a freshly appended entry starts with.
    pub fn default_fields(&self) -> &'static [&'static str] {
        match self {
            CollectionKind::Experiences => &[
                "company",
                "position",
                "location",
                "start_date",
                "end_date",
                "is_current",
                "description",
            ],
            CollectionKind::Education => &[
                "institution",
                "degree",
                "field_of_study",
                "location",
                "start_date",
                "end_date",
                "gpa",
                "description",
            ],
            CollectionKind::Skills => &["name", "category", "level", "years_of_experience"],
            CollectionKind::Projects => &[
                "name",
                "description",
                "technologies",
                "link",
                "github_link",
                "start_date",
                "end_date",
            ],
            CollectionKind::Certifications => &[
                "name",
                "issuing_organization",
                "issue_date",
                "expiry_date",
                "credential_id",
                "credential_url",
            ],
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collection element: named free-text fields plus its stable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: EntryKey,
    fields: BTreeMap<String, String>,
}

impl Entry {
    pub(crate) fn new(key: EntryKey, fields: BTreeMap<String, String>) -> Self {
        Self { key, fields }
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Missing fields read as blank.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub(crate) fn set(&mut self, field: &str, value: String) {
        self.fields.insert(field.to_string(), value);
    }
}

/// Ordered, densely indexed entries with a key → position lookup table.
///
/// The lookup table is rebuilt on every structural change so that a key
/// always resolves to the entry's current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryList {
    entries: Vec<Entry>,
    positions: HashMap<EntryKey, usize>,
}

impl EntryList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    pub(crate) fn push(&mut self, entry: Entry) -> usize {
        let position = self.entries.len();
        self.positions.insert(entry.key(), position);
        self.entries.push(entry);
        position
    }

    pub(crate) fn remove(&mut self, index: usize) -> Entry {
        let removed = self.entries.remove(index);
        self.reindex();
        removed
    }

    fn reindex(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.key(), position))
            .collect();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_TITLE: &str = "My Resume";

/// The résumé draft held in memory for one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) id: Option<ResumeId>,
    pub title: String,
    pub style: StyleId,
    pub personal: PersonalInfo,
    pub(crate) experiences: EntryList,
    pub(crate) education: EntryList,
    pub(crate) skills: EntryList,
    pub(crate) projects: EntryList,
    pub(crate) certifications: EntryList,
}

impl Document {
    pub fn new(title: impl Into<String>, style: StyleId) -> Self {
        Self {
            id: None,
            title: title.into(),
            style,
            personal: PersonalInfo::default(),
            experiences: EntryList::default(),
            education: EntryList::default(),
            skills: EntryList::default(),
            projects: EntryList::default(),
            certifications: EntryList::default(),
        }
    }

    pub fn id(&self) -> Option<&ResumeId> {
        self.id.as_ref()
    }

    pub fn collection(&self, kind: CollectionKind) -> &EntryList {
        match kind {
            CollectionKind::Experiences => &self.experiences,
            CollectionKind::Education => &self.education,
            CollectionKind::Skills => &self.skills,
            CollectionKind::Projects => &self.projects,
            CollectionKind::Certifications => &self.certifications,
        }
    }

    pub(crate) fn collection_mut(&mut self, kind: CollectionKind) -> &mut EntryList {
        match kind {
            CollectionKind::Experiences => &mut self.experiences,
            CollectionKind::Education => &mut self.education,
            CollectionKind::Skills => &mut self.skills,
            CollectionKind::Projects => &mut self.projects,
            CollectionKind::Certifications => &mut self.certifications,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, StyleId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(raw: u64, name: &str) -> Entry {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), name.to_string());
        Entry::new(EntryKey::from_raw(raw), fields)
    }

    #[test]
    fn test_unknown_style_falls_back_to_modern() {
        assert_eq!(StyleId::from_name("Dark"), StyleId::Dark);
        assert_eq!(StyleId::from_name("neon"), StyleId::Modern);
    }

    #[test]
    fn test_collection_kind_accepts_singular() {
        assert_eq!(
            CollectionKind::parse("experience"),
            Some(CollectionKind::Experiences)
        );
        assert_eq!(CollectionKind::parse("Skills"), Some(CollectionKind::Skills));
        assert_eq!(CollectionKind::parse("hobbies"), None);
    }

    #[test]
    fn test_field_path_parse() {
        assert_eq!(FieldPath::parse("title"), Some(FieldPath::Title));
        assert_eq!(
            FieldPath::parse("full_name"),
            Some(FieldPath::Personal(PersonalField::FullName))
        );
        assert_eq!(FieldPath::parse("nickname"), None);
    }

    #[test]
    fn test_entry_list_reindexes_after_remove() {
        let mut list = EntryList::default();
        list.push(entry(1, "a"));
        list.push(entry(2, "b"));
        list.push(entry(3, "c"));

        list.remove(0);

        assert_eq!(list.len(), 2);
        assert_eq!(list.position_of(EntryKey::from_raw(1)), None);
        assert_eq!(list.position_of(EntryKey::from_raw(2)), Some(0));
        assert_eq!(list.position_of(EntryKey::from_raw(3)), Some(1));
    }

    #[test]
    fn test_missing_entry_field_reads_blank() {
        let e = entry(1, "Rust");
        assert_eq!(e.get("name"), "Rust");
        assert_eq!(e.get("level"), "");
    }
}
