//! Preview renderer: pure projection from a draft snapshot to a display tree.
//!
//! `render` has no side effects and is deterministic: the same snapshot and
//! style always produce the same tree. Sections without data are omitted
//! entirely; a blank summary or an empty collection never yields a heading.

pub mod markup;
pub mod styles;

use serde::{Serialize, Serializer};

use crate::models::resume::{CollectionKind, Document, Entry, EntryKey, StyleId};

// ────────────────────────────────────────────────────────────────────────────
// Display tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Summary,
    Collection(CollectionKind),
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Summary => "summary",
            SectionId::Collection(kind) => kind.as_str(),
        }
    }
}

impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub contact: Vec<String>,
    pub links: Vec<String>,
}

/// One rendered collection entry. `position` is valid for this render only;
/// `key` is the handle the view should send back with edit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub key: EntryKey,
    pub position: usize,
    pub title: String,
    pub subtitle: String,
    pub meta: String,
    pub body: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SectionBody {
    Text(String),
    Items(Vec<Item>),
    Tags(Vec<Item>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub id: SectionId,
    pub heading: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTree {
    pub style: StyleId,
    pub theme: &'static str,
    pub title: String,
    pub header: Header,
    pub sections: Vec<Section>,
    /// 0–100 completeness indicator.
    pub completeness: u8,
}

impl DisplayTree {
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Projection
// ────────────────────────────────────────────────────────────────────────────

pub fn render(document: &Document, style: StyleId) -> DisplayTree {
    let profile = styles::profile(style);

    let sections = profile
        .section_order
        .iter()
        .filter_map(|id| render_section(document, *id, &profile))
        .collect();

    DisplayTree {
        style,
        theme: profile.theme,
        title: document.title.clone(),
        header: render_header(document, profile.show_links),
        sections,
        completeness: completeness(document),
    }
}

fn render_header(document: &Document, show_links: bool) -> Header {
    let p = &document.personal;
    let location = join_nonblank(&[p.city.as_str(), p.country.as_str()], ", ");
    let location = if location.is_empty() {
        p.address.trim().to_string()
    } else {
        location
    };

    let contact = non_blank(&[p.email.as_str(), p.phone.as_str(), location.as_str()]);
    let links = if show_links {
        non_blank(&[
            p.linkedin.as_str(),
            p.github.as_str(),
            p.portfolio.as_str(),
            p.website.as_str(),
        ])
    } else {
        Vec::new()
    };

    Header {
        name: p.full_name.trim().to_string(),
        contact,
        links,
    }
}

fn render_section(
    document: &Document,
    id: SectionId,
    profile: &styles::StyleProfile,
) -> Option<Section> {
    let (heading, body) = match id {
        SectionId::Summary => {
            let summary = document.personal.summary.trim();
            if summary.is_empty() {
                return None;
            }
            ("Professional Summary", SectionBody::Text(summary.to_string()))
        }
        SectionId::Collection(kind) => {
            let list = document.collection(kind);
            if list.is_empty() {
                return None;
            }
            let items: Vec<Item> = list
                .iter()
                .enumerate()
                .map(|(position, entry)| render_item(kind, position, entry, profile.show_links))
                .collect();
            let body = if kind == CollectionKind::Skills && profile.skill_tags {
                SectionBody::Tags(items)
            } else {
                SectionBody::Items(items)
            };
            (kind.heading(), body)
        }
    };

    let heading = if profile.uppercase_headings {
        heading.to_uppercase()
    } else {
        heading.to_string()
    };
    Some(Section { id, heading, body })
}

fn render_item(kind: CollectionKind, position: usize, entry: &Entry, show_links: bool) -> Item {
    let f = |name: &str| entry.get(name).trim();
    let dates = date_range(f("start_date"), f("end_date"), f("is_current"));

    let (title, subtitle, meta, body, link) = match kind {
        CollectionKind::Experiences => (
            f("position").to_string(),
            join_nonblank(&[f("company"), f("location")], " · "),
            dates,
            f("description").to_string(),
            String::new(),
        ),
        CollectionKind::Education => {
            let degree = match (f("degree"), f("field_of_study")) {
                (d, "") => d.to_string(),
                ("", field) => field.to_string(),
                (d, field) => format!("{d} in {field}"),
            };
            let gpa = if f("gpa").is_empty() {
                String::new()
            } else {
                format!("GPA: {}", f("gpa"))
            };
            (
                degree,
                join_nonblank(&[f("institution"), f("location")], " · "),
                join_nonblank(&[dates.as_str(), gpa.as_str()], " · "),
                f("description").to_string(),
                String::new(),
            )
        }
        CollectionKind::Skills => {
            let years = if f("years_of_experience").is_empty() {
                String::new()
            } else {
                format!("{} yrs", f("years_of_experience"))
            };
            (
                f("name").to_string(),
                join_nonblank(&[f("category"), f("level")], " · "),
                years,
                String::new(),
                String::new(),
            )
        }
        CollectionKind::Projects => (
            f("name").to_string(),
            f("technologies").to_string(),
            dates,
            f("description").to_string(),
            first_nonblank(&[f("link"), f("github_link")]),
        ),
        CollectionKind::Certifications => {
            let issued = join_nonblank(&[f("issue_date"), f("expiry_date")], " – ");
            let credential = if f("credential_id").is_empty() {
                String::new()
            } else {
                format!("Credential ID: {}", f("credential_id"))
            };
            (
                f("name").to_string(),
                f("issuing_organization").to_string(),
                issued,
                credential,
                f("credential_url").to_string(),
            )
        }
    };

    Item {
        key: entry.key(),
        position,
        title,
        subtitle,
        meta,
        body,
        link: if show_links { link } else { String::new() },
    }
}

fn date_range(start: &str, end: &str, is_current: &str) -> String {
    let current = matches!(is_current, "true" | "1" | "yes");
    let end = if current { "Present" } else { end };
    join_nonblank(&[start, end], " – ")
}

/// Completeness as the service computes it: five points, six ways to earn one.
fn completeness(document: &Document) -> u8 {
    let p = &document.personal;
    let filled = [&p.full_name, &p.email, &p.summary]
        .iter()
        .filter(|v| !v.trim().is_empty())
        .count()
        + [
            CollectionKind::Experiences,
            CollectionKind::Education,
            CollectionKind::Skills,
        ]
        .iter()
        .filter(|kind| !document.collection(**kind).is_empty())
        .count();
    (filled * 100 / 5).min(100) as u8
}

fn non_blank(values: &[&str]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_nonblank(values: &[&str], sep: &str) -> String {
    non_blank(values).join(sep)
}

fn first_nonblank(values: &[&str]) -> String {
    non_blank(values).into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftStore;
    use crate::models::resume::{FieldPath, PersonalField};
    use std::collections::BTreeMap;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> DraftStore {
        let mut store = DraftStore::new_draft("Backend CV", StyleId::Modern);
        store.mutate_field(FieldPath::Personal(PersonalField::FullName), "Ada Lovelace");
        store.mutate_field(FieldPath::Personal(PersonalField::Email), "ada@example.com");
        store.mutate_field(
            FieldPath::Personal(PersonalField::Github),
            "github.com/ada",
        );
        store
            .append(
                CollectionKind::Experiences,
                fields(&[
                    ("position", "Engineer"),
                    ("company", "Acme"),
                    ("start_date", "2020"),
                    ("is_current", "true"),
                ]),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = sample();
        let doc = store.get();
        assert_eq!(render(&doc, StyleId::Modern), render(&doc, StyleId::Modern));
        assert_eq!(
            markup::to_html(&render(&doc, StyleId::Creative)),
            markup::to_html(&render(&doc, StyleId::Creative))
        );
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let store = sample();
        let tree = render(&store.get(), StyleId::Modern);

        assert!(tree.section(SectionId::Summary).is_none());
        assert!(tree
            .section(SectionId::Collection(CollectionKind::Skills))
            .is_none());
        assert_eq!(tree.sections.len(), 1);
    }

    #[test]
    fn test_blank_summary_is_omitted() {
        let mut store = sample();
        store.mutate_field(FieldPath::Personal(PersonalField::Summary), "   ");
        let tree = render(&store.get(), StyleId::Modern);
        assert!(tree.section(SectionId::Summary).is_none());
    }

    #[test]
    fn test_experience_item_projection() {
        let store = sample();
        let tree = render(&store.get(), StyleId::Modern);
        let section = tree
            .section(SectionId::Collection(CollectionKind::Experiences))
            .unwrap();

        let SectionBody::Items(items) = &section.body else {
            panic!("experience should render as items");
        };
        assert_eq!(items[0].title, "Engineer");
        assert_eq!(items[0].subtitle, "Acme");
        assert_eq!(items[0].meta, "2020 – Present");
        assert_eq!(items[0].position, 0);
    }

    #[test]
    fn test_blank_entry_still_renders_blank_row() {
        let mut store = DraftStore::new_draft("CV", StyleId::Modern);
        store.append(CollectionKind::Projects, BTreeMap::new()).unwrap();
        let tree = render(&store.get(), StyleId::Modern);
        let section = tree
            .section(SectionId::Collection(CollectionKind::Projects))
            .unwrap();
        let SectionBody::Items(items) = &section.body else {
            panic!("projects should render as items");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "");
    }

    #[test]
    fn test_ats_style_uppercases_and_drops_links() {
        let store = sample();
        let tree = render(&store.get(), StyleId::Ats);
        assert!(tree.header.links.is_empty());
        assert_eq!(tree.sections[0].heading, "EXPERIENCE");

        let modern = render(&store.get(), StyleId::Modern);
        assert_eq!(modern.header.links, vec!["github.com/ada".to_string()]);
    }

    #[test]
    fn test_creative_style_puts_skills_first() {
        let mut store = sample();
        store
            .append(CollectionKind::Skills, fields(&[("name", "Rust")]))
            .unwrap();
        let tree = render(&store.get(), StyleId::Creative);
        assert_eq!(
            tree.sections[0].id,
            SectionId::Collection(CollectionKind::Skills)
        );
        assert!(matches!(tree.sections[0].body, SectionBody::Tags(_)));
    }

    #[test]
    fn test_completeness_caps_at_100() {
        let mut store = sample();
        assert_eq!(render(&store.get(), StyleId::Modern).completeness, 60);

        store.mutate_field(FieldPath::Personal(PersonalField::Summary), "Builder.");
        store
            .append(CollectionKind::Education, fields(&[("degree", "BSc")]))
            .unwrap();
        store
            .append(CollectionKind::Skills, fields(&[("name", "Rust")]))
            .unwrap();
        assert_eq!(render(&store.get(), StyleId::Modern).completeness, 100);
    }
}
