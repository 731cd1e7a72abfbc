use crate::models::resume::{CollectionKind, StyleId};
use crate::preview::SectionId;

/// Presentation rules a style applies on top of the shared projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleProfile {
    pub theme: &'static str,
    pub section_order: [SectionId; 6],
    pub uppercase_headings: bool,
    pub show_links: bool,
    /// Skills render as inline tags rather than a list.
    pub skill_tags: bool,
}

const SUMMARY: SectionId = SectionId::Summary;
const EXPERIENCE: SectionId = SectionId::Collection(CollectionKind::Experiences);
const EDUCATION: SectionId = SectionId::Collection(CollectionKind::Education);
const SKILLS: SectionId = SectionId::Collection(CollectionKind::Skills);
const PROJECTS: SectionId = SectionId::Collection(CollectionKind::Projects);
const CERTIFICATIONS: SectionId = SectionId::Collection(CollectionKind::Certifications);

const STANDARD_ORDER: [SectionId; 6] = [
    SUMMARY,
    EXPERIENCE,
    EDUCATION,
    SKILLS,
    PROJECTS,
    CERTIFICATIONS,
];

pub fn profile(style: StyleId) -> StyleProfile {
    match style {
        StyleId::Modern => StyleProfile {
            theme: "modern",
            section_order: STANDARD_ORDER,
            uppercase_headings: false,
            show_links: true,
            skill_tags: true,
        },
        StyleId::Professional => StyleProfile {
            theme: "professional",
            section_order: [
                SUMMARY,
                EXPERIENCE,
                PROJECTS,
                EDUCATION,
                CERTIFICATIONS,
                SKILLS,
            ],
            uppercase_headings: false,
            show_links: true,
            skill_tags: false,
        },
        StyleId::Creative => StyleProfile {
            theme: "creative",
            section_order: [
                SUMMARY,
                SKILLS,
                PROJECTS,
                EXPERIENCE,
                EDUCATION,
                CERTIFICATIONS,
            ],
            uppercase_headings: false,
            show_links: true,
            skill_tags: true,
        },
        // Parsers choke on decoration: plain headings, no links.
        StyleId::Ats => StyleProfile {
            theme: "ats",
            section_order: STANDARD_ORDER,
            uppercase_headings: true,
            show_links: false,
            skill_tags: false,
        },
        StyleId::Dark => StyleProfile {
            theme: "dark",
            section_order: STANDARD_ORDER,
            uppercase_headings: false,
            show_links: true,
            skill_tags: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_style_orders_all_sections_once() {
        for style in StyleId::ALL {
            let order = profile(style).section_order;
            for (i, a) in order.iter().enumerate() {
                for b in &order[i + 1..] {
                    assert_ne!(a, b, "{style:?} repeats a section");
                }
            }
        }
    }

    #[test]
    fn test_ats_profile_hides_links() {
        let ats = profile(StyleId::Ats);
        assert!(!ats.show_links);
        assert!(ats.uppercase_headings);
    }
}
