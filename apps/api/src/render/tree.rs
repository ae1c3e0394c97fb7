//! Render tree: maps an `AnalyzedRecord` into ordered section cards with
//! per-element entrance delays.
//!
//! Pure and deterministic: the same record always yields the same tree.
//! Sections are emitted in a fixed order and each rendered section takes the
//! next ordinal; sections without data emit nothing and take no ordinal.
//! The first rendered card always starts at delay 0, with no gaps left for
//! missing sections.

use serde::Serialize;

use crate::models::resume::{
    AnalyzedRecord, ContactField, ContactInfo, EducationEntry, ExperienceEntry, NamedLists,
    ProjectEntry, Skills,
};
use crate::render::stagger::{
    heading_delay, item_delay, section_delay, sub_item_delay, StaggerRate, NAME_HEADING_DELAY,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RenderTree {
    pub name: Option<NameHeading>,
    pub sections: Vec<SectionCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameHeading {
    pub text: String,
    pub delay: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Custom,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionCard {
    pub kind: SectionKind,
    pub title: String,
    pub emoji: &'static str,
    pub ordinal: usize,
    pub card_delay: f64,
    pub heading_delay: f64,
    pub rate: StaggerRate,
    pub items: Vec<RenderItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderItem {
    pub delay: f64,
    pub content: ItemContent,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<Chip>,
}

/// A tag-like element nested inside an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chip {
    pub text: String,
    pub delay: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemContent {
    ContactLine {
        field: ContactField,
        label: &'static str,
        value: String,
        href: Option<String>,
    },
    Paragraph {
        text: String,
    },
    Experience(ExperienceEntry),
    Education(EducationEntry),
    SkillChip {
        text: String,
    },
    SkillCategory {
        title: String,
    },
    Project(ProjectEntry),
    ListItem {
        text: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

pub fn build_render_tree(record: &AnalyzedRecord) -> RenderTree {
    let name = record
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| NameHeading {
            text: n.to_string(),
            delay: NAME_HEADING_DELAY,
        });

    let mut sections = Vec::new();
    let mut ordinal = 0;

    // Ordinals depend on which earlier sections rendered, so build in order.
    let builders: [&dyn Fn(usize) -> Option<SectionCard>; 6] = [
        &|i| record.contact_info.as_ref().and_then(|info| contact_card(info, i)),
        &|i| record.summary.as_deref().and_then(|s| summary_card(s, i)),
        &|i| experience_card(&record.experience, i),
        &|i| education_card(&record.education, i),
        &|i| record.skills.as_ref().and_then(|s| skills_card(s, i)),
        &|i| projects_card(&record.projects, i),
    ];
    for build in builders {
        if let Some(card) = build(ordinal) {
            sections.push(card);
            ordinal += 1;
        }
    }

    sections.extend(custom_cards(&record.custom_sections, ordinal));

    RenderTree { name, sections }
}

fn card(
    kind: SectionKind,
    title: impl Into<String>,
    emoji: &'static str,
    ordinal: usize,
    rate: StaggerRate,
    items: Vec<RenderItem>,
) -> SectionCard {
    SectionCard {
        kind,
        title: title.into(),
        emoji,
        ordinal,
        card_delay: section_delay(ordinal),
        heading_delay: heading_delay(ordinal),
        rate,
        items,
    }
}

/// Items at `rate`, one per content element, in order.
fn staggered(
    ordinal: usize,
    rate: StaggerRate,
    contents: impl IntoIterator<Item = ItemContent>,
) -> Vec<RenderItem> {
    contents
        .into_iter()
        .enumerate()
        .map(|(j, content)| RenderItem {
            delay: item_delay(ordinal, j, rate),
            content,
            chips: Vec::new(),
        })
        .collect()
}

fn chips(parent_delay: f64, texts: &[String]) -> Vec<Chip> {
    texts
        .iter()
        .enumerate()
        .map(|(k, text)| Chip {
            text: text.clone(),
            delay: sub_item_delay(parent_delay, k),
        })
        .collect()
}

fn contact_card(info: &ContactInfo, ordinal: usize) -> Option<SectionCard> {
    let fields = info.labeled_fields();
    if fields.is_empty() {
        return None;
    }
    let lines = fields.into_iter().map(|(field, value)| ItemContent::ContactLine {
        field,
        label: field.label(),
        value: value.to_string(),
        href: field.href(value),
    });
    Some(card(
        SectionKind::Contact,
        "Contact Information",
        "📞",
        ordinal,
        StaggerRate::Normal,
        staggered(ordinal, StaggerRate::Normal, lines),
    ))
}

fn summary_card(summary: &str, ordinal: usize) -> Option<SectionCard> {
    if summary.trim().is_empty() {
        return None;
    }
    let paragraph = RenderItem {
        delay: heading_delay(ordinal),
        content: ItemContent::Paragraph {
            text: summary.to_string(),
        },
        chips: Vec::new(),
    };
    Some(card(
        SectionKind::Summary,
        "Summary",
        "📝",
        ordinal,
        StaggerRate::Normal,
        vec![paragraph],
    ))
}

fn experience_card(entries: &[ExperienceEntry], ordinal: usize) -> Option<SectionCard> {
    if entries.is_empty() {
        return None;
    }
    Some(card(
        SectionKind::Experience,
        "Work Experience",
        "💼",
        ordinal,
        StaggerRate::Normal,
        staggered(
            ordinal,
            StaggerRate::Normal,
            entries.iter().cloned().map(ItemContent::Experience),
        ),
    ))
}

fn education_card(entries: &[EducationEntry], ordinal: usize) -> Option<SectionCard> {
    if entries.is_empty() {
        return None;
    }
    Some(card(
        SectionKind::Education,
        "Education",
        "🎓",
        ordinal,
        StaggerRate::Normal,
        staggered(
            ordinal,
            StaggerRate::Normal,
            entries.iter().cloned().map(ItemContent::Education),
        ),
    ))
}

fn skills_card(skills: &Skills, ordinal: usize) -> Option<SectionCard> {
    if skills.is_empty() {
        return None;
    }
    let (rate, items) = match skills {
        Skills::Flat(list) => (StaggerRate::Fast, flat_skill_items(list, ordinal)),
        Skills::Categorized(categories) => {
            (StaggerRate::Normal, categorized_skill_items(categories, ordinal))
        }
    };
    Some(card(SectionKind::Skills, "Skills", "🛠️", ordinal, rate, items))
}

fn flat_skill_items(list: &[String], ordinal: usize) -> Vec<RenderItem> {
    staggered(
        ordinal,
        StaggerRate::Fast,
        list.iter().map(|s| ItemContent::SkillChip { text: s.clone() }),
    )
}

fn categorized_skill_items(categories: &NamedLists, ordinal: usize) -> Vec<RenderItem> {
    categories
        .iter()
        .enumerate()
        .map(|(j, (title, list))| {
            let delay = item_delay(ordinal, j, StaggerRate::Normal);
            RenderItem {
                delay,
                content: ItemContent::SkillCategory {
                    title: title.to_string(),
                },
                chips: chips(delay, list),
            }
        })
        .collect()
}

fn projects_card(entries: &[ProjectEntry], ordinal: usize) -> Option<SectionCard> {
    if entries.is_empty() {
        return None;
    }
    let items = entries
        .iter()
        .enumerate()
        .map(|(j, project)| {
            let delay = item_delay(ordinal, j, StaggerRate::Normal);
            RenderItem {
                delay,
                chips: chips(delay, project.technologies_used.as_deref().unwrap_or_default()),
                content: ItemContent::Project(project.clone()),
            }
        })
        .collect();
    Some(card(
        SectionKind::Projects,
        "Projects",
        "💡",
        ordinal,
        StaggerRate::Normal,
        items,
    ))
}

/// Each custom section takes `base + local`, where `local` counts custom
/// sections only. Empty item lists still render a card.
fn custom_cards(sections: &NamedLists, base: usize) -> Vec<SectionCard> {
    let mut local = 0;
    let mut cards = Vec::with_capacity(sections.0.len());
    for (title, items) in sections.iter() {
        let ordinal = base + local;
        local += 1;
        let list = items
            .iter()
            .map(|text| ItemContent::ListItem { text: text.clone() });
        cards.push(card(
            SectionKind::Custom,
            title,
            "🌟",
            ordinal,
            StaggerRate::Normal,
            staggered(ordinal, StaggerRate::Normal, list),
        ));
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::stagger::{ITEM_STAGGER_FAST, ITEM_STAGGER_NORMAL};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn full_record() -> AnalyzedRecord {
        AnalyzedRecord {
            name: Some("Ada Lovelace".to_string()),
            contact_info: Some(ContactInfo {
                email: Some("ada@example.com".to_string()),
                phone: Some("555-0100".to_string()),
                ..Default::default()
            }),
            summary: Some("Analyst.".to_string()),
            experience: vec![ExperienceEntry {
                job_title: "Engineer".to_string(),
                company: "Analytical Engines".to_string(),
                dates: "1842 - 1843".to_string(),
                responsibilities: vec!["Wrote notes".to_string()],
                ..Default::default()
            }],
            education: vec![],
            skills: Some(Skills::Flat(vec!["Math".to_string(), "Poetry".to_string()])),
            projects: vec![ProjectEntry {
                name: "Note G".to_string(),
                description: "Bernoulli numbers".to_string(),
                technologies_used: Some(vec!["Punch cards".to_string(), "Gears".to_string()]),
                link: None,
            }],
            custom_sections: NamedLists::from(vec![
                ("Awards", vec!["First programmer"]),
                ("Languages", vec!["English", "French"]),
            ]),
        }
    }

    #[test]
    fn test_name_only_renders_no_cards() {
        let record = AnalyzedRecord {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let tree = build_render_tree(&record);
        let name = tree.name.expect("name heading");
        assert_eq!(name.text, "Ada");
        assert!(approx(name.delay, NAME_HEADING_DELAY));
        assert!(tree.sections.is_empty());
    }

    #[test]
    fn test_blank_contact_block_renders_nothing() {
        let record = AnalyzedRecord {
            contact_info: Some(ContactInfo::default()),
            ..Default::default()
        };
        assert!(build_render_tree(&record).sections.is_empty());
    }

    #[test]
    fn test_absent_sections_do_not_consume_ordinals() {
        let tree = build_render_tree(&full_record());
        let kinds: Vec<(SectionKind, usize)> =
            tree.sections.iter().map(|c| (c.kind, c.ordinal)).collect();
        // Education is empty and skipped; everything after it shifts up.
        assert_eq!(
            kinds,
            vec![
                (SectionKind::Contact, 0),
                (SectionKind::Summary, 1),
                (SectionKind::Experience, 2),
                (SectionKind::Skills, 3),
                (SectionKind::Projects, 4),
                (SectionKind::Custom, 5),
                (SectionKind::Custom, 6),
            ]
        );
    }

    #[test]
    fn test_card_and_heading_delays_follow_ordinal() {
        let tree = build_render_tree(&full_record());
        for card in &tree.sections {
            assert!(approx(card.card_delay, 0.15 * card.ordinal as f64));
            assert!(approx(card.heading_delay, 0.15 * card.ordinal as f64 + 0.15));
        }
    }

    #[test]
    fn test_summary_paragraph_appears_with_heading() {
        let tree = build_render_tree(&full_record());
        let summary = &tree.sections[1];
        assert_eq!(summary.kind, SectionKind::Summary);
        assert_eq!(summary.items.len(), 1);
        assert!(approx(summary.items[0].delay, summary.heading_delay));
    }

    #[test]
    fn test_contact_lines_use_normal_rate() {
        let tree = build_render_tree(&full_record());
        let contact = &tree.sections[0];
        assert_eq!(contact.items.len(), 2);
        assert!(approx(contact.items[0].delay, 0.15));
        assert!(approx(contact.items[1].delay, 0.15 + ITEM_STAGGER_NORMAL));
        match &contact.items[0].content {
            ItemContent::ContactLine { href, .. } => {
                assert_eq!(href.as_deref(), Some("mailto:ada@example.com"))
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_flat_skills_never_take_categorized_path() {
        let tree = build_render_tree(&full_record());
        let skills = tree
            .sections
            .iter()
            .find(|c| c.kind == SectionKind::Skills)
            .unwrap();
        assert_eq!(skills.rate, StaggerRate::Fast);
        assert!(skills.items.iter().all(|item| {
            matches!(item.content, ItemContent::SkillChip { .. }) && item.chips.is_empty()
        }));
        assert!(approx(
            skills.items[1].delay,
            skills.heading_delay + ITEM_STAGGER_FAST
        ));
    }

    #[test]
    fn test_categorized_skills_never_take_flat_path() {
        let record = AnalyzedRecord {
            skills: Some(Skills::Categorized(NamedLists::from(vec![
                ("Languages", vec!["Rust", "Go"]),
                ("Tools", vec!["Git"]),
            ]))),
            ..Default::default()
        };
        let tree = build_render_tree(&record);
        let skills = &tree.sections[0];
        assert_eq!(skills.ordinal, 0);
        assert_eq!(skills.rate, StaggerRate::Normal);
        assert!(skills
            .items
            .iter()
            .all(|item| matches!(item.content, ItemContent::SkillCategory { .. })));

        let tools = &skills.items[1];
        assert!(approx(tools.delay, 0.15 + 0.08));
        let languages = &skills.items[0];
        assert!(approx(languages.chips[1].delay, 0.15 + 0.15 + 0.05));
    }

    #[test]
    fn test_project_technologies_are_sub_items() {
        let tree = build_render_tree(&full_record());
        let projects = &tree.sections[4];
        let project = &projects.items[0];
        assert!(approx(project.delay, projects.heading_delay));
        let expected: Vec<f64> = vec![project.delay + 0.15, project.delay + 0.15 + 0.05];
        let actual: Vec<f64> = project.chips.iter().map(|c| c.delay).collect();
        assert!(expected.iter().zip(&actual).all(|(a, b)| approx(*a, *b)));
    }

    #[test]
    fn test_custom_sections_use_base_plus_local_counter() {
        let tree = build_render_tree(&full_record());
        let custom: Vec<&SectionCard> = tree
            .sections
            .iter()
            .filter(|c| c.kind == SectionKind::Custom)
            .collect();
        assert_eq!(custom[0].title, "Awards");
        assert_eq!(custom[1].title, "Languages");
        assert_eq!(custom[1].ordinal, custom[0].ordinal + 1);
        assert!(approx(
            custom[1].items[1].delay,
            heading_delay(custom[1].ordinal) + ITEM_STAGGER_NORMAL
        ));
    }

    #[test]
    fn test_empty_custom_section_still_renders_card() {
        let record = AnalyzedRecord {
            custom_sections: NamedLists::from(vec![("Hobbies", vec![])]),
            ..Default::default()
        };
        let tree = build_render_tree(&record);
        assert_eq!(tree.sections.len(), 1);
        assert!(tree.sections[0].items.is_empty());
    }

    #[test]
    fn test_render_tree_is_deterministic() {
        let record = full_record();
        let a = serde_json::to_value(build_render_tree(&record)).unwrap();
        let b = serde_json::to_value(build_render_tree(&record)).unwrap();
        assert_eq!(a, b);
    }
}
