// Template Projection: pure mapping from a document to a render tree.
// One module per template; each dispatches section bodies with an exhaustive
// match over SectionType.

pub mod classic;
pub mod minimal;
pub mod modern;
pub mod tree;

use crate::models::{ItemField, ResumeDocument, Section, SectionItem, Template};

pub use tree::{
    Align, BoxStyle, ContactKind, Insets, NodeKind, Region, RenderNode, RenderTree, TextNode,
    TextRole, TextStyle,
};

/// Projects the document into the layout of its selected template.
pub fn project(doc: &ResumeDocument) -> RenderTree {
    let root = match doc.template {
        Template::Modern => modern::project(doc),
        Template::Classic => classic::project(doc),
        Template::Minimal => minimal::project(doc),
    };
    RenderTree {
        template: doc.template,
        root,
    }
}

/// Sections that take part in projection, in document order. Hidden sections
/// are skipped by every template.
pub(crate) fn visible_sections(doc: &ResumeDocument) -> impl Iterator<Item = &Section> {
    doc.sections.iter().filter(|s| s.is_visible)
}

pub(crate) fn item_role(section: &Section, item: &SectionItem, field: ItemField) -> TextRole {
    TextRole::ItemField {
        section: section.id.clone(),
        item: item.id.clone(),
        field,
    }
}

pub(crate) fn skill_role(section: &Section, item: &SectionItem) -> TextRole {
    TextRole::Skill {
        section: section.id.clone(),
        item: item.id.clone(),
    }
}

/// Heading lines always render; a missing title or subtitle becomes an empty line.
pub(crate) fn heading_text(item: &SectionItem, field: ItemField) -> &str {
    item.field(field).unwrap_or("")
}

/// Contact fields in display order, skipping the empty ones.
pub(crate) fn contact_fields(doc: &ResumeDocument) -> Vec<(ContactKind, &str)> {
    let info = &doc.personal_info;
    [
        (ContactKind::Address, info.address.as_str()),
        (ContactKind::Phone, info.phone.as_str()),
        (ContactKind::Email, info.email.as_str()),
        (
            ContactKind::Linkedin,
            info.linkedin.as_deref().unwrap_or(""),
        ),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .collect()
}

pub(crate) fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::DropEvent;
    use crate::models::defaults::default_document;
    use crate::models::{ItemId, SectionId, SectionPatch, SectionType};

    const TEMPLATES: [Template; 3] = [Template::Modern, Template::Classic, Template::Minimal];

    /// A document that exercises every section type, blank fields and a hidden section.
    fn rich_document(template: Template) -> ResumeDocument {
        let mut doc = default_document(template);
        let (next, exp_id) = doc.add_section();
        doc = next.patch_section(
            &exp_id,
            &SectionPatch {
                title: Some("Experiência".into()),
                ..Default::default()
            },
        );
        let (next, item) = doc.add_item(&exp_id);
        let item = item.unwrap();
        doc = next
            .update_item(&exp_id, &item, ItemField::Title, "Padaria Central")
            .update_item(&exp_id, &item, ItemField::Subtitle, "Atendente")
            .update_item(&exp_id, &item, ItemField::Date, "2024 - 2025")
            .update_item(&exp_id, &item, ItemField::Description, "Atendimento ao cliente.");
        let (next, empty_section) = doc.add_section();
        doc = next.patch_section(
            &empty_section,
            &SectionPatch {
                title: Some("Projetos".into()),
                kind: Some(SectionType::List),
                ..Default::default()
            },
        );
        let (next, hidden) = doc.add_section();
        next.patch_section(
            &hidden,
            &SectionPatch {
                title: Some("Oculta".into()),
                is_visible: Some(false),
                ..Default::default()
            },
        )
    }

    fn heading_counts(tree: &RenderTree) -> HashMap<SectionId, usize> {
        let mut counts = HashMap::new();
        for id in tree.section_heading_order() {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_project_records_template() {
        for template in TEMPLATES {
            let tree = project(&default_document(template));
            assert_eq!(tree.template, template);
        }
    }

    #[test]
    fn test_every_visible_section_heading_exactly_once() {
        for template in TEMPLATES {
            let doc = rich_document(template);
            let tree = project(&doc);
            let counts = heading_counts(&tree);
            for section in &doc.sections {
                let expected = usize::from(section.is_visible);
                assert_eq!(
                    counts.get(&section.id).copied().unwrap_or(0),
                    expected,
                    "{template}: section {}",
                    section.title
                );
            }
            let heading_texts: Vec<_> = tree
                .texts()
                .into_iter()
                .filter(|t| matches!(t.role, TextRole::SectionHeading { .. }))
                .map(|t| t.text.clone())
                .collect();
            assert!(heading_texts.contains(&"Projetos".to_string()), "{template}: empty section keeps heading");
            assert!(!heading_texts.contains(&"Oculta".to_string()), "{template}: hidden section skipped");
        }
    }

    #[test]
    fn test_every_non_empty_item_field_exactly_once() {
        for template in TEMPLATES {
            let doc = rich_document(template);
            let tree = project(&doc);
            let texts = tree.texts();
            for section in doc.sections.iter().filter(|s| s.is_visible) {
                for item in &section.items {
                    if section.kind.is_skills() {
                        let hits: Vec<_> = texts
                            .iter()
                            .filter(|t| t.role == skill_role(section, item))
                            .collect();
                        assert_eq!(hits.len(), 1, "{template}: skill {}", item.id);
                        assert_eq!(hits[0].text, item.skill_label());
                        continue;
                    }
                    for field in [
                        ItemField::Title,
                        ItemField::Subtitle,
                        ItemField::Date,
                        ItemField::Description,
                    ] {
                        let hits: Vec<_> = texts
                            .iter()
                            .filter(|t| t.role == item_role(section, item, field))
                            .collect();
                        let expected = match field {
                            ItemField::Title | ItemField::Subtitle => 1,
                            ItemField::Date | ItemField::Description => {
                                usize::from(item.non_empty(field).is_some())
                            }
                        };
                        assert_eq!(
                            hits.len(),
                            expected,
                            "{template}: section {} item {} field {field:?}",
                            section.id,
                            item.id
                        );
                        if let Some(hit) = hits.first() {
                            assert_eq!(hit.text, heading_text(item, field));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_title_renders_as_empty_line() {
        for template in TEMPLATES {
            let doc = default_document(template);
            let tree = project(&doc);
            let section = doc.section(&SectionId::new("obj")).unwrap();
            let item = &section.items[0];
            let title = tree
                .texts()
                .into_iter()
                .find(|t| t.role == item_role(section, item, ItemField::Title))
                .map(|t| t.text.clone());
            assert_eq!(title.as_deref(), Some(""), "{template}");
        }
    }

    #[test]
    fn test_skills_items_never_show_both_fields() {
        let mut doc = default_document(Template::Classic);
        let sid = SectionId::new("qual");
        let item = ItemId::new("1");
        doc = doc.update_item(&sid, &item, ItemField::Title, "Trabalho em equipe");
        let tree = project(&doc);
        let all: Vec<String> = tree.texts().iter().map(|t| t.text.clone()).collect();
        assert!(all.contains(&"Facilidade em trabalhar em equipe".to_string()));
        assert!(!all.contains(&"Trabalho em equipe".to_string()));
    }

    #[test]
    fn test_minimal_routes_skills_to_side_panel_only() {
        let doc = rich_document(Template::Minimal);
        let tree = project(&doc);
        let side = tree.find_region(&Region::SidePanel).expect("side panel");
        let main = tree.find_region(&Region::MainPanel).expect("main panel");

        let headings = |node: &RenderNode| -> Vec<SectionId> {
            node.texts()
                .into_iter()
                .filter_map(|t| match &t.role {
                    TextRole::SectionHeading { section } => Some(section.clone()),
                    _ => None,
                })
                .collect()
        };
        let side_ids = headings(side);
        let main_ids = headings(main);

        let skills: Vec<SectionId> = visible_sections(&doc)
            .filter(|s| s.kind.is_skills())
            .map(|s| s.id.clone())
            .collect();
        let others: Vec<SectionId> = visible_sections(&doc)
            .filter(|s| !s.kind.is_skills())
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(side_ids, skills);
        assert_eq!(main_ids, others);
    }

    #[test]
    fn test_modern_heading_rules_use_primary_color() {
        let doc = default_document(Template::Modern).set_primary_color(crate::models::Color::BLUE_600);
        let tree = project(&doc);
        let section = tree
            .find_region(&Region::Section(SectionId::new("edu")))
            .unwrap();
        let mut rule_colors = Vec::new();
        section.walk(&mut |node| {
            if let NodeKind::Rule(rule) = &node.kind {
                rule_colors.push(rule.color);
            }
        });
        assert_eq!(rule_colors, vec![crate::models::Color::BLUE_600]);
    }

    #[test]
    fn test_new_section_moved_first_heads_modern_body() {
        let doc = default_document(Template::Modern);
        let (doc, new_id) = doc.add_section();
        let (doc, _) = doc.add_item(&new_id);
        let last = doc.sections.len() - 1;
        let doc = doc.move_section(DropEvent::new(last, Some(0)));
        let tree = project(&doc);

        let texts = tree.texts();
        let summary_pos = texts
            .iter()
            .position(|t| t.role == TextRole::Summary)
            .expect("summary rendered");
        let first_heading_after = texts[summary_pos..]
            .iter()
            .find_map(|t| match &t.role {
                TextRole::SectionHeading { section } => Some(section.clone()),
                _ => None,
            });
        assert_eq!(first_heading_after, Some(new_id));
    }

    #[test]
    fn test_empty_summary_is_omitted() {
        for template in TEMPLATES {
            let doc = default_document(template)
                .set_personal_field(crate::models::PersonalField::Summary, "");
            let tree = project(&doc);
            assert!(tree
                .texts()
                .iter()
                .all(|t| t.role != TextRole::Summary && t.role != TextRole::SummaryHeading));
        }
    }

    #[test]
    fn test_photo_rendered_once_when_present_except_classic() {
        for template in TEMPLATES {
            let tree = project(&default_document(template));
            let mut photos = 0;
            tree.root.walk(&mut |n| {
                if matches!(n.kind, NodeKind::Photo(_)) {
                    photos += 1;
                }
            });
            let expected = usize::from(template != Template::Classic);
            assert_eq!(photos, expected, "{template}");

            let without = default_document(template).set_photo(None);
            let mut photos = 0;
            project(&without).root.walk(&mut |n| {
                if matches!(n.kind, NodeKind::Photo(_)) {
                    photos += 1;
                }
            });
            assert_eq!(photos, 0, "{template}");
        }
    }
}
