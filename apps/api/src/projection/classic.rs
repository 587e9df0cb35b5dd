//! Classic: centered serif header, a bulleted contact line and a two-column
//! body where dates sit in a narrow left gutter. Carries no photo.

use crate::models::{Color, ItemField, ResumeDocument, Section, SectionType};
use crate::projection::tree::{Align, BoxStyle, Insets, Region, RenderNode, TextRole, TextStyle};
use crate::projection::{
    contact_fields, heading_text, item_role, non_blank, skill_role, visible_sections,
};

const SUMMARY_HEADING: &str = "Resumo";
const CONTACT_SEPARATOR: &str = "•";

pub fn project(doc: &ResumeDocument) -> RenderNode {
    let mut page = vec![
        header(doc),
        RenderNode::rule(Color::GRAY_800, 2.0),
    ];
    if let Some(summary) = non_blank(&doc.personal_info.summary) {
        page.push(RenderNode::column(
            BoxStyle::default().gap(8.0).region(Region::Summary),
            vec![
                RenderNode::text(
                    TextRole::SummaryHeading,
                    SUMMARY_HEADING,
                    heading_style(),
                ),
                RenderNode::rule(Color::GRAY_300, 1.0),
                RenderNode::text(
                    TextRole::Summary,
                    summary,
                    TextStyle::serif(16.0, Color::GRAY_700).line_height(1.6),
                ),
            ],
        ));
    }
    page.extend(visible_sections(doc).map(section_block));

    RenderNode::column(
        BoxStyle::default()
            .padding(Insets::all(40.0))
            .gap(24.0)
            .background(Color::WHITE),
        page,
    )
}

fn header(doc: &ResumeDocument) -> RenderNode {
    let info = &doc.personal_info;
    let mut lines = vec![RenderNode::text(
        TextRole::Name,
        info.full_name.as_str(),
        TextStyle::serif(36.0, Color::GRAY_900)
            .bold()
            .align(Align::Center)
            .line_height(1.2),
    )];
    if let Some(title) = non_blank(&info.title) {
        lines.push(RenderNode::text(
            TextRole::JobTitle,
            title,
            TextStyle::sans(18.0, Color::GRAY_600).align(Align::Center),
        ));
    }

    let contacts = contact_fields(doc);
    if !contacts.is_empty() {
        let mut inline = Vec::with_capacity(contacts.len() * 2);
        for (i, (kind, value)) in contacts.into_iter().enumerate() {
            if i > 0 {
                inline.push(RenderNode::text(
                    TextRole::Separator,
                    CONTACT_SEPARATOR,
                    TextStyle::sans(14.0, Color::GRAY_400),
                ));
            }
            inline.push(RenderNode::text(
                TextRole::Contact { kind },
                value,
                TextStyle::sans(14.0, Color::GRAY_600),
            ));
        }
        lines.push(RenderNode::wrap(
            BoxStyle::default()
                .gap(8.0)
                .align(Align::Center)
                .region(Region::ContactStrip),
            inline,
        ));
    }

    RenderNode::column(
        BoxStyle::default()
            .gap(8.0)
            .align(Align::Center)
            .region(Region::Header),
        lines,
    )
}

fn heading_style() -> TextStyle {
    TextStyle::serif(18.0, Color::GRAY_800).bold().uppercase()
}

fn section_block(section: &Section) -> RenderNode {
    let body = match section.kind {
        SectionType::Skills => skill_grid(section),
        SectionType::Text | SectionType::List | SectionType::Experience | SectionType::Education => {
            dated_entries(section)
        }
    };
    RenderNode::column(
        BoxStyle::default()
            .gap(8.0)
            .region(Region::Section(section.id.clone())),
        vec![
            RenderNode::text(
                TextRole::SectionHeading {
                    section: section.id.clone(),
                },
                section.title.as_str(),
                heading_style(),
            ),
            RenderNode::rule(Color::GRAY_300, 1.0),
            body,
        ],
    )
}

fn skill_grid(section: &Section) -> RenderNode {
    let cells = section
        .items
        .iter()
        .map(|item| {
            RenderNode::split(
                BoxStyle::default().gap(8.0),
                vec![0.04, 0.96],
                vec![
                    RenderNode::dot(Color::GRAY_400, 8.0),
                    RenderNode::text(
                        skill_role(section, item),
                        item.skill_label(),
                        TextStyle::serif(16.0, Color::GRAY_800),
                    ),
                ],
            )
        })
        .collect();
    RenderNode::grid(BoxStyle::default().gap(8.0), 2, cells)
}

fn dated_entries(section: &Section) -> RenderNode {
    let rows = section
        .items
        .iter()
        .map(|item| {
            let date_column = match item.non_empty(ItemField::Date) {
                Some(date) => vec![RenderNode::text(
                    item_role(section, item, ItemField::Date),
                    date,
                    TextStyle::sans(14.0, Color::GRAY_500).bold(),
                )],
                None => Vec::new(),
            };

            let mut content = vec![
                RenderNode::text(
                    item_role(section, item, ItemField::Title),
                    heading_text(item, ItemField::Title),
                    TextStyle::serif(16.0, Color::GRAY_900).bold(),
                ),
                RenderNode::text(
                    item_role(section, item, ItemField::Subtitle),
                    heading_text(item, ItemField::Subtitle),
                    TextStyle::serif(16.0, Color::GRAY_700).italic(),
                ),
            ];
            if let Some(description) = item.non_empty(ItemField::Description) {
                content.push(RenderNode::text(
                    item_role(section, item, ItemField::Description),
                    description,
                    TextStyle::serif(15.0, Color::GRAY_700).line_height(1.5),
                ));
            }

            RenderNode::split(
                BoxStyle::default().gap(16.0),
                vec![3.0, 9.0],
                vec![
                    RenderNode::column(BoxStyle::default(), date_column),
                    RenderNode::column(BoxStyle::default().gap(2.0), content),
                ],
            )
        })
        .collect();
    RenderNode::column(BoxStyle::default().gap(16.0), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::{PersonalField, Template};

    #[test]
    fn test_contact_line_separates_with_bullets() {
        let doc = default_document(Template::Classic);
        let root = project(&doc);
        let strip = root.find_region(&Region::ContactStrip).unwrap();
        let texts = strip.texts();
        let contacts = texts
            .iter()
            .filter(|t| matches!(t.role, TextRole::Contact { .. }))
            .count();
        let separators = texts
            .iter()
            .filter(|t| t.role == TextRole::Separator)
            .count();
        assert!(contacts > 1);
        assert_eq!(separators, contacts - 1);
    }

    #[test]
    fn test_single_contact_has_no_separator() {
        let doc = default_document(Template::Classic)
            .set_personal_field(PersonalField::Phone, "")
            .set_personal_field(PersonalField::Email, "")
            .set_personal_field(PersonalField::Linkedin, "");
        let root = project(&doc);
        assert!(root.texts().iter().all(|t| t.role != TextRole::Separator));
    }

    #[test]
    fn test_header_is_centered_serif() {
        let root = project(&default_document(Template::Classic));
        let name = root
            .texts()
            .into_iter()
            .find(|t| t.role == TextRole::Name)
            .unwrap();
        assert_eq!(name.style.align, Align::Center);
        assert_eq!(name.style.family, crate::layout::font_metrics::FontFamily::Serif);
    }
}
