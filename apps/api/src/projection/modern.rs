//! Modern: dark full-width header with name and photo, a light contact strip,
//! then every section stacked in a single column under accent-colored rules.

use crate::models::{Color, ItemField, ResumeDocument, Section, SectionType};
use crate::projection::tree::{Align, BoxStyle, Insets, Region, RenderNode, TextRole, TextStyle};
use crate::projection::{
    contact_fields, heading_text, item_role, non_blank, skill_role, visible_sections,
};

const NAME_FALLBACK: &str = "Seu Nome";
const SUMMARY_HEADING: &str = "Sobre Mim";
const PHOTO_SIZE: f32 = 128.0;
/// Vertical space between body blocks. Keeps the sample document on one A4 page.
const SECTION_GAP: f32 = 24.0;

pub fn project(doc: &ResumeDocument) -> RenderNode {
    let mut page = vec![header(doc)];
    let contacts = contact_strip(doc);
    if let Some(strip) = contacts {
        page.push(strip);
        page.push(RenderNode::rule(Color::GRAY_300, 1.0));
    }
    page.push(body(doc));
    RenderNode::column(BoxStyle::default().background(Color::WHITE), page)
}

fn header(doc: &ResumeDocument) -> RenderNode {
    let info = &doc.personal_info;
    let name = non_blank(&info.full_name).unwrap_or(NAME_FALLBACK);

    let mut identity = vec![RenderNode::text(
        TextRole::Name,
        name,
        TextStyle::sans(36.0, Color::WHITE)
            .bold()
            .uppercase()
            .line_height(1.1),
    )];
    if let Some(title) = non_blank(&info.title) {
        identity.push(RenderNode::text(
            TextRole::JobTitle,
            title,
            TextStyle::sans(20.0, Color::GRAY_300).uppercase(),
        ));
    }

    let photo = match &info.photo {
        Some(photo) => vec![RenderNode::photo(
            photo.clone(),
            PHOTO_SIZE,
            Some((Color::WHITE, 4.0)),
        )],
        None => Vec::new(),
    };

    RenderNode::column(
        BoxStyle::default()
            .padding(Insets::all(32.0))
            .background(Color::GRAY_900)
            .region(Region::Header),
        vec![RenderNode::split(
            BoxStyle::default(),
            vec![0.7, 0.3],
            vec![
                RenderNode::column(BoxStyle::default().gap(8.0), identity),
                RenderNode::column(BoxStyle::default().align(Align::End), photo),
            ],
        )],
    )
}

fn contact_strip(doc: &ResumeDocument) -> Option<RenderNode> {
    let contacts = contact_fields(doc);
    if contacts.is_empty() {
        return None;
    }
    let children = contacts
        .into_iter()
        .map(|(kind, value)| {
            RenderNode::text(
                TextRole::Contact { kind },
                value,
                TextStyle::sans(14.0, Color::GRAY_800),
            )
        })
        .collect();
    Some(RenderNode::wrap(
        BoxStyle::default()
            .padding(Insets::xy(32.0, 16.0))
            .background(Color::GRAY_100)
            .gap(16.0)
            .region(Region::ContactStrip),
        children,
    ))
}

fn body(doc: &ResumeDocument) -> RenderNode {
    let mut blocks = Vec::new();
    if let Some(summary) = non_blank(&doc.personal_info.summary) {
        blocks.push(RenderNode::column(
            BoxStyle::default().gap(8.0).region(Region::Summary),
            vec![
                RenderNode::text(TextRole::SummaryHeading, SUMMARY_HEADING, heading_style()),
                RenderNode::rule(doc.primary_color, 2.0),
                RenderNode::text(
                    TextRole::Summary,
                    summary,
                    TextStyle::sans(14.0, Color::GRAY_700).line_height(1.6),
                ),
            ],
        ));
    }
    blocks.extend(visible_sections(doc).map(|section| section_block(doc, section)));

    RenderNode::column(
        BoxStyle::default()
            .padding(Insets::all(32.0))
            .gap(SECTION_GAP)
            .region(Region::Body),
        blocks,
    )
}

fn heading_style() -> TextStyle {
    TextStyle::sans(18.0, Color::GRAY_800).bold().uppercase()
}

fn section_block(doc: &ResumeDocument, section: &Section) -> RenderNode {
    let body = match section.kind {
        SectionType::Skills => skill_chips(section),
        SectionType::Text | SectionType::List | SectionType::Experience | SectionType::Education => {
            entries(section)
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
            RenderNode::rule(doc.primary_color, 2.0),
            body,
        ],
    )
}

fn skill_chips(section: &Section) -> RenderNode {
    let chips = section
        .items
        .iter()
        .map(|item| {
            RenderNode::column(
                BoxStyle::default()
                    .padding(Insets::xy(12.0, 4.0))
                    .background(Color::GRAY_100)
                    .radius(12.0),
                vec![RenderNode::text(
                    skill_role(section, item),
                    item.skill_label(),
                    TextStyle::sans(14.0, Color::GRAY_800).bold(),
                )],
            )
        })
        .collect();
    RenderNode::wrap(BoxStyle::default().gap(8.0), chips)
}

fn entries(section: &Section) -> RenderNode {
    let entries = section
        .items
        .iter()
        .map(|item| {
            let title = RenderNode::text(
                item_role(section, item, ItemField::Title),
                heading_text(item, ItemField::Title),
                TextStyle::sans(16.0, Color::GRAY_800).bold(),
            );
            let title_row = match item.non_empty(ItemField::Date) {
                Some(date) => RenderNode::split(
                    BoxStyle::default(),
                    vec![0.75, 0.25],
                    vec![
                        title,
                        RenderNode::text(
                            item_role(section, item, ItemField::Date),
                            date,
                            TextStyle::sans(14.0, Color::GRAY_500).align(Align::End),
                        ),
                    ],
                ),
                None => title,
            };

            // Title and subtitle sit flush; the description follows a small gap.
            let heading = RenderNode::column(
                BoxStyle::default(),
                vec![
                    title_row,
                    RenderNode::text(
                        item_role(section, item, ItemField::Subtitle),
                        heading_text(item, ItemField::Subtitle),
                        TextStyle::sans(14.0, Color::GRAY_600).bold(),
                    ),
                ],
            );
            let mut lines = vec![heading];
            if let Some(description) = item.non_empty(ItemField::Description) {
                lines.push(RenderNode::text(
                    item_role(section, item, ItemField::Description),
                    description,
                    TextStyle::sans(14.0, Color::GRAY_600).line_height(1.6),
                ));
            }
            RenderNode::column(BoxStyle::default().gap(4.0), lines)
        })
        .collect();
    RenderNode::column(BoxStyle::default().gap(16.0), entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::{PersonalField, Template};
    use crate::projection::NodeKind;

    #[test]
    fn test_blank_name_falls_back_to_placeholder() {
        let doc = default_document(Template::Modern).set_personal_field(PersonalField::FullName, "  ");
        let root = project(&doc);
        let name = root
            .texts()
            .into_iter()
            .find(|t| t.role == TextRole::Name)
            .map(|t| t.text.clone());
        assert_eq!(name.as_deref(), Some(NAME_FALLBACK));
    }

    #[test]
    fn test_contact_strip_skips_empty_fields() {
        let doc = default_document(Template::Modern)
            .set_personal_field(PersonalField::Phone, "")
            .set_personal_field(PersonalField::Linkedin, "");
        let root = project(&doc);
        let strip = root.find_region(&Region::ContactStrip).unwrap();
        let values: Vec<_> = strip.texts().iter().map(|t| t.text.clone()).collect();
        assert_eq!(
            values,
            vec![doc.personal_info.address.clone(), doc.personal_info.email.clone()]
        );
    }

    #[test]
    fn test_skills_render_as_chips() {
        let doc = default_document(Template::Modern);
        let root = project(&doc);
        let qual = root
            .find_region(&Region::Section(crate::models::SectionId::new("qual")))
            .unwrap();
        let chips = qual
            .children()
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Wrap { .. }))
            .expect("chip row");
        assert_eq!(chips.children().len(), 4);
        assert!(chips
            .children()
            .iter()
            .all(|chip| chip.style.background == Some(Color::GRAY_100)));
    }
}
