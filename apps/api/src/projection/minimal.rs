//! Minimal: dark left panel with identity, contacts and every Skills section;
//! white main panel with the summary and all other sections.

use crate::models::{Color, ItemField, ResumeDocument, Section, SectionType};
use crate::projection::tree::{Align, BoxStyle, Insets, Region, RenderNode, TextRole, TextStyle};
use crate::projection::{
    contact_fields, heading_text, item_role, non_blank, skill_role, visible_sections,
};

const SUMMARY_HEADING: &str = "Perfil";
const CONTACT_LABEL: &str = "Contato";
const PHOTO_SIZE: f32 = 96.0;

pub fn project(doc: &ResumeDocument) -> RenderNode {
    RenderNode::split(
        BoxStyle::default(),
        vec![1.0, 2.0],
        vec![side_panel(doc), main_panel(doc)],
    )
}

fn side_label_style() -> TextStyle {
    TextStyle::sans(12.0, Color::GRAY_400).bold().uppercase()
}

fn side_panel(doc: &ResumeDocument) -> RenderNode {
    let info = &doc.personal_info;

    let mut identity = Vec::new();
    if let Some(photo) = &info.photo {
        identity.push(RenderNode::photo(
            photo.clone(),
            PHOTO_SIZE,
            Some((Color::WHITE, 2.0)),
        ));
    }
    identity.push(RenderNode::text(
        TextRole::Name,
        info.full_name.as_str(),
        TextStyle::sans(24.0, Color::WHITE)
            .bold()
            .align(Align::Center)
            .line_height(1.2),
    ));
    if let Some(title) = non_blank(&info.title) {
        identity.push(RenderNode::text(
            TextRole::JobTitle,
            title,
            TextStyle::sans(14.0, Color::BLUE_300)
                .uppercase()
                .align(Align::Center),
        ));
    }

    let mut blocks = vec![RenderNode::column(
        BoxStyle::default()
            .gap(8.0)
            .align(Align::Center)
            .region(Region::Header),
        identity,
    )];

    let contacts = contact_fields(doc);
    if !contacts.is_empty() {
        let mut lines = vec![RenderNode::text(
            TextRole::Label,
            CONTACT_LABEL,
            side_label_style(),
        )];
        lines.extend(contacts.into_iter().map(|(kind, value)| {
            RenderNode::text(
                TextRole::Contact { kind },
                value,
                TextStyle::sans(14.0, Color::WHITE),
            )
        }));
        blocks.push(RenderNode::column(
            BoxStyle::default().gap(8.0).region(Region::ContactStrip),
            lines,
        ));
    }

    blocks.extend(
        visible_sections(doc)
            .filter(|s| s.kind.is_skills())
            .map(skill_block),
    );

    RenderNode::column(
        BoxStyle::default()
            .padding(Insets::all(24.0))
            .gap(24.0)
            .background(Color::GRAY_800)
            .region(Region::SidePanel),
        blocks,
    )
}

fn skill_block(section: &Section) -> RenderNode {
    let mut lines = vec![RenderNode::text(
        TextRole::SectionHeading {
            section: section.id.clone(),
        },
        section.title.as_str(),
        side_label_style(),
    )];
    lines.extend(section.items.iter().map(|item| {
        RenderNode::split(
            BoxStyle::default().gap(8.0),
            vec![0.05, 0.95],
            vec![
                RenderNode::dot(Color::BLUE_300, 6.0),
                RenderNode::text(
                    skill_role(section, item),
                    item.skill_label(),
                    TextStyle::sans(14.0, Color::WHITE),
                ),
            ],
        )
    }));
    RenderNode::column(
        BoxStyle::default()
            .gap(8.0)
            .region(Region::Section(section.id.clone())),
        lines,
    )
}

fn main_heading_style() -> TextStyle {
    TextStyle::sans(14.0, Color::GRAY_800).bold().uppercase()
}

fn main_panel(doc: &ResumeDocument) -> RenderNode {
    let mut blocks = Vec::new();
    if let Some(summary) = non_blank(&doc.personal_info.summary) {
        blocks.push(RenderNode::column(
            BoxStyle::default().gap(8.0).region(Region::Summary),
            vec![
                RenderNode::text(TextRole::SummaryHeading, SUMMARY_HEADING, main_heading_style()),
                RenderNode::rule(Color::GRAY_300, 1.0),
                RenderNode::text(
                    TextRole::Summary,
                    summary,
                    TextStyle::sans(14.0, Color::GRAY_600).line_height(1.6),
                ),
            ],
        ));
    }
    blocks.extend(
        visible_sections(doc)
            .filter(|s| !s.kind.is_skills())
            .map(section_block),
    );

    RenderNode::column(
        BoxStyle::default()
            .padding(Insets::all(32.0))
            .gap(32.0)
            .background(Color::WHITE)
            .region(Region::MainPanel),
        blocks,
    )
}

fn section_block(section: &Section) -> RenderNode {
    let entries = match section.kind {
        // Routed to the side panel; kept exhaustive so a new type is a compile error.
        SectionType::Skills => Vec::new(),
        SectionType::Text | SectionType::List | SectionType::Experience | SectionType::Education => {
            section.items.iter().map(|item| entry(section, item)).collect()
        }
    };

    let mut lines = vec![
        RenderNode::text(
            TextRole::SectionHeading {
                section: section.id.clone(),
            },
            section.title.as_str(),
            main_heading_style(),
        ),
        RenderNode::rule(Color::GRAY_300, 1.0),
    ];
    lines.push(RenderNode::column(BoxStyle::default().gap(16.0), entries));
    RenderNode::column(
        BoxStyle::default()
            .gap(8.0)
            .region(Region::Section(section.id.clone())),
        lines,
    )
}

fn entry(section: &Section, item: &crate::models::SectionItem) -> RenderNode {
    let title = RenderNode::text(
        item_role(section, item, ItemField::Title),
        heading_text(item, ItemField::Title),
        TextStyle::sans(14.0, Color::GRAY_900).bold(),
    );
    let title_row = match item.non_empty(ItemField::Date) {
        Some(date) => RenderNode::split(
            BoxStyle::default(),
            vec![0.7, 0.3],
            vec![
                title,
                RenderNode::text(
                    item_role(section, item, ItemField::Date),
                    date,
                    TextStyle::sans(12.0, Color::GRAY_500).align(Align::End),
                ),
            ],
        ),
        None => title,
    };

    let mut lines = vec![
        title_row,
        RenderNode::text(
            item_role(section, item, ItemField::Subtitle),
            heading_text(item, ItemField::Subtitle),
            TextStyle::sans(12.0, Color::BLUE_600).bold().uppercase(),
        ),
    ];
    if let Some(description) = item.non_empty(ItemField::Description) {
        lines.push(RenderNode::text(
            item_role(section, item, ItemField::Description),
            description,
            TextStyle::sans(12.0, Color::GRAY_600).line_height(1.6),
        ));
    }
    RenderNode::column(BoxStyle::default().gap(4.0), lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::Template;

    #[test]
    fn test_side_panel_holds_contact_label_and_photo() {
        let root = project(&default_document(Template::Minimal));
        let side = root.find_region(&Region::SidePanel).unwrap();
        assert!(side
            .texts()
            .iter()
            .any(|t| t.role == TextRole::Label && t.text == CONTACT_LABEL));
        let mut photos = 0;
        side.walk(&mut |n| {
            if matches!(n.kind, crate::projection::NodeKind::Photo(_)) {
                photos += 1;
            }
        });
        assert_eq!(photos, 1);
    }

    #[test]
    fn test_summary_lives_in_main_panel() {
        let root = project(&default_document(Template::Minimal));
        let main = root.find_region(&Region::MainPanel).unwrap();
        assert!(main.texts().iter().any(|t| t.role == TextRole::Summary));
        let side = root.find_region(&Region::SidePanel).unwrap();
        assert!(side.texts().iter().all(|t| t.role != TextRole::Summary));
    }
}
