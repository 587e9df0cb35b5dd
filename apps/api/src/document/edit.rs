use serde::{Deserialize, Serialize};

use crate::document::reorder::DropEvent;
use crate::models::{
    Color, ItemField, ItemId, PersonalField, PhotoRef, ResumeDocument, Section, SectionId,
    SectionPatch, Template,
};

/// One user edit, as sent by the editor UI. Tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    SetPersonalField {
        field: PersonalField,
        value: String,
    },
    /// Remote photo URL, or `null` to clear. Uploads go through the photo route.
    SetPhotoUrl {
        url: Option<String>,
    },
    SetTemplate {
        template: Template,
    },
    SetPrimaryColor {
        color: Color,
    },
    SetContentScale {
        scale: f64,
    },
    AddSection,
    RemoveSection {
        id: SectionId,
    },
    UpdateSection {
        id: SectionId,
        section: Section,
    },
    PatchSection {
        id: SectionId,
        patch: SectionPatch,
    },
    ReorderSections {
        order: Vec<SectionId>,
    },
    MoveSection {
        source: usize,
        destination: Option<usize>,
    },
    AddItem {
        section_id: SectionId,
    },
    UpdateItem {
        section_id: SectionId,
        item_id: ItemId,
        field: ItemField,
        value: String,
    },
    RemoveItem {
        section_id: SectionId,
        item_id: ItemId,
    },
}

/// Identifier minted by an edit that creates something.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Created {
    Section { id: SectionId },
    Item { section_id: SectionId, id: ItemId },
}

impl Edit {
    /// Applies the edit to `doc`, returning the next snapshot and any new id.
    pub fn apply(&self, doc: &ResumeDocument) -> (ResumeDocument, Option<Created>) {
        match self {
            Edit::SetPersonalField { field, value } => {
                (doc.set_personal_field(*field, value.clone()), None)
            }
            Edit::SetPhotoUrl { url } => {
                let photo = url
                    .as_ref()
                    .filter(|u| !u.trim().is_empty())
                    .map(|u| PhotoRef::Remote { url: u.clone() });
                (doc.set_photo(photo), None)
            }
            Edit::SetTemplate { template } => (doc.set_template(*template), None),
            Edit::SetPrimaryColor { color } => (doc.set_primary_color(*color), None),
            Edit::SetContentScale { scale } => (doc.set_content_scale(*scale), None),
            Edit::AddSection => {
                let (next, id) = doc.add_section();
                (next, Some(Created::Section { id }))
            }
            Edit::RemoveSection { id } => (doc.remove_section(id), None),
            Edit::UpdateSection { id, section } => (doc.update_section(id, section.clone()), None),
            Edit::PatchSection { id, patch } => (doc.patch_section(id, patch), None),
            Edit::ReorderSections { order } => (doc.reorder_sections(order), None),
            Edit::MoveSection {
                source,
                destination,
            } => (doc.move_section(DropEvent::new(*source, *destination)), None),
            Edit::AddItem { section_id } => {
                let (next, id) = doc.add_item(section_id);
                let created = id.map(|id| Created::Item {
                    section_id: section_id.clone(),
                    id,
                });
                (next, created)
            }
            Edit::UpdateItem {
                section_id,
                item_id,
                field,
                value,
            } => (
                doc.update_item(section_id, item_id, *field, value.clone()),
                None,
            ),
            Edit::RemoveItem {
                section_id,
                item_id,
            } => (doc.remove_item(section_id, item_id), None),
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Edit::SetPersonalField { .. } => "set_personal_field",
            Edit::SetPhotoUrl { .. } => "set_photo_url",
            Edit::SetTemplate { .. } => "set_template",
            Edit::SetPrimaryColor { .. } => "set_primary_color",
            Edit::SetContentScale { .. } => "set_content_scale",
            Edit::AddSection => "add_section",
            Edit::RemoveSection { .. } => "remove_section",
            Edit::UpdateSection { .. } => "update_section",
            Edit::PatchSection { .. } => "patch_section",
            Edit::ReorderSections { .. } => "reorder_sections",
            Edit::MoveSection { .. } => "move_section",
            Edit::AddItem { .. } => "add_item",
            Edit::UpdateItem { .. } => "update_item",
            Edit::RemoveItem { .. } => "remove_item",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::ContentScale;

    #[test]
    fn test_edit_json_shape() {
        let json = r##"{"op":"set_primary_color","color":"#2563eb"}"##;
        let edit: Edit = serde_json::from_str(json).unwrap();
        assert_eq!(
            edit,
            Edit::SetPrimaryColor {
                color: Color::BLUE_600
            }
        );

        let json = r#"{"op":"move_section","source":2,"destination":null}"#;
        let edit: Edit = serde_json::from_str(json).unwrap();
        assert_eq!(
            edit,
            Edit::MoveSection {
                source: 2,
                destination: None
            }
        );
    }

    #[test]
    fn test_unknown_template_is_rejected_at_parse_time() {
        let json = r#"{"op":"set_template","template":"fancy"}"#;
        assert!(serde_json::from_str::<Edit>(json).is_err());
    }

    #[test]
    fn test_add_section_reports_created_id() {
        let doc = default_document(Template::Modern);
        let (next, created) = Edit::AddSection.apply(&doc);
        match created {
            Some(Created::Section { id }) => assert!(next.section(&id).is_some()),
            other => panic!("expected created section, got {other:?}"),
        }
    }

    #[test]
    fn test_add_item_reports_created_item() {
        let doc = default_document(Template::Modern);
        let section_id = SectionId::new("edu");
        let (next, created) = Edit::AddItem {
            section_id: section_id.clone(),
        }
        .apply(&doc);
        let Some(Created::Item { id, .. }) = created else {
            panic!("expected created item");
        };
        assert!(next.section(&section_id).unwrap().item(&id).is_some());
    }

    #[test]
    fn test_huge_content_scale_clamps_to_max() {
        let doc = default_document(Template::Modern);
        let edit: Edit = serde_json::from_str(r#"{"op":"set_content_scale","scale":1e50}"#).unwrap();
        let (next, _) = edit.apply(&doc);
        assert_eq!(next.content_scale.get(), ContentScale::MAX);

        let edit: Edit = serde_json::from_str(r#"{"op":"set_content_scale","scale":-1e50}"#).unwrap();
        assert_eq!(edit.apply(&doc).0.content_scale.get(), ContentScale::MIN);
    }

    #[test]
    fn test_set_photo_url_blank_clears() {
        let doc = default_document(Template::Modern);
        let (next, _) = Edit::SetPhotoUrl {
            url: Some(" ".into()),
        }
        .apply(&doc);
        assert!(next.personal_info.photo.is_none());
    }
}
