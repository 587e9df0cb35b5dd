//! Copy-on-write mutations of [`ResumeDocument`].
//!
//! Every operation borrows the current snapshot and returns a new one; nothing
//! is changed in place. Removal and lookup go by identifier, never by index.
//! Operations that name an unknown id return an unchanged copy.

use std::collections::HashSet;

use tracing::warn;

use crate::document::reorder::{move_section, DropEvent};
use crate::models::{
    Color, ContentScale, ItemField, ItemId, PersonalField, PhotoRef, ResumeDocument, Section,
    SectionId, SectionItem, SectionPatch, Template,
};

impl ResumeDocument {
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn set_personal_field(&self, field: PersonalField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        let info = &mut next.personal_info;
        match field {
            PersonalField::FullName => info.full_name = value,
            PersonalField::Title => info.title = value,
            PersonalField::Email => info.email = value,
            PersonalField::Phone => info.phone = value,
            PersonalField::Address => info.address = value,
            PersonalField::Summary => info.summary = value,
            PersonalField::Linkedin => {
                info.linkedin = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
        }
        next
    }

    pub fn set_photo(&self, photo: Option<PhotoRef>) -> Self {
        let mut next = self.clone();
        next.personal_info.photo = photo;
        next
    }

    pub fn set_template(&self, template: Template) -> Self {
        let mut next = self.clone();
        next.template = template;
        next
    }

    pub fn set_primary_color(&self, color: Color) -> Self {
        let mut next = self.clone();
        next.primary_color = color;
        next
    }

    /// Clamps `scale` into the allowed range. Non-finite input keeps the current value.
    pub fn set_content_scale(&self, scale: f64) -> Self {
        let mut next = self.clone();
        match ContentScale::clamped(scale) {
            Some(clamped) => {
                if clamped.get() != scale as f32 {
                    warn!(
                        requested = scale,
                        applied = clamped.get(),
                        "Content scale out of range, clamped"
                    );
                }
                next.content_scale = clamped;
            }
            None => warn!(requested = scale, "Ignoring non-finite content scale"),
        }
        next
    }

    /// Appends a default section with a fresh id. Returns the new snapshot and that id.
    pub fn add_section(&self) -> (Self, SectionId) {
        let mut next = self.clone();
        let mut section = Section::new_default();
        while self.section(&section.id).is_some() {
            section.id = SectionId::generate();
        }
        let id = section.id.clone();
        next.sections.push(section);
        (next, id)
    }

    pub fn remove_section(&self, id: &SectionId) -> Self {
        let mut next = self.clone();
        next.sections.retain(|s| &s.id != id);
        next
    }

    /// Replaces the section with `id`. The replacement keeps the canonical id;
    /// repeated item ids inside it are re-keyed.
    pub fn update_section(&self, id: &SectionId, replacement: Section) -> Self {
        let replacement = Section {
            id: id.clone(),
            ..replacement
        }
        .dedupe_item_ids();
        self.map_section(id, |_| replacement.clone())
    }

    pub fn patch_section(&self, id: &SectionId, patch: &SectionPatch) -> Self {
        self.map_section(id, |section| {
            let mut next = section.clone();
            if let Some(title) = &patch.title {
                next.title = title.clone();
            }
            if let Some(kind) = patch.kind {
                next.kind = kind;
            }
            if let Some(visible) = patch.is_visible {
                next.is_visible = visible;
            }
            next
        })
    }

    /// Applies a full new ordering. `order` must be a permutation of the current
    /// section ids; anything else leaves the document unchanged.
    pub fn reorder_sections(&self, order: &[SectionId]) -> Self {
        let current: HashSet<&SectionId> = self.sections.iter().map(|s| &s.id).collect();
        let requested: HashSet<&SectionId> = order.iter().collect();
        if order.len() != self.sections.len() || requested != current {
            warn!(
                requested = order.len(),
                current = self.sections.len(),
                "Rejected section order that is not a permutation of the current sections"
            );
            return self.clone();
        }

        let mut next = self.clone();
        next.sections = order
            .iter()
            .filter_map(|id| self.section(id).cloned())
            .collect();
        next
    }

    /// Applies a completed drag gesture.
    pub fn move_section(&self, event: DropEvent) -> Self {
        let mut next = self.clone();
        next.sections = move_section(&self.sections, event);
        next
    }

    /// Appends a blank item to the section. Returns `None` for the id when the
    /// section does not exist.
    pub fn add_item(&self, section_id: &SectionId) -> (Self, Option<ItemId>) {
        let Some(section) = self.section(section_id) else {
            return (self.clone(), None);
        };
        let mut item = SectionItem::blank();
        while section.item(&item.id).is_some() {
            item.id = ItemId::generate();
        }
        let item_id = item.id.clone();
        let next = self.map_section(section_id, |s| {
            let mut s = s.clone();
            s.items.push(item.clone());
            s
        });
        (next, Some(item_id))
    }

    pub fn update_item(
        &self,
        section_id: &SectionId,
        item_id: &ItemId,
        field: ItemField,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        self.map_section(section_id, |s| {
            let mut s = s.clone();
            for item in &mut s.items {
                if &item.id == item_id {
                    *item = item.with_field(field, value.clone());
                }
            }
            s
        })
    }

    pub fn remove_item(&self, section_id: &SectionId, item_id: &ItemId) -> Self {
        self.map_section(section_id, |s| {
            let mut s = s.clone();
            s.items.retain(|i| &i.id != item_id);
            s
        })
    }

    fn map_section(&self, id: &SectionId, f: impl Fn(&Section) -> Section) -> Self {
        let mut next = self.clone();
        next.sections = self
            .sections
            .iter()
            .map(|s| if &s.id == id { f(s) } else { s.clone() })
            .collect();
        next
    }
}
