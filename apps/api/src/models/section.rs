use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable section identifier. Assigned once at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        SectionId(id.into())
    }

    /// Fresh time-ordered identifier (UUIDv7).
    pub fn generate() -> Self {
        SectionId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item identifier, unique within its parent section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn generate() -> Self {
        ItemId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Section kind. Decides which item fields matter and how templates lay it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Text,
    List,
    Experience,
    Education,
    Skills,
}

impl SectionType {
    pub fn is_skills(self) -> bool {
        matches!(self, SectionType::Skills)
    }
}

/// One entry within a section: a job, a degree, a skill line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ItemId {
    fn default() -> Self {
        ItemId::generate()
    }
}

/// Editable fields of a [`SectionItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Title,
    Subtitle,
    Date,
    Description,
}

impl SectionItem {
    /// A new item with every text field present but empty, as the editor creates it.
    pub fn blank() -> Self {
        SectionItem {
            id: ItemId::generate(),
            title: Some(String::new()),
            subtitle: Some(String::new()),
            date: Some(String::new()),
            description: Some(String::new()),
        }
    }

    pub fn field(&self, field: ItemField) -> Option<&str> {
        match field {
            ItemField::Title => self.title.as_deref(),
            ItemField::Subtitle => self.subtitle.as_deref(),
            ItemField::Date => self.date.as_deref(),
            ItemField::Description => self.description.as_deref(),
        }
    }

    /// Returns the field only when it holds visible text.
    pub fn non_empty(&self, field: ItemField) -> Option<&str> {
        self.field(field).filter(|v| !v.trim().is_empty())
    }

    pub fn with_field(&self, field: ItemField, value: String) -> Self {
        let mut next = self.clone();
        let slot = match field {
            ItemField::Title => &mut next.title,
            ItemField::Subtitle => &mut next.subtitle,
            ItemField::Date => &mut next.date,
            ItemField::Description => &mut next.description,
        };
        *slot = Some(value);
        next
    }

    /// Text shown for a skills entry: the description when present, else the title.
    pub fn skill_label(&self) -> &str {
        self.non_empty(ItemField::Description)
            .or_else(|| self.non_empty(ItemField::Title))
            .unwrap_or("")
    }
}

/// A named, ordered, typed group of resume entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub items: Vec<SectionItem>,
}

fn default_visible() -> bool {
    true
}

impl Section {
    /// The section the editor appends on "Nova Seção".
    pub fn new_default() -> Self {
        Section {
            id: SectionId::generate(),
            title: "Nova Seção".to_string(),
            kind: SectionType::Experience,
            is_visible: true,
            items: Vec::new(),
        }
    }

    pub fn item(&self, id: &ItemId) -> Option<&SectionItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Re-keys any item whose id repeats an earlier one in the same section.
    pub fn dedupe_item_ids(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        for item in &mut self.items {
            if !seen.insert(item.id.clone()) {
                item.id = ItemId::generate();
                seen.insert(item.id.clone());
            }
        }
        self
    }
}

/// Partial update for a section's header fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<SectionType>,
    #[serde(default)]
    pub is_visible: Option<bool>,
}
