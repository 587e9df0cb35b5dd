pub mod defaults;
pub mod resume;
pub mod section;

pub use resume::{
    Color, ContentScale, PersonalField, PersonalInfo, PhotoHandle, PhotoRef, ResumeDocument,
    Template,
};
pub use section::{ItemField, ItemId, Section, SectionId, SectionItem, SectionPatch, SectionType};
