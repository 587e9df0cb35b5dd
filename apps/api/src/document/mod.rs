// Document Model: copy-on-write edits, the drag reordering engine and the
// session photo store.

pub mod edit;
pub mod ops;
pub mod photo;
pub mod reorder;

pub use edit::{Created, Edit};
pub use photo::PhotoStore;
pub use reorder::DropEvent;
