pub mod document;
pub mod icon;
pub mod merge;

pub use document::{ConfigDocument, ScopedConfig};
pub use icon::IconChoice;
pub use merge::{merge_field_config, FieldConfig};
