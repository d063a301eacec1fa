//! Photos and their tags

pub mod entity;
pub mod mime;
pub mod tag;

pub use entity::Photo;
pub use mime::mime_type_for;
pub use tag::{tags_to_json, Tag, TagKind, TagPosition, TagRecord, TagValue};
