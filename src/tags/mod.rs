pub mod codec;
pub mod localizer;
pub mod types;

pub use localizer::LocalizationTable;
pub use types::{palette_tags, same_tag_names, Color, Tag, PALETTE};
