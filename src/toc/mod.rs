mod builder;
mod entry;

pub use builder::{
    TocBuilder, ENTRY_CLASS, ID_PREFIX, LEVEL_ATTRIBUTE, LEVEL_CLASS_PREFIX, TITLE_MARKER_CLASS,
};
pub use entry::{to_outline, TocEntry};
