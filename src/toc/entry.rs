use serde::{Deserialize, Serialize};

/// One generated `<li>` of the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Hierarchy level, the 1-based index of the pattern that leveled the heading
    pub level: usize,
    /// Identifier of the heading the entry links to
    pub id: String,
    /// Classes of the list item: entry class, level class, then the heading's own classes
    pub classes: Vec<String>,
    /// Heading text with whitespace collapsed
    pub text: String,
    /// Heading inner markup, copied verbatim into the link
    pub html: String,
}

impl TocEntry {
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }

    /// One outline line: the text and link target, indented two spaces per level below 1
    pub fn to_outline_line(&self) -> String {
        let indent = "  ".repeat(self.level.saturating_sub(1));
        format!("{}{} ({})\n", indent, self.text, self.href())
    }
}

/// Render entries as an indented plain text outline
pub fn to_outline(entries: &[TocEntry]) -> String {
    entries.iter().map(TocEntry::to_outline_line).collect()
}
