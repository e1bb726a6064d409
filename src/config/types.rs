use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Resolved table of contents configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocConfig {
    /// Selector locating the container the generated list is appended to
    #[serde(alias = "tocElement")]
    pub toc_element: String,

    /// Heading selectors; the position of a pattern (1-based) is its level
    #[serde(alias = "titleElements")]
    pub title_elements: Vec<String>,

    /// `id` of the generated list
    #[serde(alias = "listId", default = "defaults::default_list_id")]
    pub list_id: String,

    /// Remove a previously generated list from the container before inserting
    #[serde(alias = "replaceExisting", default)]
    pub replace_existing: bool,
}

impl TocConfig {
    pub fn new<S: Into<String>>(toc_element: S, title_elements: Vec<String>) -> Self {
        Self {
            toc_element: toc_element.into(),
            title_elements,
            list_id: defaults::default_list_id(),
            replace_existing: false,
        }
    }
}

/// Configuration as read from a single file or the command line; every key optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocConfigFile {
    #[serde(default, alias = "tocElement")]
    pub toc_element: Option<String>,

    #[serde(default, alias = "titleElements")]
    pub title_elements: Option<Vec<String>>,

    #[serde(default, alias = "listId")]
    pub list_id: Option<String>,

    #[serde(default, alias = "replaceExisting")]
    pub replace_existing: Option<bool>,
}

impl TocConfigFile {
    /// Overlay every key set in `other` on top of `self`
    pub fn merge(&mut self, other: TocConfigFile) {
        if other.toc_element.is_some() {
            self.toc_element = other.toc_element;
        }
        if other.title_elements.is_some() {
            self.title_elements = other.title_elements;
        }
        if other.list_id.is_some() {
            self.list_id = other.list_id;
        }
        if other.replace_existing.is_some() {
            self.replace_existing = other.replace_existing;
        }
    }
}
