//! Parsed HTML document tree and selector queries over it.
//!
//! The tree is an html5ever `RcDom`. Nodes are shared `Handle`s that are
//! mutated in place through the helpers in [`node`].

pub mod node;
pub mod selector;

use std::collections::{HashMap, HashSet};

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, Node, RcDom, SerializableHandle};

use crate::utils::error::PagetocError;

pub use selector::SelectorList;

/// A parsed HTML document
pub struct Document {
    dom: RcDom,
}

impl Document {
    /// Parse a complete document; fragments are wrapped in `html`/`body` as browsers do
    pub fn parse(html: &str) -> Result<Self, PagetocError> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| PagetocError::Html(format!("Failed to parse HTML: {}", e)))?;

        Ok(Self { dom })
    }

    /// The document node
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// All elements in document (pre-order) order
    pub fn elements(&self) -> Vec<Handle> {
        let mut elements = Vec::new();
        let mut stack: Vec<Handle> = self.root().children.borrow().iter().rev().cloned().collect();

        while let Some(handle) = stack.pop() {
            if node::is_element(&handle) {
                elements.push(handle.clone());
            }
            for child in handle.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
        }

        elements
    }

    /// Every element matching the selector, in document order
    pub fn select_all(&self, selector: &SelectorList) -> Vec<Handle> {
        self.elements()
            .into_iter()
            .filter(|element| selector.matches(element))
            .collect()
    }

    /// First matching element in document order
    pub fn select_first(&self, selector: &SelectorList) -> Option<Handle> {
        self.elements()
            .into_iter()
            .find(|element| selector.matches(element))
    }

    /// Non-empty `id` values present in the document, skipping the subtrees
    /// rooted at `excluded`
    pub fn ids_outside(&self, excluded: &[Handle]) -> HashSet<String> {
        self.elements()
            .iter()
            .filter(|element| !node::is_inside_any(element, excluded))
            .filter_map(node::id)
            .collect()
    }

    /// Pre-order position of every element, keyed by node address
    pub fn position_index(&self) -> HashMap<*const Node, usize> {
        self.elements()
            .iter()
            .enumerate()
            .map(|(position, element)| (std::rc::Rc::as_ptr(element), position))
            .collect()
    }

    /// Serialize the whole document back to HTML
    pub fn to_html(&self) -> Result<String, PagetocError> {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut buf, &SerializableHandle::from(self.root().clone()), opts)
            .map_err(|e| PagetocError::Html(format!("Failed to serialize document: {}", e)))?;

        String::from_utf8(buf)
            .map_err(|e| PagetocError::Html(format!("Serialized document is not UTF-8: {}", e)))
    }
}
