//! Table of contents generation for rendered HTML documents.
//!
//! Headings are picked with an ordered list of selector patterns; the position
//! of the pattern gives the heading level. The generated flat `<ul>` is
//! appended to a container element of the same document.
//!
//! ```no_run
//! use pagetoc::{Document, TocBuilder, TocConfig};
//!
//! let doc = Document::parse("<div id=\"toc\"></div><h1>Intro</h1><h2>Background</h2>")?;
//! let config = TocConfig::new("#toc", vec!["h1".to_string(), "h2".to_string()]);
//! let entries = TocBuilder::new(config).build(&doc)?;
//! assert_eq!(entries.len(), 2);
//! println!("{}", doc.to_html()?);
//! # Ok::<(), pagetoc::PagetocError>(())
//! ```

pub mod config;
pub mod document;
pub mod toc;
pub mod utils;

pub use config::TocConfig;
pub use document::{Document, SelectorList};
pub use toc::{TocBuilder, TocEntry};
pub use utils::error::PagetocError;
