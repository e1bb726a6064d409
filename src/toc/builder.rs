use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, info, warn};
use markup5ever_rcdom::{Handle, Node};

use crate::config::TocConfig;
use crate::document::{node, Document, SelectorList};
use crate::toc::entry::TocEntry;
use crate::utils::error::PagetocError;

/// Marker class added to every leveled heading; never copied to an entry
pub const TITLE_MARKER_CLASS: &str = "title-element";
/// Attribute carrying the hierarchy level on headings and entries
pub const LEVEL_ATTRIBUTE: &str = "data-title-level";
/// Prefix of synthesized heading identifiers
pub const ID_PREFIX: &str = "title-element-";
/// Class present on every entry
pub const ENTRY_CLASS: &str = "toc-element";
/// Prefix of the per-level entry class
pub const LEVEL_CLASS_PREFIX: &str = "toc-element-level-";

/// A heading picked up by the tagging pass
struct TaggedHeading {
    element: Handle,
    level: usize,
    /// Set when the heading has no identifier of its own
    synthesized_id: Option<String>,
}

impl TaggedHeading {
    fn id(&self) -> String {
        self.synthesized_id
            .clone()
            .or_else(|| node::id(&self.element))
            .unwrap_or_default()
    }
}

/// Result of the tagging pass: headings in first-match order and the final counter
struct TaggingPass {
    headings: Vec<TaggedHeading>,
    processed: usize,
}

/// Builds a flat, level-tagged table of contents list inside a document.
///
/// A heading's level is the 1-based position of the pattern in
/// `title_elements` that matches it; when several patterns match, the last
/// one listed wins. Entries follow document order. Validation (selectors, container, identifier collisions) completes
/// before the document is touched, so an error leaves it unchanged.
pub struct TocBuilder {
    config: TocConfig,
}

impl TocBuilder {
    pub fn new(config: TocConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    /// Level the headings of `document`, give them identifiers and append the
    /// generated list to the container. Returns the entries in list order.
    pub fn build(&self, document: &Document) -> Result<Vec<TocEntry>, PagetocError> {
        let patterns = self.parse_patterns()?;
        let container = self.locate_container(document)?;
        let stale_lists = if self.config.replace_existing {
            find_generated_lists(&container, &self.config.list_id)
        } else {
            Vec::new()
        };

        let pass = tagging_pass(document, &patterns, &stale_lists);
        debug!(
            "Tagging pass matched {} headings over {} pattern matches",
            pass.headings.len(), pass.processed
        );

        self.check_identifiers(document, &pass.headings, &stale_lists)?;

        let ordered = document_order(document, pass.headings);
        let mut entries: Vec<TocEntry> = ordered.iter().map(make_entry).collect();

        for heading in &ordered {
            node::add_class(&heading.element, TITLE_MARKER_CLASS);
            node::set_attr(&heading.element, LEVEL_ATTRIBUTE, &heading.level.to_string());
            if let Some(id) = &heading.synthesized_id {
                node::set_attr(&heading.element, "id", id);
            }
        }

        for stale in &stale_lists {
            debug!("Removing previously generated list #{}", self.config.list_id);
            node::detach(stale);
        }

        // Headings nested in other headings are copied with their new attributes
        let list = node::create_element("ul", &[("id", self.config.list_id.as_str())]);
        for (heading, entry) in ordered.iter().zip(entries.iter_mut()) {
            let (item, link) = render_entry(heading, entry);
            entry.html = node::inner_html(&link)?;
            node::append_child(&list, item);
        }
        node::append_child(&container, list);

        info!("Generated table of contents with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_patterns(&self) -> Result<Vec<SelectorList>, PagetocError> {
        if self.config.title_elements.is_empty() {
            return Err(PagetocError::Configuration(
                "no heading selector patterns configured".to_string()
            ));
        }

        self.config
            .title_elements
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                SelectorList::parse(pattern).map_err(|e| {
                    PagetocError::Configuration(format!("level {} pattern: {}", index + 1, e))
                })
            })
            .collect()
    }

    /// The first element matching `toc_element`; several matches are allowed
    /// but only the first receives the list
    fn locate_container(&self, document: &Document) -> Result<Handle, PagetocError> {
        let selector = SelectorList::parse(&self.config.toc_element).map_err(|e| {
            PagetocError::Configuration(format!("container selector: {}", e))
        })?;

        let mut matches = document.select_all(&selector).into_iter();
        let container = matches.next().ok_or_else(|| {
            PagetocError::Configuration(format!(
                "container selector '{}' matches no element", selector
            ))
        })?;

        let extra = matches.count();
        if extra > 0 {
            warn!(
                "Container selector '{}' matches {} elements, using the first",
                selector, extra + 1
            );
        }
        Ok(container)
    }

    /// Synthesized identifiers must not collide with identifiers already in the
    /// document (outside lists about to be replaced) or with the list id
    fn check_identifiers(
        &self,
        document: &Document,
        headings: &[TaggedHeading],
        stale_lists: &[Handle],
    ) -> Result<(), PagetocError> {
        let mut taken: HashSet<String> = document.ids_outside(stale_lists);
        taken.insert(self.config.list_id.clone());

        for heading in headings {
            if let Some(id) = &heading.synthesized_id {
                if taken.contains(id) {
                    return Err(PagetocError::Resolution(format!(
                        "synthesized identifier '{}' is already used in the document", id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Apply the patterns in order. The counter goes up once per (pattern, element)
/// match; an element seen again keeps its identifier but takes the new level.
fn tagging_pass(document: &Document, patterns: &[SelectorList], excluded: &[Handle]) -> TaggingPass {
    let mut headings: Vec<TaggedHeading> = Vec::new();
    let mut seen: HashMap<*const Node, usize> = HashMap::new();
    let mut processed = 0;

    for (index, pattern) in patterns.iter().enumerate() {
        let level = index + 1;

        for element in document.select_all(pattern) {
            if node::is_inside_any(&element, excluded) {
                continue;
            }
            processed += 1;

            match seen.get(&Rc::as_ptr(&element)) {
                Some(&slot) => {
                    debug!(
                        "Heading already leveled at {} is re-leveled at {} by '{}'",
                        headings[slot].level, level, pattern
                    );
                    headings[slot].level = level;
                }
                None => {
                    let synthesized_id = match node::id(&element) {
                        Some(_) => None,
                        None => Some(format!("{}{}", ID_PREFIX, processed)),
                    };
                    debug!(
                        "Level {} heading <{}> matched by '{}'{}",
                        level,
                        node::tag_name(&element).unwrap_or_default(),
                        pattern,
                        synthesized_id
                            .as_ref()
                            .map(|id| format!(", id {}", id))
                            .unwrap_or_default()
                    );
                    seen.insert(Rc::as_ptr(&element), headings.len());
                    headings.push(TaggedHeading { element, level, synthesized_id });
                }
            }
        }
    }

    TaggingPass { headings, processed }
}

/// Sort headings by their pre-order position in the document
fn document_order(document: &Document, mut headings: Vec<TaggedHeading>) -> Vec<TaggedHeading> {
    let positions = document.position_index();
    headings.sort_by_key(|heading| {
        positions
            .get(&Rc::as_ptr(&heading.element))
            .copied()
            .unwrap_or(usize::MAX)
    });
    headings
}

/// Entry record without `html`, which is taken from the rendered link
fn make_entry(heading: &TaggedHeading) -> TocEntry {
    let mut classes = vec![
        ENTRY_CLASS.to_string(),
        format!("{}{}", LEVEL_CLASS_PREFIX, heading.level),
    ];
    for class in node::class_list(&heading.element) {
        if class != TITLE_MARKER_CLASS && !classes.contains(&class) {
            classes.push(class);
        }
    }

    let text = node::text_content(&heading.element)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    TocEntry {
        level: heading.level,
        id: heading.id(),
        classes,
        text,
        html: String::new(),
    }
}

/// `<li class=".." data-title-level=".."><a href="#id">heading content</a></li>`,
/// returned with its link
fn render_entry(heading: &TaggedHeading, entry: &TocEntry) -> (Handle, Handle) {
    let level = entry.level.to_string();
    let classes = entry.classes.join(" ");
    let item = node::create_element("li", &[
        ("class", classes.as_str()),
        (LEVEL_ATTRIBUTE, level.as_str()),
    ]);

    let href = entry.href();
    let link = node::create_element("a", &[("href", href.as_str())]);
    for child in heading.element.children.borrow().iter() {
        node::append_child(&link, node::deep_clone(child));
    }

    node::append_child(&item, link.clone());
    (item, link)
}

/// Every list with `list_id` inside the container, in document order
fn find_generated_lists(container: &Handle, list_id: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut stack: Vec<Handle> = container.children.borrow().iter().rev().cloned().collect();
    while let Some(handle) = stack.pop() {
        if node::id(&handle).as_deref() == Some(list_id) {
            // Lists nested in a stale list go away with it
            found.push(handle);
            continue;
        }
        stack.extend(handle.children.borrow().iter().rev().cloned());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toc: &str, titles: &[&str]) -> TocConfig {
        TocConfig::new(toc, titles.iter().map(|s| s.to_string()).collect())
    }

    fn build(html: &str, titles: &[&str]) -> (Document, Vec<TocEntry>) {
        let doc = Document::parse(html).unwrap();
        let entries = TocBuilder::new(config("#toc", titles)).build(&doc).unwrap();
        (doc, entries)
    }

    fn select(doc: &Document, pattern: &str) -> Vec<Handle> {
        doc.select_all(&SelectorList::parse(pattern).unwrap())
    }

    #[test]
    fn test_levels_and_synthesized_ids() {
        let (doc, entries) = build(
            "<div id=\"toc\"></div><h1>Intro</h1><h2>Background</h2>",
            &["h1", "h2"],
        );

        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].level, entries[0].id.as_str()), (1, "title-element-1"));
        assert_eq!((entries[1].level, entries[1].id.as_str()), (2, "title-element-2"));
        assert_eq!(entries[0].text, "Intro");

        let h1 = &select(&doc, "h1")[0];
        assert_eq!(node::id(h1).as_deref(), Some("title-element-1"));
        assert_eq!(node::get_attr(h1, LEVEL_ATTRIBUTE).as_deref(), Some("1"));
        assert!(node::has_class(h1, TITLE_MARKER_CLASS));
    }

    #[test]
    fn test_existing_id_is_kept() {
        let (doc, entries) = build(
            "<div id=\"toc\"></div><h1 id=\"custom-id\">Main</h1>",
            &["h1"],
        );

        assert_eq!(entries[0].id, "custom-id");
        let links = select(&doc, "#toc a");
        assert_eq!(node::get_attr(&links[0], "href").as_deref(), Some("#custom-id"));
        assert_eq!(node::id(&select(&doc, "h1")[0]).as_deref(), Some("custom-id"));
    }

    #[test]
    fn test_counter_counts_headings_with_ids() {
        let (_, entries) = build(
            "<div id=\"toc\"></div><h1 id=\"first\">A</h1><h1>B</h1><h2>C</h2>",
            &["h1", "h2"],
        );

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "title-element-2", "title-element-3"]);
    }

    #[test]
    fn test_document_order_wins_over_pattern_order() {
        let (_, entries) = build(
            "<div id=\"toc\"></div><h2>Sub</h2><h1>Main</h1>",
            &["h1", "h2"],
        );

        let outline: Vec<(usize, &str)> = entries.iter().map(|e| (e.level, e.text.as_str())).collect();
        assert_eq!(outline, vec![(2, "Sub"), (1, "Main")]);
        // Ids follow processing order, not document order
        assert_eq!(entries[0].id, "title-element-2");
        assert_eq!(entries[1].id, "title-element-1");
    }

    #[test]
    fn test_empty_patterns_is_configuration_error() {
        let doc = Document::parse("<div id=\"toc\"></div><h1>Intro</h1>").unwrap();
        let before = doc.to_html().unwrap();

        let err = TocBuilder::new(config("#toc", &[])).build(&doc).unwrap_err();
        assert!(matches!(err, PagetocError::Configuration(_)));
        assert_eq!(doc.to_html().unwrap(), before);
    }

    #[test]
    fn test_classes_are_carried_over() {
        let (doc, entries) = build(
            "<div id=\"toc\"></div><h1 class=\"chapter special\">Intro</h1>",
            &["h1"],
        );

        let classes = &entries[0].classes;
        assert!(classes.contains(&"chapter".to_string()));
        assert!(classes.contains(&"special".to_string()));
        assert!(classes.contains(&"toc-element-level-1".to_string()));
        assert!(classes.contains(&"toc-element".to_string()));
        assert!(!classes.contains(&TITLE_MARKER_CLASS.to_string()));

        let item = &select(&doc, "#toc li")[0];
        assert!(node::has_class(item, "chapter"));
        assert!(!node::has_class(item, TITLE_MARKER_CLASS));
        assert_eq!(node::get_attr(item, LEVEL_ATTRIBUTE).as_deref(), Some("1"));
    }

    #[test]
    fn test_overlapping_patterns_last_wins() {
        let (doc, entries) = build(
            "<div id=\"toc\"></div><h1 class=\"title\">Both</h1><h2>Other</h2>",
            &["h1", "h2", ".title"],
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Both");
        assert_eq!(entries[0].level, 3);
        assert_eq!(entries[0].id, "title-element-1");
        assert!(entries[0].classes.contains(&"toc-element-level-3".to_string()));

        let h1 = &select(&doc, "h1")[0];
        assert_eq!(node::get_attr(h1, LEVEL_ATTRIBUTE).as_deref(), Some("3"));
        assert_eq!(node::get_attr(h1, "class").as_deref(), Some("title title-element"));

        // Listing the class pattern first makes the tag pattern win instead
        let (_, entries) = build(
            "<div id=\"toc\"></div><h1 class=\"title\">Both</h1>",
            &[".title", "h1"],
        );
        assert_eq!(entries[0].level, 2);
    }

    #[test]
    fn test_inner_markup_is_copied_verbatim() {
        let (doc, entries) = build(
            "<nav id=\"toc\"></nav><h1>Intro <em>to</em> &amp; more</h1>",
            &["h1"],
        );

        assert_eq!(entries[0].html, "Intro <em>to</em> &amp; more");
        assert_eq!(entries[0].text, "Intro to & more");

        let list = &select(&doc, "#toc > ul")[0];
        assert_eq!(
            node::inner_html(list).unwrap(),
            "<li class=\"toc-element toc-element-level-1\" data-title-level=\"1\">\
             <a href=\"#title-element-1\">Intro <em>to</em> &amp; more</a></li>"
        );
    }

    #[test]
    fn test_single_flat_list_in_container() {
        let (doc, _) = build(
            "<div id=\"toc\"><p>Contents</p></div><h1>A</h1><h2>B</h2><h3>C</h3>",
            &["h1", "h2", "h3"],
        );

        let lists = select(&doc, "ul");
        assert_eq!(lists.len(), 1);
        assert_eq!(node::id(&lists[0]).as_deref(), Some("list-toc-generated"));
        assert_eq!(select(&doc, "#toc > ul > li").len(), 3);

        // Appended after existing container content
        let container = &select(&doc, "#toc")[0];
        let last = container.children.borrow().last().cloned().unwrap();
        assert!(Rc::ptr_eq(&last, &lists[0]));
    }

    #[test]
    fn test_missing_container_is_configuration_error() {
        let doc = Document::parse("<h1>Intro</h1>").unwrap();
        let err = TocBuilder::new(config("#toc", &["h1"])).build(&doc).unwrap_err();

        assert!(matches!(err, PagetocError::Configuration(_)));
        assert!(node::id(&select(&doc, "h1")[0]).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let doc = Document::parse("<div id=\"toc\"></div><h1>Intro</h1>").unwrap();
        let err = TocBuilder::new(config("#toc", &["h1", "h2::before"])).build(&doc).unwrap_err();
        assert!(matches!(err, PagetocError::Configuration(ref msg) if msg.contains("level 2")));
    }

    #[test]
    fn test_first_container_is_used() {
        let (doc, _) = build(
            "<div id=\"toc\" class=\"a\"></div><div id=\"toc\" class=\"b\"></div><h1>X</h1>",
            &["h1"],
        );

        assert_eq!(select(&doc, ".a > ul").len(), 1);
        assert!(select(&doc, ".b > ul").is_empty());
    }

    #[test]
    fn test_identifier_collision_is_resolution_error() {
        let doc = Document::parse(
            "<div id=\"toc\"></div><h1>A</h1><p id=\"title-element-1\">taken</p>"
        ).unwrap();
        let before = doc.to_html().unwrap();

        let err = TocBuilder::new(config("#toc", &["h1"])).build(&doc).unwrap_err();
        assert!(matches!(err, PagetocError::Resolution(_)));
        assert_eq!(doc.to_html().unwrap(), before);
    }

    #[test]
    fn test_every_match_appears_once() {
        let (_, entries) = build(
            "<div id=\"toc\"></div><section><h1>A</h1><h2 class=\"x\">B</h2></section><h2>C</h2>",
            &["h1, h2.x", "h2", "section h2"],
        );

        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        let ids: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(entries[1].level, 3);
    }

    #[test]
    fn test_rebuild_appends_second_list() {
        let doc = Document::parse("<div id=\"toc\"></div><h1>A</h1>").unwrap();
        let builder = TocBuilder::new(config("#toc", &["h1"]));

        builder.build(&doc).unwrap();
        let entries = builder.build(&doc).unwrap();

        assert_eq!(entries[0].id, "title-element-1");
        assert_eq!(select(&doc, "#toc > ul").len(), 2);
    }

    #[test]
    fn test_replace_existing_list() {
        let doc = Document::parse("<div id=\"toc\"></div><h1 class=\"chapter\">A</h1>").unwrap();
        let mut cfg = config("#toc", &[".chapter"]);
        cfg.replace_existing = true;
        let builder = TocBuilder::new(cfg);

        builder.build(&doc).unwrap();
        let entries = builder.build(&doc).unwrap();

        // Entries of the old list carry `chapter` but are not picked up again
        assert_eq!(entries.len(), 1);
        assert_eq!(select(&doc, "#toc > ul").len(), 1);
        assert_eq!(select(&doc, "#toc li").len(), 1);
    }

    #[test]
    fn test_custom_list_id() {
        let doc = Document::parse("<div id=\"toc\"></div><h1>A</h1>").unwrap();
        let mut cfg = config("#toc", &["h1"]);
        cfg.list_id = "contents".to_string();
        TocBuilder::new(cfg).build(&doc).unwrap();

        assert_eq!(select(&doc, "#toc > ul#contents").len(), 1);
    }

    #[test]
    fn test_entry_html_matches_inserted_link() {
        let (doc, entries) = build(
            "<div id=\"toc\"></div><div class=\"part\">P<h2>Inner</h2></div>",
            &[".part", "h2"],
        );

        assert_eq!(
            entries[0].html,
            "P<h2 class=\"title-element\" data-title-level=\"2\" id=\"title-element-2\">Inner</h2>"
        );
        let links = select(&doc, "#toc a");
        assert_eq!(links.len(), 2);
        for (entry, link) in entries.iter().zip(links.iter()) {
            assert_eq!(entry.html, node::inner_html(link).unwrap());
        }
    }

    #[test]
    fn test_replace_removes_every_stale_list() {
        let doc = Document::parse("<div id=\"toc\"></div><h1 class=\"chapter\">A</h1>").unwrap();
        let plain = TocBuilder::new(config("#toc", &["h1"]));
        plain.build(&doc).unwrap();
        plain.build(&doc).unwrap();
        assert_eq!(select(&doc, "#toc > ul").len(), 2);

        let mut cfg = config("#toc", &[".chapter"]);
        cfg.replace_existing = true;
        let entries = TocBuilder::new(cfg).build(&doc).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(select(&doc, "#toc > ul").len(), 1);
        assert_eq!(select(&doc, "#toc li").len(), 1);
    }
}
