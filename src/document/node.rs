use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::{ns, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};

use crate::utils::error::PagetocError;

/// Lowercase local name of an element, `None` for any other node kind
pub fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => {
            let local: &str = &name.local;
            Some(local.to_ascii_lowercase())
        }
        _ => None,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// Value of an attribute without namespace
pub fn get_attr(node: &Handle, attr: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| is_plain_attr(&a.name, attr))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Attribute name without namespace, compared case-insensitively
fn is_plain_attr(name: &QualName, attr: &str) -> bool {
    let local: &str = &name.local;
    name.ns == ns!() && local.eq_ignore_ascii_case(attr)
}

/// Set (or replace) an attribute; ignored on non-element nodes
pub fn set_attr(node: &Handle, attr: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        let position = attrs
            .iter()
            .position(|a| is_plain_attr(&a.name, attr));
        match position {
            Some(index) => attrs[index].value = value.into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr)),
                value: value.into(),
            }),
        }
    }
}

/// The element `id`, treating an empty attribute as absent
pub fn id(node: &Handle) -> Option<String> {
    get_attr(node, "id").filter(|id| !id.is_empty())
}

/// Classes of the element in attribute order, without duplicates
pub fn class_list(node: &Handle) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    if let Some(value) = get_attr(node, "class") {
        for class in value.split_ascii_whitespace() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
    }
    classes
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    class_list(node).iter().any(|c| c == class)
}

/// Append a class unless it is already present
pub fn add_class(node: &Handle, class: &str) {
    let mut classes = class_list(node);
    if classes.iter().any(|c| c == class) {
        return;
    }
    classes.push(class.to_string());
    set_attr(node, "class", &classes.join(" "));
}

/// Create a detached HTML element with plain attributes
pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: (*value).into(),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take()?;
    let parent = weak.upgrade();
    node.parent.set(Some(weak));
    parent
}

/// Parent node if it is an element (stops at the document node)
pub fn parent_element(node: &Handle) -> Option<Handle> {
    parent(node).filter(is_element)
}

/// Whether `node` is one of `roots` or sits below one of them
pub fn is_inside_any(node: &Handle, roots: &[Handle]) -> bool {
    if roots.is_empty() {
        return false;
    }
    let mut current = Some(node.clone());
    while let Some(handle) = current {
        if roots.iter().any(|root| Rc::ptr_eq(root, &handle)) {
            return true;
        }
        current = parent(&handle);
    }
    false
}

/// Append `child` as last child of `parent`, detaching it first if needed
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Remove a node from its parent's children
pub fn detach(node: &Handle) {
    if let Some(parent) = parent(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// Copy a node and its whole subtree; the copy has no parent
pub fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype { name, public_id, system_id } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element { name, attrs, template_contents, mathml_annotation_xml_integration_point } => {
            NodeData::Element {
                name: name.clone(),
                attrs: RefCell::new(attrs.borrow().clone()),
                template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
                mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
            }
        }
        NodeData::ProcessingInstruction { target, contents } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };

    let copy = Node::new(data);
    for child in node.children.borrow().iter() {
        append_child(&copy, deep_clone(child));
    }
    copy
}

/// Serialized markup of the node's children
pub fn inner_html(node: &Handle) -> Result<String, PagetocError> {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    serialize(&mut buf, &SerializableHandle::from(node.clone()), opts)
        .map_err(|e| PagetocError::Html(format!("Failed to serialize node: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| PagetocError::Html(format!("Serialized markup is not UTF-8: {}", e)))
}

/// Concatenated text of all descendant text nodes
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn first(doc: &Document, tag: &str) -> Handle {
        doc.elements()
            .into_iter()
            .find(|n| tag_name(n).as_deref() == Some(tag))
            .unwrap()
    }

    #[test]
    fn test_attributes_and_classes() {
        let doc = Document::parse(r#"<h1 class="chapter  special chapter" id="">Title</h1>"#).unwrap();
        let h1 = first(&doc, "h1");

        assert_eq!(id(&h1), None);
        assert_eq!(class_list(&h1), vec!["chapter", "special"]);

        add_class(&h1, "title-element");
        add_class(&h1, "chapter");
        assert_eq!(class_list(&h1), vec!["chapter", "special", "title-element"]);

        set_attr(&h1, "id", "intro");
        assert_eq!(id(&h1).as_deref(), Some("intro"));
        assert!(has_class(&h1, "special"));
    }

    #[test]
    fn test_inner_html_and_text() {
        let doc = Document::parse("<h2>Hello <em>big</em> world</h2>").unwrap();
        let h2 = first(&doc, "h2");

        assert_eq!(inner_html(&h2).unwrap(), "Hello <em>big</em> world");
        assert_eq!(text_content(&h2), "Hello big world");
    }

    #[test]
    fn test_deep_clone_is_detached() {
        let doc = Document::parse("<div><p class=\"x\">a<b>b</b></p></div>").unwrap();
        let p = first(&doc, "p");
        let copy = deep_clone(&p);

        assert!(parent(&copy).is_none());
        assert_eq!(inner_html(&copy).unwrap(), inner_html(&p).unwrap());

        set_attr(&copy, "class", "y");
        assert_eq!(get_attr(&p, "class").as_deref(), Some("x"));
    }

    #[test]
    fn test_append_and_detach() {
        let doc = Document::parse("<div id=\"box\"></div>").unwrap();
        let div = first(&doc, "div");
        let ul = create_element("ul", &[("id", "list")]);

        append_child(&div, ul.clone());
        assert_eq!(div.children.borrow().len(), 1);
        assert!(Rc::ptr_eq(&parent(&ul).unwrap(), &div));
        assert_eq!(inner_html(&div).unwrap(), "<ul id=\"list\"></ul>");

        detach(&ul);
        assert!(div.children.borrow().is_empty());
        assert!(parent(&ul).is_none());
    }

    #[test]
    fn test_is_inside_any() {
        let doc = Document::parse("<ul id=\"old\"><li><a>x</a></li></ul><p>y</p>").unwrap();
        let ul = first(&doc, "ul");
        let a = first(&doc, "a");
        let p = first(&doc, "p");

        assert!(is_inside_any(&a, &[ul.clone()]));
        assert!(is_inside_any(&ul, &[ul.clone()]));
        assert!(!is_inside_any(&p, &[ul]));
        assert!(!is_inside_any(&a, &[]));
    }
}
