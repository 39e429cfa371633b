//! In-memory document model for tint.
//!
//! The tree keeps names, attribute values and text exactly as they were
//! written in the source (escaped form, qualified names), so a document that
//! is parsed and emitted again keeps its namespace prefixes and entity
//! references. Only the values a caller asks for through `Element::attr` are
//! unescaped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single attribute. `value` holds the escaped source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Any node that can appear in an element's child list or around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped. Entity references are kept verbatim.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `g` or `svg:g`.
    pub name: String,
    pub attributes: SmallVec<[Attribute; 4]>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Namespace prefix of the tag name, if it has one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    /// Unescaped attribute value. Falls back to the raw text when it holds
    /// an entity reference that cannot be resolved.
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        let raw = self.attr_raw(name)?;
        Some(quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// Attribute value exactly as stored (escaped).
    pub fn attr_raw(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute from an unescaped value, replacing any existing one.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let value = quick_xml::escape::escape(value).into_owned();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        self.attributes.len() != before
    }

    /// Append text content (escaped on the way in).
    pub fn push_text(&mut self, text: &str) {
        let escaped = quick_xml::escape::escape(text).into_owned();
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(&escaped),
            _ => self.children.push(Node::Text(escaped)),
        }
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child-index path to the first element (this one included) matching
    /// `predicate`, searched depth-first in document order.
    ///
    /// An empty path denotes `self`.
    pub fn find_path(&self, predicate: &mut impl FnMut(&Element) -> bool) -> Option<Vec<usize>> {
        if predicate(self) {
            return Some(Vec::new());
        }
        for (i, child) in self.children.iter().enumerate() {
            if let Node::Element(el) = child
                && let Some(mut path) = el.find_path(predicate)
            {
                path.insert(0, i);
                return Some(path);
            }
        }
        None
    }

    pub fn element_at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &i in path {
            current = current.children.get(i)?.as_element()?;
        }
        Some(current)
    }

    pub fn element_at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &i in path {
            current = current.children.get_mut(i)?.as_element_mut()?;
        }
        Some(current)
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// A parsed document: the root element plus whatever surrounds it.
///
/// The XML declaration is not stored; the emitter always writes its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments, processing instructions and DOCTYPE before the root.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root.
    pub epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Default namespace URI declared on the root (`xmlns="..."`), if any.
    pub fn default_namespace(&self) -> Option<&str> {
        self.root.attr_raw("xmlns")
    }
}

// ─── Styles ──────────────────────────────────────────────────────────────

/// Target presentation values for one group.
///
/// Every field is substituted literally; an empty string is a legal value
/// and blanks whatever it replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub fill: String,
    pub stroke: String,
    #[serde(rename = "stroke-width", alias = "stroke_width")]
    pub stroke_width: String,
}

impl StyleSpec {
    pub fn new(fill: &str, stroke: &str, stroke_width: &str) -> Self {
        Self {
            fill: fill.to_string(),
            stroke: stroke.to_string(),
            stroke_width: stroke_width.to_string(),
        }
    }

    /// True when no field carries a directive.
    pub fn is_empty(&self) -> bool {
        self.fill.is_empty() && self.stroke.is_empty() && self.stroke_width.is_empty()
    }
}

/// Group identifier → target style. Iteration order is insertion order,
/// which is also the order groups are re-inserted during assembly.
pub type StyleMap = IndexMap<String, StyleSpec>;

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str) -> Element {
        Element::new(name)
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(el("svg:g").local_name(), "g");
        assert_eq!(el("svg:g").prefix(), Some("svg"));
        assert_eq!(el("g").local_name(), "g");
        assert_eq!(el("g").prefix(), None);
    }

    #[test]
    fn attr_unescapes_raw_value() {
        let mut g = el("g");
        g.attributes.push(Attribute {
            name: "id".into(),
            value: "a&amp;b".into(),
        });
        assert_eq!(g.attr("id").as_deref(), Some("a&b"));
        assert_eq!(g.attr_raw("id"), Some("a&amp;b"));
    }

    #[test]
    fn set_attr_escapes_and_replaces() {
        let mut t = el("text");
        t.set_attr("fill", "#000000");
        t.set_attr("fill", "<red>");
        assert_eq!(t.attributes.len(), 1);
        assert_eq!(t.attr_raw("fill"), Some("&lt;red&gt;"));
        assert!(t.remove_attr("fill"));
        assert!(!t.remove_attr("fill"));
    }

    #[test]
    fn find_path_is_depth_first_preorder() {
        // root > [a > [g#deep], g#shallow]
        let mut deep = el("g");
        deep.set_attr("id", "deep");
        let mut a = el("a");
        a.children.push(Node::Element(deep));
        let mut shallow = el("g");
        shallow.set_attr("id", "shallow");
        let mut root = el("svg");
        root.children.push(Node::Text("\n".into()));
        root.children.push(Node::Element(a));
        root.children.push(Node::Element(shallow));

        let path = root
            .find_path(&mut |e: &Element| e.local_name() == "g")
            .expect("a g exists");
        assert_eq!(path, vec![1, 0]);
        let found = root.element_at_path(&path).unwrap();
        assert_eq!(found.attr("id").as_deref(), Some("deep"));
    }

    #[test]
    fn find_path_matches_self_with_empty_path() {
        let root = el("g");
        assert_eq!(root.find_path(&mut |e: &Element| e.name == "g"), Some(vec![]));
    }

    #[test]
    fn style_spec_reads_both_width_spellings() {
        let a: StyleSpec = serde_json::from_str(r#"{"stroke-width": "2"}"#).unwrap();
        let b: StyleSpec = serde_json::from_str(r#"{"stroke_width": "2"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fill, "");
        assert!(!a.is_empty());
        assert!(StyleSpec::default().is_empty());
    }
}
