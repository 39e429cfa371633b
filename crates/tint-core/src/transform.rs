//! Transform passes that mutate a `Document` in place.
//!
//! - `assemble`: empty the layer container and refill it with the restyled
//!   groups named in a `StyleMap`.
//! - `inject_label`: put a single marker `<text>` at the top of the root.
//!
//! Both take `&mut Document`; the caller owns the document and serializes
//! access to it.

use crate::error::{Result, TintError};
use crate::groups::second_level_groups;
use crate::model::{Document, Element, Node, StyleMap};
use crate::parser::parse_fragment;
use crate::rewrite::rewrite_fragment;
use std::fmt;

// ─── Layer container selection ────────────────────────────────────────────

/// Rule choosing the element that `assemble` rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayerSelector {
    /// The first element anywhere in the document, depth-first in document
    /// order (root included), whose local name is `g`.
    #[default]
    FirstGroup,
    /// The first element, in the same order, whose `id` equals the value.
    ById(String),
    /// The first element, in the same order, with this local name.
    FirstByLocalName(String),
}

impl LayerSelector {
    fn matches(&self, el: &Element) -> bool {
        match self {
            LayerSelector::FirstGroup => el.local_name() == "g",
            LayerSelector::ById(id) => el.attr("id").is_some_and(|v| v == id.as_str()),
            LayerSelector::FirstByLocalName(name) => el.local_name() == name,
        }
    }

    /// Child-index path from the root to the selected element.
    pub fn select(&self, doc: &Document) -> Option<Vec<usize>> {
        doc.root.find_path(&mut |el: &Element| self.matches(el))
    }
}

impl fmt::Display for LayerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSelector::FirstGroup => write!(f, "first <g> in document order"),
            LayerSelector::ById(id) => write!(f, "element with id `{id}`"),
            LayerSelector::FirstByLocalName(name) => write!(f, "first <{name}> in document order"),
        }
    }
}

// ─── Assemble ─────────────────────────────────────────────────────────────

/// What `assemble` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleReport {
    /// Qualified name of the rebuilt container (plus `#id` when it has one).
    pub container: String,
    /// Groups re-inserted, in insertion order.
    pub appended: Vec<String>,
    /// Style map keys with no located group.
    pub skipped: Vec<String>,
    /// Located groups the style map did not mention; they are gone.
    pub dropped: Vec<String>,
}

/// Rebuild the first `<g>` of the document from the groups in `styles`.
///
/// See `assemble_with`.
pub fn assemble(doc: &mut Document, styles: &StyleMap) -> Result<AssembleReport> {
    assemble_with(doc, styles, &LayerSelector::FirstGroup)
}

/// Rebuild the container chosen by `selector`.
///
/// Second-level groups are captured first. The container's children are
/// then discarded and, for each `styles` entry whose key names a captured
/// group (in `styles` order), the group's fragment is rewritten, parsed and
/// appended. Groups not named in `styles` are dropped.
///
/// # Errors
/// - `MissingLayerContainer` if nothing matches `selector`; the document is
///   left untouched.
/// - `InvalidRewrittenFragment` if a rewritten group does not parse. The
///   container then holds exactly the groups appended before it.
pub fn assemble_with(
    doc: &mut Document,
    styles: &StyleMap,
    selector: &LayerSelector,
) -> Result<AssembleReport> {
    let groups = second_level_groups(doc);
    let path = selector
        .select(doc)
        .ok_or_else(|| TintError::MissingLayerContainer {
            selector: selector.to_string(),
        })?;
    let container = doc
        .root
        .element_at_path_mut(&path)
        .ok_or_else(|| TintError::MissingLayerContainer {
            selector: selector.to_string(),
        })?;

    let mut report = AssembleReport {
        container: describe(container),
        ..AssembleReport::default()
    };
    log::debug!(
        "rebuilding {} ({} located groups, {} styled)",
        report.container,
        groups.len(),
        styles.len()
    );
    container.children.clear();

    for (id, spec) in styles {
        let Some(fragment) = groups.get(id) else {
            log::debug!("style for unknown group `{id}` skipped");
            report.skipped.push(id.clone());
            continue;
        };
        let rewritten = rewrite_fragment(fragment, spec);
        let el = parse_fragment(&rewritten).map_err(|err| {
            log::warn!("group `{id}` no longer parses after rewrite; assembly stopped");
            TintError::InvalidRewrittenFragment {
                group: id.clone(),
                message: err.to_string(),
            }
        })?;
        container.children.push(Node::Element(el));
        report.appended.push(id.clone());
    }

    report.dropped = groups
        .keys()
        .filter(|id| !styles.contains_key(id.as_str()))
        .cloned()
        .collect();
    for id in &report.dropped {
        log::debug!("group `{id}` not in style map; dropped");
    }
    Ok(report)
}

fn describe(el: &Element) -> String {
    match el.attr("id") {
        Some(id) => format!("<{}#{id}>", el.name),
        None => format!("<{}>", el.name),
    }
}

// ─── Label ────────────────────────────────────────────────────────────────

/// A marker text placed at the top-left of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub text: String,
    /// Position in document user units.
    pub x: String,
    pub y: String,
    pub font_size: String,
    pub fill: String,
    pub font_family: String,
    /// Written as the label's `id`; empty means no id.
    pub element_id: String,
    /// Remove root-level `<text>` elements carrying `element_id` first.
    pub replace_if_exists: bool,
}

impl Default for LabelSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            x: "8".to_string(),
            y: "16".to_string(),
            font_size: "12".to_string(),
            fill: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
            element_id: "__theme_label__".to_string(),
            replace_if_exists: true,
        }
    }
}

impl LabelSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Insert `label` as the first child of the root.
///
/// Only direct children of the root are considered for replacement. With
/// `replace_if_exists` unset, repeated calls accumulate labels.
pub fn inject_label(doc: &mut Document, label: &LabelSpec) {
    let root = &mut doc.root;

    if label.replace_if_exists && !label.element_id.is_empty() {
        let before = root.children.len();
        root.children.retain(|node| match node {
            Node::Element(el) => {
                !(el.local_name() == "text"
                    && el.attr("id").is_some_and(|id| id == label.element_id.as_str()))
            }
            _ => true,
        });
        let removed = before - root.children.len();
        if removed > 0 {
            log::debug!("replaced {removed} existing label(s) `{}`", label.element_id);
        }
    }

    // Share the root's prefix so the label lands in the root's namespace.
    let name = match root.prefix() {
        Some(prefix) => format!("{prefix}:text"),
        None => "text".to_string(),
    };
    let mut text = Element::new(name);
    text.set_attr("x", &label.x);
    text.set_attr("y", &label.y);
    text.set_attr("font-size", &label.font_size);
    text.set_attr("fill", &label.fill);
    text.set_attr("font-family", &label.font_family);
    if !label.element_id.is_empty() {
        text.set_attr("id", &label.element_id);
    }
    text.push_text(&label.text);

    root.children.insert(0, Node::Element(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::emit_element;
    use crate::groups::locate_groups;
    use crate::model::StyleSpec;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    const SCHEMATIC: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"><g id="layer1"><g id="Wire"><path stroke="#112233" stroke-width="0.5mm"/></g><g id="Pin"><circle fill="#445566"/></g><g id="Text"><text style="fill:#000000">L1</text></g></g></svg>"##;

    fn styles(entries: &[(&str, StyleSpec)]) -> StyleMap {
        entries
            .iter()
            .map(|(id, spec)| (id.to_string(), spec.clone()))
            .collect()
    }

    fn child_ids(el: &Element) -> Vec<String> {
        el.child_elements()
            .map(|c| c.attr("id").map(|id| id.into_owned()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn assemble_rewrites_and_orders_by_style_map() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        let map = styles(&[
            ("Text", StyleSpec::new("#FFFFFF", "", "")),
            ("Wire", StyleSpec::new("", "#FF0000", "2")),
        ]);
        let report = assemble(&mut doc, &map).unwrap();

        assert_eq!(report.container, "<g#layer1>");
        assert_eq!(report.appended, vec!["Text", "Wire"]);
        assert_eq!(report.dropped, vec!["Pin"]);
        assert!(report.skipped.is_empty());

        let layer = doc.root.child_elements().next().unwrap();
        assert_eq!(child_ids(layer), vec!["Text", "Wire"]);
        assert_eq!(
            emit_element(layer),
            r##"<g id="layer1"><g id="Text"><text style="fill:#FFFFFF">L1</text></g><g id="Wire"><path stroke="#FF0000" stroke-width="2px"/></g></g>"##
        );
    }

    #[test]
    fn assemble_drops_groups_missing_from_map() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        let map = styles(&[("Wire", StyleSpec::default()), ("Pin", StyleSpec::default())]);
        assemble(&mut doc, &map).unwrap();
        let keys: Vec<_> = locate_groups(&doc).into_iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["Wire", "Pin"]);
    }

    #[test]
    fn assemble_skips_unknown_keys() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        let map = styles(&[("Nope", StyleSpec::default()), ("Pin", StyleSpec::default())]);
        let report = assemble(&mut doc, &map).unwrap();
        assert_eq!(report.skipped, vec!["Nope"]);
        assert_eq!(report.appended, vec!["Pin"]);
    }

    #[test]
    fn assemble_with_empty_map_empties_container() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        let report = assemble(&mut doc, &StyleMap::new()).unwrap();
        assert_eq!(report.dropped, vec!["Wire", "Pin", "Text"]);
        let layer = doc.root.child_elements().next().unwrap();
        assert!(layer.children.is_empty());
    }

    #[test]
    fn assemble_without_group_is_a_distinct_error() {
        let mut doc = parse_document("<svg><rect/></svg>").unwrap();
        let before = doc.clone();
        let err = assemble(&mut doc, &StyleMap::new()).unwrap_err();
        assert!(matches!(err, TintError::MissingLayerContainer { .. }), "{err}");
        assert_eq!(doc, before);
    }

    #[test]
    fn container_is_first_g_anywhere_even_when_deeper() {
        // The first <g> in document order sits inside <defs>, three levels down.
        let mut doc = parse_document(
            r#"<svg><defs><clipPath><g id="first"><rect/></g></clipPath></defs><g id="layer"><g id="A"/></g></svg>"#,
        )
        .unwrap();
        let map = styles(&[("A", StyleSpec::default())]);
        let report = assemble(&mut doc, &map).unwrap();
        assert_eq!(report.container, "<g#first>");
        assert_eq!(
            emit_element(&doc.root),
            r#"<svg><defs><clipPath><g id="first"><g id="A"/></g></clipPath></defs><g id="layer"><g id="A"/></g></svg>"#
        );
    }

    #[test]
    fn container_may_be_the_root_itself() {
        let mut doc = parse_document(r#"<g id="root"><a><g id="x"/></a></g>"#).unwrap();
        let map = styles(&[("x", StyleSpec::default())]);
        assemble(&mut doc, &map).unwrap();
        assert_eq!(emit_element(&doc.root), r#"<g id="root"><g id="x"/></g>"#);
    }

    #[test]
    fn selector_by_id_targets_named_layer() {
        let mut doc = parse_document(
            r#"<svg><g id="bg"><g id="keep"/></g><g id="fg"><g id="A"/></g></svg>"#,
        )
        .unwrap();
        let map = styles(&[("A", StyleSpec::default())]);
        let selector = LayerSelector::ById("fg".into());
        let report = assemble_with(&mut doc, &map, &selector).unwrap();
        assert_eq!(report.container, "<g#fg>");
        assert_eq!(
            emit_element(&doc.root),
            r#"<svg><g id="bg"><g id="keep"/></g><g id="fg"><g id="A"/></g></svg>"#
        );
    }

    #[test]
    fn invalid_rewrite_fails_fast_keeping_earlier_groups() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        let map = styles(&[
            ("Pin", StyleSpec::new("#000000", "", "")),
            ("Wire", StyleSpec::new("", "\"broken", "")),
            ("Text", StyleSpec::default()),
        ]);
        let err = assemble(&mut doc, &map).unwrap_err();
        match err {
            TintError::InvalidRewrittenFragment { group, .. } => assert_eq!(group, "Wire"),
            other => panic!("unexpected error: {other}"),
        }
        let layer = doc.root.child_elements().next().unwrap();
        assert_eq!(child_ids(layer), vec!["Pin"]);
    }

    #[test]
    fn markup_in_rewritten_value_is_rejected() {
        for bad in ["a&b", "a<b", "R&D<"] {
            let mut doc = parse_document(SCHEMATIC).unwrap();
            let map = styles(&[("Pin", StyleSpec::new(bad, "", ""))]);
            let err = assemble(&mut doc, &map).unwrap_err();
            assert!(
                matches!(&err, TintError::InvalidRewrittenFragment { group, .. } if group == "Pin"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn label_is_first_root_child() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        inject_label(&mut doc, &LabelSpec::new("Theme: dark"));
        let first = doc.root.child_elements().next().unwrap();
        assert_eq!(
            emit_element(first),
            r##"<text x="8" y="16" font-size="12" fill="#000000" font-family="sans-serif" id="__theme_label__">Theme: dark</text>"##
        );
    }

    #[test]
    fn label_replace_keeps_single_latest() {
        let mut doc = parse_document(SCHEMATIC).unwrap();
        inject_label(&mut doc, &LabelSpec::new("Theme: one"));
        let second = LabelSpec {
            x: "20".into(),
            y: "30".into(),
            ..LabelSpec::new("Theme: two")
        };
        inject_label(&mut doc, &second);

        let labels: Vec<_> = doc
            .root
            .child_elements()
            .filter(|el| el.local_name() == "text")
            .collect();
        assert_eq!(labels.len(), 1);
        let first = doc.root.child_elements().next().unwrap();
        assert_eq!(first.attr("x").as_deref(), Some("20"));
        assert_eq!(first.attr("y").as_deref(), Some("30"));
        assert_eq!(first.children, vec![Node::Text("Theme: two".into())]);
    }

    #[test]
    fn label_without_replace_accumulates() {
        let mut doc = parse_document("<svg/>").unwrap();
        let spec = LabelSpec {
            replace_if_exists: false,
            ..LabelSpec::new("x")
        };
        inject_label(&mut doc, &spec);
        inject_label(&mut doc, &spec);
        assert_eq!(doc.root.child_elements().count(), 2);
    }

    #[test]
    fn label_replace_ignores_nested_text() {
        let mut doc =
            parse_document(r#"<svg><g><text id="__theme_label__">old</text></g></svg>"#).unwrap();
        inject_label(&mut doc, &LabelSpec::new("new"));
        assert_eq!(doc.root.child_elements().count(), 2);
    }

    #[test]
    fn label_uses_root_prefix_and_escapes_text() {
        let mut doc =
            parse_document(r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"/>"#).unwrap();
        let spec = LabelSpec {
            element_id: String::new(),
            ..LabelSpec::new("A & B")
        };
        inject_label(&mut doc, &spec);
        let first = doc.root.child_elements().next().unwrap();
        assert_eq!(first.name, "svg:text");
        assert!(first.attr("id").is_none());
        assert_eq!(first.children, vec![Node::Text("A &amp; B".into())]);
    }
}
