//! Group locator: finds the themable `<g>` layers of a document.
//!
//! A candidate is a `g` element exactly two levels below the root
//! (root → any child → `g`). Deeper or shallower groups are never
//! candidates. Groups without an `id` get a synthetic key `(no-id)#N`,
//! numbered from 1 in document order on every call.

use crate::emitter::emit_element;
use crate::model::{Document, Element};
use indexmap::IndexMap;

/// Group identifier → serialized fragment, in discovery order.
pub type GroupSet = IndexMap<String, String>;

/// One located group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedGroup {
    /// Explicit `id`, or the synthetic identifier.
    pub key: String,
    /// Whether `key` came from the element's own `id`.
    pub explicit_id: bool,
    /// Child-index path from the root (always two entries).
    pub path: [usize; 2],
}

/// Synthetic identifier for the `n`th group lacking an id (1-based).
pub fn synthetic_id(n: usize) -> String {
    format!("(no-id)#{n}")
}

/// Locate every second-level group in document order.
#[must_use]
pub fn locate_groups(doc: &Document) -> Vec<LocatedGroup> {
    let mut found = Vec::new();
    let mut missing_ids = 0usize;

    for (i, child) in doc.root.children.iter().enumerate() {
        let Some(child) = child.as_element() else {
            continue;
        };
        for (j, grandchild) in child.children.iter().enumerate() {
            let Some(group) = grandchild.as_element() else {
                continue;
            };
            if group.local_name() != "g" {
                continue;
            }
            let (key, explicit_id) = match group.attr("id") {
                Some(id) if !id.is_empty() => (id.into_owned(), true),
                _ => {
                    missing_ids += 1;
                    (synthetic_id(missing_ids), false)
                }
            };
            found.push(LocatedGroup {
                key,
                explicit_id,
                path: [i, j],
            });
        }
    }
    found
}

/// Map every second-level group's identifier to its serialized fragment.
///
/// A later group repeating an id replaces the earlier fragment but keeps
/// the earlier position.
#[must_use]
pub fn second_level_groups(doc: &Document) -> GroupSet {
    let mut set = GroupSet::new();
    for located in locate_groups(doc) {
        if let Some(group) = group_at(doc, &located) {
            set.insert(located.key, emit_element(group));
        }
    }
    set
}

/// Resolve a located group back to its element.
pub fn group_at<'a>(doc: &'a Document, located: &LocatedGroup) -> Option<&'a Element> {
    doc.root.element_at_path(&located.path)
}
