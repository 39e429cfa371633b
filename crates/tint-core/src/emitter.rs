//! Emitter: `Document` → XML text.
//!
//! Names, attribute values and text are written exactly as stored, so
//! namespace prefixes and `xmlns` declarations come out the way they went in.

use crate::model::{Document, Element, Node};
use std::fmt::Write;

/// Declaration written at the top of every emitted document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Emit a whole document, declaration included.
#[must_use]
pub fn emit_document(doc: &Document) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    out.push('\n');

    for node in &doc.prolog {
        emit_node(&mut out, node);
        out.push('\n');
    }
    emit_element_into(&mut out, &doc.root);
    for node in &doc.epilog {
        out.push('\n');
        emit_node(&mut out, node);
    }
    out.push('\n');
    out
}

/// UTF-8 bytes of `emit_document`, ready to hand to a renderer or a file.
#[must_use]
pub fn to_bytes(doc: &Document) -> Vec<u8> {
    emit_document(doc).into_bytes()
}

/// Emit one element and its subtree, without a declaration.
#[must_use]
pub fn emit_element(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    emit_element_into(&mut out, el);
    out
}

fn emit_element_into(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        // Stored values are escaped, but `'` and `"` may appear literally
        // when the source used the other quote character.
        let quote = if attr.value.contains('"') { '\'' } else { '"' };
        let _ = write!(out, " {}={quote}{}{quote}", attr.name, attr.value);
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &el.children {
        emit_node(out, child);
    }
    let _ = write!(out, "</{}>", el.name);
}

fn emit_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => emit_element_into(out, el),
        Node::Text(text) => out.push_str(text),
        Node::CData(data) => {
            let _ = write!(out, "<![CDATA[{data}]]>");
        }
        Node::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        Node::ProcessingInstruction(content) => {
            let _ = write!(out, "<?{content}?>");
        }
        Node::DocType(content) => {
            let _ = write!(out, "<!DOCTYPE {content}>");
        }
    }
}
