//! Parser: XML text → `Document`.
//!
//! Built on `quick-xml`'s pull reader. Names, attribute values and text are
//! stored in their source (escaped) form; see `model` for why.
//! Handles: elements, text with entity references, CDATA, comments,
//! processing instructions and a DOCTYPE. The XML declaration is dropped.

use crate::error::{Result, TintError};
use crate::model::{Attribute, Document, Element, Node};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Parse a complete document. Exactly one root element is required.
#[must_use = "parsing result should be used"]
pub fn parse_document(input: &str) -> Result<Document> {
    let mut reader = Reader::from_str(input);
    let mut builder = TreeBuilder::default();

    loop {
        let position = reader.buffer_position() as u64;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(TintError::malformed(
                    reader.error_position() as u64,
                    err.to_string(),
                ));
            }
        };
        let malformed = |message: String| TintError::malformed(position, message);

        match event {
            Event::Start(e) => {
                let el = start_element(&reader, &e).map_err(malformed)?;
                builder.open.push(el);
            }
            Event::Empty(e) => {
                let el = start_element(&reader, &e).map_err(malformed)?;
                builder.close(el).map_err(malformed)?;
            }
            Event::End(e) => {
                let el = builder.open.pop().ok_or_else(|| {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    malformed(format!("unexpected end tag </{name}>"))
                })?;
                builder.close(el).map_err(malformed)?;
            }
            Event::Text(e) => {
                let text = e.decode().map_err(|err| malformed(err.to_string()))?;
                builder.text(&text).map_err(malformed)?;
            }
            Event::GeneralRef(e) => {
                let name = e.decode().map_err(|err| malformed(err.to_string()))?;
                builder.text(&format!("&{name};")).map_err(malformed)?;
            }
            Event::CData(e) => {
                let data = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| malformed(err.to_string()))?;
                builder
                    .node(Node::CData(data.into_owned()))
                    .map_err(malformed)?;
            }
            Event::Comment(e) => {
                let text = e.decode().map_err(|err| malformed(err.to_string()))?;
                builder
                    .node(Node::Comment(text.into_owned()))
                    .map_err(malformed)?;
            }
            Event::PI(e) => {
                let content = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| malformed(err.to_string()))?;
                builder
                    .node(Node::ProcessingInstruction(content.into_owned()))
                    .map_err(malformed)?;
            }
            Event::DocType(e) => {
                let text = e.decode().map_err(|err| malformed(err.to_string()))?;
                builder
                    .node(Node::DocType(text.trim().to_string()))
                    .map_err(malformed)?;
            }
            Event::Decl(_) => {}
            Event::Eof => break,
        }
    }

    builder.finish(reader.buffer_position() as u64)
}

/// Parse a single element fragment, e.g. the serialized text of one group.
///
/// Prefixes used inside the fragment do not have to be declared in it.
pub fn parse_fragment(input: &str) -> Result<Element> {
    parse_document(input).map(|doc| doc.root)
}

fn start_element(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> std::result::Result<Element, String> {
    let decoder = reader.decoder();
    let qname = e.name();
    let name = decoder
        .decode(qname.as_ref())
        .map_err(|err| err.to_string())?;
    let mut el = Element::new(name.into_owned());

    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|err| err.to_string())?;
        let value = decoder.decode(&attr.value).map_err(|err| err.to_string())?;
        if value.contains('<') {
            return Err(format!("`<` in value of attribute `{key}`"));
        }
        unescape(&value).map_err(|err| format!("attribute `{key}`: {err}"))?;
        el.attributes.push(Attribute {
            name: key.into_owned(),
            value: value.into_owned(),
        });
    }
    Ok(el)
}

// ─── Tree builder ────────────────────────────────────────────────────────

#[derive(Default)]
struct TreeBuilder {
    /// Elements whose end tag has not been seen yet, outermost first.
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    /// Attach a completed element to its parent, or make it the root.
    fn close(&mut self, el: Element) -> std::result::Result<(), String> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(Node::Element(el));
            return Ok(());
        }
        if self.root.is_some() {
            return Err(format!("second root element <{}>", el.name));
        }
        self.root = Some(el);
        Ok(())
    }

    fn text(&mut self, raw: &str) -> std::result::Result<(), String> {
        match self.open.last_mut() {
            Some(parent) => {
                match parent.children.last_mut() {
                    Some(Node::Text(existing)) => existing.push_str(raw),
                    _ => parent.children.push(Node::Text(raw.to_string())),
                }
                Ok(())
            }
            None if raw.trim().is_empty() => Ok(()),
            None => Err(format!("text outside the root element: {:?}", raw.trim())),
        }
    }

    fn node(&mut self, node: Node) -> std::result::Result<(), String> {
        if let Some(parent) = self.open.last_mut() {
            if matches!(node, Node::DocType(_)) {
                return Err("DOCTYPE inside an element".to_string());
            }
            parent.children.push(node);
        } else if self.root.is_none() {
            self.prolog.push(node);
        } else if matches!(node, Node::DocType(_)) {
            return Err("DOCTYPE after the root element".to_string());
        } else {
            self.epilog.push(node);
        }
        Ok(())
    }

    fn finish(self, position: u64) -> Result<Document> {
        if let Some(open) = self.open.last() {
            return Err(TintError::malformed(
                position,
                format!("unclosed element <{}>", open.name),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| TintError::malformed(position, "no root element"))?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
