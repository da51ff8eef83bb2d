//! Minimal namespace-aware XML element tree.
//!
//! OGC responses handled here are small (exception reports, feature info
//! for one point), so they are read fully into a tree and then walked.

use ogc_common::{OgcError, OgcResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// An element with its resolved namespace, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI, if the element is bound to one
    pub namespace: Option<String>,
    /// Local name (prefix stripped)
    pub name: String,
    /// Attributes by local name, in document order
    pub attributes: Vec<(String, String)>,
    /// Direct text content
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// This element and all descendants, in document order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }
}

/// Parse a document into its root element.
///
/// Mismatched or unclosed tags and documents without a root element are
/// parse errors.
pub fn parse_document(xml: &str) -> OgcResult<XmlElement> {
    let mut reader = NsReader::from_str(xml);
    reader.expand_empty_elements(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let namespace = namespace_uri(&ns);
                stack.push(start_element(namespace, &e)?);
            }
            Ok((_, Event::End(_))) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| OgcError::Parse("unexpected closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => {}
                }
            }
            Ok((_, Event::Text(t))) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Ok((_, Event::CData(c))) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(OgcError::Parse(format!(
                    "XML parsing error at position {}: {}",
                    position, e
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(OgcError::Parse(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| OgcError::Parse("document has no root element".to_string()))
}

fn namespace_uri(ns: &ResolveResult) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn start_element(namespace: Option<String>, e: &BytesStart) -> OgcResult<XmlElement> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        namespace,
        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}
