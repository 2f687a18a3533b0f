//! Minimal namespace-aware element tree over `quick-xml`.
//!
//! Discovery documents are small, so they are read into an [`Element`] tree
//! once and then inspected by the document parsers. Every element remembers
//! the byte span it occupied so embedded fragments (inline schemas) can be
//! copied out verbatim.
//!
//! The reader never resolves external DTD subsets or general entities: a
//! `DOCTYPE` is skipped and an undeclared entity reference is a parse error.

use crate::{Error, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::ops::Range;

/// One attribute as written, with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name (`prefix:local` or `local`).
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

impl XmlAttribute {
    /// The name without its prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// An element with its resolved namespace, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace URI the element's prefix resolved to.
    pub namespace: Option<String>,
    /// Local name without prefix.
    pub local_name: String,
    /// Attributes in document order.
    pub attributes: Vec<XmlAttribute>,
    /// Child elements in document order.
    pub children: Vec<Self>,
    /// Byte range of the element in the source, start tag through end tag.
    pub span: Range<usize>,
}

impl Element {
    /// Whether the element is `{namespace}local_name`.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// `{namespace}local` rendering used in diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Value of the attribute with the given local name, ignoring namespace
    /// declarations.
    #[must_use]
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| !a.is_namespace_declaration() && a.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// Child elements named `{namespace}local_name`.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        self.children
            .iter()
            .filter(move |child| child.is(namespace, local_name))
    }

    /// The source bytes this element was read from.
    #[must_use]
    pub fn source<'a>(&self, document: &'a [u8]) -> &'a [u8] {
        document.get(self.span.clone()).unwrap_or_default()
    }
}

/// Read a complete document into an element tree, returning its root.
pub fn parse(bytes: &[u8]) -> Result<Element> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let before = position(&reader);
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_of(resolved)?;

        match event {
            Event::Start(start) => {
                open.push(element(namespace, &start, tag_start(bytes, before))?);
            },
            Event::Empty(start) => {
                let mut el = element(namespace, &start, tag_start(bytes, before))?;
                el.span.end = position(&reader);
                attach(&mut open, &mut root, el);
            },
            Event::End(_) => {
                let mut el = open
                    .pop()
                    .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                el.span.end = position(&reader);
                attach(&mut open, &mut root, el);
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !open.is_empty() {
        return Err(Error::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

/// Peek the root element's namespace and local name without building a tree.
pub fn root_name(bytes: &[u8]) -> Result<(Option<String>, String)> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_of(resolved)?;
        match event {
            Event::Start(start) | Event::Empty(start) => {
                let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                return Ok((namespace, local));
            },
            Event::Text(text) if !text.iter().all(u8::is_ascii_whitespace) => {
                return Err(Error::Xml("text before the root element".to_string()));
            },
            Event::Eof => {
                return Err(Error::Xml("document has no root element".to_string()));
            },
            _ => {},
        }
        buf.clear();
    }
}

fn namespace_of(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::Xml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn element(namespace: Option<String>, start: &BytesStart<'_>, offset: usize) -> Result<Element> {
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        attributes.push(XmlAttribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(Element {
        namespace,
        local_name,
        attributes,
        children: Vec::new(),
        span: offset..offset,
    })
}

fn attach(open: &mut [Element], root: &mut Option<Element>, el: Element) {
    if let Some(parent) = open.last_mut() {
        parent.children.push(el);
    } else if root.is_none() {
        *root = Some(el);
    }
}

fn position<R>(reader: &NsReader<R>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

// Trimmed whitespace is consumed by the same read as the tag that follows it.
fn tag_start(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == b'<'))
        .map_or(from, |offset| from + offset)
}
