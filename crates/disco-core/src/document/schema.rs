//! Schema (XSD) documents.
//!
//! The schema grammar itself is opaque here. A schema is kept as the exact
//! bytes it was read from, plus the few attributes discovery needs: its
//! identity hints and the `include`/`import`/`redefine` externals that point
//! at further schema documents.

use crate::classify::XSD_NS;
use crate::xml::{self, Element};
use crate::{Error, Result};

/// How a schema pulls in another schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    /// `xsd:include`
    Include,
    /// `xsd:import`
    Import,
    /// `xsd:redefine`
    Redefine,
}

/// One `include`/`import`/`redefine` of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaExternal {
    /// Which construct declared it.
    pub kind: ExternalKind,
    /// Raw `schemaLocation`, if any.
    pub schema_location: Option<String>,
    /// `namespace` of an import.
    pub namespace: Option<String>,
}

/// A parsed schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    source: Vec<u8>,
    /// `targetNamespace` attribute.
    pub target_namespace: Option<String>,
    /// `id` attribute, used as the document's name.
    pub id: Option<String>,
    /// Externals in document order.
    pub externals: Vec<SchemaExternal>,
}

impl SchemaDocument {
    /// Parse a standalone schema document.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = xml::parse(bytes)?;
        if !root.is(XSD_NS, "schema") {
            return Err(Error::Parse(format!(
                "not a schema document (root element '{}')",
                root.qualified_name()
            )));
        }
        Ok(Self::from_element(&root, bytes.to_vec()))
    }

    /// Build a schema from an already parsed `xsd:schema` element.
    ///
    /// `source` is the text the schema is written back as; for schemas
    /// embedded in a contract this is the element's own span.
    pub(crate) fn from_element(schema: &Element, source: Vec<u8>) -> Self {
        let externals = schema
            .children
            .iter()
            .filter(|child| child.namespace.as_deref() == Some(XSD_NS))
            .filter_map(|child| {
                let kind = match child.local_name.as_str() {
                    "include" => ExternalKind::Include,
                    "import" => ExternalKind::Import,
                    "redefine" => ExternalKind::Redefine,
                    _ => return None,
                };
                Some(SchemaExternal {
                    kind,
                    schema_location: child.attr("schemaLocation").map(str::to_string),
                    namespace: child.attr("namespace").map(str::to_string),
                })
            })
            .collect();

        Self {
            source,
            target_namespace: schema.attr("targetNamespace").map(str::to_string),
            id: schema.attr("id").map(str::to_string),
            externals,
        }
    }

    /// Externals that name a location to fetch.
    pub fn located_externals(&self) -> impl Iterator<Item = &str> {
        self.externals.iter().filter_map(|external| {
            external
                .schema_location
                .as_deref()
                .map(str::trim)
                .filter(|location| !location.is_empty())
        })
    }

    /// The bytes this schema is written back as.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const XSD: &str = r#"<?xml version="1.0"?>
<xs:schema id="Orders" targetNamespace="urn:orders" xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="common.xsd"/>
  <xs:import namespace="urn:types" schemaLocation="../types.xsd"/>
  <xs:import namespace="urn:inline"/>
  <xs:redefine schemaLocation="  "/>
  <xs:element name="order" type="xs:string"/>
</xs:schema>"#;

    #[test]
    fn test_parse_reads_identity_and_externals() {
        let schema = SchemaDocument::parse(XSD.as_bytes()).unwrap();
        assert_eq!(schema.id.as_deref(), Some("Orders"));
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:orders"));
        assert_eq!(schema.externals.len(), 4);
        assert_eq!(schema.externals[1].kind, ExternalKind::Import);
        assert_eq!(schema.externals[1].namespace.as_deref(), Some("urn:types"));
    }

    #[test]
    fn test_located_externals_skip_empty_locations() {
        let schema = SchemaDocument::parse(XSD.as_bytes()).unwrap();
        let located: Vec<_> = schema.located_externals().collect();
        assert_eq!(located, vec!["common.xsd", "../types.xsd"]);
    }

    #[test]
    fn test_keeps_source_bytes_verbatim() {
        let schema = SchemaDocument::parse(XSD.as_bytes()).unwrap();
        assert_eq!(schema.as_bytes(), XSD.as_bytes());
    }

    #[test]
    fn test_rejects_other_roots() {
        assert!(SchemaDocument::parse(br#"<schema xmlns="urn:not-xsd"/>"#).is_err());
    }
}
