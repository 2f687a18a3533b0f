//! Contract (WSDL) documents.

use super::schema::SchemaDocument;
use crate::classify::{WSDL_NS, XSD_NS};
use crate::xml;
use crate::{Error, Result};

/// A `wsdl:import` of another contract or schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractImport {
    /// `namespace` attribute.
    pub namespace: Option<String>,
    /// Raw `location` attribute.
    pub location: Option<String>,
}

/// A schema embedded in the contract's `wsdl:types` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSchema {
    /// Fragment identifying the schema within the contract: its `id`, else
    /// its `targetNamespace`, else `schema<n>`.
    pub fragment: String,
    /// The embedded schema; its bytes are the element's own source text.
    pub schema: SchemaDocument,
}

/// A parsed contract document.
///
/// Kept as the exact bytes it was read from; only the imports and embedded
/// schemas are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDocument {
    source: Vec<u8>,
    /// `name` attribute of `definitions`.
    pub name: Option<String>,
    /// `targetNamespace` attribute of `definitions`.
    pub target_namespace: Option<String>,
    /// `wsdl:import` elements in document order.
    pub imports: Vec<ContractImport>,
    /// Schemas embedded under `wsdl:types`.
    pub inline_schemas: Vec<InlineSchema>,
}

impl ContractDocument {
    /// Parse a contract document.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = xml::parse(bytes)?;
        if !root.is(WSDL_NS, "definitions") {
            return Err(Error::Parse(format!(
                "not a contract document (root element '{}')",
                root.qualified_name()
            )));
        }

        let imports = root
            .children_named(WSDL_NS, "import")
            .map(|import| ContractImport {
                namespace: import.attr("namespace").map(str::to_string),
                location: import.attr("location").map(str::to_string),
            })
            .collect();

        let inline_schemas = root
            .children_named(WSDL_NS, "types")
            .flat_map(|types| types.children_named(XSD_NS, "schema"))
            .enumerate()
            .map(|(index, schema)| {
                let fragment = schema
                    .attr("id")
                    .or_else(|| schema.attr("targetNamespace"))
                    .filter(|value| !value.is_empty())
                    .map_or_else(|| format!("schema{index}"), str::to_string);
                InlineSchema {
                    fragment,
                    schema: SchemaDocument::from_element(schema, schema.source(bytes).to_vec()),
                }
            })
            .collect();

        Ok(Self {
            source: bytes.to_vec(),
            name: root.attr("name").map(str::to_string),
            target_namespace: root.attr("targetNamespace").map(str::to_string),
            imports,
            inline_schemas,
        })
    }

    /// Non-empty `wsdl:import` locations.
    pub fn import_locations(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|import| {
            import
                .location
                .as_deref()
                .map(str::trim)
                .filter(|location| !location.is_empty())
        })
    }

    /// The bytes this contract is written back as.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }
}
