//! The polymorphic reference model.
//!
//! A [`Reference`] names one location and the variant expected there. The
//! variants form a closed set ([`ReferenceVariant`]); every place that needs
//! type-specific behaviour dispatches once on [`ReferenceKind`].
//!
//! References carry no pointer back to their session. They are owned by the
//! [`ResolutionContext`](crate::ResolutionContext)'s reference table, keyed by
//! their current location, and reach the shared document store through it.

use crate::classify::DocumentKind;
use crate::document::{ContractDocument, Document, PointerDocument, PointerEntry, SchemaDocument};
use crate::location::{Location, make_valid_file_name};
use crate::{Error, Result};
use std::fmt;
use std::io::Write;

/// Which document a reference expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    /// A pointer (`.disco`) document.
    Pointer,
    /// A contract (WSDL) document.
    Contract,
    /// A schema (XSD) document.
    Schema,
}

impl ReferenceKind {
    /// Priority order used when the kind of a location is unknown.
    pub const ALL: [Self; 3] = [Self::Pointer, Self::Contract, Self::Schema];

    /// Name recorded in manifest indexes.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Pointer => "DiscoveryDocumentReference",
            Self::Contract => "ContractReference",
            Self::Schema => "SchemaReference",
        }
    }

    /// Parse a manifest type name; namespace qualifiers are ignored.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let short = name.trim().rsplit(['.', ':']).next().unwrap_or_default();
        Self::ALL.into_iter().find(|kind| kind.type_name() == short)
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pointer => "discovery",
            Self::Contract => "contract",
            Self::Schema => "schema",
        }
    }

    /// File extension for manifest files.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pointer => "disco",
            Self::Contract => "wsdl",
            Self::Schema => "xsd",
        }
    }

    /// The variant that owns a classified document, if any.
    #[must_use]
    pub const fn for_document(kind: DocumentKind) -> Option<Self> {
        match kind {
            DocumentKind::PointerXml => Some(Self::Pointer),
            DocumentKind::ContractXml => Some(Self::Contract),
            DocumentKind::SchemaXml => Some(Self::Schema),
            DocumentKind::Html | DocumentKind::UnrecognizedXml | DocumentKind::NonXml => None,
        }
    }

    /// Parse bytes as this variant's document.
    pub fn read_document(self, bytes: &[u8]) -> Result<Document> {
        Ok(match self {
            Self::Pointer => Document::Pointer(PointerDocument::parse(bytes)?),
            Self::Contract => Document::Contract(ContractDocument::parse(bytes)?),
            Self::Schema => Document::Schema(SchemaDocument::parse(bytes)?),
        })
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Variant-specific reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceVariant {
    /// A pointer document reference.
    Pointer,
    /// A contract reference.
    Contract {
        /// Location of the contract's human-readable page.
        doc_location: Option<Location>,
    },
    /// A schema reference.
    Schema {
        /// Informational target namespace; never part of identity.
        target_namespace: Option<String>,
    },
}

/// Where a reference is in its resolution lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    /// Not yet selected for processing.
    #[default]
    Unresolved,
    /// Being fetched and parsed.
    Resolving,
    /// Document stored and nested references registered.
    Resolved,
    /// Resolution failed; the error is in the collector.
    Failed,
}

/// A reference to one document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    location: Location,
    variant: ReferenceVariant,
    state: ResolutionState,
}

impl Reference {
    /// A reference of the given kind with no variant-specific data.
    #[must_use]
    pub const fn new(kind: ReferenceKind, location: Location) -> Self {
        let variant = match kind {
            ReferenceKind::Pointer => ReferenceVariant::Pointer,
            ReferenceKind::Contract => ReferenceVariant::Contract { doc_location: None },
            ReferenceKind::Schema => ReferenceVariant::Schema {
                target_namespace: None,
            },
        };
        Self {
            location,
            variant,
            state: ResolutionState::Unresolved,
        }
    }

    /// A pointer document reference.
    #[must_use]
    pub const fn pointer(location: Location) -> Self {
        Self::new(ReferenceKind::Pointer, location)
    }

    /// A contract reference with an optional human-readable page.
    #[must_use]
    pub const fn contract(location: Location, doc_location: Option<Location>) -> Self {
        Self {
            location,
            variant: ReferenceVariant::Contract { doc_location },
            state: ResolutionState::Unresolved,
        }
    }

    /// A schema reference with an optional target namespace.
    #[must_use]
    pub const fn schema(location: Location, target_namespace: Option<String>) -> Self {
        Self {
            location,
            variant: ReferenceVariant::Schema { target_namespace },
            state: ResolutionState::Unresolved,
        }
    }

    /// Current location; may change when resolution follows a redirect.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Variant of this reference.
    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        match self.variant {
            ReferenceVariant::Pointer => ReferenceKind::Pointer,
            ReferenceVariant::Contract { .. } => ReferenceKind::Contract,
            ReferenceVariant::Schema { .. } => ReferenceKind::Schema,
        }
    }

    /// Variant-specific data.
    #[must_use]
    pub const fn variant(&self) -> &ReferenceVariant {
        &self.variant
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ResolutionState {
        self.state
    }

    /// Human-readable page of a contract reference.
    #[must_use]
    pub const fn doc_location(&self) -> Option<&Location> {
        match &self.variant {
            ReferenceVariant::Contract { doc_location } => doc_location.as_ref(),
            _ => None,
        }
    }

    /// Target namespace of a schema reference.
    #[must_use]
    pub fn target_namespace(&self) -> Option<&str> {
        match &self.variant {
            ReferenceVariant::Schema { target_namespace } => target_namespace.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub(crate) fn set_state(&mut self, state: ResolutionState) {
        self.state = state;
    }

    /// Switch variant, keeping the location and any data the new variant can hold.
    pub(crate) fn retype(&mut self, kind: ReferenceKind) {
        if kind != self.kind() {
            let location = self.location.clone();
            let state = self.state;
            *self = Self::new(kind, location);
            self.state = state;
        }
    }

    /// Default manifest file name for this reference's document.
    ///
    /// Uses the document's own name when it has a non-empty one, else the
    /// location's last path segment, else `item`; then appends the variant's
    /// extension.
    #[must_use]
    pub fn default_file_name(&self, document: Option<&Document>) -> String {
        let stem = document
            .and_then(Document::name)
            .map_or_else(|| self.location.file_stem(), make_valid_file_name);
        format!("{stem}.{}", self.kind().extension())
    }

    /// Parse bytes as this reference's document.
    pub fn read_document(&self, bytes: &[u8]) -> Result<Document> {
        self.kind().read_document(bytes)
    }

    /// Write a document of this reference's variant to `sink`.
    pub fn write_document(&self, document: &Document, sink: &mut impl Write) -> Result<()> {
        if document.kind() != self.kind() {
            return Err(Error::DocumentTypeMismatch {
                url: self.location.to_string(),
                expected: self.kind().label(),
                found: document.kind().label(),
            });
        }
        sink.write_all(&document.to_bytes()?)?;
        Ok(())
    }
}

/// A reference found inside a document, not yet normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedReference {
    /// Raw location as written; may be relative or empty.
    pub location: String,
    /// Variant the parent document declared.
    pub kind: ReferenceKind,
    /// Raw human-readable page of a contract reference.
    pub doc_location: Option<String>,
    /// Target namespace of a schema reference.
    pub target_namespace: Option<String>,
}

impl NestedReference {
    fn new(location: &str, kind: ReferenceKind) -> Self {
        Self {
            location: location.to_string(),
            kind,
            doc_location: None,
            target_namespace: None,
        }
    }
}

/// References declared by a document, in document order.
///
/// Pointer documents yield every child reference, including empty ones, so
/// the caller can reject them. Contract documents yield their `wsdl:import`
/// locations and the externals of their embedded schemas; schema documents
/// yield their located externals.
#[must_use]
pub fn nested_references(document: &Document) -> Vec<NestedReference> {
    match document {
        Document::Pointer(pointer) => pointer
            .references
            .iter()
            .map(|entry| match entry {
                PointerEntry::Discovery { reference } => {
                    NestedReference::new(reference, ReferenceKind::Pointer)
                },
                PointerEntry::Contract {
                    reference,
                    doc_reference,
                } => NestedReference {
                    doc_location: doc_reference.clone(),
                    ..NestedReference::new(reference, ReferenceKind::Contract)
                },
                PointerEntry::Schema {
                    reference,
                    target_namespace,
                } => NestedReference {
                    target_namespace: target_namespace.clone(),
                    ..NestedReference::new(reference, ReferenceKind::Schema)
                },
            })
            .collect(),
        Document::Contract(contract) => contract
            .import_locations()
            .map(|location| NestedReference::new(location, ReferenceKind::Contract))
            .chain(contract.inline_schemas.iter().flat_map(|inline| {
                inline.schema.located_externals().map(|location| NestedReference {
                    target_namespace: inline.schema.target_namespace.clone(),
                    ..NestedReference::new(location, ReferenceKind::Schema)
                })
            }))
            .collect(),
        Document::Schema(schema) => schema
            .externals
            .iter()
            .filter_map(|external| {
                let location = external.schema_location.as_deref()?.trim();
                (!location.is_empty()).then(|| NestedReference {
                    target_namespace: external.namespace.clone(),
                    ..NestedReference::new(location, ReferenceKind::Schema)
                })
            })
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_type_names_round_trip() {
        for kind in ReferenceKind::ALL {
            assert_eq!(ReferenceKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(
            ReferenceKind::from_type_name("System.Web.Services.Discovery.ContractReference"),
            Some(ReferenceKind::Contract)
        );
        assert_eq!(ReferenceKind::from_type_name(""), None);
    }

    #[test]
    fn test_default_file_name_prefers_document_name() {
        let reference = Reference::contract(loc("http://h/b.asmx?wsdl"), None);
        let document = ReferenceKind::Contract
            .read_document(
                br#"<definitions name="Stock Quote" xmlns="http://schemas.xmlsoap.org/wsdl/"/>"#,
            )
            .unwrap();
        assert_eq!(reference.default_file_name(Some(&document)), "Stock Quote.wsdl");
        assert_eq!(reference.default_file_name(None), "b.wsdl");
    }

    #[test]
    fn test_default_file_name_falls_back_to_item() {
        let reference = Reference::pointer(loc("http://h/"));
        assert_eq!(reference.default_file_name(None), "item.disco");
    }

    #[test]
    fn test_write_document_checks_variant() {
        let reference = Reference::schema(loc("http://h/c.xsd"), None);
        let document = Document::Pointer(PointerDocument::default());
        let mut sink = Vec::new();
        let err = reference.write_document(&document, &mut sink).unwrap_err();
        assert!(matches!(err, Error::DocumentTypeMismatch { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_retype_keeps_location_and_state() {
        let mut reference = Reference::contract(loc("http://h/x"), Some(loc("http://h/x.html")));
        reference.set_state(ResolutionState::Resolving);
        reference.retype(ReferenceKind::Schema);
        assert_eq!(reference.kind(), ReferenceKind::Schema);
        assert_eq!(reference.location().as_str(), "http://h/x");
        assert_eq!(reference.state(), ResolutionState::Resolving);
        assert_eq!(reference.doc_location(), None);
    }

    #[test]
    fn test_nested_references_of_pointer_keep_empty_entries() {
        let document = ReferenceKind::Pointer
            .read_document(
                br#"<discovery xmlns="http://schemas.xmlsoap.org/disco/">
                      <discoveryRef ref=""/>
                      <contractRef ref="b.asmx?wsdl" docRef="b.asmx" xmlns="http://schemas.xmlsoap.org/disco/scl/"/>
                    </discovery>"#,
            )
            .unwrap();
        let nested = nested_references(&document);
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].location, "");
        assert_eq!(nested[1].kind, ReferenceKind::Contract);
        assert_eq!(nested[1].doc_location.as_deref(), Some("b.asmx"));
    }

    #[test]
    fn test_nested_references_of_contract_include_inline_imports() {
        let document = ReferenceKind::Contract
            .read_document(
                br#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" xmlns:s="http://www.w3.org/2001/XMLSchema">
                      <import location="base.wsdl"/>
                      <types><s:schema><s:import schemaLocation="c.xsd"/></s:schema></types>
                    </definitions>"#,
            )
            .unwrap();
        let nested = nested_references(&document);
        let locations: Vec<_> = nested.iter().map(|n| (n.location.as_str(), n.kind)).collect();
        assert_eq!(
            locations,
            vec![
                ("base.wsdl", ReferenceKind::Contract),
                ("c.xsd", ReferenceKind::Schema)
            ]
        );
    }
}
