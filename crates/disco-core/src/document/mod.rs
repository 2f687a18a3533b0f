//! Parsed documents held by the [`DocumentStore`](crate::DocumentStore).
//!
//! Each location resolves to exactly one [`Document`]. References never hold
//! a document directly; they look it up by location, so a reload can swap the
//! stored value without touching the reference table.

pub mod contract;
pub mod pointer;
pub mod schema;

pub use contract::{ContractDocument, ContractImport, InlineSchema};
pub use pointer::{AdditionalInfo, PointerDocument, PointerEntry, QualifiedName};
pub use schema::{ExternalKind, SchemaDocument, SchemaExternal};

use crate::Result;
use crate::reference::ReferenceKind;

/// The parsed result of one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// A pointer (`.disco`) document.
    Pointer(PointerDocument),
    /// A contract (WSDL) document.
    Contract(ContractDocument),
    /// A schema (XSD) document.
    Schema(SchemaDocument),
}

impl Document {
    /// Which reference variant owns this kind of document.
    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        match self {
            Self::Pointer(_) => ReferenceKind::Pointer,
            Self::Contract(_) => ReferenceKind::Contract,
            Self::Schema(_) => ReferenceKind::Schema,
        }
    }

    /// The document's own name, used for manifest file names.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Pointer(_) => None,
            Self::Contract(contract) => contract.name.as_deref(),
            Self::Schema(schema) => schema.id.as_deref(),
        }
        .map(str::trim)
        .filter(|name| !name.is_empty())
    }

    /// Serialized bytes, as written to a manifest.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Pointer(pointer) => pointer.to_bytes(),
            Self::Contract(contract) => Ok(contract.as_bytes().to_vec()),
            Self::Schema(schema) => Ok(schema.as_bytes().to_vec()),
        }
    }

    /// The pointer document, if this is one.
    #[must_use]
    pub const fn as_pointer(&self) -> Option<&PointerDocument> {
        match self {
            Self::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// The contract document, if this is one.
    #[must_use]
    pub const fn as_contract(&self) -> Option<&ContractDocument> {
        match self {
            Self::Contract(contract) => Some(contract),
            _ => None,
        }
    }

    /// The schema document, if this is one.
    #[must_use]
    pub const fn as_schema(&self) -> Option<&SchemaDocument> {
        match self {
            Self::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}
