//! Pointer (`.disco`) documents.
//!
//! ## Wire format
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <discovery xmlns="http://schemas.xmlsoap.org/disco/">
//!   <discoveryRef ref="other.disco"/>
//!   <contractRef ref="svc.asmx?wsdl" docRef="svc.asmx" xmlns="http://schemas.xmlsoap.org/disco/scl/"/>
//!   <schemaRef ref="types.xsd" targetNamespace="urn:types" xmlns="http://schemas.xmlsoap.org/disco/schema/"/>
//!   <soap address="http://h/svc.asmx" xmlns:q1="urn:svc" binding="q1:SvcSoap" xmlns="http://schemas.xmlsoap.org/disco/soap/"/>
//! </discovery>
//! ```
//!
//! `soap` entries and unknown children are opaque additional information;
//! they are kept and written back but never resolved.

use crate::classify::{CONTRACT_REF_NS, DISCO_NS, SCHEMA_REF_NS, SOAP_BINDING_NS};
use crate::xml::{self, Element, XmlAttribute};
use crate::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

/// One resolvable child of a pointer document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEntry {
    /// `discoveryRef`: another pointer document.
    Discovery {
        /// Raw `ref` attribute, possibly relative, possibly empty.
        reference: String,
    },
    /// `contractRef`: a contract document and its human-readable page.
    Contract {
        /// Raw `ref` attribute.
        reference: String,
        /// Raw `docRef` attribute.
        doc_reference: Option<String>,
    },
    /// `schemaRef`: a schema document.
    Schema {
        /// Raw `ref` attribute.
        reference: String,
        /// Informational `targetNamespace` attribute.
        target_namespace: Option<String>,
    },
}

impl PointerEntry {
    /// The raw reference as written in the document.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Discovery { reference }
            | Self::Contract { reference, .. }
            | Self::Schema { reference, .. } => reference,
        }
    }
}

/// A namespace-qualified name such as a SOAP binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Namespace the prefix resolved to, if any.
    pub namespace: Option<String>,
    /// Local part.
    pub name: String,
}

/// Children of a pointer document that are carried but not resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdditionalInfo {
    /// `soap` element: where a binding is served.
    SoapBinding {
        /// Endpoint address.
        address: String,
        /// Binding name.
        binding: QualifiedName,
    },
    /// Any child element the pointer format does not define.
    Other {
        /// Element namespace.
        namespace: Option<String>,
        /// Element local name.
        local_name: String,
        /// Unprefixed attributes, in document order.
        attributes: Vec<XmlAttribute>,
    },
}

/// A parsed pointer document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerDocument {
    /// Resolvable children in document order.
    pub references: Vec<PointerEntry>,
    /// Opaque children in document order.
    pub additional_info: Vec<AdditionalInfo>,
}

impl PointerDocument {
    /// Parse a pointer document.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = xml::parse(bytes)?;
        if !root.is(DISCO_NS, "discovery") {
            return Err(Error::Parse(format!(
                "not a discovery document (root element '{}')",
                root.qualified_name()
            )));
        }

        let mut document = Self::default();
        for child in &root.children {
            let reference = || child.attr("ref").unwrap_or_default().to_string();
            if child.is(DISCO_NS, "discoveryRef") {
                document.references.push(PointerEntry::Discovery {
                    reference: reference(),
                });
            } else if child.is(CONTRACT_REF_NS, "contractRef") {
                document.references.push(PointerEntry::Contract {
                    reference: reference(),
                    doc_reference: child.attr("docRef").map(str::to_string),
                });
            } else if child.is(SCHEMA_REF_NS, "schemaRef") {
                document.references.push(PointerEntry::Schema {
                    reference: reference(),
                    target_namespace: child.attr("targetNamespace").map(str::to_string),
                });
            } else if child.is(SOAP_BINDING_NS, "soap") {
                document.additional_info.push(AdditionalInfo::SoapBinding {
                    address: child.attr("address").unwrap_or_default().to_string(),
                    binding: resolve_qname(child.attr("binding").unwrap_or_default(), child, &root),
                });
            } else {
                document.additional_info.push(AdditionalInfo::Other {
                    namespace: child.namespace.clone(),
                    local_name: child.local_name.clone(),
                    attributes: child
                        .attributes
                        .iter()
                        .filter(|a| !a.name.contains(':') && a.name != "xmlns")
                        .cloned()
                        .collect(),
                });
            }
        }
        Ok(document)
    }

    /// Serialize in the pointer wire format.
    ///
    /// Output is deterministic, so parsing and re-serializing yields the same bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("discovery");
        root.push_attribute(("xmlns", DISCO_NS));
        writer.write_event(Event::Start(root))?;

        for entry in &self.references {
            writer.write_event(Event::Empty(entry_element(entry)))?;
        }
        for info in &self.additional_info {
            writer.write_event(Event::Empty(info_element(info)))?;
        }

        writer.write_event(Event::End(BytesEnd::new("discovery")))?;
        Ok(writer.into_inner())
    }
}

fn entry_element(entry: &PointerEntry) -> BytesStart<'_> {
    match entry {
        PointerEntry::Discovery { reference } => {
            let mut el = BytesStart::new("discoveryRef");
            el.push_attribute(("ref", reference.as_str()));
            el
        },
        PointerEntry::Contract {
            reference,
            doc_reference,
        } => {
            let mut el = BytesStart::new("contractRef");
            el.push_attribute(("ref", reference.as_str()));
            if let Some(doc) = doc_reference {
                el.push_attribute(("docRef", doc.as_str()));
            }
            el.push_attribute(("xmlns", CONTRACT_REF_NS));
            el
        },
        PointerEntry::Schema {
            reference,
            target_namespace,
        } => {
            let mut el = BytesStart::new("schemaRef");
            el.push_attribute(("ref", reference.as_str()));
            if let Some(ns) = target_namespace {
                el.push_attribute(("targetNamespace", ns.as_str()));
            }
            el.push_attribute(("xmlns", SCHEMA_REF_NS));
            el
        },
    }
}

fn info_element(info: &AdditionalInfo) -> BytesStart<'_> {
    match info {
        AdditionalInfo::SoapBinding { address, binding } => {
            let mut el = BytesStart::new("soap");
            el.push_attribute(("address", address.as_str()));
            match &binding.namespace {
                Some(ns) => {
                    el.push_attribute(("xmlns:q1", ns.as_str()));
                    el.push_attribute(("binding", format!("q1:{}", binding.name).as_str()));
                },
                None => el.push_attribute(("binding", binding.name.as_str())),
            }
            el.push_attribute(("xmlns", SOAP_BINDING_NS));
            el
        },
        AdditionalInfo::Other {
            namespace,
            local_name,
            attributes,
        } => {
            let mut el = BytesStart::new(local_name.as_str());
            for attr in attributes {
                el.push_attribute((attr.name.as_str(), attr.value.as_str()));
            }
            el.push_attribute(("xmlns", namespace.as_deref().unwrap_or_default()));
            el
        },
    }
}

// Prefix declarations are looked up on the element first, then the root.
fn resolve_qname(raw: &str, element: &Element, root: &Element) -> QualifiedName {
    let (prefix, name) = raw.split_once(':').unwrap_or(("", raw));
    let declaration = if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{prefix}")
    };
    let namespace = [element, root].iter().find_map(|el| {
        el.attributes
            .iter()
            .find(|a| a.name == declaration)
            .map(|a| a.value.clone())
    });
    // An unprefixed binding does not pick up the element's default namespace.
    let namespace = if prefix.is_empty() { None } else { namespace };
    QualifiedName {
        namespace,
        name: name.to_string(),
    }
}
