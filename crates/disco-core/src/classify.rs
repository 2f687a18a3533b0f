//! Content sniffing: decide what kind of document a response body holds.
//!
//! Classification never trusts file extensions. The content type only
//! short-circuits HTML; everything else is decided by peeking the XML root.

use crate::content_type;
use crate::xml;
use std::fmt;

/// Namespace of pointer (`.disco`) documents and their `discoveryRef` children.
pub const DISCO_NS: &str = "http://schemas.xmlsoap.org/disco/";
/// Namespace of `contractRef` entries.
pub const CONTRACT_REF_NS: &str = "http://schemas.xmlsoap.org/disco/scl/";
/// Namespace of `schemaRef` entries.
pub const SCHEMA_REF_NS: &str = "http://schemas.xmlsoap.org/disco/schema/";
/// Namespace of `soap` binding entries.
pub const SOAP_BINDING_NS: &str = "http://schemas.xmlsoap.org/disco/soap/";
/// Namespace of contract (WSDL) documents.
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
/// Namespace of schema (XSD) documents.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// What a response body turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// An HTML page; only useful if it links to an alternate document.
    Html,
    /// `{disco}discovery` root.
    PointerXml,
    /// `{wsdl}definitions` root.
    ContractXml,
    /// `{xsd}schema` root.
    SchemaXml,
    /// Well-formed enough to have a root, but not one we know.
    UnrecognizedXml,
    /// Not XML at all.
    NonXml,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Html => "html",
            Self::PointerXml => "discovery",
            Self::ContractXml => "contract",
            Self::SchemaXml => "schema",
            Self::UnrecognizedXml => "unrecognized xml",
            Self::NonXml => "non-xml",
        };
        f.write_str(name)
    }
}

/// Classify a response body.
///
/// The body is only borrowed, so the same bytes can be handed to the parser
/// of the chosen document kind afterwards.
#[must_use]
pub fn classify(content_type: &str, body: &[u8]) -> DocumentKind {
    if content_type::is_html(content_type) {
        return DocumentKind::Html;
    }

    match xml::root_name(body) {
        Ok((namespace, local)) => classify_root(namespace.as_deref(), &local),
        Err(err) => {
            tracing::debug!(error = %err, content_type, "body did not parse as XML");
            if content_type::is_xml(content_type) {
                DocumentKind::UnrecognizedXml
            } else {
                DocumentKind::NonXml
            }
        },
    }
}

/// Classify by root element alone.
#[must_use]
pub fn classify_root(namespace: Option<&str>, local_name: &str) -> DocumentKind {
    match (namespace, local_name) {
        (Some(DISCO_NS), "discovery") => DocumentKind::PointerXml,
        (Some(XSD_NS), "schema") => DocumentKind::SchemaXml,
        (Some(WSDL_NS), "definitions") => DocumentKind::ContractXml,
        _ => DocumentKind::UnrecognizedXml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_wins_regardless_of_body() {
        let body = br#"<discovery xmlns="http://schemas.xmlsoap.org/disco/"/>"#;
        assert_eq!(classify("text/html; charset=utf-8", body), DocumentKind::Html);
    }

    #[test]
    fn test_pointer_document() {
        let body = br#"<?xml version="1.0"?><discovery xmlns="http://schemas.xmlsoap.org/disco/"></discovery>"#;
        assert_eq!(classify("text/xml", body), DocumentKind::PointerXml);
    }

    #[test]
    fn test_schema_document_with_prefix() {
        let body = br#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
        assert_eq!(classify("application/octet-stream", body), DocumentKind::SchemaXml);
    }

    #[test]
    fn test_contract_document() {
        let body = br#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"/>"#;
        assert_eq!(classify("text/xml", body), DocumentKind::ContractXml);
    }

    #[test]
    fn test_unknown_root() {
        let body = br#"<rss version="2.0"/>"#;
        assert_eq!(classify("text/xml", body), DocumentKind::UnrecognizedXml);
        let wrong_ns = br#"<discovery xmlns="urn:other"/>"#;
        assert_eq!(classify("text/xml", wrong_ns), DocumentKind::UnrecognizedXml);
    }

    #[test]
    fn test_non_xml_depends_on_content_type() {
        assert_eq!(classify("application/json", b"{}"), DocumentKind::NonXml);
        assert_eq!(classify("text/xml", b"{}"), DocumentKind::UnrecognizedXml);
    }

    #[test]
    fn test_external_dtd_is_not_fetched() {
        let body = br#"<!DOCTYPE discovery SYSTEM "http://127.0.0.1:1/evil.dtd"><discovery xmlns="http://schemas.xmlsoap.org/disco/"/>"#;
        assert_eq!(classify("text/xml", body), DocumentKind::PointerXml);
    }
}
