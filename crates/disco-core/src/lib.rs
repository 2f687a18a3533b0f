//! # disco-core
//!
//! Reference-resolution engine for web service discovery documents.
//!
//! Starting from one location, the engine downloads, sniffs and parses
//! pointer (`.disco`), contract (WSDL) and schema (XSD) documents, follows the
//! references they declare until no new ones appear, and can persist the
//! resulting document set as a manifest directory.
//!
//! ## Architecture
//!
//! - **Classification**: content-type and root-element sniffing ([`classify`]),
//!   plus alternate-link scraping for HTML landing pages ([`html`])
//! - **Reference model**: the closed set of reference variants ([`reference`])
//!   and the documents they resolve to ([`document`])
//! - **Session**: [`ResolutionContext`] owns the [`DocumentStore`], the
//!   reference table and the [`ErrorCollector`] and runs the resolution loop
//! - **Manifests**: [`ResolutionContext::write_all`] and
//!   [`ResolutionContext::read_all`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use disco_core::{DiscoveryConfig, ResolutionContext, Result};
//! use std::path::Path;
//!
//! # async fn run() -> Result<()> {
//! let mut session = ResolutionContext::new(DiscoveryConfig::load()?)?;
//! session.resolve_all("http://example.com/service.disco").await?;
//! session.write_all(Path::new("out"), disco_core::manifest::DEFAULT_INDEX_NAME)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Bulk resolution never aborts on one bad location. Failures are recorded
//! per location and stay queryable after the call returns:
//!
//! ```rust,no_run
//! # async fn run(session: &mut disco_core::ResolutionContext) -> disco_core::Result<()> {
//! session.resolve_all("http://example.com/service.disco").await?;
//! for (location, error) in session.errors() {
//!     eprintln!("{location} [{}]: {error}", error.category());
//! }
//! # Ok(())
//! # }
//! ```

/// Content classification
pub mod classify;
/// The resolution session and engine
pub mod client;
/// Configuration loading
pub mod config;
/// Media-type helpers
pub mod content_type;
/// Parsed documents
pub mod document;
/// Error types and result aliases
pub mod error;
/// Per-location error table
pub mod errors;
/// Transport seam and the HTTP implementation
pub mod fetcher;
/// Alternate-link scraping for HTML pages
pub mod html;
/// Normalized locations
pub mod location;
/// Manifest writer and reader
pub mod manifest;
/// Reference variants and their dispatch
pub mod reference;
/// Document cache
pub mod store;
/// Element tree over quick-xml
pub mod xml;

// Re-export commonly used types
pub use classify::DocumentKind;
pub use client::ResolutionContext;
pub use config::DiscoveryConfig;
pub use document::{
    AdditionalInfo, ContractDocument, Document, PointerDocument, PointerEntry, SchemaDocument,
};
pub use error::{Error, Result};
pub use errors::ErrorCollector;
pub use fetcher::{FetchedDocument, HttpTransport, Transport};
pub use location::Location;
pub use manifest::ManifestEntry;
pub use reference::{Reference, ReferenceKind, ResolutionState};
pub use store::DocumentStore;
