//! Error types and handling for disco-core operations.
//!
//! This module provides a single error type that covers every failure the
//! discovery engine can encounter. Errors are categorized for logging and
//! carry hints about recoverability for retry logic.
//!
//! ## Error Categories
//!
//! - **Transport**: HTTP failures and non-success status codes
//! - **Content**: HTML where a document was expected, unrecognized XML roots
//! - **Reference**: empty nested references, wrong document kind for a location
//! - **Aggregate**: `discover_any` attempts that all failed differently
//! - **Budget**: the fixed-point traversal exceeded its configured bounds
//! - **I/O / Serialization / Configuration**: manifest and config handling
//!
//! ## Propagation
//!
//! [`ResolutionContext::resolve`](crate::ResolutionContext::resolve) records
//! every error in the [`ErrorCollector`](crate::ErrorCollector) except the
//! ones for which [`Error::is_fatal`] is true. Direct accessors propagate.
//!
//! ```rust
//! use disco_core::Error;
//!
//! let err = Error::Transport {
//!     url: "http://example.com/service.asmx?wsdl".to_string(),
//!     status: 503,
//! };
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "transport");
//! ```

use thiserror::Error;

/// The main error type for disco-core operations.
///
/// Every public function in disco-core returns `Result<T, Error>`. The error
/// keeps its source chain where one exists, so callers can render nested causes.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading and writing manifest files and their directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed before a response status was available.
    ///
    /// Connection and timeout errors are typically recoverable.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transport returned a non-success status code.
    #[error("Request for '{url}' failed with HTTP status {status}")]
    Transport {
        /// Requested location.
        url: String,
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// HTML was returned where a discoverable document was required and no
    /// usable alternate link was present.
    #[error("Location '{url}' returned content type '{content_type}', expected an XML document")]
    InvalidContentType {
        /// Location that produced the content.
        url: String,
        /// Content type reported by the transport.
        content_type: String,
    },

    /// Every variant rejected the location because it serves an HTML page.
    #[error(
        "'{url}' looks like a human-readable page, not a discovery, contract or schema document"
    )]
    HumanReadablePage {
        /// Location that was probed.
        url: String,
    },

    /// The content parsed as XML but matched no known root element.
    #[error("Document at '{url}' is not a recognized discovery document (root element '{root}')")]
    UnrecognizedDocument {
        /// Location of the document.
        url: String,
        /// Qualified root element (`{namespace}local`), or a short description.
        root: String,
    },

    /// A nested reference carried an empty location.
    ///
    /// This fails the parent document's resolution because an empty
    /// location cannot be deduplicated.
    #[error("Document at '{parent}' contains a reference with an empty location")]
    MalformedReference {
        /// Location of the document that contained the empty reference.
        parent: String,
    },

    /// A cached document exists but is not of the kind the caller required.
    #[error("Document at '{url}' is a {found} document, not a {expected} document")]
    DocumentTypeMismatch {
        /// Location of the cached document.
        url: String,
        /// Kind the caller asked for.
        expected: &'static str,
        /// Kind actually stored.
        found: &'static str,
    },

    /// Every variant attempt in `discover_any` failed with heterogeneous causes.
    #[error("Unable to discover a document at '{url}':\n{}", format_failures(.failures))]
    AggregateDiscoveryFailure {
        /// Location that was probed.
        url: String,
        /// One rendered diagnostic per variant attempt, nested causes included.
        failures: Vec<String>,
    },

    /// The fixed-point traversal exceeded its configured bounds.
    #[error("Resolution budget exceeded ({limit}): {detail}")]
    ResolutionBudgetExceeded {
        /// Which limit tripped (`max_passes` or `max_references`).
        limit: &'static str,
        /// Human-readable detail including the configured value.
        detail: String,
    },

    /// XML could not be read or written.
    #[error("XML error: {0}")]
    Xml(String),

    /// Content did not have the expected structure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Manifest or config serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or cannot be resolved against its base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Requested resource was not found in the session.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

fn format_failures(failures: &[String]) -> String {
    failures
        .iter()
        .map(|failure| format!("  - {failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for network timeouts and connection failures, for
    /// server-side (5xx) transport errors, and for interrupted I/O.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Transport { status, .. } => *status >= 500,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Whether the error must abort traversal instead of being recorded.
    ///
    /// The resolution engine records every other error per location and keeps going.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ResolutionBudgetExceeded { .. })
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful as a structured field in log events.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Transport { .. } => "transport",
            Self::InvalidContentType { .. } | Self::HumanReadablePage { .. } => {
                "invalid_content_type"
            },
            Self::UnrecognizedDocument { .. } => "unrecognized_document",
            Self::MalformedReference { .. } => "malformed_reference",
            Self::DocumentTypeMismatch { .. } => "document_type_mismatch",
            Self::AggregateDiscoveryFailure { .. } => "aggregate",
            Self::ResolutionBudgetExceeded { .. } => "budget",
            Self::Xml(_) => "xml",
            Self::Parse(_) => "parse",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::NotFound(_) => "not_found",
            Self::Other(_) => "other",
        }
    }

    /// Render the error followed by its source chain on one line.
    ///
    /// Used when several failures are folded into one aggregate diagnostic.
    #[must_use]
    pub fn display_chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

/// Convenience type alias for disco-core results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_error_display_formatting() {
        let err = Error::Transport {
            url: "http://h/a.disco".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request for 'http://h/a.disco' failed with HTTP status 404"
        );

        let err = Error::MalformedReference {
            parent: "http://h/a.disco".to_string(),
        };
        assert!(err.to_string().contains("empty location"));

        let err = Error::DocumentTypeMismatch {
            url: "http://h/b.wsdl".to_string(),
            expected: "schema",
            found: "contract",
        };
        assert_eq!(
            err.to_string(),
            "Document at 'http://h/b.wsdl' is a contract document, not a schema document"
        );
    }

    #[test]
    fn test_aggregate_lists_every_failure() {
        let err = Error::AggregateDiscoveryFailure {
            url: "http://h/x".to_string(),
            failures: vec!["first".to_string(), "second".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("  - first"));
        assert!(rendered.contains("  - second"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::Xml("x".into()).category(), "xml");
        assert_eq!(
            Error::HumanReadablePage { url: String::new() }.category(),
            "invalid_content_type"
        );
        assert_eq!(
            Error::ResolutionBudgetExceeded {
                limit: "max_passes",
                detail: String::new()
            }
            .category(),
            "budget"
        );
    }

    #[test]
    fn test_error_recoverability() {
        let server_side = Error::Transport {
            url: String::new(),
            status: 502,
        };
        let client_side = Error::Transport {
            url: String::new(),
            status: 404,
        };
        assert!(server_side.is_recoverable());
        assert!(!client_side.is_recoverable());
        assert!(
            Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")).is_recoverable()
        );
        assert!(!Error::Parse("bad".into()).is_recoverable());
    }

    #[test]
    fn test_only_budget_errors_are_fatal() {
        assert!(
            Error::ResolutionBudgetExceeded {
                limit: "max_references",
                detail: "10".into()
            }
            .is_fatal()
        );
        assert!(!Error::MalformedReference { parent: String::new() }.is_fatal());
        assert!(!Error::Other("boom".into()).is_fatal());
    }

    #[test]
    fn test_display_chain_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = Error::Io(io);
        assert!(err.display_chain().contains("missing file"));
    }

    #[test]
    fn test_url_parse_conversion() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    proptest! {
        #[test]
        fn test_other_error_with_arbitrary_messages(msg in r".{0,200}") {
            let err = Error::Other(msg.clone());
            prop_assert_eq!(err.to_string(), msg);
            prop_assert_eq!(err.category(), "other");
        }
    }
}
