//! Normalized absolute locations.
//!
//! A [`Location`] is the primary key of every table in a
//! [`ResolutionContext`](crate::ResolutionContext). Two locations are the same
//! entity iff their normalized strings are equal, so all construction goes
//! through [`url::Url`] parsing (scheme/host lowercasing, dot-segment removal,
//! default-port elision).

use crate::{Error, Result};
use std::fmt;
use url::Url;

/// File name used when neither the document nor its location yield one.
pub const FALLBACK_FILE_STEM: &str = "item";

/// A normalized absolute URL identifying one document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(String);

impl Location {
    /// Parse and normalize an absolute URL.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("location is empty".to_string()));
        }
        let url = Url::parse(trimmed)
            .map_err(|e| Error::InvalidUrl(format!("'{trimmed}': {e}")))?;
        Ok(Self(url.into()))
    }

    /// Resolve a possibly relative reference against this location.
    pub fn join(&self, reference: &str) -> Result<Self> {
        let base = Url::parse(&self.0)?;
        let joined = base
            .join(reference.trim())
            .map_err(|e| Error::InvalidUrl(format!("'{reference}' relative to '{self}': {e}")))?;
        Ok(Self(joined.into()))
    }

    /// Key for a schema embedded in the document at this location.
    ///
    /// The fragment never reaches the network: inline keys are only looked up
    /// in the inline table.
    #[must_use]
    pub fn inline(&self, fragment: &str) -> Self {
        let base = self.0.split('#').next().unwrap_or(&self.0);
        Self(format!("{base}#{fragment}"))
    }

    /// Fragment of an inline key, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.0.split_once('#').map(|(_, fragment)| fragment)
    }

    /// The normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File stem derived from the last path segment.
    ///
    /// Takes the text after the last `/`, stops at the first `.` and at any
    /// `?`, and replaces characters that are invalid in file names. Falls back
    /// to [`FALLBACK_FILE_STEM`].
    #[must_use]
    pub fn file_stem(&self) -> String {
        let without_fragment = self.0.split('#').next().unwrap_or_default();
        let without_query = without_fragment.split('?').next().unwrap_or_default();
        let segment = without_query
            .rsplit('/')
            .next()
            .unwrap_or_default();
        let stem = segment.split('.').next().unwrap_or_default();
        make_valid_file_name(stem)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Replace characters that cannot appear in a file name with `_`.
///
/// Returns [`FALLBACK_FILE_STEM`] when nothing usable remains.
#[must_use]
pub fn make_valid_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = sanitized.trim_matches('.').to_string();
    if sanitized.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        sanitized
    }
}
