//! Per-location error table.
//!
//! Resolution records a failure here instead of aborting the traversal. A
//! later failure at the same location replaces the earlier one.

use crate::Error;
use crate::location::Location;
use std::collections::BTreeMap;

/// Errors encountered during resolution, keyed by location.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: BTreeMap<Location, Error>,
}

impl ErrorCollector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` for `location`, replacing any earlier entry.
    pub fn set(&mut self, location: Location, error: Error) {
        self.errors.insert(location, error);
    }

    /// The error recorded for `location`.
    #[must_use]
    pub fn get(&self, location: &Location) -> Option<&Error> {
        self.errors.get(location)
    }

    /// Forget the error for `location`, e.g. after it resolved on retry.
    pub fn remove(&mut self, location: &Location) -> Option<Error> {
        self.errors.remove(location)
    }

    /// Forget every error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Recorded errors in location order.
    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Error)> {
        self.errors.iter()
    }

    /// Number of locations with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether resolution recorded no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<'a> IntoIterator for &'a ErrorCollector {
    type Item = (&'a Location, &'a Error);
    type IntoIter = std::collections::btree_map::Iter<'a, Location, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
