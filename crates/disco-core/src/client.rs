//! The resolution engine.
//!
//! A [`ResolutionContext`] is one discovery session. It owns every table the
//! traversal touches: the [`DocumentStore`], the reference table keyed by
//! location, the additional-information list and the [`ErrorCollector`].
//! Sessions share nothing, so independent sessions can run side by side.
//!
//! ## Resolution
//!
//! Resolving a reference fetches its location, classifies the content,
//! follows at most one HTML alternate link, parses the document, stores it at
//! its final location and registers the references it declares as
//! unresolved. [`ResolutionContext::resolve_all`] repeats this until a pass
//! discovers nothing new.
//!
//! ```rust,no_run
//! use disco_core::{DiscoveryConfig, ResolutionContext};
//!
//! # async fn run() -> disco_core::Result<()> {
//! let mut session = ResolutionContext::new(DiscoveryConfig::load()?)?;
//! session.resolve_all("http://example.com/service.disco").await?;
//!
//! for (location, error) in session.errors() {
//!     eprintln!("{location}: {error}");
//! }
//! println!("{} documents", session.documents().len());
//! # Ok(())
//! # }
//! ```

use crate::classify::{DocumentKind, classify};
use crate::config::DiscoveryConfig;
use crate::content_type;
use crate::document::{AdditionalInfo, ContractDocument, Document, PointerDocument, SchemaDocument};
use crate::errors::ErrorCollector;
use crate::fetcher::{FetchedDocument, HttpTransport, Transport};
use crate::html::scrape_alternate_link;
use crate::location::Location;
use crate::reference::{Reference, ReferenceKind, ResolutionState, nested_references};
use crate::store::DocumentStore;
use crate::xml;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one successful resolution.
struct Resolved {
    /// Where the reference lives now.
    location: Location,
    /// References registered by this resolution.
    added: Vec<Location>,
}

/// One discovery session.
pub struct ResolutionContext {
    transport: Arc<dyn Transport>,
    config: DiscoveryConfig,
    store: DocumentStore,
    references: BTreeMap<Location, Reference>,
    additional_info: Vec<AdditionalInfo>,
    errors: ErrorCollector,
}

impl ResolutionContext {
    /// A session fetching over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// A session fetching through `transport`.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, config: DiscoveryConfig) -> Self {
        Self {
            transport,
            config,
            store: DocumentStore::new(),
            references: BTreeMap::new(),
            additional_info: Vec::new(),
            errors: ErrorCollector::new(),
        }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Every stored document.
    #[must_use]
    pub const fn documents(&self) -> &DocumentStore {
        &self.store
    }

    /// Registered references in location order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    /// The reference registered at `location`.
    #[must_use]
    pub fn reference(&self, location: &Location) -> Option<&Reference> {
        self.references.get(location)
    }

    /// Errors recorded by bulk resolution.
    #[must_use]
    pub const fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    /// Opaque entries collected from every resolved pointer document.
    #[must_use]
    pub fn additional_information(&self) -> &[AdditionalInfo] {
        &self.additional_info
    }

    /// Register `reference` unless its location is already known.
    ///
    /// Returns `true` if it was added.
    pub fn add_reference(&mut self, reference: Reference) -> bool {
        if self.references.contains_key(reference.location()) {
            return false;
        }
        self.references.insert(reference.location().clone(), reference);
        true
    }

    /// Reset the session.
    pub fn clear(&mut self) {
        self.store.clear();
        self.references.clear();
        self.additional_info.clear();
        self.errors.clear();
    }

    /// Resolve the reference registered at `location`.
    ///
    /// Failures are recorded in [`errors`](Self::errors) and the reference is
    /// marked failed; only fatal errors are returned. A location whose
    /// document is already stored returns immediately without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no reference is registered at
    /// `location`, or any error for which [`Error::is_fatal`] holds.
    pub async fn resolve(&mut self, location: &Location) -> Result<()> {
        if !self.references.contains_key(location) {
            return Err(Error::NotFound(format!("no reference registered at '{location}'")));
        }
        self.resolve_recorded(location).await.map(|_| ())
    }

    /// Resolve everything reachable from `start`.
    ///
    /// Seeds a pointer reference at `start` and runs passes until no
    /// unresolved reference is left. Nested pointer documents are followed
    /// depth-first within a pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unusable `start` and
    /// [`Error::ResolutionBudgetExceeded`] when the configured pass or
    /// reference limit is hit. Per-location failures are recorded instead.
    #[instrument(skip(self))]
    pub async fn resolve_all(&mut self, start: &str) -> Result<()> {
        let start = Location::parse(start)?;
        self.add_reference(Reference::pointer(start));
        self.run_to_fixed_point().await
    }

    /// Resolve `start` and its immediate children only.
    ///
    /// Grandchildren are registered but left unresolved.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_all`](Self::resolve_all).
    #[instrument(skip(self))]
    pub async fn resolve_one_level(&mut self, start: &str) -> Result<()> {
        let start = Location::parse(start)?;
        self.add_reference(Reference::pointer(start.clone()));
        self.resolve_recorded(&start).await?;
        let pending = self.pending();
        self.resolve_pass(pending, false).await
    }

    /// Resolve every registered reference that is still unresolved, and
    /// whatever those discover, until a fixed point.
    ///
    /// Continues a session seeded by [`discover`](Self::discover),
    /// [`discover_any`](Self::discover_any) or
    /// [`add_reference`](Self::add_reference) without seeding a new start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResolutionBudgetExceeded`] when the configured pass
    /// or reference limit is hit. Per-location failures are recorded instead.
    #[instrument(skip(self))]
    pub async fn resolve_pending(&mut self) -> Result<()> {
        self.run_to_fixed_point().await
    }

    /// Fetch the pointer document at `url` and register its children.
    ///
    /// Children are left unresolved. HTML pages are followed through one
    /// alternate link.
    ///
    /// # Errors
    ///
    /// Propagates the resolution error, or [`Error::DocumentTypeMismatch`]
    /// if the location serves a contract or schema.
    #[instrument(skip(self))]
    pub async fn discover(&mut self, url: &str) -> Result<&PointerDocument> {
        let location = Location::parse(url)?;
        self.add_reference(Reference::pointer(location.clone()));
        let resolved = self.try_resolve(&location).await?;
        let document = self.stored(&resolved.location)?;
        document
            .as_pointer()
            .ok_or_else(|| mismatch(&resolved.location, ReferenceKind::Pointer, document.kind()))
    }

    /// Discover whatever document lives at `url`.
    ///
    /// The content is fetched once and then read as a pointer, contract and
    /// schema document in that order; the first that parses wins and is
    /// registered with its children left unresolved.
    ///
    /// # Errors
    ///
    /// - [`Error::HumanReadablePage`] if the location serves HTML without a
    ///   usable alternate link
    /// - the single distinct error if every attempt failed the same way
    /// - [`Error::AggregateDiscoveryFailure`] otherwise
    #[instrument(skip(self))]
    pub async fn discover_any(&mut self, url: &str) -> Result<&Document> {
        let location = Location::parse(url)?;
        if self.store.contains(&location) {
            return self.stored(&location);
        }

        let mut fetched = self.transport.fetch(&location).await?;
        if content_type::is_html(&fetched.content_type) {
            let alternate = alternate_link(&fetched)
                .ok_or_else(|| Error::HumanReadablePage {
                    url: location.to_string(),
                })?;
            debug!("following alternate link {} from {}", alternate, location);
            if let Some(resolved) = self.already_resolved(&location, &alternate) {
                return self.stored(&resolved.location);
            }
            fetched = self.transport.fetch(&alternate).await?;
            if content_type::is_html(&fetched.content_type) {
                return Err(Error::HumanReadablePage {
                    url: location.to_string(),
                });
            }
        }

        let final_location = fetched.final_url.clone();
        if self.store.contains(&final_location) {
            let kind = self.stored(&final_location)?.kind();
            self.relocate(&location, &final_location, kind);
            return self.stored(&final_location);
        }

        let mut failures = Vec::new();
        for kind in ReferenceKind::ALL {
            match kind.read_document(&fetched.body) {
                Ok(document) => {
                    debug!("{} reads as a {} document", final_location, kind);
                    self.add_reference(Reference::new(kind, location.clone()));
                    let resolved = self.register(&location, final_location, document)?;
                    return self.stored(&resolved.location);
                },
                Err(error) => {
                    debug!("{} is not a {} document: {}", final_location, kind, error);
                    failures.push(error);
                },
            }
        }

        let mut messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
        messages.sort();
        messages.dedup();
        if messages.len() > 1 {
            return Err(Error::AggregateDiscoveryFailure {
                url: location.to_string(),
                failures: failures.iter().map(Error::display_chain).collect(),
            });
        }
        Err(failures.into_iter().next().unwrap_or_else(|| Error::UnrecognizedDocument {
            url: location.to_string(),
            root: "unknown".to_string(),
        }))
    }

    /// The document at `location`, resolving it on demand.
    ///
    /// # Errors
    ///
    /// Propagates the resolution error for this location.
    pub async fn document(&mut self, location: &Location) -> Result<&Document> {
        let location = self.ensure_resolved(location).await?;
        self.stored(&location)
    }

    /// The pointer document at `location`, resolving it on demand.
    ///
    /// # Errors
    ///
    /// Propagates the resolution error, or [`Error::DocumentTypeMismatch`]
    /// if a different kind of document is stored there.
    pub async fn pointer_document(&mut self, location: &Location) -> Result<&PointerDocument> {
        let document = self.document(location).await?;
        document
            .as_pointer()
            .ok_or_else(|| mismatch(location, ReferenceKind::Pointer, document.kind()))
    }

    /// The contract document at `location`, resolving it on demand.
    ///
    /// # Errors
    ///
    /// Same as [`pointer_document`](Self::pointer_document).
    pub async fn contract_document(&mut self, location: &Location) -> Result<&ContractDocument> {
        let document = self.document(location).await?;
        document
            .as_contract()
            .ok_or_else(|| mismatch(location, ReferenceKind::Contract, document.kind()))
    }

    /// The schema document at `location`, fetched or inline.
    ///
    /// # Errors
    ///
    /// Same as [`pointer_document`](Self::pointer_document).
    pub async fn schema_document(&mut self, location: &Location) -> Result<&SchemaDocument> {
        if self.store.is_inline(location) {
            return self
                .store
                .get_inline(location)
                .ok_or_else(|| Error::NotFound(location.to_string()));
        }
        let document = self.document(location).await?;
        document
            .as_schema()
            .ok_or_else(|| mismatch(location, ReferenceKind::Schema, document.kind()))
    }

    /// Run passes until no unresolved reference remains.
    pub(crate) async fn run_to_fixed_point(&mut self) -> Result<()> {
        let mut passes = 0;
        loop {
            let pending = self.pending();
            if pending.is_empty() {
                break;
            }
            passes += 1;
            if passes > self.config.max_passes {
                return Err(Error::ResolutionBudgetExceeded {
                    limit: "max_passes",
                    detail: format!(
                        "{} references still unresolved after {} passes",
                        pending.len(),
                        self.config.max_passes
                    ),
                });
            }
            let before = self.references.len();
            self.resolve_pass(pending, true).await?;
            debug!(
                pass = passes,
                added = self.references.len().saturating_sub(before),
                "resolution pass complete"
            );
        }

        info!(
            documents = self.store.len(),
            references = self.references.len(),
            errors = self.errors.len(),
            "resolution reached a fixed point"
        );
        Ok(())
    }

    /// Resolve `pending` in order; with `recurse`, child pointer references
    /// are resolved depth-first as soon as their parent is.
    async fn resolve_pass(&mut self, pending: Vec<Location>, recurse: bool) -> Result<()> {
        let mut stack: Vec<Location> = pending.into_iter().rev().collect();
        while let Some(location) = stack.pop() {
            let unresolved = self
                .references
                .get(&location)
                .is_some_and(|r| r.state() == ResolutionState::Unresolved);
            if !unresolved {
                continue;
            }

            let added = self.resolve_recorded(&location).await?;
            self.check_reference_budget()?;

            if recurse {
                let pointers = added.into_iter().rev().filter(|child| {
                    self.references
                        .get(child)
                        .is_some_and(|r| r.kind() == ReferenceKind::Pointer)
                });
                stack.extend(pointers);
            }
        }
        Ok(())
    }

    /// Resolve and record non-fatal failures; returns the references added.
    async fn resolve_recorded(&mut self, location: &Location) -> Result<Vec<Location>> {
        match self.try_resolve(location).await {
            Ok(resolved) => {
                self.errors.remove(location);
                Ok(resolved.added)
            },
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => {
                warn!(
                    location = %location,
                    category = error.category(),
                    "resolution failed: {error}"
                );
                self.errors.set(location.clone(), error);
                Ok(Vec::new())
            },
        }
    }

    /// Resolve the reference at `location`, registering it first if needed.
    async fn ensure_resolved(&mut self, location: &Location) -> Result<Location> {
        if self.store.contains(location) {
            return Ok(location.clone());
        }
        self.add_reference(Reference::pointer(location.clone()));
        self.try_resolve(location).await.map(|resolved| resolved.location)
    }

    /// Resolve the reference at `location`, returning any failure.
    ///
    /// The reference ends `Resolved` or `Failed`; nothing is recorded in the
    /// error collector.
    async fn try_resolve(&mut self, location: &Location) -> Result<Resolved> {
        if self.store.contains(location) {
            return Ok(Resolved {
                location: location.clone(),
                added: Vec::new(),
            });
        }
        if self.store.is_inline(location) {
            self.set_state(location, ResolutionState::Resolved);
            return Ok(Resolved {
                location: location.clone(),
                added: Vec::new(),
            });
        }

        self.set_state(location, ResolutionState::Resolving);
        let result = self.fetch_and_register(location).await;
        if result.is_err() {
            self.set_state(location, ResolutionState::Failed);
        }
        result
    }

    async fn fetch_and_register(&mut self, requested: &Location) -> Result<Resolved> {
        let mut current = requested.clone();
        let mut fetched = self.transport.fetch(&current).await?;
        let mut followed_link = false;

        loop {
            if fetched.final_url != current {
                debug!("{} redirected to {}", current, fetched.final_url);
                current = fetched.final_url.clone();
                if let Some(resolved) = self.already_resolved(requested, &current) {
                    return Ok(resolved);
                }
            }

            let kind = match classify(&fetched.content_type, &fetched.body) {
                DocumentKind::Html => {
                    // One hop through an HTML landing page, never a chain.
                    let alternate = if followed_link {
                        None
                    } else {
                        alternate_link(&fetched)
                    };
                    let Some(alternate) = alternate else {
                        return Err(Error::InvalidContentType {
                            url: current.to_string(),
                            content_type: fetched.content_type,
                        });
                    };
                    debug!("following alternate link {} from {}", alternate, current);
                    followed_link = true;
                    current = alternate;
                    if let Some(resolved) = self.already_resolved(requested, &current) {
                        return Ok(resolved);
                    }
                    fetched = self.transport.fetch(&current).await?;
                    continue;
                },
                DocumentKind::PointerXml => ReferenceKind::Pointer,
                DocumentKind::ContractXml => ReferenceKind::Contract,
                DocumentKind::SchemaXml => ReferenceKind::Schema,
                DocumentKind::UnrecognizedXml => {
                    let (namespace, local_name) = xml::root_name(&fetched.body)?;
                    return Err(Error::UnrecognizedDocument {
                        url: current.to_string(),
                        root: namespace.map_or_else(
                            || local_name.clone(),
                            |ns| format!("{{{ns}}}{local_name}"),
                        ),
                    });
                },
                DocumentKind::NonXml => {
                    return Err(Error::InvalidContentType {
                        url: current.to_string(),
                        content_type: fetched.content_type,
                    });
                },
            };

            let document = kind.read_document(&fetched.body)?;
            return self.register(requested, current, document);
        }
    }

    /// Short-circuit when a redirect lands on an already stored location.
    fn already_resolved(&mut self, requested: &Location, current: &Location) -> Option<Resolved> {
        let kind = self.store.get(current)?.kind();
        debug!("{} is already resolved as {}", requested, current);
        self.relocate(requested, current, kind);
        Some(Resolved {
            location: current.clone(),
            added: Vec::new(),
        })
    }

    /// Store `document` at `location` and register its nested references.
    ///
    /// Nested references are validated before anything is stored, so a
    /// rejected document leaves the session untouched.
    pub(crate) fn register(
        &mut self,
        requested: &Location,
        location: Location,
        document: Document,
    ) -> Result<Resolved> {
        let children = self.children_of(&location, &document)?;
        self.relocate(requested, &location, document.kind());

        match &document {
            Document::Pointer(pointer) => {
                self.additional_info
                    .extend(pointer.additional_info.iter().cloned());
            },
            Document::Contract(contract) => {
                for inline in &contract.inline_schemas {
                    self.store
                        .put_inline(location.inline(&inline.fragment), inline.schema.clone());
                }
            },
            Document::Schema(_) => {},
        }
        self.store.put(location.clone(), document);

        let added = children
            .into_iter()
            .filter_map(|child| {
                let key = child.location().clone();
                self.add_reference(child).then_some(key)
            })
            .collect();
        Ok(Resolved { location, added })
    }

    /// Re-register the nested references of a document already in the store.
    pub(crate) fn register_children(&mut self, location: &Location) -> Result<Vec<Location>> {
        let Some(document) = self.store.get(location) else {
            return Ok(Vec::new());
        };
        let children = self.children_of(location, document)?;
        Ok(children
            .into_iter()
            .filter_map(|child| {
                let key = child.location().clone();
                self.add_reference(child).then_some(key)
            })
            .collect())
    }

    /// Place a document loaded from elsewhere into the session as resolved.
    pub(crate) fn insert_resolved(&mut self, mut reference: Reference, document: Document) {
        let location = reference.location().clone();
        reference.retype(document.kind());
        reference.set_state(ResolutionState::Resolved);
        if let Document::Contract(contract) = &document {
            for inline in &contract.inline_schemas {
                self.store
                    .put_inline(location.inline(&inline.fragment), inline.schema.clone());
            }
        }
        if let Document::Pointer(pointer) = &document {
            self.additional_info
                .extend(pointer.additional_info.iter().cloned());
        }
        self.store.put(location.clone(), document);
        self.references.insert(location, reference);
    }

    /// Record a failure that did not come from [`resolve`](Self::resolve).
    pub(crate) fn record_error(&mut self, location: Location, error: Error) {
        warn!(
            location = %location,
            category = error.category(),
            "{error}"
        );
        self.set_state(&location, ResolutionState::Failed);
        self.errors.set(location, error);
    }

    /// Register a schema embedded elsewhere under its inline key.
    pub(crate) fn insert_inline(&mut self, location: Location, schema: SchemaDocument) {
        if !self.store.is_inline(&location) {
            self.store.put_inline(location, schema);
        }
    }

    /// Normalized nested references of `document`, which lives at `base`.
    fn children_of(&self, base: &Location, document: &Document) -> Result<Vec<Reference>> {
        let own_inline: Vec<Location> = document
            .as_contract()
            .map(|contract| {
                contract
                    .inline_schemas
                    .iter()
                    .map(|inline| base.inline(&inline.fragment))
                    .collect()
            })
            .unwrap_or_default();

        let mut children = Vec::new();
        for nested in nested_references(document) {
            if nested.location.trim().is_empty() {
                if matches!(document, Document::Pointer(_)) {
                    return Err(Error::MalformedReference {
                        parent: base.to_string(),
                    });
                }
                continue;
            }

            let location = base.join(&nested.location)?;
            if self.store.is_inline(&location) || own_inline.contains(&location) {
                continue;
            }
            let child = match nested.kind {
                ReferenceKind::Pointer => Reference::pointer(location),
                ReferenceKind::Contract => {
                    let doc_location = nested
                        .doc_location
                        .as_deref()
                        .map(str::trim)
                        .filter(|doc| !doc.is_empty())
                        .map(|doc| base.join(doc))
                        .transpose()?;
                    Reference::contract(location, doc_location)
                },
                ReferenceKind::Schema => Reference::schema(location, nested.target_namespace),
            };
            children.push(child);
        }
        Ok(children)
    }

    /// Move the reference at `from` to `to`, marking it resolved as `kind`.
    ///
    /// If `to` already holds a reference, that one is kept and `from` is
    /// merged into it.
    fn relocate(&mut self, from: &Location, to: &Location, kind: ReferenceKind) {
        let moved = self.references.remove(from);
        if let Some(existing) = self.references.get_mut(to) {
            debug!("merged reference {} into {}", from, to);
            existing.retype(kind);
            existing.set_state(ResolutionState::Resolved);
            return;
        }

        let mut reference = moved.unwrap_or_else(|| Reference::new(kind, to.clone()));
        if reference.kind() != kind {
            debug!(
                "{} was referenced as {} but holds a {} document",
                to,
                reference.kind(),
                kind
            );
            reference.retype(kind);
        }
        reference.set_location(to.clone());
        reference.set_state(ResolutionState::Resolved);
        self.references.insert(to.clone(), reference);
    }

    fn set_state(&mut self, location: &Location, state: ResolutionState) {
        if let Some(reference) = self.references.get_mut(location) {
            reference.set_state(state);
        }
    }

    fn pending(&self) -> Vec<Location> {
        self.references
            .values()
            .filter(|r| r.state() == ResolutionState::Unresolved)
            .map(|r| r.location().clone())
            .collect()
    }

    fn check_reference_budget(&self) -> Result<()> {
        if self.references.len() > self.config.max_references {
            return Err(Error::ResolutionBudgetExceeded {
                limit: "max_references",
                detail: format!(
                    "{} references registered, limit is {}",
                    self.references.len(),
                    self.config.max_references
                ),
            });
        }
        Ok(())
    }

    fn stored(&self, location: &Location) -> Result<&Document> {
        self.store
            .get(location)
            .ok_or_else(|| Error::NotFound(format!("no document stored at '{location}'")))
    }
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("config", &self.config)
            .field("documents", &self.store.len())
            .field("references", &self.references.len())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

fn alternate_link(fetched: &FetchedDocument) -> Option<Location> {
    let html = content_type::decode_text(&fetched.content_type, &fetched.body);
    let href = scrape_alternate_link(&html)?;
    fetched.final_url.join(&href).ok()
}

fn mismatch(location: &Location, expected: ReferenceKind, found: ReferenceKind) -> Error {
    Error::DocumentTypeMismatch {
        url: location.to_string(),
        expected: expected.label(),
        found: found.label(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const DISCO: &str = "text/xml; charset=utf-8";

    #[derive(Default)]
    struct MapTransport {
        responses: HashMap<String, (String, Vec<u8>)>,
        calls: Mutex<Vec<String>>,
    }

    impl MapTransport {
        fn with(mut self, url: &str, content_type: &str, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), (content_type.to_string(), body.as_bytes().to_vec()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MapTransport {
        async fn fetch(&self, url: &Location) -> Result<FetchedDocument> {
            self.calls.lock().unwrap().push(url.to_string());
            let (content_type, body) =
                self.responses
                    .get(url.as_str())
                    .cloned()
                    .ok_or_else(|| Error::Transport {
                        url: url.to_string(),
                        status: 404,
                    })?;
            Ok(FetchedDocument {
                final_url: url.clone(),
                content_type,
                body,
            })
        }
    }

    fn session(transport: &Arc<MapTransport>) -> ResolutionContext {
        ResolutionContext::with_transport(transport.clone(), DiscoveryConfig::default())
    }

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_requires_registered_reference() {
        let transport = Arc::new(MapTransport::default());
        let mut ctx = session(&transport);
        let err = ctx.resolve(&loc("http://h/a.disco")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_not_returned() {
        let transport = Arc::new(MapTransport::default());
        let mut ctx = session(&transport);
        let a = loc("http://h/a.disco");
        ctx.add_reference(Reference::pointer(a.clone()));

        ctx.resolve(&a).await.unwrap();

        assert_eq!(ctx.reference(&a).unwrap().state(), ResolutionState::Failed);
        assert_eq!(ctx.errors().get(&a).unwrap().category(), "transport");
        assert!(ctx.documents().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_root_is_reported() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/x.xml",
            DISCO,
            r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#,
        ));
        let mut ctx = session(&transport);
        let x = loc("http://h/x.xml");
        ctx.add_reference(Reference::pointer(x.clone()));
        ctx.resolve(&x).await.unwrap();

        match ctx.errors().get(&x) {
            Some(Error::UnrecognizedDocument { root, .. }) => {
                assert_eq!(root, "{http://www.w3.org/2005/Atom}feed");
            },
            other => panic!("expected unrecognized document, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_html_without_link_is_invalid_content_type() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/index.html",
            "text/html",
            "<html><head><title>x</title></head><body></body></html>",
        ));
        let mut ctx = session(&transport);
        let page = loc("http://h/index.html");
        ctx.add_reference(Reference::pointer(page.clone()));
        ctx.resolve(&page).await.unwrap();

        assert!(matches!(
            ctx.errors().get(&page),
            Some(Error::InvalidContentType { .. })
        ));
    }

    #[tokio::test]
    async fn test_contract_reference_is_retyped_from_content() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/svc",
            DISCO,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
        ));
        let mut ctx = session(&transport);
        let svc = loc("http://h/svc");
        ctx.add_reference(Reference::contract(svc.clone(), None));
        ctx.resolve(&svc).await.unwrap();

        let reference = ctx.reference(&svc).unwrap();
        assert_eq!(reference.kind(), ReferenceKind::Schema);
        assert_eq!(reference.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn test_inline_schemas_are_never_fetched() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/b.wsdl",
            DISCO,
            r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" xmlns:s="http://www.w3.org/2001/XMLSchema">
                 <types><s:schema id="types"/></types>
               </definitions>"#,
        ));
        let mut ctx = session(&transport);
        let b = loc("http://h/b.wsdl");
        ctx.add_reference(Reference::contract(b.clone(), None));
        ctx.resolve(&b).await.unwrap();

        let inline = b.inline("types");
        ctx.add_reference(Reference::schema(inline.clone(), None));
        ctx.resolve(&inline).await.unwrap();

        assert_eq!(transport.calls(), vec!["http://h/b.wsdl".to_string()]);
        assert_eq!(ctx.reference(&inline).unwrap().state(), ResolutionState::Resolved);
        assert!(ctx.schema_document(&inline).await.is_ok());
    }

    #[tokio::test]
    async fn test_typed_accessor_reports_mismatch() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/c.xsd",
            DISCO,
            r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"/>"#,
        ));
        let mut ctx = session(&transport);
        let c = loc("http://h/c.xsd");

        let err = ctx.contract_document(&c).await.unwrap_err();
        assert!(matches!(
            err,
            Error::DocumentTypeMismatch {
                expected: "contract",
                found: "schema",
                ..
            }
        ));
        assert!(ctx.schema_document(&c).await.is_ok());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_typed_accessor_propagates_resolution_error() {
        let transport = Arc::new(MapTransport::default());
        let mut ctx = session(&transport);
        let err = ctx
            .pointer_document(&loc("http://h/missing.disco"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { status: 404, .. }));
        assert!(ctx.errors().is_empty());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let transport = Arc::new(MapTransport::default().with(
            "http://h/a.disco",
            DISCO,
            r#"<discovery xmlns="http://schemas.xmlsoap.org/disco/">
                 <soap address="http://h/svc" binding="Svc" xmlns="http://schemas.xmlsoap.org/disco/soap/"/>
                 <discoveryRef ref="gone.disco"/>
               </discovery>"#,
        ));
        let mut ctx = session(&transport);
        ctx.resolve_all("http://h/a.disco").await.unwrap();
        assert_eq!(ctx.additional_information().len(), 1);
        assert_eq!(ctx.errors().len(), 1);

        ctx.clear();
        assert!(ctx.documents().is_empty());
        assert_eq!(ctx.references().count(), 0);
        assert!(ctx.additional_information().is_empty());
        assert!(ctx.errors().is_empty());
    }
}
