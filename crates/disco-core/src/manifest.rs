//! On-disk manifests of a resolved session.
//!
//! A manifest is a directory holding one file per document plus an index
//! document naming, for each file, the reference type and the location it
//! came from:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <DiscoveryClientResultsFile>
//!   <Results>
//!     <DiscoveryClientResult referenceType="DiscoveryDocumentReference" url="http://h/a.disco" filename="a.disco"/>
//!     <DiscoveryClientResult referenceType="ContractReference" url="http://h/b.asmx?wsdl" filename="b.wsdl"/>
//!   </Results>
//! </DiscoveryClientResultsFile>
//! ```
//!
//! File names are unique per manifest, compared case-insensitively. Reading a
//! manifest restores the session and fetches only what the manifest lacks.

use crate::client::ResolutionContext;
use crate::classify::{DocumentKind, classify};
use crate::content_type;
use crate::document::Document;
use crate::location::Location;
use crate::reference::{Reference, ReferenceKind};
use crate::xml;
use crate::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Default index file name.
pub const DEFAULT_INDEX_NAME: &str = "results.discomap";

const ROOT: &str = "DiscoveryClientResultsFile";
const RESULTS: &str = "Results";
const RESULT: &str = "DiscoveryClientResult";

/// One record of a manifest index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Reference type; `None` when the index left it empty.
    pub kind: Option<ReferenceKind>,
    /// Location the document came from.
    pub url: String,
    /// File path relative to the index file's directory.
    pub filename: String,
}

impl ResolutionContext {
    /// Write every stored document and inline schema to `directory`, followed
    /// by an index named `index_name`.
    ///
    /// Returns the path of the index file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any file cannot be written.
    #[instrument(skip(self), fields(directory = %directory.display()))]
    pub fn write_all(&self, directory: &Path, index_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(directory)?;

        let mut names = UniqueNames::default();
        names.reserve(index_name);
        let mut entries = Vec::new();

        for (location, document) in self.documents().iter() {
            let reference = self
                .reference(location)
                .filter(|r| r.kind() == document.kind())
                .cloned()
                .unwrap_or_else(|| Reference::new(document.kind(), location.clone()));
            entries.push(write_entry(directory, &mut names, &reference, document)?);
        }

        for (location, schema) in self.documents().inline_iter() {
            let reference = Reference::schema(location.clone(), schema.target_namespace.clone());
            let document = Document::Schema(schema.clone());
            entries.push(write_entry(directory, &mut names, &reference, &document)?);
        }

        let index_path = directory.join(index_name);
        fs::write(&index_path, write_index(&entries)?)?;
        info!(
            files = entries.len(),
            "wrote manifest {}",
            index_path.display()
        );
        Ok(index_path)
    }

    /// Restore a session from the manifest index at `index_path`.
    ///
    /// Documents found on disk are loaded as resolved; records whose file is
    /// missing are registered unresolved. The references of every loaded
    /// document are re-derived and the fixed-point loop then fetches whatever
    /// the manifest does not contain.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read or parsed, or if the
    /// follow-up resolution exceeds its budget. Problems with individual
    /// records are recorded in [`errors`](Self::errors).
    #[instrument(skip(self), fields(index = %index_path.display()))]
    pub async fn read_all(&mut self, index_path: &Path) -> Result<()> {
        let index = fs::read(index_path)?;
        let entries = read_index(&index)?;
        let base = index_path.parent().unwrap_or_else(|| Path::new("."));

        let mut loaded = Vec::new();
        let mut inline = Vec::new();
        for entry in entries {
            let location = match Location::parse(&entry.url) {
                Ok(location) => location,
                Err(error) => {
                    warn!("skipping manifest record '{}': {}", entry.filename, error);
                    continue;
                },
            };
            if !is_contained(&entry.filename) {
                self.add_reference(Reference::new(
                    entry.kind.unwrap_or(ReferenceKind::Pointer),
                    location.clone(),
                ));
                self.record_error(
                    location,
                    Error::Parse(format!(
                        "manifest file '{}' is outside the manifest directory",
                        entry.filename
                    )),
                );
                continue;
            }

            let bytes = match fs::read(base.join(&entry.filename)) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if location.fragment().is_some() {
                        // restored with its contract
                        continue;
                    }
                    debug!("{} is not in the manifest directory; will fetch", entry.filename);
                    let kind = entry.kind.unwrap_or(ReferenceKind::Pointer);
                    self.add_reference(Reference::new(kind, location));
                    continue;
                },
                Err(e) => return Err(e.into()),
            };

            let Some(kind) = entry.kind.or_else(|| sniff(&bytes)) else {
                self.add_reference(Reference::pointer(location.clone()));
                self.record_error(
                    location.clone(),
                    Error::UnrecognizedDocument {
                        url: location.to_string(),
                        root: format!("manifest file '{}'", entry.filename),
                    },
                );
                continue;
            };

            match kind.read_document(&bytes) {
                Ok(Document::Schema(schema)) if location.fragment().is_some() => {
                    inline.push((location, schema));
                },
                Ok(document) => {
                    self.insert_resolved(Reference::new(kind, location.clone()), document);
                    loaded.push(location);
                },
                Err(error) => {
                    self.add_reference(Reference::new(kind, location.clone()));
                    self.record_error(location, error);
                },
            }
        }

        for (location, schema) in inline {
            self.insert_inline(location, schema);
        }
        for location in loaded {
            if let Err(error) = self.register_children(&location) {
                self.record_error(location, error);
            }
        }

        info!(
            documents = self.documents().len(),
            "loaded manifest {}",
            index_path.display()
        );
        self.run_to_fixed_point().await
    }
}

/// File names already used by one manifest, compared case-insensitively.
#[derive(Debug, Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_lowercase());
    }

    /// `name` itself if free, else `name` with 0, 1, ... before the extension.
    fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }
        let (stem, extension) = name
            .rsplit_once('.')
            .map_or((name, String::new()), |(stem, ext)| (stem, format!(".{ext}")));
        (0_usize..)
            .map(|i| format!("{stem}{i}{extension}"))
            .find(|candidate| self.taken.insert(candidate.to_lowercase()))
            .unwrap_or_else(|| name.to_string())
    }
}

fn write_entry(
    directory: &Path,
    names: &mut UniqueNames,
    reference: &Reference,
    document: &Document,
) -> Result<ManifestEntry> {
    let filename = names.claim(&reference.default_file_name(Some(document)));
    let mut file = fs::File::create(directory.join(&filename))?;
    reference.write_document(document, &mut file)?;
    debug!("wrote {} as {}", reference.location(), filename);
    Ok(ManifestEntry {
        kind: Some(reference.kind()),
        url: reference.location().to_string(),
        filename,
    })
}

/// Whether `filename` stays inside the directory it is joined to.
fn is_contained(filename: &str) -> bool {
    Path::new(filename)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn sniff(bytes: &[u8]) -> Option<ReferenceKind> {
    match classify(content_type::XML, bytes) {
        DocumentKind::PointerXml => Some(ReferenceKind::Pointer),
        DocumentKind::ContractXml => Some(ReferenceKind::Contract),
        DocumentKind::SchemaXml => Some(ReferenceKind::Schema),
        _ => None,
    }
}

/// Serialize a manifest index.
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn write_index(entries: &[ManifestEntry]) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
    writer.write_event(Event::Start(BytesStart::new(RESULTS)))?;
    for entry in entries {
        let mut result = BytesStart::new(RESULT);
        result.push_attribute((
            "referenceType",
            entry.kind.map_or("", ReferenceKind::type_name),
        ));
        result.push_attribute(("url", entry.url.as_str()));
        result.push_attribute(("filename", entry.filename.as_str()));
        writer.write_event(Event::Empty(result))?;
    }
    writer.write_event(Event::End(BytesEnd::new(RESULTS)))?;
    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    Ok(writer.into_inner())
}

/// Parse a manifest index.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document is not a manifest index or a
/// record lacks its `url` or `filename`.
pub fn read_index(bytes: &[u8]) -> Result<Vec<ManifestEntry>> {
    let root = xml::parse(bytes)?;
    if root.local_name != ROOT {
        return Err(Error::Parse(format!(
            "not a manifest index (root element '{}')",
            root.qualified_name()
        )));
    }

    root.children
        .iter()
        .filter(|child| child.local_name == RESULTS)
        .flat_map(|results| results.children.iter())
        .filter(|child| child.local_name == RESULT)
        .map(|result| {
            let required = |name: &str| {
                result
                    .attr(name)
                    .map(str::to_string)
                    .filter(|value| !value.trim().is_empty())
                    .ok_or_else(|| Error::Parse(format!("manifest record without '{name}'")))
            };
            Ok(ManifestEntry {
                kind: result.attr("referenceType").and_then(ReferenceKind::from_type_name),
                url: required("url")?,
                filename: required("filename")?,
            })
        })
        .collect()
}
