// Locator resolution: turns a locator returned by a gallery provider into a
// filesystem path.
//
// Document references are decoded by a strategy chosen from the provider
// authority. What remains is either a content locator (resolved through a
// metadata query for the storage path column) or a raw file locator.

use crate::host::{ContentQuery, MetadataQuery, PlatformInfo};
use crate::locator::{Locator, SCHEME_CONTENT, SCHEME_FILE};
use std::collections::HashMap;
use std::path::PathBuf;

pub const AUTHORITY_EXTERNAL_STORAGE: &str = "com.android.externalstorage.documents";
pub const AUTHORITY_DOWNLOADS: &str = "com.android.providers.downloads.documents";
pub const AUTHORITY_MEDIA: &str = "com.android.providers.media.documents";

pub const PUBLIC_DOWNLOADS_LOCATOR: &str = "content://downloads/public_downloads";
pub const IMAGES_LOCATOR: &str = "content://media/external/images/media";
pub const VIDEO_LOCATOR: &str = "content://media/external/video/media";
pub const AUDIO_LOCATOR: &str = "content://media/external/audio/media";

/// Storage path column of media rows
pub const COLUMN_DATA: &str = "_data";

const SELECTION_BY_ID: &str = "_id=?";

/// How the document id of a given provider authority is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStrategy {
    /// `<volume>:<relative path>` under the external storage root
    ExternalStorage,
    /// Numeric id into the public downloads collection
    Downloads,
    /// `<image|video|audio>:<row id>` into the media collections
    Media,
}

/// Authority → strategy mapping
#[derive(Debug, Clone)]
pub struct AuthorityRegistry {
    strategies: HashMap<String, DocumentStrategy>,
}

impl AuthorityRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register(&mut self, authority: impl Into<String>, strategy: DocumentStrategy) {
        self.strategies.insert(authority.into(), strategy);
    }

    pub fn strategy_for(&self, authority: &str) -> Option<DocumentStrategy> {
        self.strategies.get(authority).copied()
    }
}

impl Default for AuthorityRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(AUTHORITY_EXTERNAL_STORAGE, DocumentStrategy::ExternalStorage);
        registry.register(AUTHORITY_DOWNLOADS, DocumentStrategy::Downloads);
        registry.register(AUTHORITY_MEDIA, DocumentStrategy::Media);
        registry
    }
}

/// Outcome of decoding a document reference
enum DocumentStep {
    /// Final path, no query needed
    Path(String),
    /// Rewritten locator plus optional row id filter for the query step
    Query { locator: Locator, row_id: Option<String> },
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct LocatorResolver {
    registry: AuthorityRegistry,
    external_root: PathBuf,
    platform: PlatformInfo,
}

impl LocatorResolver {
    pub fn new(external_root: impl Into<PathBuf>, platform: PlatformInfo) -> Self {
        Self::with_registry(external_root, platform, AuthorityRegistry::default())
    }

    pub fn with_registry(
        external_root: impl Into<PathBuf>,
        platform: PlatformInfo,
        registry: AuthorityRegistry,
    ) -> Self {
        Self {
            registry,
            external_root: external_root.into(),
            platform,
        }
    }

    pub fn registry_mut(&mut self) -> &mut AuthorityRegistry {
        &mut self.registry
    }

    /// Resolves `locator` to a filesystem path, or `None` if it cannot be mapped
    ///
    /// Never fails: query errors are logged and treated as unresolvable.
    pub fn resolve<Q: ContentQuery + ?Sized>(&self, locator: &Locator, content: &Q) -> Option<String> {
        let mut target = locator.clone();
        let mut row_id = None;

        if let Some((strategy, doc_id)) = self.document_reference(locator) {
            log::debug!("Document locator {} ({:?}), id '{}'", locator, strategy, doc_id);
            match self.decode_document(strategy, &doc_id) {
                DocumentStep::Path(path) => return Some(path),
                DocumentStep::Query {
                    locator: rewritten,
                    row_id: id,
                } => {
                    target = rewritten;
                    row_id = id;
                }
                DocumentStep::Unresolved => {
                    log::warn!("Could not decode document id '{}' of {}", doc_id, locator);
                    return None;
                }
            }
        }

        if target.has_scheme(SCHEME_CONTENT) {
            self.query_data_column(&target, row_id, content)
        } else if target.has_scheme(SCHEME_FILE) {
            target.file_path()
        } else {
            log::warn!("Unsupported locator scheme: {}", target);
            None
        }
    }

    fn document_reference(&self, locator: &Locator) -> Option<(DocumentStrategy, String)> {
        if !self.platform.has_documents_api() {
            return None;
        }
        let doc_id = locator.document_id()?;
        let strategy = self.registry.strategy_for(locator.authority()?)?;
        Some((strategy, doc_id))
    }

    fn decode_document(&self, strategy: DocumentStrategy, doc_id: &str) -> DocumentStep {
        match strategy {
            DocumentStrategy::ExternalStorage => match doc_id.split_once(':') {
                Some((_volume, relative)) => DocumentStep::Path(format!(
                    "{}/{}",
                    self.external_root.to_string_lossy().trim_end_matches('/'),
                    relative
                )),
                None => DocumentStep::Unresolved,
            },
            DocumentStrategy::Downloads => match doc_id.parse::<u64>() {
                Ok(id) => match Locator::parse(PUBLIC_DOWNLOADS_LOCATOR)
                    .and_then(|base| base.with_appended_id(id))
                {
                    Ok(locator) => DocumentStep::Query {
                        locator,
                        row_id: None,
                    },
                    Err(_) => DocumentStep::Unresolved,
                },
                Err(_) => DocumentStep::Unresolved,
            },
            DocumentStrategy::Media => {
                let Some((kind, id)) = doc_id.split_once(':') else {
                    return DocumentStep::Unresolved;
                };
                let collection = match kind {
                    "image" => IMAGES_LOCATOR,
                    "video" => VIDEO_LOCATOR,
                    "audio" => AUDIO_LOCATOR,
                    _ => return DocumentStep::Unresolved,
                };
                match Locator::parse(collection) {
                    Ok(locator) => DocumentStep::Query {
                        locator,
                        row_id: Some(id.to_string()),
                    },
                    Err(_) => DocumentStep::Unresolved,
                }
            }
        }
    }

    fn query_data_column<Q: ContentQuery + ?Sized>(
        &self,
        locator: &Locator,
        row_id: Option<String>,
        content: &Q,
    ) -> Option<String> {
        let query = MetadataQuery {
            locator: locator.clone(),
            projection: vec![COLUMN_DATA.to_string()],
            selection: row_id.as_ref().map(|_| SELECTION_BY_ID.to_string()),
            selection_args: row_id.into_iter().collect(),
        };

        match content.query_metadata(&query) {
            Ok(rows) => {
                let path = rows
                    .into_iter()
                    .next()
                    .and_then(|row| row.into_iter().next())
                    .flatten();
                if path.is_none() {
                    log::debug!("No {} row for {}", COLUMN_DATA, locator);
                }
                path
            }
            Err(e) => {
                log::error!("Metadata query for {} failed: {}", locator, e);
                None
            }
        }
    }
}
