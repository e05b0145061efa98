// Opaque resource locators as handed around by content providers.
//
// A locator looks like `scheme://authority/path?query#fragment`. Only the
// pieces needed to route a locator to a filesystem path are interpreted here.

use crate::error::CaptureError;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::Path;
use url::Url;

pub const SCHEME_CONTENT: &str = "content";
pub const SCHEME_FILE: &str = "file";

const PATH_DOCUMENT: &str = "document";
const PATH_TREE: &str = "tree";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    url: Url,
}

impl Locator {
    pub fn parse(s: &str) -> Result<Self, CaptureError> {
        if s.trim().is_empty() {
            return Err(CaptureError::InvalidLocator("empty locator".to_string()));
        }
        let url = Url::parse(s)
            .map_err(|e| CaptureError::InvalidLocator(format!("'{}': {}", s, e)))?;
        Ok(Self { url })
    }

    /// `file://` locator for an absolute local path, percent-encoded
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let url = Url::from_file_path(path).map_err(|_| {
            CaptureError::InvalidLocator(format!("not an absolute path: {:?}", path))
        })?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.url.scheme().eq_ignore_ascii_case(scheme)
    }

    pub fn authority(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// Decoded path component
    pub fn path(&self) -> String {
        percent_decode_str(self.url.path())
            .decode_utf8_lossy()
            .into_owned()
    }

    /// Local path of a `file` locator
    pub fn file_path(&self) -> Option<String> {
        if !self.has_scheme(SCHEME_FILE) {
            return None;
        }
        self.url
            .to_file_path()
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }

    /// Decoded, non-empty path segments
    pub fn path_segments(&self) -> Vec<String> {
        self.url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Provider-assigned document id if this is a document reference
    ///
    /// Matches `content://<authority>/document/<id>` and
    /// `content://<authority>/tree/<tree-id>/document/<id>`.
    pub fn document_id(&self) -> Option<String> {
        if !self.has_scheme(SCHEME_CONTENT) {
            return None;
        }
        let mut segments = self.path_segments();
        match segments.len() {
            2 if segments[0] == PATH_DOCUMENT => segments.pop(),
            4 if segments[0] == PATH_TREE && segments[2] == PATH_DOCUMENT => segments.pop(),
            _ => None,
        }
    }

    /// Appends a numeric id as a new last path segment
    pub fn with_appended_id(&self, id: u64) -> Result<Self, CaptureError> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| CaptureError::InvalidLocator(format!("{} has no path", self.url)))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(Self { url })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl std::str::FromStr for Locator {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}
