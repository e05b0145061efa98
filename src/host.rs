use crate::error::CaptureError;
use crate::locator::Locator;
use crate::models::RequestCode;
use crate::request::ProviderRequest;
use std::path::PathBuf;

/// First API level with document providers
pub const API_LEVEL_DOCUMENTS: u32 = 19;
/// First API level that rejects raw file locators passed to other apps
pub const API_LEVEL_SHARED_LOCATORS: u32 = 24;

/// Facts about the running platform the coordinator branches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub api_level: u32,
}

impl PlatformInfo {
    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    pub fn has_documents_api(&self) -> bool {
        self.api_level >= API_LEVEL_DOCUMENTS
    }

    pub fn requires_shared_locators(&self) -> bool {
        self.api_level >= API_LEVEL_SHARED_LOCATORS
    }
}

/// A metadata query against a content locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataQuery {
    pub locator: Locator,
    pub projection: Vec<String>,
    /// Row filter such as `_id=?`
    pub selection: Option<String>,
    pub selection_args: Vec<String>,
}

/// One result row, values in projection order
pub type MetadataRow = Vec<Option<String>>;

/// Content resolution capability supplied by the host
pub trait ContentQuery {
    fn query_metadata(&self, query: &MetadataQuery) -> Result<Vec<MetadataRow>, CaptureError>;
}

/// Everything the coordinator needs from the hosting application
pub trait CaptureHost: ContentQuery {
    /// Hands a request to the platform activity stack, tagged with `code`
    fn launch_external(
        &mut self,
        request: &ProviderRequest,
        code: RequestCode,
    ) -> Result<(), CaptureError>;

    /// Exposes a local file to other apps through the sharing `authority`
    fn obtain_shared_locator(&self, path: &str, authority: &str) -> Result<Locator, CaptureError>;

    fn platform(&self) -> PlatformInfo;

    fn package_name(&self) -> String;

    /// App-specific files directory used for default camera and crop paths
    fn files_dir(&self) -> PathBuf;

    /// Root that external storage document ids are relative to
    fn external_storage_dir(&self) -> PathBuf;
}

/// Terminal notifications; exactly one fires per flow
pub trait PhotoCallback {
    fn on_photo_camera(&mut self, path: &str);

    fn on_photo_gallery(&mut self, path: &str);

    fn on_photo_crop(&mut self, path: &str);

    fn on_photo_cancel(&mut self);

    fn on_photo_failed(&mut self);
}
