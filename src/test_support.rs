// Recording host and callback used by the coordinator tests.

use crate::error::CaptureError;
use crate::host::{CaptureHost, ContentQuery, MetadataQuery, MetadataRow, PhotoCallback, PlatformInfo};
use crate::locator::Locator;
use crate::models::RequestCode;
use crate::request::ProviderRequest;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

pub const PACKAGE_NAME: &str = "de.example.photos";

pub struct MockHost {
    pub api_level: u32,
    pub files_dir: PathBuf,
    pub external_root: PathBuf,
    pub launched: Vec<(ProviderRequest, RequestCode)>,
    /// Rows per queried locator; missing locators fail the query
    pub rows: HashMap<String, Vec<MetadataRow>>,
    pub queries: RefCell<Vec<MetadataQuery>>,
    pub fail_launch: bool,
    pub fail_share: bool,
}

impl MockHost {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_level: 30,
            files_dir: files_dir.into(),
            external_root: PathBuf::from("/storage/emulated/0"),
            launched: Vec::new(),
            rows: HashMap::new(),
            queries: RefCell::new(Vec::new()),
            fail_launch: false,
            fail_share: false,
        }
    }

    pub fn with_row(mut self, locator: &str, path: &str) -> Self {
        self.rows
            .insert(locator.to_string(), vec![vec![Some(path.to_string())]]);
        self
    }

    pub fn last_launch(&self) -> Option<&(ProviderRequest, RequestCode)> {
        self.launched.last()
    }
}

impl ContentQuery for MockHost {
    fn query_metadata(&self, query: &MetadataQuery) -> Result<Vec<MetadataRow>, CaptureError> {
        self.queries.borrow_mut().push(query.clone());
        self.rows
            .get(query.locator.as_str())
            .cloned()
            .ok_or_else(|| CaptureError::Query(format!("no provider for {}", query.locator)))
    }
}

impl CaptureHost for MockHost {
    fn launch_external(
        &mut self,
        request: &ProviderRequest,
        code: RequestCode,
    ) -> Result<(), CaptureError> {
        if self.fail_launch {
            return Err(CaptureError::Host("no activity found".to_string()));
        }
        self.launched.push((request.clone(), code));
        Ok(())
    }

    fn obtain_shared_locator(&self, path: &str, authority: &str) -> Result<Locator, CaptureError> {
        if self.fail_share {
            return Err(CaptureError::Host("path outside shared roots".to_string()));
        }
        Locator::parse(&format!("content://{}/root{}", authority, path))
    }

    fn platform(&self) -> PlatformInfo {
        PlatformInfo::new(self.api_level)
    }

    fn package_name(&self) -> String {
        PACKAGE_NAME.to_string()
    }

    fn files_dir(&self) -> PathBuf {
        self.files_dir.clone()
    }

    fn external_storage_dir(&self) -> PathBuf {
        self.external_root.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoEvent {
    Camera(String),
    Gallery(String),
    Crop(String),
    Cancel,
    Failed,
}

#[derive(Debug, Default)]
pub struct RecordingCallback {
    pub events: Vec<PhotoEvent>,
}

impl PhotoCallback for RecordingCallback {
    fn on_photo_camera(&mut self, path: &str) {
        self.events.push(PhotoEvent::Camera(path.to_string()));
    }

    fn on_photo_gallery(&mut self, path: &str) {
        self.events.push(PhotoEvent::Gallery(path.to_string()));
    }

    fn on_photo_crop(&mut self, path: &str) {
        self.events.push(PhotoEvent::Crop(path.to_string()));
    }

    fn on_photo_cancel(&mut self) {
        self.events.push(PhotoEvent::Cancel);
    }

    fn on_photo_failed(&mut self) {
        self.events.push(PhotoEvent::Failed);
    }
}
