//! # Photo Capture
//!
//! Acquires a photo from the camera or the gallery, optionally crops it, and
//! hands a concrete file path back to the caller.
//!
//! The crate does not draw UI or touch pixels. It decides which external
//! provider to launch, correlates the asynchronous result by request code,
//! and resolves content locators to filesystem paths.
//!
//! ## Platform Separation
//!
//! Everything platform specific sits behind [`CaptureHost`]. On Android the
//! [`android::AndroidHost`] implementation talks to the activity over JNI;
//! tests and other platforms plug in their own host.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_capture::{CaptureConfig, CaptureCoordinator, Outcome, ResultPayload};
//!
//! let config = CaptureConfig::new(100, 101, 102);
//! let mut coordinator = CaptureCoordinator::new(host, callback, config)?;
//! coordinator.launch_gallery_cropped(512, 512)?;
//!
//! // later, from the activity result hook
//! coordinator.on_result(request_code, Outcome::from_code(result_code), &payload);
//! ```

pub mod cleanup;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod locator;
pub mod logging;
pub mod models;
pub mod paths;
pub mod request;
pub mod resolver;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(test)]
mod test_support;

pub use cleanup::{delete_file, delete_recursive};
pub use config::CaptureConfig;
pub use coordinator::CaptureCoordinator;
pub use error::CaptureError;
pub use host::{CaptureHost, ContentQuery, MetadataQuery, MetadataRow, PhotoCallback, PlatformInfo};
pub use locator::Locator;
pub use logging::init_logging;
pub use models::{CropSize, FlowConfig, FlowId, FlowOrigin, FlowState, Outcome, RequestCode, ResultPayload};
pub use request::{CropRequest, ProviderRequest};
pub use resolver::{AuthorityRegistry, DocumentStrategy, LocatorResolver};
