// Descriptors for the external provider requests the flow launcher emits.
// The host turns these into platform intents.

use crate::locator::Locator;
use crate::models::CropSize;

pub const ACTION_IMAGE_CAPTURE: &str = "android.media.action.IMAGE_CAPTURE";
pub const ACTION_PICK: &str = "android.intent.action.PICK";
pub const ACTION_CROP: &str = "com.android.camera.action.CROP";

pub const MIME_ANY_IMAGE: &str = "image/*";

/// Request for the crop provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropRequest {
    pub source: Locator,
    pub mime_type: String,
    /// Aspect ratio and output size are both the configured crop size
    pub size: CropSize,
    /// Extension of the output format, e.g. `jpg`
    pub output_format: String,
    pub output: Locator,
    pub scale: bool,
    pub return_data: bool,
    pub no_face_detection: bool,
    /// Grant read+write access on `source` to the crop provider
    pub grant_uri_permissions: bool,
}

impl CropRequest {
    pub fn new(
        source: Locator,
        size: CropSize,
        output_format: &str,
        output: Locator,
        grant_uri_permissions: bool,
    ) -> Self {
        Self {
            source,
            mime_type: MIME_ANY_IMAGE.to_string(),
            size,
            output_format: output_format.to_string(),
            output,
            scale: true,
            return_data: false,
            no_face_detection: true,
            grant_uri_permissions,
        }
    }
}

/// One external provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    /// Capture a photo, writing full resolution output to `output`
    Capture { output: Locator },
    /// Pick a single item of `mime_type` from the gallery
    Pick { mime_type: String },
    Crop(CropRequest),
}

impl ProviderRequest {
    pub fn capture(output: Locator) -> Self {
        ProviderRequest::Capture { output }
    }

    pub fn pick_image() -> Self {
        ProviderRequest::Pick {
            mime_type: MIME_ANY_IMAGE.to_string(),
        }
    }

    /// Platform intent action for this request
    pub fn action(&self) -> &'static str {
        match self {
            ProviderRequest::Capture { .. } => ACTION_IMAGE_CAPTURE,
            ProviderRequest::Pick { .. } => ACTION_PICK,
            ProviderRequest::Crop(_) => ACTION_CROP,
        }
    }
}
