use crate::error::CaptureError;
use crate::models::RequestCode;
use serde::{Deserialize, Serialize};

const DEFAULT_PROVIDER_NAME_APPEND: &str = "provider_photoutil";
const DEFAULT_CAMERA_FILE_NAME: &str = "camera.jpg";
const DEFAULT_CROP_FILE_TEMPLATE: &str = "crop.%s";

/// Coordinator configuration, loadable from TOML
///
/// The three request codes must be pairwise distinct and must not collide
/// with any other request code the host application uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    pub camera_request_code: RequestCode,
    pub gallery_request_code: RequestCode,
    pub crop_request_code: RequestCode,
    /// Suffix appended to the package name to form the file sharing authority
    #[serde(default = "default_provider_name_append")]
    pub provider_name_append: String,
    /// File name of the default camera output inside the files dir
    #[serde(default = "default_camera_file_name")]
    pub camera_file_name: String,
    /// Crop output file name template inside the files dir (`%s` = extension)
    #[serde(default = "default_crop_file_template")]
    pub crop_file_template: String,
}

fn default_provider_name_append() -> String {
    DEFAULT_PROVIDER_NAME_APPEND.to_string()
}

fn default_camera_file_name() -> String {
    DEFAULT_CAMERA_FILE_NAME.to_string()
}

fn default_crop_file_template() -> String {
    DEFAULT_CROP_FILE_TEMPLATE.to_string()
}

impl CaptureConfig {
    pub fn new(camera: RequestCode, gallery: RequestCode, crop: RequestCode) -> Self {
        Self {
            camera_request_code: camera,
            gallery_request_code: gallery,
            crop_request_code: crop,
            provider_name_append: default_provider_name_append(),
            camera_file_name: default_camera_file_name(),
            crop_file_template: default_crop_file_template(),
        }
    }

    /// Checks that the request codes are pairwise distinct
    pub fn validate(&self) -> Result<(), CaptureError> {
        let codes = [
            ("camera", self.camera_request_code),
            ("gallery", self.gallery_request_code),
            ("crop", self.crop_request_code),
        ];
        for (i, (name_a, a)) in codes.iter().enumerate() {
            for (name_b, b) in codes.iter().skip(i + 1) {
                if a == b {
                    return Err(CaptureError::Config(format!(
                        "{} and {} request codes are both {}",
                        name_a, name_b, a
                    )));
                }
            }
        }
        if self.provider_name_append.is_empty() {
            return Err(CaptureError::Config(
                "provider_name_append must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Sharing authority for `package_name`, e.g. `com.example.provider_photoutil`
    pub fn sharing_authority(&self, package_name: &str) -> String {
        format!("{}.{}", package_name, self.provider_name_append)
    }

    /// Converts to TOML string
    pub fn to_toml(&self) -> Result<String, CaptureError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads from TOML string and validates
    pub fn from_toml(s: &str) -> Result<Self, CaptureError> {
        let config: CaptureConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
