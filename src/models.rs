use uuid::Uuid;

/// Correlation token attached to an external provider request
pub type RequestCode = i32;

/// Platform result code for a successful activity
pub const RESULT_OK: i32 = -1;
/// Platform result code for a cancelled activity
pub const RESULT_CANCELED: i32 = 0;
/// First platform result code reserved for user-defined results
pub const RESULT_FIRST_USER: i32 = 1;

/// Outcome reported by the host when an external provider finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Cancelled,
    /// Start of user-defined results; logged, never reported to the caller
    FirstUser,
    Failed(i32),
}

impl Outcome {
    /// Maps a raw platform result code
    pub fn from_code(code: i32) -> Self {
        match code {
            RESULT_OK => Outcome::Ok,
            RESULT_CANCELED => Outcome::Cancelled,
            RESULT_FIRST_USER => Outcome::FirstUser,
            other => Outcome::Failed(other),
        }
    }
}

/// Data handed back by an external provider alongside its outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPayload {
    /// The returned data locator (gallery picks), if any
    pub data: Option<String>,
}

impl ResultPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }
}

/// Which flow produced the result that is now awaiting its crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOrigin {
    Camera,
    Gallery,
}

/// Requested crop dimensions in pixels; zero in either disables cropping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropSize {
    pub width: u32,
    pub height: u32,
}

impl CropSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn needs_crop(&self) -> bool {
        self.width != 0 && self.height != 0
    }
}

/// Per-launch configuration recorded by the flow launcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowConfig {
    pub crop: CropSize,
    /// Where the camera provider writes its full-resolution output
    pub camera_save_path: String,
    /// Crop output path with one `%s` slot for the file extension
    pub crop_save_path_template: String,
}

impl FlowConfig {
    pub fn needs_crop(&self) -> bool {
        self.crop.needs_crop()
    }
}

/// Unique identifier of one camera-or-gallery flow, used for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(Uuid);

impl FlowId {
    pub fn new() -> Self {
        FlowId(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transient state of the in-flight flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowState {
    pub flow_id: Option<FlowId>,
    /// Set when a camera/gallery result arrives, cleared by the crop result
    pub origin: Option<FlowOrigin>,
    /// Filled crop template, set when the crop is launched
    pub resolved_crop_save_path: Option<String>,
}

impl FlowState {
    /// True while a crop has been launched and its result is still owed
    pub fn awaiting_crop(&self) -> bool {
        self.resolved_crop_save_path.is_some()
    }

    pub fn reset(&mut self) {
        *self = FlowState::default();
    }
}
