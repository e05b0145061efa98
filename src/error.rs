use std::fmt;

/// Central error type for photo capture flows
#[derive(Debug)]
pub enum CaptureError {
    /// The host failed to launch an external provider or hand out a locator
    Host(String),
    /// A metadata query against a content locator failed
    Query(String),
    /// Filesystem error
    Io(std::io::Error),
    /// Invalid configuration (e.g. colliding request codes)
    Config(String),
    /// A locator string could not be parsed
    InvalidLocator(String),
    /// Operation not valid for the current flow state
    InvalidState(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CaptureError::Host(msg) => write!(f, "Host error: {}", msg),
            CaptureError::Query(msg) => write!(f, "Query error: {}", msg),
            CaptureError::Io(e) => write!(f, "IO error: {}", e),
            CaptureError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CaptureError::InvalidLocator(msg) => write!(f, "Invalid locator: {}", msg),
            CaptureError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        CaptureError::Io(e)
    }
}

impl From<toml::de::Error> for CaptureError {
    fn from(e: toml::de::Error) -> Self {
        CaptureError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for CaptureError {
    fn from(e: toml::ser::Error) -> Self {
        CaptureError::Config(e.to_string())
    }
}
