use std::fmt;

#[derive(Debug)]
pub enum ComposerError {
    PermissionDenied(String),
    DeviceError(String),
    CodecError(String),
    PersistenceError(String),
    IdentityMismatch(String),
}

impl fmt::Display for ComposerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComposerError::PermissionDenied(msg) => write!(f, "Permission denied error: {}", msg),
            ComposerError::DeviceError(msg) => write!(f, "Capture device error: {}", msg),
            ComposerError::CodecError(msg) => write!(f, "Codec error: {}", msg),
            ComposerError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
            ComposerError::IdentityMismatch(msg) => write!(f, "Identity mismatch error: {}", msg),
        }
    }
}

impl std::error::Error for ComposerError {}
