//! Error types for NSX operations

use thiserror::Error;

pub type NsxResult<T> = Result<T, NsxError>;

/// Main error type for NSX operations
#[derive(Debug, Error)]
pub enum NsxError {
    #[error("NSX API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP transport error: {message}")]
    Transport { message: String },

    #[error("Element '{path}' not found in {resource_type} response")]
    MissingElement {
        resource_type: String,
        path: String,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Missing URI parameter '{parameter}' for {resource_type}")]
    MissingUriParameter {
        resource_type: String,
        parameter: String,
    },

    #[error("Invalid resource id: {0}")]
    InvalidResourceId(#[from] nsx_shared_types::SharedTypeError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NsxError {
    /// NSX rejects parallel changes of one edge; such errors go away on rerun
    pub fn is_busy(&self) -> bool {
        match self {
            NsxError::Api { status, message } => {
                let message = message.to_lowercase();
                *status == 409
                    || *status == 503
                    || message.contains("busy")
                    || message.contains("concurrent")
            }
            _ => false,
        }
    }
}

/// Property validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {path}")]
    MissingField { path: String },

    #[error("Invalid value for {path}: {value} ({reason})")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
    },

    #[error("Value {value} for {path} is not one of [{allowed}]")]
    NotAllowed {
        path: String,
        value: String,
        allowed: String,
    },
}

/// Plugin configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to persist state: {0}")]
    Persist(String),

    #[error("Missing credential field: {field}")]
    MissingCredential { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_detection() {
        let conflict = NsxError::Api {
            status: 409,
            message: "conflict".to_string(),
        };
        assert!(conflict.is_busy());

        let busy = NsxError::Api {
            status: 400,
            message: "Edge edge-3 is currently Busy".to_string(),
        };
        assert!(busy.is_busy());

        let not_found = NsxError::Api {
            status: 404,
            message: "not found".to_string(),
        };
        assert!(!not_found.is_busy());
        assert!(!NsxError::UnknownResource("x".to_string()).is_busy());
    }
}
