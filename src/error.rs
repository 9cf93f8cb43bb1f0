use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors returned by [`Resources`](crate::resource::Resources) lookups
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Resource not found: {name}")]
    NotFound { name: String },

    #[error("Resource {name} holds {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ResourceError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ResourceError::NotFound { .. } => "resource_not_found",
            ResourceError::TypeMismatch { .. } => "resource_type_mismatch",
        }
    }
}
