use thiserror::Error;

/// Domain failures raised before anything touches the store.
///
/// These travel inside `anyhow::Error` and are recovered with `downcast_ref`
/// when deciding how a failure is reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{group} is full ({max} members)")]
    Capacity { group: String, max: u32 },

    #[error("{entity} '{value}' already exists")]
    Duplicate { entity: &'static str, value: String },
}

impl FlockError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        FlockError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        FlockError::NotFound { entity, id }
    }
}
