use stencil_template_core::TemplateError;
use thiserror::Error;

/// Error type for part source operations.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Malformed part '{part}': {message}")]
    Malformed { part: String, message: String },

    #[error("Part store lock poisoned while accessing '{0}'")]
    LockPoisoned(String),
}

impl From<SourceError> for TemplateError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::PartNotFound(part) => TemplateError::MalformedFile {
                reason: "part not found".to_string(),
                part,
            },
            SourceError::Malformed { part, message } => TemplateError::MalformedFile { part, reason: message },
            SourceError::LockPoisoned(part) => TemplateError::MalformedFile {
                reason: "part store lock poisoned".to_string(),
                part,
            },
        }
    }
}
