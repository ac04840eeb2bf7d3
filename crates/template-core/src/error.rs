use stencil_dom::DomError;
use thiserror::Error;

/// Errors raised while scanning, parsing or compiling a template part.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Close delimiter without a matching open delimiter near '{text}'")]
    MissingStartDelimiter { text: String },

    #[error("Open delimiter without a matching close delimiter near '{text}'")]
    MissingCloseDelimiter { text: String },

    #[error("Invalid options in tag '{raw_text}': {message}")]
    TagOptionsParse { raw_text: String, message: String },

    #[error("Tag '{name}' is opened but never closed")]
    UnclosedTag { name: String },

    #[error("Content type '{content_type}' of tag '{raw_text}' at '{path}' has no registered plugin")]
    UnknownContentType {
        content_type: String,
        raw_text: String,
        path: String,
    },

    #[error("Tag '{raw_text}' cannot be applied to this document structure: {reason}")]
    TagStructure { raw_text: String, reason: String },

    #[error("Malformed part '{part}': {reason}")]
    MalformedFile { part: String, reason: String },

    #[error("Invalid template configuration: {0}")]
    Config(String),

    #[error("Document tree error: {0}")]
    Dom(#[from] DomError),
}
