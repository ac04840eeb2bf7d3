//! Core abstractions for template scanning and compilation
//!
//! This crate turns placeholder tags embedded in a Word document tree into
//! plugin calls. It defines the contract between the compiler and the
//! plugins that rewrite the tree.
//!
//! ## Key Abstractions
//!
//! - **`DelimiterScanner`**: finds tag delimiters across fragmented text nodes
//! - **`TagParser`**: pairs delimiters into `Tag`s and isolates each tag in one text node
//! - **`ScopeData`**: the scope path into the caller's data and its resolver
//! - **`TemplateCompiler`**: open/close matching and data-driven plugin dispatch
//! - **`TemplatePlugin`**: handler contract for one `ContentType`
//! - **`PartResources`**: relationship and media services for leaf plugins

mod compiler;
mod content;
mod delimiters;
mod error;
mod options;
mod plugin;
mod scanner;
mod scope;
mod tag;
mod tag_parser;

pub use compiler::{CompilerOptions, PluginRegistry, TemplateCompiler};
pub use content::{ContentType, CONTENT_TYPE_FIELD};
pub use delimiters::Delimiters;
pub use error::TemplateError;
pub use options::{parse_options, TagOptions};
pub use plugin::{PartResources, RelationshipType, TemplateContext, TemplateExtension, TemplatePlugin};
pub use scanner::{DelimiterMark, DelimiterScanner};
pub use scope::{LexicalScopeResolver, PathPart, ScopeData, ScopeResolver};
pub use tag::{ContainerKind, Tag, TagDisposition};
pub use tag_parser::TagParser;
