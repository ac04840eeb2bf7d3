//! Stencil: a Word document template engine
//!
//! Placeholder tags such as `{name}`, `{#items}...{/items}` or
//! `{^section}...{/section}` are written anywhere in the text of a document.
//! `TemplateHandler` finds them in every part a [`PartSource`] exposes and
//! replaces them with data, repeating, hiding or removing whole regions
//! where container tags ask for it.
//!
//! ## Example
//!
//! ```ignore
//! use serde_json::json;
//! use stencil::{InMemoryPartSource, PartSource, TemplateHandler};
//!
//! let source = InMemoryPartSource::new().with_part("word/document.xml", xml);
//! let handler = TemplateHandler::builder().with_skip_empty_tags(true).build()?;
//! handler.process(&source, &json!({"name": "World"}))?;
//! ```

mod builder;
mod handler;

pub use builder::TemplateHandlerBuilder;
pub use handler::TemplateHandler;

pub use stencil_dom::{parse_document, Document, DomError, NodeId};
pub use stencil_plugins::{
    create_default_plugins, HidableStrategy, ImagePlugin, LinkPlugin, LoopPlugin, RawXmlPlugin, SectionsPlugin,
    TableLoopPlugin, TextPlugin,
};
pub use stencil_source::{InMemoryPartSource, InMemoryResources, PartSource, Relationship, SourceError};
pub use stencil_template_core::{
    CompilerOptions, ContentType, Delimiters, LexicalScopeResolver, PartResources, PathPart, RelationshipType,
    ScopeData, ScopeResolver, Tag, TagDisposition, TemplateCompiler, TemplateContext, TemplateError,
    TemplateExtension, TemplatePlugin,
};
