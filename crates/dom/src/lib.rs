//! Mutable document tree for WordprocessingML parts.
//!
//! This crate provides the arena-backed [`Document`] used by the template
//! compiler, markup parsing and serialization built on quick-xml, and the
//! Word-specific structure helpers in [`word`].
//!
//! ## Key Abstractions
//!
//! - [`Document`]: arena of nodes addressed by stable [`NodeId`] handles
//! - [`NodeKind`]: text, element or verbatim markup payload
//! - [`parse_document`] / [`parse_fragment`]: markup to tree
//! - [`word`]: paragraph, run and text splitting and joining

mod document;
mod error;
mod node;
pub mod word;
mod xml;

pub use document::Document;
pub use error::DomError;
pub use node::{Element, NodeId, NodeKind};
pub use xml::{parse_document, parse_fragment};
