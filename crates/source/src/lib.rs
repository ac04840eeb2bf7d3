//! Part sources for the stencil template compiler.
//!
//! A document package is a set of XML parts (the main document, headers,
//! footers) plus package-level resources such as relationships and media.
//! The `PartSource` trait hides where those parts live so the compiler can
//! work on any container format.
//!
//! ## Available Sources
//!
//! - `InMemoryPartSource`: XML strings held in memory, with `InMemoryResources`

mod error;
mod memory;

use std::fmt::Debug;

use stencil_dom::Document;
use stencil_template_core::PartResources;

pub use error::SourceError;
pub use memory::{InMemoryPartSource, InMemoryResources, Relationship};

/// A trait for reading and writing the XML parts of a document package.
///
/// Implementations are shared across threads when parts are compiled in parallel.
pub trait PartSource: Send + Sync + Debug {
    /// Names of the parts that may contain tags, in processing order.
    fn part_names(&self) -> Vec<String>;

    /// Parses a part into a document tree.
    fn load_part(&self, name: &str) -> Result<Document, SourceError>;

    /// Serializes a document tree back into the named part.
    fn save_part(&self, name: &str, document: &Document) -> Result<(), SourceError>;

    /// Relationship and media services for the package.
    fn resources(&self) -> &dyn PartResources;

    /// Returns a human-readable name for this source (for logging/debugging).
    fn name(&self) -> &'static str;
}
