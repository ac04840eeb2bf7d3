use std::fmt;

use stencil_dom::{Document, NodeId};

use crate::compiler::TemplateCompiler;
use crate::content::ContentType;
use crate::error::TemplateError;
use crate::scope::ScopeData;
use crate::tag::Tag;

/// Relationship kinds a plugin can register for the part it writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    Hyperlink,
    Image,
}

impl RelationshipType {
    pub fn uri(self) -> &'static str {
        match self {
            RelationshipType::Hyperlink => {
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink"
            }
            RelationshipType::Image => {
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image"
            }
        }
    }
}

/// Package-level services used by leaf plugins that reference other parts.
///
/// Implementations are shared between parts compiled in parallel.
pub trait PartResources: Send + Sync {
    /// Registers a relationship from `part` to `target` and returns its id.
    fn add_relationship(
        &self,
        part: &str,
        target: &str,
        relationship: RelationshipType,
        external: bool,
    ) -> Result<String, TemplateError>;

    /// Stores a media file and returns its path relative to the main part.
    fn add_media(&self, bytes: Vec<u8>, extension: &str) -> Result<String, TemplateError>;
}

/// Per-part information handed to plugins and extensions.
#[derive(Clone, Copy)]
pub struct TemplateContext<'a> {
    pub part_name: &'a str,
    pub resources: &'a dyn PartResources,
}

impl<'a> TemplateContext<'a> {
    pub fn new(part_name: &'a str, resources: &'a dyn PartResources) -> Self {
        Self { part_name, resources }
    }
}

impl fmt::Debug for TemplateContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateContext")
            .field("part_name", &self.part_name)
            .finish_non_exhaustive()
    }
}

/// A handler for one content type.
///
/// Leaf plugins override [`TemplatePlugin::simple_tag_replacement`], container
/// plugins override [`TemplatePlugin::container_tag_replacement`].
pub trait TemplatePlugin: Send + Sync {
    fn content_type(&self) -> ContentType;

    /// Replaces a self-closed tag. The tag's text node is already empty.
    fn simple_tag_replacement(
        &self,
        _document: &mut Document,
        _tag: &Tag,
        _scope: &mut ScopeData<'_>,
        _context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        Ok(())
    }

    /// Rewrites the region spanned by `tags`, from the open tag through its close tag.
    fn container_tag_replacement(
        &self,
        _compiler: &TemplateCompiler,
        _document: &mut Document,
        _tags: &[Tag],
        _scope: &mut ScopeData<'_>,
        _context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        Ok(())
    }
}

/// A hook that runs over a whole part before or after compilation.
pub trait TemplateExtension: Send + Sync {
    fn execute(
        &self,
        document: &mut Document,
        root: NodeId,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError>;
}
