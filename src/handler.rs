use std::sync::Arc;

use serde_json::Value;
use stencil_dom::Document;
use stencil_source::PartSource;
use stencil_template_core::{
    ScopeData, ScopeResolver, Tag, TemplateCompiler, TemplateContext, TemplateError, TemplateExtension,
};

use crate::builder::TemplateHandlerBuilder;

/// The composition root: a configured compiler plus the hooks that run around it.
///
/// A handler holds no per-document state and can be shared between threads.
pub struct TemplateHandler {
    pub(crate) compiler: TemplateCompiler,
    pub(crate) scope_resolver: Arc<dyn ScopeResolver>,
    pub(crate) extensions_before: Vec<Arc<dyn TemplateExtension>>,
    pub(crate) extensions_after: Vec<Arc<dyn TemplateExtension>>,
}

impl TemplateHandler {
    pub fn builder() -> TemplateHandlerBuilder {
        TemplateHandlerBuilder::new()
    }

    /// A handler with the default delimiters and plugins.
    pub fn new() -> Result<Self, TemplateError> {
        TemplateHandlerBuilder::new().build()
    }

    pub fn compiler(&self) -> &TemplateCompiler {
        &self.compiler
    }

    /// Fills every part of `source` with `data` and writes the parts back.
    ///
    /// Parts are compiled in the order the source lists them and saved only
    /// once all of them compiled, so a failing part leaves the source as it
    /// was. With the `parallel` feature parts are compiled concurrently; each
    /// part is still compiled by one thread.
    pub fn process(&self, source: &dyn PartSource, data: &Value) -> Result<(), TemplateError> {
        let parts = source.part_names();
        log::debug!("Processing {} part(s) from {}", parts.len(), source.name());

        #[cfg(feature = "parallel")]
        let compiled = {
            use rayon::prelude::*;
            parts
                .par_iter()
                .map(|part| Ok((part, self.compile_part(source, part, data)?)))
                .collect::<Result<Vec<_>, TemplateError>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let compiled = parts
            .iter()
            .map(|part| Ok((part, self.compile_part(source, part, data)?)))
            .collect::<Result<Vec<_>, TemplateError>>()?;

        for (part, document) in compiled {
            source.save_part(part, &document)?;
        }
        Ok(())
    }

    /// Fills a single part and writes it back.
    pub fn process_part(&self, source: &dyn PartSource, part: &str, data: &Value) -> Result<(), TemplateError> {
        let document = self.compile_part(source, part, data)?;
        source.save_part(part, &document)?;
        Ok(())
    }

    /// Loads and compiles one part without writing it back.
    fn compile_part(&self, source: &dyn PartSource, part: &str, data: &Value) -> Result<Document, TemplateError> {
        let mut document = source.load_part(part)?;
        let mut scope = ScopeData::new(data, self.scope_resolver.as_ref());
        let context = TemplateContext::new(part, source.resources());
        let root = document.root();

        self.run_extensions(&self.extensions_before, &mut document, &mut scope, &context)?;
        self.compiler.compile(&mut document, root, &mut scope, &context)?;
        self.run_extensions(&self.extensions_after, &mut document, &mut scope, &context)?;

        log::debug!("Part '{}' compiled", part);
        Ok(document)
    }

    /// Lists the tags of one part without changing the source.
    pub fn parse_tags(&self, source: &dyn PartSource, part: &str) -> Result<Vec<Tag>, TemplateError> {
        let mut document = source.load_part(part)?;
        let root = document.root();
        self.compiler.parse_tags(&mut document, root)
    }

    /// Lists the tags of every part, in part order.
    pub fn parse_all_tags(&self, source: &dyn PartSource) -> Result<Vec<Tag>, TemplateError> {
        let mut tags = Vec::new();
        for part in source.part_names() {
            tags.extend(self.parse_tags(source, &part)?);
        }
        Ok(tags)
    }

    /// The text content of one part, tags included.
    pub fn get_text(&self, source: &dyn PartSource, part: &str) -> Result<String, TemplateError> {
        let document = source.load_part(part)?;
        Ok(document.text_content(document.root()))
    }

    fn run_extensions(
        &self,
        extensions: &[Arc<dyn TemplateExtension>],
        document: &mut Document,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let root = document.root();
        for extension in extensions {
            extension.execute(document, root, scope, context)?;
        }
        Ok(())
    }
}
