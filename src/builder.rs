use std::sync::Arc;

use stencil_plugins::{create_default_plugins, HidableStrategy};
use stencil_template_core::{
    CompilerOptions, ContentType, Delimiters, LexicalScopeResolver, ScopeResolver, TemplateCompiler, TemplateError,
    TemplateExtension, TemplatePlugin,
};

use crate::handler::TemplateHandler;

/// A builder for creating a `TemplateHandler`.
pub struct TemplateHandlerBuilder {
    delimiters: Delimiters,
    options: CompilerOptions,
    hidable: HidableStrategy,
    plugins: Vec<Arc<dyn TemplatePlugin>>,
    scope_resolver: Arc<dyn ScopeResolver>,
    extensions_before: Vec<Arc<dyn TemplateExtension>>,
    extensions_after: Vec<Arc<dyn TemplateExtension>>,
}

impl Default for TemplateHandlerBuilder {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            options: CompilerOptions::default(),
            hidable: HidableStrategy::default(),
            plugins: Vec::new(),
            scope_resolver: Arc::new(LexicalScopeResolver),
            extensions_before: Vec::new(),
            extensions_after: Vec::new(),
        }
    }
}

impl TemplateHandlerBuilder {
    /// Creates a new `TemplateHandlerBuilder` with the default delimiters and plugins.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Elements nested deeper than this are not scanned for tags.
    pub fn with_max_xml_depth(mut self, depth: usize) -> Self {
        self.options.max_xml_depth = depth;
        self
    }

    /// Leaves `{}` in the document instead of treating it as a tag with an empty name.
    pub fn with_skip_empty_tags(mut self, skip: bool) -> Self {
        self.options.skip_empty_tags = skip;
        self
    }

    /// The content type of self-closed tags whose data does not declare one.
    pub fn with_default_content_type(mut self, content_type: ContentType) -> Self {
        self.options.default_content_type = content_type;
        self
    }

    /// Registers a plugin, replacing the built-in plugin for its content type.
    pub fn with_plugin(mut self, plugin: Arc<dyn TemplatePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_scope_resolver(mut self, resolver: Arc<dyn ScopeResolver>) -> Self {
        self.scope_resolver = resolver;
        self
    }

    /// Selects how the built-in sections plugin hides a region.
    pub fn with_hidable_section_strategy(mut self, strategy: HidableStrategy) -> Self {
        self.hidable = strategy;
        self
    }

    /// Adds a hook that runs on each part before its tags are compiled.
    pub fn with_extension_before(mut self, extension: Arc<dyn TemplateExtension>) -> Self {
        self.extensions_before.push(extension);
        self
    }

    /// Adds a hook that runs on each part after its tags are compiled.
    pub fn with_extension_after(mut self, extension: Arc<dyn TemplateExtension>) -> Self {
        self.extensions_after.push(extension);
        self
    }

    /// Consumes the builder and creates the `TemplateHandler`.
    pub fn build(self) -> Result<TemplateHandler, TemplateError> {
        let mut plugins = create_default_plugins(self.hidable);
        for custom in self.plugins {
            let content_type = custom.content_type();
            plugins.retain(|plugin| plugin.content_type() != content_type);
            log::debug!("Using a custom plugin for {}", content_type);
            plugins.push(custom);
        }

        let compiler = TemplateCompiler::new(self.delimiters, plugins, self.options)?;
        Ok(TemplateHandler {
            compiler,
            scope_resolver: self.scope_resolver,
            extensions_before: self.extensions_before,
            extensions_after: self.extensions_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_plugins_replace_the_built_in_ones() {
        struct Silent;
        impl TemplatePlugin for Silent {
            fn content_type(&self) -> ContentType {
                ContentType::Text
            }
        }

        let silent: Arc<dyn TemplatePlugin> = Arc::new(Silent);
        let handler = TemplateHandlerBuilder::new().with_plugin(silent.clone()).build().unwrap();
        let registered = handler.compiler().plugin(ContentType::Text).unwrap();
        assert!(Arc::ptr_eq(registered, &silent));
        assert!(handler.compiler().plugin(ContentType::Loop).is_some());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let delimiters = Delimiters {
            tag_start: String::new(),
            ..Delimiters::default()
        };
        assert!(matches!(
            TemplateHandlerBuilder::new().with_delimiters(delimiters).build(),
            Err(TemplateError::Config(_))
        ));
        assert!(matches!(
            TemplateHandlerBuilder::new().with_max_xml_depth(0).build(),
            Err(TemplateError::Config(_))
        ));
    }
}
