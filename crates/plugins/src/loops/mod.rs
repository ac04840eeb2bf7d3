//! Array repetition: the loop and table-loop container plugins.

pub mod strategy;

use serde_json::Value;
use stencil_dom::Document;
use stencil_template_core::{
    ContentType, ScopeData, Tag, TemplateCompiler, TemplateContext, TemplateError, TemplatePlugin,
};

use crate::repeat::{compile_groups, repeat, ScopeStep};
use strategy::{LoopListStrategy, LoopParagraphStrategy, LoopStrategy, LoopTableStrategy};

/// Repeats the region between `{#name}` and `{/name}` once per array element.
pub struct LoopPlugin {
    content_type: ContentType,
    strategies: Vec<Box<dyn LoopStrategy>>,
}

impl LoopPlugin {
    pub fn new() -> Self {
        Self::with_strategies(
            ContentType::Loop,
            vec![
                Box::new(LoopTableStrategy::default()),
                Box::new(LoopListStrategy),
                Box::new(LoopParagraphStrategy),
            ],
        )
    }

    /// A loop plugin with a custom strategy order. The first applicable strategy wins.
    pub fn with_strategies(content_type: ContentType, strategies: Vec<Box<dyn LoopStrategy>>) -> Self {
        Self {
            content_type,
            strategies,
        }
    }
}

impl Default for LoopPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of repetitions for the value bound to a loop tag.
fn repetitions(value: Option<&Value>, tag: &Tag) -> usize {
    match value {
        Some(Value::Array(items)) => items.len(),
        None | Some(Value::Null) => {
            log::debug!("Loop '{}' has no data; repeating zero times", tag.name);
            0
        }
        Some(other) => {
            log::warn!(
                "Loop '{}' expects an array but found {}; repeating zero times",
                tag.name,
                value_kind(other)
            );
            0
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TemplatePlugin for LoopPlugin {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn container_tag_replacement(
        &self,
        compiler: &TemplateCompiler,
        document: &mut Document,
        tags: &[Tag],
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let (Some(open), Some(close)) = (tags.first(), tags.last()) else {
            return Ok(());
        };
        let inner_tags = &tags[1..tags.len().saturating_sub(1).max(1)];
        let times = repetitions(scope.scope_value(), open);

        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.is_applicable(document, open, close))
            .ok_or_else(|| TemplateError::TagStructure {
                raw_text: open.raw_text.clone(),
                reason: "no loop strategy applies to this location".to_string(),
            })?;
        log::debug!(
            "Loop '{}' at '{}': {} repetition(s) using the {} strategy",
            open.name,
            scope.path_string(),
            times,
            strategy.name()
        );

        let split = strategy.split_before(document, open, close)?;
        let groups = repeat(document, &split.nodes_to_repeat, inner_tags, times);
        let compiled = compile_groups(compiler, document, groups, scope, context, ScopeStep::Index)?;
        strategy.merge_back(document, compiled, &split)
    }
}

/// Repeats table rows for `{%name}` ... `{/name}`, falling back to inline
/// repetition outside tables.
pub struct TableLoopPlugin {
    inner: LoopPlugin,
}

impl TableLoopPlugin {
    pub fn new() -> Self {
        Self {
            inner: LoopPlugin::with_strategies(
                ContentType::TableLoop,
                vec![
                    Box::new(LoopTableStrategy::rows_by_default()),
                    Box::new(LoopParagraphStrategy),
                ],
            ),
        }
    }
}

impl Default for TableLoopPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplatePlugin for TableLoopPlugin {
    fn content_type(&self) -> ContentType {
        self.inner.content_type()
    }

    fn container_tag_replacement(
        &self,
        compiler: &TemplateCompiler,
        document: &mut Document,
        tags: &[Tag],
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        self.inner
            .container_tag_replacement(compiler, document, tags, scope, context)
    }
}
