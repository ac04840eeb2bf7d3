//! Conditional inclusion and visibility of document regions.

mod content;
mod hide;

pub use content::{Appearance, HideMode, Section, SectionContent};
pub use hide::HidableStrategy;

use serde::Deserialize;
use stencil_dom::Document;
use stencil_template_core::{ContentType, ScopeData, Tag, TemplateCompiler, TemplateContext, TemplateError, TemplatePlugin};

use crate::loops::strategy::{LoopParagraphStrategy, LoopStrategy, LoopTableStrategy};
use crate::repeat::{compile_groups, repeat, ScopeStep};
use hide::Region;

/// Keeps, hides or removes the region between `{^name}` and `{/name}`.
///
/// The region is compiled at most once and without an index in the scope
/// path, so tags inside resolve like tags next to the section.
pub struct SectionsPlugin {
    strategies: Vec<Box<dyn LoopStrategy>>,
    hidable: HidableStrategy,
}

impl SectionsPlugin {
    pub fn new(hidable: HidableStrategy) -> Self {
        Self {
            strategies: vec![Box::new(LoopTableStrategy::default()), Box::new(LoopParagraphStrategy)],
            hidable,
        }
    }

    fn section_for(scope: &ScopeData<'_>, tag: &Tag) -> Option<Section> {
        let value = scope.scope_value()?;
        match SectionContent::deserialize(value) {
            Ok(content) => Some(content.section),
            Err(err) => {
                log::warn!("Section '{}' has invalid data ({err}); removing its content", tag.name);
                None
            }
        }
    }
}

impl Default for SectionsPlugin {
    fn default() -> Self {
        Self::new(HidableStrategy::default())
    }
}

impl TemplatePlugin for SectionsPlugin {
    fn content_type(&self) -> ContentType {
        ContentType::Sections
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
        let section = Self::section_for(scope, open);
        let times = section.as_ref().map_or(0, Section::repetitions);

        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.is_applicable(document, open, close))
            .ok_or_else(|| TemplateError::TagStructure {
                raw_text: open.raw_text.clone(),
                reason: "no section strategy applies to this location".to_string(),
            })?;
        log::debug!(
            "Section '{}' at '{}': {} cop(ies) using the {} strategy",
            open.name,
            scope.path_string(),
            times,
            strategy.name()
        );

        let split = strategy.split_before(document, open, close)?;
        let groups = repeat(document, &split.nodes_to_repeat, inner_tags, times);
        let compiled = compile_groups(compiler, document, groups, scope, context, ScopeStep::Stay)?;
        let region = Region::collect(document, &compiled);
        strategy.merge_back(document, compiled, &split)?;

        let Some(section) = section.filter(|_| times > 0) else {
            return Ok(());
        };
        match self.hidable {
            HidableStrategy::ContentControl => {
                let wrapped = region.wrap_in_content_control(document, &section)?;
                if !wrapped && section.is_hidden() {
                    region.vanish(document, split.first_node)?;
                }
            }
            HidableStrategy::VanishRuns => {
                if section.is_hidden() {
                    region.vanish(document, split.first_node)?;
                }
                region.add_bookmarks(document, &section)?;
            }
        }
        Ok(())
    }
}
