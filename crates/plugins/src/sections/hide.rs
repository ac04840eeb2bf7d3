use std::collections::HashSet;

use stencil_dom::{word, Document, NodeId};
use stencil_template_core::TemplateError;

use super::content::{Appearance, Section};

/// How a hidable section is kept out of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HidableStrategy {
    /// Mark paragraphs, runs, rows and content controls as not rendered.
    #[default]
    VanishRuns,
    /// Wrap the region in a content control carrying the section metadata.
    ContentControl,
}

/// The nodes a section produced, gathered before they are merged back.
#[derive(Debug, Default)]
pub(crate) struct Region {
    top_level: Vec<NodeId>,
    runs: HashSet<NodeId>,
    paragraphs: Vec<NodeId>,
    rows: Vec<NodeId>,
    content_control_properties: Vec<NodeId>,
}

impl Region {
    pub fn collect(document: &Document, groups: &[Vec<NodeId>]) -> Self {
        let mut region = Region::default();
        for &node in groups.iter().flatten() {
            region.top_level.push(node);
            for candidate in std::iter::once(node).chain(document.descendants(node)) {
                match document.name(candidate) {
                    Some(word::RUN) => {
                        region.runs.insert(candidate);
                    }
                    Some(word::PARAGRAPH) => region.paragraphs.push(candidate),
                    Some(word::TABLE_ROW) => region.rows.push(candidate),
                    Some(word::CONTENT_CONTROL_PROPERTIES) => region.content_control_properties.push(candidate),
                    _ => {}
                }
            }
        }
        region
    }

    /// Top-level nodes of the region that are still block-level siblings in the tree.
    fn attached_blocks(&self, document: &Document) -> Vec<NodeId> {
        let blocks: Vec<NodeId> = self
            .top_level
            .iter()
            .copied()
            .filter(|&node| document.is_attached(node) && document.parent(node).is_some())
            .filter(|&node| {
                matches!(
                    document.name(node),
                    Some(word::PARAGRAPH | word::TABLE | word::TABLE_ROW | word::CONTENT_CONTROL)
                )
            })
            .collect();
        match blocks.first() {
            Some(&first) if blocks.iter().all(|&node| document.parent(node) == document.parent(first)) => blocks,
            _ => Vec::new(),
        }
    }

    /// Marks the region as not rendered.
    ///
    /// `head` is the paragraph the region was merged into; its mark is hidden
    /// when every run it holds came from the region.
    pub fn vanish(&self, document: &mut Document, head: NodeId) -> Result<(), TemplateError> {
        for &run in &self.runs {
            if document.is_attached(run) {
                let properties = word::ensure_properties(document, run, word::RUN_PROPERTIES, &[])?;
                word::set_flag(document, properties, word::VANISH)?;
            }
        }

        let mut paragraphs = self.paragraphs.clone();
        paragraphs.push(head);
        for paragraph in paragraphs {
            if !document.is_attached(paragraph) || !document.is_element_named(paragraph, word::PARAGRAPH) {
                continue;
            }
            let runs = document.find_descendants_named(paragraph, word::RUN);
            if runs.iter().all(|run| self.runs.contains(run)) {
                vanish_paragraph_mark(document, paragraph)?;
            }
        }

        for &row in &self.rows {
            if document.is_attached(row) {
                let properties = word::ensure_properties(
                    document,
                    row,
                    word::TABLE_ROW_PROPERTIES,
                    &[word::TABLE_PROPERTY_EXCEPTIONS],
                )?;
                word::set_flag(document, properties, word::HIDDEN)?;
            }
        }

        for &properties in &self.content_control_properties {
            if document.is_attached(properties) {
                let run_properties = word::ensure_properties(document, properties, word::RUN_PROPERTIES, &[])?;
                word::set_flag(document, run_properties, word::VANISH)?;
            }
        }
        Ok(())
    }

    /// Surrounds the region with bookmarks named after the section.
    pub fn add_bookmarks(&self, document: &mut Document, section: &Section) -> Result<(), TemplateError> {
        let blocks = self.attached_blocks(document);
        let (Some(&first), Some(&last)) = (blocks.first(), blocks.last()) else {
            return Ok(());
        };
        surround_with_bookmarks(document, section, first, last)
    }

    /// Moves the region into a content control. Returns false when the region
    /// has no block-level nodes to wrap.
    pub fn wrap_in_content_control(&self, document: &mut Document, section: &Section) -> Result<bool, TemplateError> {
        let blocks = self.attached_blocks(document);
        let (Some(&first), Some(&last)) = (blocks.first(), blocks.last()) else {
            return Ok(false);
        };
        let range = document.siblings_in_range(first, last)?;

        let control = document.create_element(word::CONTENT_CONTROL);
        let properties = content_control_properties(document, section)?;
        let content = document.create_element(word::CONTENT_CONTROL_CONTENT);
        document.append_child(control, properties)?;
        document.append_child(control, content)?;
        document.insert_before(control, first)?;
        for node in range {
            document.append_child(content, node)?;
        }

        surround_with_bookmarks(document, section, control, control)?;
        Ok(true)
    }
}

fn vanish_paragraph_mark(document: &mut Document, paragraph: NodeId) -> Result<(), TemplateError> {
    let properties = word::ensure_properties(document, paragraph, word::PARAGRAPH_PROPERTIES, &[])?;
    let run_properties = match document.find_child_named(properties, word::RUN_PROPERTIES) {
        Some(existing) => existing,
        None => {
            let created = document.create_element(word::RUN_PROPERTIES);
            let trailing = [word::SECTION_PROPERTIES, word::PARAGRAPH_PROPERTIES_CHANGE]
                .iter()
                .find_map(|name| document.find_child_named(properties, name));
            match trailing {
                Some(before) => document.insert_before(created, before)?,
                None => document.append_child(properties, created)?,
            }
            created
        }
    };
    word::set_flag(document, run_properties, word::VANISH)?;
    Ok(())
}

fn content_control_properties(document: &mut Document, section: &Section) -> Result<NodeId, TemplateError> {
    let properties = document.create_element(word::CONTENT_CONTROL_PROPERTIES);
    let hidden = section.is_hidden();

    if hidden {
        let run_properties = document.create_element(word::RUN_PROPERTIES);
        word::set_flag(document, run_properties, word::VANISH)?;
        document.append_child(properties, run_properties)?;
    }
    if let Some(name) = &section.name {
        append_value(document, properties, "w:alias", "w:val", name)?;
        append_value(document, properties, "w:tag", "w:val", name)?;
    }
    if let Some(id) = section.id.as_deref().filter(|id| id.parse::<i64>().is_ok()) {
        append_value(document, properties, "w:id", "w:val", id)?;
    }
    if section.lock {
        append_value(document, properties, "w:lock", "w:val", "sdtLocked")?;
    }
    let appearance = section.appearance.or(hidden.then_some(Appearance::Hidden));
    if let Some(appearance) = appearance {
        append_value(document, properties, "w15:appearance", "w15:val", appearance.as_str())?;
    }
    Ok(properties)
}

fn append_value(
    document: &mut Document,
    parent: NodeId,
    name: &str,
    attribute: &str,
    value: &str,
) -> Result<(), TemplateError> {
    let node = document.create_element(name);
    document.set_attribute(node, attribute, value);
    document.append_child(parent, node)?;
    Ok(())
}

fn surround_with_bookmarks(
    document: &mut Document,
    section: &Section,
    first: NodeId,
    last: NodeId,
) -> Result<(), TemplateError> {
    let (Some(id), Some(name)) = (section.id.as_deref(), section.bookmark_name()) else {
        return Ok(());
    };
    let start = document.create_element(word::BOOKMARK_START);
    document.set_attribute(start, "w:id", id);
    document.set_attribute(start, "w:name", name);
    let end = document.create_element(word::BOOKMARK_END);
    document.set_attribute(end, "w:id", id);
    document.insert_before(start, first)?;
    document.insert_after(end, last)?;
    Ok(())
}
