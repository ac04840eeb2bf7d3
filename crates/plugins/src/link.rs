//! Hyperlink insertion.

use serde::Deserialize;
use serde_json::Value;
use stencil_dom::{word, Document, DomError, NodeId};
use stencil_template_core::{
    ContentType, RelationshipType, ScopeData, Tag, TemplateContext, TemplateError, TemplatePlugin,
};

const RELATIONSHIP_ID: &str = "r:id";
const HYPERLINK_STYLE: &str = "Hyperlink";

/// The data bound to a link tag.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkContent {
    pub target: String,
    /// Displayed text. Defaults to the target.
    #[serde(default)]
    pub text: Option<String>,
}

/// Replaces the tag with a hyperlink that keeps the formatting of its run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkPlugin;

impl TemplatePlugin for LinkPlugin {
    fn content_type(&self) -> ContentType {
        ContentType::Link
    }

    fn simple_tag_replacement(
        &self,
        document: &mut Document,
        tag: &Tag,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let Some(content) = scope.scope_value().and_then(|value| link_content(value, tag)) else {
            document.detach(word::text_unit(document, tag.text_node));
            return Ok(());
        };
        let text = content.text.as_deref().unwrap_or(&content.target).to_string();

        let text_element = word::text_unit(document, tag.text_node);
        let Some(run) = word::containing_run(document, tag.text_node) else {
            log::warn!("Link '{}' is not inside a run; writing its text only", tag.name);
            document.set_text(tag.text_node, text)?;
            return Ok(());
        };

        let relationship_id = context.resources.add_relationship(
            context.part_name,
            &content.target,
            RelationshipType::Hyperlink,
            true,
        )?;
        log::debug!("Link '{}' -> {} as {}", tag.name, content.target, relationship_id);

        split_run_after(document, run, text_element)?;
        let hyperlink = document.create_element(word::HYPERLINK);
        document.set_attribute(hyperlink, RELATIONSHIP_ID, relationship_id);
        let link_run = styled_run(document, run, &text)?;
        document.append_child(hyperlink, link_run)?;
        document.insert_after(hyperlink, run)?;
        document.detach(text_element);

        if let Some(parent) = document.parent(run) {
            word::remove_empty_runs(document, parent);
        }
        Ok(())
    }
}

fn link_content(value: &Value, tag: &Tag) -> Option<LinkContent> {
    match LinkContent::deserialize(value) {
        Ok(content) => Some(content),
        Err(err) => {
            log::warn!("Link '{}' has invalid data ({err}); removing the tag", tag.name);
            None
        }
    }
}

/// Moves the children of `run` that follow `child` into a new run placed after it.
fn split_run_after(document: &mut Document, run: NodeId, child: NodeId) -> Result<(), DomError> {
    let trailing: Vec<NodeId> = document
        .children(run)
        .iter()
        .copied()
        .skip_while(|&node| node != child)
        .skip(1)
        .collect();
    if trailing.is_empty() {
        return Ok(());
    }
    let tail = document.clone_shallow(run);
    if let Some(properties) = document.find_child_named(run, word::RUN_PROPERTIES) {
        let copy = document.clone_subtree(properties);
        document.append_child(tail, copy)?;
    }
    for node in trailing {
        document.append_child(tail, node)?;
    }
    document.insert_after(tail, run)
}

/// A run holding `text`, formatted like `source` plus the hyperlink character style.
fn styled_run(document: &mut Document, source: NodeId, text: &str) -> Result<NodeId, DomError> {
    let run = document.create_element(word::RUN);
    let properties = match document.find_child_named(source, word::RUN_PROPERTIES) {
        Some(existing) => document.clone_subtree(existing),
        None => document.create_element(word::RUN_PROPERTIES),
    };
    document.append_child(run, properties)?;
    let style = match document.find_child_named(properties, word::RUN_STYLE) {
        Some(existing) => existing,
        None => {
            let created = document.create_element(word::RUN_STYLE);
            document.insert_child(properties, 0, created)?;
            created
        }
    };
    document.set_attribute(style, "w:val", HYPERLINK_STYLE);

    let text_element = document.create_element(word::TEXT);
    word::set_space_preserve(document, text_element);
    let content = document.create_text(text);
    document.append_child(text_element, content)?;
    document.append_child(run, text_element)?;
    Ok(run)
}
