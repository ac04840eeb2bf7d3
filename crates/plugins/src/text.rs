//! Plain text replacement, including multi-line values and checkboxes.

use serde_json::Value;
use stencil_dom::{word, Document, NodeId};
use stencil_template_core::{ContentType, ScopeData, Tag, TemplateContext, TemplateError, TemplatePlugin};

const CHECKBOX: &str = "w14:checkbox";
const CHECKED: &str = "w14:checked";
const CHECKED_STATE: &str = "w14:checkedState";
const UNCHECKED_STATE: &str = "w14:uncheckedState";
const CHECKBOX_VALUE: &str = "w14:val";
const SYMBOL_CHECKED: char = '\u{2612}';
const SYMBOL_UNCHECKED: char = '\u{2610}';

/// Writes the bound value as text in place of the tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPlugin;

impl TemplatePlugin for TextPlugin {
    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    fn simple_tag_replacement(
        &self,
        document: &mut Document,
        tag: &Tag,
        scope: &mut ScopeData<'_>,
        _context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let value = scope.scope_value();
        if let Some(checkbox) = checkbox_of(document, tag.text_node) {
            return toggle_checkbox(document, tag.text_node, checkbox, value.is_some_and(is_truthy));
        }
        let text = value.map(text_value).unwrap_or_default();
        write_lines(document, tag.text_node, &text)
    }
}

/// The string written for a data value.
///
/// Objects declaring the text content type contribute their `value` field.
pub fn text_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Object(fields) if ContentType::declared_by(value) == Some(Ok(ContentType::Text)) => {
            fields.get("value").map(text_value).unwrap_or_default()
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Truthiness used for checkboxes: empty and zero values are unchecked.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "false" && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => match ContentType::declared_by(value) {
            Some(Ok(ContentType::Text)) => value.get("value").is_some_and(is_truthy),
            _ => true,
        },
    }
}

/// Writes `text` into the tag's text node. Each further line goes into its
/// own text element after a line break in the same run.
fn write_lines(document: &mut Document, text_node: NodeId, text: &str) -> Result<(), TemplateError> {
    let mut lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));
    let first = lines.next().unwrap_or_default();
    document.set_text(text_node, first)?;

    let Some(element) = word::containing_text_element(document, text_node) else {
        return Ok(());
    };
    word::set_space_preserve(document, element);

    let mut anchor = element;
    for line in lines {
        let line_break = document.create_element(word::LINE_BREAK);
        document.insert_after(line_break, anchor)?;
        let next = document.clone_shallow(element);
        let content = document.create_text(line);
        document.append_child(next, content)?;
        document.insert_after(next, line_break)?;
        anchor = next;
    }
    Ok(())
}

/// The checkbox definition of the content control holding `text_node`.
fn checkbox_of(document: &Document, text_node: NodeId) -> Option<NodeId> {
    let control = document.find_ancestor_named(text_node, word::CONTENT_CONTROL)?;
    let properties = document.find_child_named(control, word::CONTENT_CONTROL_PROPERTIES)?;
    document.find_child_named(properties, CHECKBOX)
}

fn toggle_checkbox(
    document: &mut Document,
    text_node: NodeId,
    checkbox: NodeId,
    checked: bool,
) -> Result<(), TemplateError> {
    let state = match document.find_child_named(checkbox, CHECKED) {
        Some(existing) => existing,
        None => {
            let created = document.create_element(CHECKED);
            document.insert_child(checkbox, 0, created)?;
            created
        }
    };
    document.set_attribute(state, CHECKBOX_VALUE, if checked { "1" } else { "0" });

    let (state_name, fallback) = if checked {
        (CHECKED_STATE, SYMBOL_CHECKED)
    } else {
        (UNCHECKED_STATE, SYMBOL_UNCHECKED)
    };
    let symbol = document
        .find_child_named(checkbox, state_name)
        .and_then(|node| document.attribute(node, CHECKBOX_VALUE))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32)
        .unwrap_or(fallback);
    log::trace!("Checkbox set to {checked}");
    document.set_text(text_node, symbol.to_string())?;
    Ok(())
}
