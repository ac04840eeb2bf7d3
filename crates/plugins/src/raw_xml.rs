//! Verbatim markup insertion.

use serde::Deserialize;
use serde_json::Value;
use stencil_dom::{parse_fragment, word, Document};
use stencil_template_core::{ContentType, ScopeData, Tag, TemplateContext, TemplateError, TemplatePlugin};

/// The data bound to a raw markup tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawXmlContent {
    #[serde(default)]
    pub xml: Option<String>,
    /// Replace the tag's whole paragraph rather than its text element.
    #[serde(default)]
    pub replace_paragraph: bool,
}

impl RawXmlContent {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(xml) => Some(Self {
                xml: Some(xml.clone()),
                replace_paragraph: false,
            }),
            Value::Object(_) => RawXmlContent::deserialize(value)
                .map_err(|err| log::warn!("Ignoring invalid raw XML content: {err}"))
                .ok(),
            _ => None,
        }
    }
}

/// Parses the bound markup and puts it where the tag was.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawXmlPlugin;

impl TemplatePlugin for RawXmlPlugin {
    fn content_type(&self) -> ContentType {
        ContentType::RawXml
    }

    fn simple_tag_replacement(
        &self,
        document: &mut Document,
        tag: &Tag,
        scope: &mut ScopeData<'_>,
        _context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let content = scope.scope_value().and_then(RawXmlContent::from_value).unwrap_or_default();
        let text_unit = word::text_unit(document, tag.text_node);
        let target = if content.replace_paragraph {
            word::containing_paragraph(document, tag.text_node).unwrap_or(text_unit)
        } else {
            text_unit
        };

        if let Some(xml) = content.xml.as_deref().filter(|xml| !xml.trim().is_empty()) {
            let nodes = parse_fragment(document, xml)?;
            log::trace!("Inserting {} raw node(s) for '{}'", nodes.len(), tag.name);
            for node in nodes {
                document.insert_before(node, target)?;
            }
        }
        document.detach(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{body, paragraph_texts, render};

    #[test]
    fn replaces_the_text_element() {
        let doc = render(
            &body("<w:p><w:r><w:t>{raw}</w:t></w:r></w:p>"),
            json!({"raw": {"_type": "rawXml", "xml": "<w:t>inserted</w:t><w:tab/>"}}),
        );
        let run = doc.find_descendants_named(doc.root(), word::RUN)[0];
        assert_eq!(doc.node_to_xml(run), "<w:r><w:t>inserted</w:t><w:tab/></w:r>");
    }

    #[test]
    fn replaces_the_whole_paragraph() {
        let doc = render(
            &body("<w:p><w:r><w:t>before</w:t></w:r></w:p><w:p><w:r><w:t>{raw}</w:t></w:r></w:p>"),
            json!({"raw": {"_type": "rawXml", "xml": "<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p>", "replaceParagraph": true}}),
        );
        assert_eq!(paragraph_texts(&doc), vec!["before", "a", "b"]);
    }

    #[test]
    fn missing_markup_removes_the_tag() {
        let doc = render(
            &body("<w:p><w:r><w:t>x{raw}y</w:t></w:r></w:p>"),
            json!({"raw": {"_type": "rawXml"}}),
        );
        assert_eq!(paragraph_texts(&doc), vec!["xy"]);
    }

    #[test]
    fn malformed_markup_fails() {
        let result = crate::test_support::render_with(
            &body("<w:p><w:r><w:t>{raw}</w:t></w:r></w:p>"),
            json!({"raw": {"_type": "rawXml", "xml": "<w:t>open"}}),
            Default::default(),
            &Default::default(),
        );
        assert!(matches!(result, Err(TemplateError::Dom(_))));
    }
}
