use serde::Deserialize;

use crate::error::TemplateError;

/// Markers that make up the tag grammar.
///
/// All values are plain strings so multi-character delimiters such as `{{`
/// work the same way as the single-character defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Delimiters {
    pub tag_start: String,
    pub tag_end: String,
    pub container_tag_open: String,
    pub container_tag_close: String,
    pub table_tag_open: String,
    pub section_tag_open: String,
    pub tag_options_start: String,
    pub tag_options_end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            tag_start: "{".to_string(),
            tag_end: "}".to_string(),
            container_tag_open: "#".to_string(),
            container_tag_close: "/".to_string(),
            table_tag_open: "%".to_string(),
            section_tag_open: "^".to_string(),
            tag_options_start: "[".to_string(),
            tag_options_end: "]".to_string(),
        }
    }
}

impl Delimiters {
    /// Rejects empty or whitespace-padded markers and ambiguous container sigils.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let fields = [
            ("tagStart", &self.tag_start),
            ("tagEnd", &self.tag_end),
            ("containerTagOpen", &self.container_tag_open),
            ("containerTagClose", &self.container_tag_close),
            ("tableTagOpen", &self.table_tag_open),
            ("sectionTagOpen", &self.section_tag_open),
            ("tagOptionsStart", &self.tag_options_start),
            ("tagOptionsEnd", &self.tag_options_end),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(TemplateError::Config(format!("delimiter '{name}' must not be empty")));
            }
            if value.trim() != value.as_str() {
                return Err(TemplateError::Config(format!(
                    "delimiter '{name}' must not start or end with whitespace"
                )));
            }
        }
        if self.container_tag_open == self.container_tag_close {
            return Err(TemplateError::Config(
                "containerTagOpen and containerTagClose must differ".to_string(),
            ));
        }
        Ok(())
    }
}
