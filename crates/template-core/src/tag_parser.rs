use stencil_dom::{word, Document, NodeId};

use crate::delimiters::Delimiters;
use crate::error::TemplateError;
use crate::options::{parse_options, TagOptions};
use crate::scanner::DelimiterMark;
use crate::tag::{ContainerKind, Tag, TagDisposition};

/// Turns delimiter marks into tags.
///
/// Parsing normalizes the tree so every tag lives in exactly one text node,
/// then strips the tag text from that node.
#[derive(Debug, Clone)]
pub struct TagParser {
    delimiters: Delimiters,
}

impl TagParser {
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    pub fn parse(&self, document: &mut Document, marks: &[DelimiterMark]) -> Result<Vec<Tag>, TemplateError> {
        let pairs = pair_marks(document, marks)?;

        // Right to left, so cuts never shift the offsets of marks still to come.
        let mut tag_nodes = Vec::with_capacity(pairs.len());
        for (open, close) in pairs.into_iter().rev() {
            tag_nodes.push(self.normalize_tag_nodes(document, open, close)?);
        }
        tag_nodes.reverse();

        let mut tags = Vec::with_capacity(tag_nodes.len());
        for text_node in tag_nodes {
            let raw_text = document.text(text_node).unwrap_or_default().to_string();
            let tag = self.process_tag(text_node, raw_text)?;
            document.set_text(text_node, "")?;
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Isolates the text between an open and a close mark in one text node.
    fn normalize_tag_nodes(
        &self,
        document: &mut Document,
        open: DelimiterMark,
        close: DelimiterMark,
    ) -> Result<NodeId, TemplateError> {
        let (start_node, start_index) = self.rewind_to_tag_start(document, open)?;

        let close_text = document.text(close.text_node).unwrap_or_default();
        let close_width = close_text[close.index..].chars().next().map_or(0, char::len_utf8);
        let cut = close.index + close_width;
        if cut < close_text.len() {
            word::split_text_node(document, close.text_node, cut)?;
        }

        let mut end_node = close.text_node;
        let tag_node = if start_index > 0 {
            let tail = word::split_text_node(document, start_node, start_index)?;
            if start_node == close.text_node {
                end_node = tail;
            }
            tail
        } else {
            start_node
        };

        if tag_node != end_node {
            word::join_text_nodes_range(document, tag_node, end_node)?;
        }
        Ok(tag_node)
    }

    /// Walks back from the last character of the start delimiter to its first.
    fn rewind_to_tag_start(&self, document: &Document, open: DelimiterMark) -> Result<(NodeId, usize), TemplateError> {
        let mut node = open.text_node;
        let mut index = open.index;
        let mut remaining = self.delimiters.tag_start.chars().count().saturating_sub(1);
        while remaining > 0 {
            let text = document.text(node).unwrap_or_default();
            match text[..index].char_indices().next_back() {
                Some((previous, _)) => {
                    index = previous;
                    remaining -= 1;
                }
                None => {
                    node = document
                        .previous_text_node(node)
                        .ok_or_else(|| TemplateError::MissingStartDelimiter {
                            text: text.to_string(),
                        })?;
                    index = document.text(node).map_or(0, str::len);
                }
            }
        }
        Ok((node, index))
    }

    /// Classifies the raw text of one tag.
    pub fn process_tag(&self, text_node: NodeId, raw_text: String) -> Result<Tag, TemplateError> {
        let d = &self.delimiters;
        let inner = raw_text
            .strip_prefix(d.tag_start.as_str())
            .and_then(|rest| rest.strip_suffix(d.tag_end.as_str()))
            .unwrap_or(raw_text.as_str())
            .trim();

        let (head, options) = self.split_options(inner, &raw_text)?;

        let (disposition, container, name) = if let Some(rest) = head.strip_prefix(d.container_tag_open.as_str()) {
            (TagDisposition::Open, Some(ContainerKind::Loop), rest)
        } else if let Some(rest) = head.strip_prefix(d.table_tag_open.as_str()) {
            (TagDisposition::Open, Some(ContainerKind::TableLoop), rest)
        } else if let Some(rest) = head.strip_prefix(d.section_tag_open.as_str()) {
            (TagDisposition::Open, Some(ContainerKind::Section), rest)
        } else if let Some(rest) = head.strip_prefix(d.container_tag_close.as_str()) {
            (TagDisposition::Close, None, rest)
        } else {
            (TagDisposition::SelfClosed, None, head)
        };

        Ok(Tag {
            name: name.trim().to_string(),
            disposition,
            container,
            options,
            text_node,
            raw_text,
        })
    }

    fn split_options<'t>(&self, inner: &'t str, raw_text: &str) -> Result<(&'t str, TagOptions), TemplateError> {
        let d = &self.delimiters;
        let Some(position) = inner.find(d.tag_options_start.as_str()) else {
            return Ok((inner, TagOptions::new()));
        };
        let block = inner[position + d.tag_options_start.len()..]
            .strip_suffix(d.tag_options_end.as_str())
            .ok_or_else(|| TemplateError::TagOptionsParse {
                raw_text: raw_text.to_string(),
                message: format!("option block is not terminated by '{}'", d.tag_options_end),
            })?;
        let options = parse_options(block).map_err(|message| TemplateError::TagOptionsParse {
            raw_text: raw_text.to_string(),
            message,
        })?;
        Ok((&inner[..position], options))
    }
}

/// Pairs each open mark with the close mark that follows it.
fn pair_marks(document: &Document, marks: &[DelimiterMark]) -> Result<Vec<(DelimiterMark, DelimiterMark)>, TemplateError> {
    let node_text = |mark: &DelimiterMark| document.text(mark.text_node).unwrap_or_default().to_string();

    let mut pairs = Vec::new();
    let mut pending: Option<DelimiterMark> = None;
    for &mark in marks {
        match (mark.is_open, pending) {
            (true, None) => pending = Some(mark),
            (true, Some(open)) => {
                return Err(TemplateError::MissingCloseDelimiter { text: node_text(&open) });
            }
            (false, Some(open)) => {
                pairs.push((open, mark));
                pending = None;
            }
            (false, None) => {
                return Err(TemplateError::MissingStartDelimiter { text: node_text(&mark) });
            }
        }
    }
    if let Some(open) = pending {
        return Err(TemplateError::MissingCloseDelimiter { text: node_text(&open) });
    }
    Ok(pairs)
}
