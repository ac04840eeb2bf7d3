use std::collections::VecDeque;

use stencil_dom::{word, Document, NodeId, NodeKind};

use crate::delimiters::Delimiters;

/// Position where a delimiter completes.
///
/// `index` is the byte offset, inside `text_node`, of the delimiter's last
/// character. Multi-character delimiters may start in an earlier text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterMark {
    pub text_node: NodeId,
    pub index: usize,
    pub is_open: bool,
}

/// Finds tag delimiters in the logical text of a subtree.
///
/// Word splits visible text into runs freely, so matching runs over the
/// concatenation of all text nodes and only resets at paragraph boundaries.
/// Subtrees deeper than `max_depth` are not scanned.
#[derive(Debug, Clone)]
pub struct DelimiterScanner {
    start: Vec<char>,
    end: Vec<char>,
    max_depth: usize,
}

#[derive(Default)]
struct MatchState {
    window: VecDeque<char>,
    expecting_close: bool,
}

impl MatchState {
    fn reset(&mut self) {
        self.window.clear();
        self.expecting_close = false;
    }
}

impl DelimiterScanner {
    pub fn new(delimiters: &Delimiters, max_depth: usize) -> Self {
        Self {
            start: delimiters.tag_start.chars().collect(),
            end: delimiters.tag_end.chars().collect(),
            max_depth,
        }
    }

    pub fn find_delimiters(&self, document: &Document, root: NodeId) -> Vec<DelimiterMark> {
        let mut state = MatchState::default();
        let mut marks = Vec::new();
        self.visit(document, root, 0, &mut state, &mut marks);
        marks
    }

    fn visit(
        &self,
        document: &Document,
        node: NodeId,
        depth: usize,
        state: &mut MatchState,
        marks: &mut Vec<DelimiterMark>,
    ) {
        match document.kind(node) {
            NodeKind::Text(text) => self.scan_text(node, text, state, marks),
            NodeKind::Element(element) => {
                if depth >= self.max_depth {
                    log::trace!("Skipping '{}' below the maximum scan depth {}", element.name, self.max_depth);
                    return;
                }
                let paragraph = element.name == word::PARAGRAPH;
                if paragraph {
                    state.reset();
                }
                for &child in document.children(node) {
                    self.visit(document, child, depth + 1, state, marks);
                }
                if paragraph {
                    state.reset();
                }
            }
            NodeKind::Markup(_) => {}
        }
    }

    fn scan_text(&self, node: NodeId, text: &str, state: &mut MatchState, marks: &mut Vec<DelimiterMark>) {
        let same_delimiters = self.start == self.end;
        let capacity = self.start.len().max(self.end.len());
        for (index, ch) in text.char_indices() {
            state.window.push_back(ch);
            if state.window.len() > capacity {
                state.window.pop_front();
            }

            let try_open = !(same_delimiters && state.expecting_close);
            let is_open = if try_open && ends_with(&state.window, &self.start) {
                true
            } else if ends_with(&state.window, &self.end) {
                false
            } else {
                continue;
            };
            marks.push(DelimiterMark {
                text_node: node,
                index,
                is_open,
            });
            state.window.clear();
            state.expecting_close = is_open;
        }
    }
}

fn ends_with(window: &VecDeque<char>, delimiter: &[char]) -> bool {
    window.len() >= delimiter.len()
        && window
            .iter()
            .skip(window.len() - delimiter.len())
            .eq(delimiter.iter())
}
