use std::collections::HashMap;
use std::sync::Arc;

use stencil_dom::{Document, NodeId};

use crate::content::ContentType;
use crate::delimiters::Delimiters;
use crate::error::TemplateError;
use crate::plugin::{TemplateContext, TemplatePlugin};
use crate::scanner::DelimiterScanner;
use crate::scope::{PathPart, ScopeData};
use crate::tag::{ContainerKind, Tag, TagDisposition};
use crate::tag_parser::TagParser;

/// Compiler settings that do not depend on the plugin set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Leave `{}` tags in place instead of resolving an empty name.
    pub skip_empty_tags: bool,
    pub default_content_type: ContentType,
    pub container_content_type: ContentType,
    pub table_container_content_type: ContentType,
    pub section_content_type: ContentType,
    pub max_xml_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            skip_empty_tags: false,
            default_content_type: ContentType::Text,
            container_content_type: ContentType::Loop,
            table_container_content_type: ContentType::TableLoop,
            section_content_type: ContentType::Sections,
            max_xml_depth: 20,
        }
    }
}

/// Registry of plugins keyed by the content type they render.
pub type PluginRegistry = HashMap<ContentType, Arc<dyn TemplatePlugin>>;

/// Scans, parses and compiles the tags of a subtree.
///
/// The compiler is immutable after construction and can be shared between
/// threads; all per-run state lives in the [`ScopeData`] and the document.
pub struct TemplateCompiler {
    scanner: DelimiterScanner,
    parser: TagParser,
    plugins: PluginRegistry,
    options: CompilerOptions,
}

impl TemplateCompiler {
    pub fn new(
        delimiters: Delimiters,
        plugins: Vec<Arc<dyn TemplatePlugin>>,
        options: CompilerOptions,
    ) -> Result<Self, TemplateError> {
        delimiters.validate()?;
        if options.max_xml_depth == 0 {
            return Err(TemplateError::Config("max_xml_depth must be positive".to_string()));
        }
        let plugins = plugins
            .into_iter()
            .map(|plugin| (plugin.content_type(), plugin))
            .collect();
        Ok(Self {
            scanner: DelimiterScanner::new(&delimiters, options.max_xml_depth),
            parser: TagParser::new(delimiters),
            plugins,
            options,
        })
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn plugin(&self, content_type: ContentType) -> Option<&Arc<dyn TemplatePlugin>> {
        self.plugins.get(&content_type)
    }

    /// Scans and parses the tags under `root`. The tag text is stripped from the tree.
    pub fn parse_tags(&self, document: &mut Document, root: NodeId) -> Result<Vec<Tag>, TemplateError> {
        let marks = self.scanner.find_delimiters(document, root);
        self.parser.parse(document, &marks)
    }

    pub fn compile(
        &self,
        document: &mut Document,
        root: NodeId,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let tags = self.parse_tags(document, root)?;
        self.compile_tags(document, &tags, scope, context)
    }

    /// Dispatches already-parsed tags in one left-to-right pass.
    pub fn compile_tags(
        &self,
        document: &mut Document,
        tags: &[Tag],
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        log::debug!(
            "Compiling {} tag(s) of part '{}' at scope '{}'",
            tags.len(),
            context.part_name,
            scope.path_string()
        );

        let mut index = 0;
        while index < tags.len() {
            let tag = &tags[index];
            if tag.name.is_empty() && self.options.skip_empty_tags {
                // Parsing stripped the delimiters; put them back.
                document.set_text(tag.text_node, tag.raw_text.clone())?;
                index += 1;
                continue;
            }
            let last = scope.with_part(PathPart::Key(tag.name.clone()), |scope| {
                self.replace_tag(document, tags, index, scope, context)
            })?;
            index = last + 1;
        }
        Ok(())
    }

    /// Replaces the tag at `index` and returns the index of the last tag it consumed.
    fn replace_tag(
        &self,
        document: &mut Document,
        tags: &[Tag],
        index: usize,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<usize, TemplateError> {
        let tag = &tags[index];
        let content_type = self.detect_content_type(tag, scope)?;
        let plugin = self
            .plugins
            .get(&content_type)
            .ok_or_else(|| TemplateError::UnknownContentType {
                content_type: content_type.to_string(),
                raw_text: tag.raw_text.clone(),
                path: scope.path_string(),
            })?;
        log::trace!("Tag '{}' at '{}' resolved to {}", tag.raw_text, scope.path_string(), content_type);

        match tag.disposition {
            TagDisposition::SelfClosed => {
                plugin.simple_tag_replacement(document, tag, scope, context)?;
                Ok(index)
            }
            TagDisposition::Open => {
                let close = find_close_tag_index(tags, index)?;
                plugin.container_tag_replacement(self, document, &tags[index..=close], scope, context)?;
                Ok(close)
            }
            TagDisposition::Close => {
                log::warn!("Ignoring close tag '{}' without a matching open tag", tag.raw_text);
                Ok(index)
            }
        }
    }

    fn detect_content_type(&self, tag: &Tag, scope: &ScopeData<'_>) -> Result<ContentType, TemplateError> {
        match tag.disposition {
            TagDisposition::Open | TagDisposition::Close => Ok(match tag.container {
                Some(ContainerKind::TableLoop) => self.options.table_container_content_type,
                Some(ContainerKind::Section) => self.options.section_content_type,
                Some(ContainerKind::Loop) | None => self.options.container_content_type,
            }),
            TagDisposition::SelfClosed => match scope.scope_value().and_then(ContentType::declared_by) {
                Some(Ok(content_type)) => Ok(content_type),
                Some(Err(declared)) => Err(TemplateError::UnknownContentType {
                    content_type: declared,
                    raw_text: tag.raw_text.clone(),
                    path: scope.path_string(),
                }),
                None => Ok(self.options.default_content_type),
            },
        }
    }
}

/// The nearest close tag after `open_index` with the same name.
fn find_close_tag_index(tags: &[Tag], open_index: usize) -> Result<usize, TemplateError> {
    let open = &tags[open_index];
    tags.iter()
        .enumerate()
        .skip(open_index + 1)
        .find(|(_, tag)| tag.disposition == TagDisposition::Close && tag.name == open.name)
        .map(|(index, _)| index)
        .ok_or_else(|| TemplateError::UnclosedTag {
            name: open.name.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PartResources, RelationshipType};
    use crate::scope::LexicalScopeResolver;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use stencil_dom::parse_document;

    struct NoResources;

    impl PartResources for NoResources {
        fn add_relationship(&self, _: &str, _: &str, _: RelationshipType, _: bool) -> Result<String, TemplateError> {
            Err(TemplateError::Config("no resources".to_string()))
        }

        fn add_media(&self, _: Vec<u8>, _: &str) -> Result<String, TemplateError> {
            Err(TemplateError::Config("no resources".to_string()))
        }
    }

    /// Records every call so dispatch can be asserted.
    #[derive(Default)]
    struct Recorder {
        content_type: Option<ContentType>,
        calls: Mutex<Vec<(String, String, usize)>>,
    }

    impl Recorder {
        fn of(content_type: ContentType) -> Arc<Self> {
            Arc::new(Self {
                content_type: Some(content_type),
                calls: Mutex::default(),
            })
        }

        fn calls(&self) -> Vec<(String, String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TemplatePlugin for Recorder {
        fn content_type(&self) -> ContentType {
            self.content_type.unwrap_or(ContentType::Text)
        }

        fn simple_tag_replacement(
            &self,
            _: &mut Document,
            tag: &Tag,
            scope: &mut ScopeData<'_>,
            _: &TemplateContext<'_>,
        ) -> Result<(), TemplateError> {
            self.calls.lock().unwrap().push((tag.name.clone(), scope.path_string(), 1));
            Ok(())
        }

        fn container_tag_replacement(
            &self,
            _: &TemplateCompiler,
            _: &mut Document,
            tags: &[Tag],
            scope: &mut ScopeData<'_>,
            _: &TemplateContext<'_>,
        ) -> Result<(), TemplateError> {
            self.calls
                .lock()
                .unwrap()
                .push((tags[0].name.clone(), scope.path_string(), tags.len()));
            Ok(())
        }
    }

    fn run(xml: &str, data: Value, plugins: Vec<Arc<dyn TemplatePlugin>>) -> Result<(), TemplateError> {
        let _ = env_logger::builder().is_test(true).try_init();
        let compiler = TemplateCompiler::new(Delimiters::default(), plugins, CompilerOptions::default())?;
        let mut doc = parse_document(xml).unwrap();
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        let context = TemplateContext::new("word/document.xml", &NoResources);
        let root = doc.root();
        compiler.compile(&mut doc, root, &mut scope, &context)?;
        assert!(scope.path().is_empty());
        Ok(())
    }

    #[test]
    fn nearest_close_tag_wins() {
        let loops = Recorder::of(ContentType::Loop);
        let text = Recorder::of(ContentType::Text);
        run(
            "<w:p><w:t>{#a}{#a}{/a}{/a}{x}</w:t></w:p>",
            json!({}),
            vec![loops.clone(), text.clone()],
        )
        .unwrap();
        // The first open consumes up to the first close; the outer loop then
        // sees the stray second close and the trailing leaf.
        assert_eq!(loops.calls(), vec![("a".to_string(), "a".to_string(), 3)]);
        assert_eq!(text.calls(), vec![("x".to_string(), "x".to_string(), 1)]);
    }

    #[test]
    fn sigils_route_to_their_container_types() {
        let table = Recorder::of(ContentType::TableLoop);
        let sections = Recorder::of(ContentType::Sections);
        run(
            "<w:p><w:t>{%rows}{/rows}{^part}{/part}</w:t></w:p>",
            json!({}),
            vec![table.clone(), sections.clone()],
        )
        .unwrap();
        assert_eq!(table.calls().len(), 1);
        assert_eq!(sections.calls().len(), 1);
    }

    #[test]
    fn data_declares_the_leaf_content_type() {
        let image = Recorder::of(ContentType::Image);
        let text = Recorder::of(ContentType::Text);
        run(
            "<w:p><w:t>{logo}{name}</w:t></w:p>",
            json!({"logo": {"_type": "image"}, "name": "x"}),
            vec![image.clone(), text.clone()],
        )
        .unwrap();
        assert_eq!(image.calls(), vec![("logo".to_string(), "logo".to_string(), 1)]);
        assert_eq!(text.calls(), vec![("name".to_string(), "name".to_string(), 1)]);
    }

    #[test]
    fn unknown_content_type_reports_the_path() {
        let err = run(
            "<w:p><w:t>{clip}</w:t></w:p>",
            json!({"clip": {"_type": "video"}}),
            vec![Recorder::of(ContentType::Text)],
        )
        .unwrap_err();
        match err {
            TemplateError::UnknownContentType {
                content_type,
                raw_text,
                path,
            } => {
                assert_eq!(content_type, "video");
                assert_eq!(raw_text, "{clip}");
                assert_eq!(path, "clip");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unregistered_plugin_is_a_routing_error() {
        let err = run("<w:p><w:t>{#a}{/a}</w:t></w:p>", json!({}), vec![Recorder::of(ContentType::Text)]).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownContentType { content_type, .. } if content_type == "loop"));
    }

    #[test]
    fn unclosed_open_tag_fails() {
        let err = run("<w:p><w:t>{#a}{x}</w:t></w:p>", json!({}), vec![Recorder::of(ContentType::Loop)]).unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedTag { name } if name == "a"));
    }

    #[test]
    fn empty_tags_can_be_skipped() {
        let text = Recorder::of(ContentType::Text);
        let compiler = TemplateCompiler::new(
            Delimiters::default(),
            vec![text.clone()],
            CompilerOptions {
                skip_empty_tags: true,
                ..CompilerOptions::default()
            },
        )
        .unwrap();
        let mut doc = parse_document("<w:p><w:t>{}{a}</w:t></w:p>").unwrap();
        let data = json!({});
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        let root = doc.root();
        compiler
            .compile(&mut doc, root, &mut scope, &TemplateContext::new("part", &NoResources))
            .unwrap();
        assert_eq!(text.calls().len(), 1);
        assert_eq!(doc.text_content(root), "{}");
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let delimiters = Delimiters {
            container_tag_close: "#".to_string(),
            ..Delimiters::default()
        };
        assert!(TemplateCompiler::new(delimiters, vec![], CompilerOptions::default()).is_err());
    }

    #[test]
    fn documents_without_tags_are_untouched() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t xml:space="preserve">plain </w:t></w:r></w:p></w:body></w:document>"#;
        let compiler = TemplateCompiler::new(Delimiters::default(), vec![], CompilerOptions::default()).unwrap();
        let mut doc = parse_document(xml).unwrap();
        let data = json!({});
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        let root = doc.root();
        compiler
            .compile(&mut doc, root, &mut scope, &TemplateContext::new("part", &NoResources))
            .unwrap();
        assert_eq!(doc.to_xml(), xml);
    }
}
