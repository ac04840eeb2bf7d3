//! Content plugins for the stencil template compiler
//!
//! Container plugins rewrite whole regions of a part: loops repeat them once
//! per array element and sections keep, hide or drop them. Leaf plugins
//! replace a single tag with text, raw markup, a hyperlink or an image.
//!
//! [`create_default_plugins`] returns one plugin per built-in content type.

pub mod image;
pub mod link;
pub mod loops;
pub mod raw_xml;
mod repeat;
pub mod sections;
pub mod text;

use std::sync::Arc;

use stencil_template_core::TemplatePlugin;

pub use image::ImagePlugin;
pub use link::LinkPlugin;
pub use loops::{LoopPlugin, TableLoopPlugin};
pub use raw_xml::RawXmlPlugin;
pub use sections::{HidableStrategy, SectionsPlugin};
pub use text::TextPlugin;

/// The built-in plugin set, one per content type.
pub fn create_default_plugins(hidable: HidableStrategy) -> Vec<Arc<dyn TemplatePlugin>> {
    vec![
        Arc::new(TextPlugin),
        Arc::new(RawXmlPlugin),
        Arc::new(LinkPlugin),
        Arc::new(ImagePlugin),
        Arc::new(LoopPlugin::new()),
        Arc::new(TableLoopPlugin::new()),
        Arc::new(SectionsPlugin::new(hidable)),
    ]
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use stencil_dom::Document;
    use stencil_template_core::{ContentType, ScopeData, Tag, TemplateContext, TemplateError};

    use super::*;
    use crate::test_support::{body, compile_with_plugins, RecordingResources};

    /// Stands in for the text plugin and records the scope path of every leaf.
    #[derive(Default)]
    struct PathRecorder {
        paths: Mutex<Vec<(String, usize)>>,
    }

    impl TemplatePlugin for PathRecorder {
        fn content_type(&self) -> ContentType {
            ContentType::Text
        }

        fn simple_tag_replacement(
            &self,
            _: &mut Document,
            _: &Tag,
            scope: &mut ScopeData<'_>,
            _: &TemplateContext<'_>,
        ) -> Result<(), TemplateError> {
            self.paths
                .lock()
                .unwrap()
                .push((scope.path_string(), scope.path().len()));
            Ok(())
        }
    }

    #[test]
    fn nested_containers_restore_the_scope_path() {
        let recorder = Arc::new(PathRecorder::default());
        let mut plugins = create_default_plugins(HidableStrategy::default());
        plugins.retain(|plugin| plugin.content_type() != ContentType::Text);
        plugins.push(recorder.clone());

        let shown = json!({"_type": "sections", "section": {}});
        let data = json!({"groups": [
            {"g": "A", "items": [{"v": 1, "extra": shown.clone()}, {"v": 2, "extra": shown.clone()}]},
            {"g": "B", "items": [{"v": 3, "extra": shown}]}
        ]});
        let xml = body(
            "<w:p><w:r><w:t>{#groups}</w:t></w:r></w:p>\
             <w:p><w:r><w:t>{#items}{^extra}{v}{/extra}{/items}{g}</w:t></w:r></w:p>\
             <w:p><w:r><w:t>{/groups}</w:t></w:r></w:p>",
        );

        // The helper also asserts the path is empty once compilation returns.
        compile_with_plugins(&xml, data, plugins, &RecordingResources::default()).unwrap();

        let paths = recorder.paths.lock().unwrap().clone();
        let expected = [
            ("groups.0.items.0.extra.v", 6),
            ("groups.0.items.1.extra.v", 6),
            ("groups.0.g", 3),
            ("groups.1.items.0.extra.v", 6),
            ("groups.1.g", 3),
        ];
        assert_eq!(
            paths,
            expected
                .iter()
                .map(|(path, depth)| (path.to_string(), *depth))
                .collect::<Vec<_>>()
        );
    }
}
