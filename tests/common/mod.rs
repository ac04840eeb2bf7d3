pub mod docx_assertions;
pub mod fixtures;

use serde_json::Value;
use stencil::{parse_document, Document, InMemoryPartSource, PartSource, TemplateHandler};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const MAIN_PART: &str = "word/document.xml";

/// A compiled main document part together with the source it was written to.
pub struct Rendered {
    pub source: InMemoryPartSource,
    pub document: Document,
}

impl Rendered {
    pub fn xml(&self) -> String {
        self.document.to_xml()
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        docx_assertions::paragraph_texts(&self.document)
    }

    /// Names of the direct children of `w:body`.
    pub fn body_children(&self) -> Vec<String> {
        docx_assertions::body_children(&self.document)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Compile a main document part built from `body` with the default handler.
pub fn render(body: &str, data: Value) -> Result<Rendered, Box<dyn std::error::Error>> {
    render_with(&TemplateHandler::new()?, body, data)
}

/// Compile a main document part built from `body` with `handler`.
pub fn render_with(
    handler: &TemplateHandler,
    body: &str,
    data: Value,
) -> Result<Rendered, Box<dyn std::error::Error>> {
    init_logger();
    let source = InMemoryPartSource::new().with_part(MAIN_PART, fixtures::document(body));
    handler.process(&source, &data)?;
    let document = source.load_part(MAIN_PART)?;
    // The saved XML must parse again.
    parse_document(&document.to_xml())?;
    Ok(Rendered { source, document })
}
