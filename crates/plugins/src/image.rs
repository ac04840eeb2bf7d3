//! Inline image insertion.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use stencil_dom::{word, Document, DomError, NodeId};
use stencil_template_core::{
    ContentType, RelationshipType, ScopeData, Tag, TemplateContext, TemplateError, TemplatePlugin,
};

/// English Metric Units per pixel at 96 DPI.
pub const EMUS_PER_PIXEL: f64 = 9525.0;

const DRAWING_PROPERTIES: &str = "wp:docPr";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// The data bound to an image tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// Base64 image bytes, optionally as a `data:` URL.
    pub source: String,
    /// A mime type such as `image/png`, or a bare extension.
    pub format: String,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub transparency_percent: Option<f64>,
}

impl ImageContent {
    pub fn extension(&self) -> String {
        let format = self.format.trim().to_ascii_lowercase();
        let subtype = format.rsplit('/').next().unwrap_or(&format);
        subtype.trim_end_matches("+xml").to_string()
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = match self.source.strip_prefix("data:") {
            Some(url) => url.split_once(',').map_or(url, |(_, data)| data),
            None => self.source.as_str(),
        };
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)
    }
}

fn to_emus(pixels: f64) -> i64 {
    (pixels.max(0.0) * EMUS_PER_PIXEL).round() as i64
}

/// Replaces the tag with an inline picture stored as a media part.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePlugin;

impl TemplatePlugin for ImagePlugin {
    fn content_type(&self) -> ContentType {
        ContentType::Image
    }

    fn simple_tag_replacement(
        &self,
        document: &mut Document,
        tag: &Tag,
        scope: &mut ScopeData<'_>,
        context: &TemplateContext<'_>,
    ) -> Result<(), TemplateError> {
        let text_element = word::text_unit(document, tag.text_node);
        let content = match scope.scope_value().map(ImageContent::deserialize) {
            Some(Ok(content)) => content,
            Some(Err(err)) => {
                log::warn!("Image '{}' has invalid data ({err}); removing the tag", tag.name);
                document.detach(text_element);
                return Ok(());
            }
            None => {
                document.detach(text_element);
                return Ok(());
            }
        };
        let bytes = match content.decode() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Image '{}' is not valid base64 ({err}); removing the tag", tag.name);
                document.detach(text_element);
                return Ok(());
            }
        };
        if word::containing_run(document, tag.text_node).is_none() {
            log::warn!("Image '{}' is not inside a run; removing the tag", tag.name);
            document.detach(text_element);
            return Ok(());
        }

        let media_path = context.resources.add_media(bytes, &content.extension())?;
        let relationship_id =
            context
                .resources
                .add_relationship(context.part_name, &media_path, RelationshipType::Image, false)?;
        let picture_id = next_picture_id(document);
        log::debug!(
            "Image '{}' stored as {} ({}), picture #{}",
            tag.name,
            media_path,
            relationship_id,
            picture_id
        );

        let drawing = build_drawing(document, &content, &relationship_id, picture_id)?;
        document.insert_before(drawing, text_element)?;
        document.detach(text_element);
        Ok(())
    }
}

/// One more than the largest drawing id in the arena. Detached copies count
/// too, so pictures created inside repeated regions never share an id.
fn next_picture_id(document: &Document) -> u32 {
    document
        .node_ids()
        .filter(|&node| document.is_element_named(node, DRAWING_PROPERTIES))
        .filter_map(|node| document.attribute(node, "id")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

fn element(
    document: &mut Document,
    parent: Option<NodeId>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<NodeId, DomError> {
    let node = document.create_element(name);
    for &(key, value) in attributes {
        document.set_attribute(node, key, value);
    }
    if let Some(parent) = parent {
        document.append_child(parent, node)?;
    }
    Ok(node)
}

fn build_drawing(
    document: &mut Document,
    content: &ImageContent,
    relationship_id: &str,
    picture_id: u32,
) -> Result<NodeId, DomError> {
    let cx = to_emus(content.width).to_string();
    let cy = to_emus(content.height).to_string();
    let id = picture_id.to_string();
    let name = format!("Picture {picture_id}");
    let description = content.alt_text.as_deref().unwrap_or_default();

    let drawing = element(document, None, word::DRAWING, &[])?;
    let inline = element(
        document,
        Some(drawing),
        "wp:inline",
        &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
    )?;
    element(document, Some(inline), "wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    element(
        document,
        Some(inline),
        "wp:effectExtent",
        &[("l", "0"), ("t", "0"), ("r", "0"), ("b", "0")],
    )?;
    element(
        document,
        Some(inline),
        DRAWING_PROPERTIES,
        &[("id", id.as_str()), ("name", name.as_str()), ("descr", description)],
    )?;
    let frame = element(document, Some(inline), "wp:cNvGraphicFramePr", &[])?;
    element(
        document,
        Some(frame),
        "a:graphicFrameLocks",
        &[("xmlns:a", NS_DRAWING), ("noChangeAspect", "1")],
    )?;

    let graphic = element(document, Some(inline), "a:graphic", &[("xmlns:a", NS_DRAWING)])?;
    let data = element(document, Some(graphic), "a:graphicData", &[("uri", NS_PICTURE)])?;
    let picture = element(document, Some(data), "pic:pic", &[("xmlns:pic", NS_PICTURE)])?;

    let non_visual = element(document, Some(picture), "pic:nvPicPr", &[])?;
    element(
        document,
        Some(non_visual),
        "pic:cNvPr",
        &[("id", "0"), ("name", name.as_str()), ("descr", description)],
    )?;
    element(document, Some(non_visual), "pic:cNvPicPr", &[])?;

    let fill = element(document, Some(picture), "pic:blipFill", &[])?;
    let blip = element(document, Some(fill), "a:blip", &[("r:embed", relationship_id)])?;
    if let Some(percent) = content.transparency_percent {
        let amount = ((100.0 - percent.clamp(0.0, 100.0)) * 1000.0).round() as i64;
        element(document, Some(blip), "a:alphaModFix", &[("amt", amount.to_string().as_str())])?;
    }
    let stretch = element(document, Some(fill), "a:stretch", &[])?;
    element(document, Some(stretch), "a:fillRect", &[])?;

    let shape = element(document, Some(picture), "pic:spPr", &[])?;
    let transform = element(document, Some(shape), "a:xfrm", &[])?;
    element(document, Some(transform), "a:off", &[("x", "0"), ("y", "0")])?;
    element(document, Some(transform), "a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    let geometry = element(document, Some(shape), "a:prstGeom", &[("prst", "rect")])?;
    element(document, Some(geometry), "a:avLst", &[])?;

    Ok(drawing)
}
