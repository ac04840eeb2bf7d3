use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// What happens to a hidden section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HideMode {
    /// Kept in the document but not rendered.
    #[default]
    Hidable,
    /// Removed from the document.
    #[serde(alias = "ejectable")]
    Excludable,
}

/// How Word draws the content control around a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Appearance {
    Hidden,
    BoundingBox,
}

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Hidden => "hidden",
            Appearance::BoundingBox => "boundingBox",
        }
    }
}

/// A named, possibly hidden region of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSection")]
pub struct Section {
    pub id: Option<String>,
    pub name: Option<String>,
    pub hidden: bool,
    /// `include: false` is an alternative spelling of `hidden: true`.
    pub include: Option<bool>,
    pub hide_mode: HideMode,
    pub lock: bool,
    pub appearance: Option<Appearance>,
}

/// Section data as written, before `hideMode` and its `mode` spelling are merged.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    include: Option<bool>,
    #[serde(default)]
    hide_mode: Option<HideMode>,
    #[serde(default)]
    mode: Option<HideMode>,
    #[serde(default)]
    lock: bool,
    #[serde(default)]
    appearance: Option<Appearance>,
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            hidden: raw.hidden,
            include: raw.include,
            // `hideMode` wins when both spellings are present.
            hide_mode: raw.hide_mode.or(raw.mode).unwrap_or_default(),
            lock: raw.lock,
            appearance: raw.appearance,
        }
    }
}

impl Section {
    pub fn is_hidden(&self) -> bool {
        self.hidden || self.include == Some(false)
    }

    /// Copies of the region to keep: hidable sections always stay.
    pub fn repetitions(&self) -> usize {
        match self.hide_mode {
            HideMode::Hidable => 1,
            HideMode::Excludable if self.is_hidden() => 0,
            HideMode::Excludable => 1,
        }
    }

    /// Bookmark name, defaulting to one derived from the id.
    pub fn bookmark_name(&self) -> Option<String> {
        let id = self.id.as_ref()?;
        Some(self.name.clone().unwrap_or_else(|| format!("sectionId_{id}")))
    }
}

/// The value bound to a section tag.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionContent {
    pub section: Section,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}
