use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Field a data value uses to declare which plugin renders it.
pub const CONTENT_TYPE_FIELD: &str = "_type";

/// The handler categories a tag can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Text,
    Image,
    Link,
    RawXml,
    Loop,
    TableLoop,
    Sections,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Text,
        ContentType::Image,
        ContentType::Link,
        ContentType::RawXml,
        ContentType::Loop,
        ContentType::TableLoop,
        ContentType::Sections,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Link => "link",
            ContentType::RawXml => "rawXml",
            ContentType::Loop => "loop",
            ContentType::TableLoop => "tableLoop",
            ContentType::Sections => "sections",
        }
    }

    /// The type a data value declares through its `_type` field.
    ///
    /// `Some(Err(name))` reports a declared type no variant matches.
    pub fn declared_by(value: &Value) -> Option<Result<ContentType, String>> {
        let declared = value.as_object()?.get(CONTENT_TYPE_FIELD)?.as_str()?;
        Some(declared.parse().map_err(|_| declared.to_string()))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|content_type| content_type.as_str() == s)
            .ok_or_else(|| format!("unknown content type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_round_trip() {
        for content_type in ContentType::ALL {
            assert_eq!(content_type.as_str().parse::<ContentType>(), Ok(content_type));
        }
        assert!("video".parse::<ContentType>().is_err());
    }

    #[test]
    fn reads_the_discriminator_field() {
        assert_eq!(ContentType::declared_by(&json!({"_type": "image"})), Some(Ok(ContentType::Image)));
        assert_eq!(ContentType::declared_by(&json!({"_type": "video"})), Some(Err("video".to_string())));
        assert_eq!(ContentType::declared_by(&json!("plain")), None);
        assert_eq!(ContentType::declared_by(&json!({"_type": 3})), None);
    }
}
