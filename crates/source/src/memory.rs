use std::collections::HashMap;
use std::sync::RwLock;

use stencil_dom::{parse_document, Document};
use stencil_template_core::{PartResources, RelationshipType, TemplateError};

use crate::error::SourceError;
use crate::PartSource;

/// One relationship registered for a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub target: String,
    pub relationship: RelationshipType,
    pub external: bool,
}

/// Relationships and media files created while compiling, kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryResources {
    relationships: RwLock<HashMap<String, Vec<Relationship>>>,
    media: RwLock<Vec<(String, Vec<u8>)>>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationships registered for `part`, in creation order.
    ///
    /// Returns an empty list if the lock is poisoned.
    pub fn relationships(&self, part: &str) -> Vec<Relationship> {
        self.relationships
            .read()
            .ok()
            .and_then(|all| all.get(part).cloned())
            .unwrap_or_default()
    }

    /// Stored media paths, in creation order.
    pub fn media_paths(&self) -> Vec<String> {
        self.media
            .read()
            .map(|media| media.iter().map(|(path, _)| path.clone()).collect())
            .unwrap_or_default()
    }

    pub fn media_file(&self, path: &str) -> Option<Vec<u8>> {
        let media = self.media.read().ok()?;
        media
            .iter()
            .find(|(stored, _)| stored == path)
            .map(|(_, bytes)| bytes.clone())
    }
}

impl PartResources for InMemoryResources {
    fn add_relationship(
        &self,
        part: &str,
        target: &str,
        relationship: RelationshipType,
        external: bool,
    ) -> Result<String, TemplateError> {
        let mut all = self
            .relationships
            .write()
            .map_err(|_| SourceError::LockPoisoned(part.to_string()))?;
        let entries = all.entry(part.to_string()).or_default();
        let id = format!("rId{}", entries.len() + 1);
        entries.push(Relationship {
            id: id.clone(),
            target: target.to_string(),
            relationship,
            external,
        });
        log::trace!("Relationship {id} of '{part}' -> {target}");
        Ok(id)
    }

    fn add_media(&self, bytes: Vec<u8>, extension: &str) -> Result<String, TemplateError> {
        let mut media = self
            .media
            .write()
            .map_err(|_| SourceError::LockPoisoned("media".to_string()))?;
        let path = format!("media/image{}.{}", media.len() + 1, extension);
        log::trace!("Stored {} byte(s) as {path}", bytes.len());
        media.push((path.clone(), bytes));
        Ok(path)
    }
}

/// A part source holding XML strings in memory.
///
/// Parts are listed in insertion order, which is the order they are processed in.
#[derive(Debug, Default)]
pub struct InMemoryPartSource {
    parts: RwLock<Vec<(String, String)>>,
    resources: InMemoryResources,
}

impl InMemoryPartSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`InMemoryPartSource::add_part`].
    pub fn with_part(self, name: impl Into<String>, xml: impl Into<String>) -> Self {
        let name = name.into();
        match self.parts.write() {
            Ok(mut parts) => upsert(&mut parts, name, xml.into()),
            Err(_) => log::warn!("Part store lock poisoned; dropping part '{name}'"),
        }
        self
    }

    /// Adds or replaces a part.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::LockPoisoned` if the internal lock is poisoned.
    pub fn add_part(&self, name: impl Into<String>, xml: impl Into<String>) -> Result<(), SourceError> {
        let name = name.into();
        let mut parts = self
            .parts
            .write()
            .map_err(|_| SourceError::LockPoisoned(name.clone()))?;
        upsert(&mut parts, name, xml.into());
        Ok(())
    }

    /// The current XML of a part.
    pub fn part_xml(&self, name: &str) -> Option<String> {
        let parts = self.parts.read().ok()?;
        parts
            .iter()
            .find(|(stored, _)| stored == name)
            .map(|(_, xml)| xml.clone())
    }

    pub fn in_memory_resources(&self) -> &InMemoryResources {
        &self.resources
    }
}

fn upsert(parts: &mut Vec<(String, String)>, name: String, xml: String) {
    match parts.iter_mut().find(|(stored, _)| *stored == name) {
        Some(existing) => existing.1 = xml,
        None => parts.push((name, xml)),
    }
}

impl PartSource for InMemoryPartSource {
    fn part_names(&self) -> Vec<String> {
        self.parts
            .read()
            .map(|parts| parts.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn load_part(&self, name: &str) -> Result<Document, SourceError> {
        let xml = self
            .part_xml(name)
            .ok_or_else(|| SourceError::PartNotFound(name.to_string()))?;
        parse_document(&xml).map_err(|err| SourceError::Malformed {
            part: name.to_string(),
            message: err.to_string(),
        })
    }

    fn save_part(&self, name: &str, document: &Document) -> Result<(), SourceError> {
        let mut parts = self
            .parts
            .write()
            .map_err(|_| SourceError::LockPoisoned(name.to_string()))?;
        upsert(&mut parts, name.to_string(), document.to_xml());
        Ok(())
    }

    fn resources(&self) -> &dyn PartResources {
        &self.resources
    }

    fn name(&self) -> &'static str {
        "InMemoryPartSource"
    }
}
