//! Catalog JSON envelope and its conversion into domain types.
//!
//! Every response looks like
//! `{"code": 200, "status": "Ok", "data": {"offset", "limit", "total", "count", "results": [...]}}`.

use html_escape::decode_html_entities;
use serde::Deserialize;
use url::Url;

use crate::app::Result;
use crate::domain::{Appearances, Character, Publication, PublicationKind};

/// Only `data.results` is read; the other envelope fields are ignored.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Page<T>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

impl Thumbnail {
    pub fn url(&self) -> Option<Url> {
        if self.path.is_empty() {
            return None;
        }
        Url::parse(&format!("{}.{}", self.path, self.extension)).ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct PublicationRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub available: u32,
}

#[derive(Debug, Deserialize)]
pub struct CharacterRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub comics: ResourceList,
    #[serde(default)]
    pub series: ResourceList,
    #[serde(default)]
    pub stories: ResourceList,
    #[serde(default)]
    pub events: ResourceList,
}

pub fn decode_publications(body: &[u8], kind: PublicationKind) -> Result<Vec<Publication>> {
    let envelope: Envelope<PublicationRecord> = serde_json::from_slice(body)?;
    Ok(envelope
        .data
        .results
        .into_iter()
        .map(|record| record.into_publication(kind))
        .collect())
}

pub fn decode_characters(body: &[u8]) -> Result<Vec<Character>> {
    let envelope: Envelope<CharacterRecord> = serde_json::from_slice(body)?;
    Ok(envelope
        .data
        .results
        .into_iter()
        .map(CharacterRecord::into_character)
        .collect())
}

impl PublicationRecord {
    fn into_publication(self, kind: PublicationKind) -> Publication {
        let title = self
            .title
            .map(|t| decode_html_entities(t.trim()).to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "(Untitled)".to_string());

        let mut publication = Publication::new(self.id, title, kind);
        if let Some(url) = self.thumbnail.as_ref().and_then(Thumbnail::url) {
            publication = publication.with_thumbnail(url);
        }
        if let Some(modified) = self.modified.filter(|m| !m.is_empty()) {
            publication = publication.with_modified(modified);
        }
        publication
    }
}

impl CharacterRecord {
    fn into_character(self) -> Character {
        let mut character = Character::new(self.id, decode_html_entities(&self.name).to_string());
        character.description = self
            .description
            .map(|d| decode_html_entities(&d).to_string());
        character.thumbnail = self.thumbnail.as_ref().and_then(Thumbnail::url);
        character.modified = self.modified;
        character.appearances = Appearances {
            comics: self.comics.available,
            series: self.series.available,
            stories: self.stories.available,
            events: self.events.available,
        };
        character
    }
}
