use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::Url;

/// Format of the catalog's `modified` field, e.g. `2014-04-29T14:18:17-0400`.
const MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationKind {
    Comic,
    Series,
    Story,
    Event,
}

impl PublicationKind {
    pub const ALL: [PublicationKind; 4] = [
        PublicationKind::Comic,
        PublicationKind::Series,
        PublicationKind::Story,
        PublicationKind::Event,
    ];

    /// Path segment under `characters/{id}/`.
    pub fn segment(self) -> &'static str {
        match self {
            PublicationKind::Comic => "comics",
            PublicationKind::Series => "series",
            PublicationKind::Story => "stories",
            PublicationKind::Event => "events",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PublicationKind::Comic => "Comics",
            PublicationKind::Series => "Series",
            PublicationKind::Story => "Stories",
            PublicationKind::Event => "Events",
        }
    }
}

impl fmt::Display for PublicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for PublicationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comic" | "comics" => Ok(PublicationKind::Comic),
            "series" => Ok(PublicationKind::Series),
            "story" | "stories" => Ok(PublicationKind::Story),
            "event" | "events" => Ok(PublicationKind::Event),
            other => Err(format!(
                "Unknown publication kind: {}. Use comics, series, stories or events",
                other
            )),
        }
    }
}

/// A comic, series, story or event a character appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    id: u64,
    title: String,
    thumbnail: Option<Url>,
    modified: Option<String>,
    kind: PublicationKind,
}

impl Publication {
    pub fn new(id: u64, title: impl Into<String>, kind: PublicationKind) -> Self {
        Self {
            id,
            title: title.into(),
            thumbnail: None,
            modified: None,
            kind,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Url) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = Some(modified.into());
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn thumbnail(&self) -> Option<&Url> {
        self.thumbnail.as_ref()
    }

    /// Raw modification token, also used as the image cache key.
    pub fn modified(&self) -> Option<&str> {
        self.modified.as_deref()
    }

    pub fn kind(&self) -> PublicationKind {
        self.kind
    }

    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        self.modified
            .as_deref()
            .and_then(|m| DateTime::parse_from_str(m, MODIFIED_FORMAT).ok())
    }

    pub fn is_presentable(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// Thumbnail and cache key, when both are known.
    pub fn image_source(&self) -> Option<(&Url, &str)> {
        match (self.thumbnail.as_ref(), self.modified.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb() -> Url {
        Url::parse("http://i.annihil.us/u/prod/marvel/i/mg/c/e0/535fecbbb9784.jpg").unwrap()
    }

    #[test]
    fn test_presentable_requires_thumbnail() {
        let bare = Publication::new(1, "Avengers (1963) #1", PublicationKind::Comic);
        assert!(!bare.is_presentable());
        assert!(bare.with_thumbnail(thumb()).is_presentable());
    }

    #[test]
    fn test_image_source_needs_both_parts() {
        let only_thumb = Publication::new(1, "A", PublicationKind::Comic).with_thumbnail(thumb());
        assert!(only_thumb.image_source().is_none());

        let full = only_thumb.with_modified("2014-04-29T14:18:17-0400");
        let (url, key) = full.image_source().unwrap();
        assert_eq!(url, &thumb());
        assert_eq!(key, "2014-04-29T14:18:17-0400");
    }

    #[test]
    fn test_modified_at_parses_catalog_format() {
        let p = Publication::new(1, "A", PublicationKind::Event)
            .with_modified("2014-04-29T14:18:17-0400");
        let parsed = p.modified_at().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2014-04-29T14:18:17-04:00");
    }

    #[test]
    fn test_modified_at_tolerates_garbage() {
        let p = Publication::new(1, "A", PublicationKind::Story).with_modified("-0001-11-30T00:00:00-0500x");
        assert!(p.modified_at().is_none());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("comics".parse::<PublicationKind>().unwrap(), PublicationKind::Comic);
        assert_eq!("Stories".parse::<PublicationKind>().unwrap(), PublicationKind::Story);
        assert_eq!("event".parse::<PublicationKind>().unwrap(), PublicationKind::Event);
        assert!("movies".parse::<PublicationKind>().is_err());
    }

    #[test]
    fn test_kind_segments() {
        let segments: Vec<_> = PublicationKind::ALL.iter().map(|k| k.segment()).collect();
        assert_eq!(segments, vec!["comics", "series", "stories", "events"]);
    }
}
