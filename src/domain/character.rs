use serde::{Deserialize, Serialize};
use url::Url;

use super::PublicationKind;

/// How many publications of each kind the catalog lists for a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearances {
    pub comics: u32,
    pub series: u32,
    pub stories: u32,
    pub events: u32,
}

impl Appearances {
    pub fn count(&self, kind: PublicationKind) -> u32 {
        match kind {
            PublicationKind::Comic => self.comics,
            PublicationKind::Series => self.series,
            PublicationKind::Story => self.stories,
            PublicationKind::Event => self.events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail: Option<Url>,
    pub modified: Option<String>,
    pub appearances: Appearances,
}

impl Character {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            thumbnail: None,
            modified: None,
            appearances: Appearances::default(),
        }
    }

    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("(No description)")
    }
}
