use url::Url;

use crate::app::{PanelsError, Result};
use crate::domain::PublicationKind;

/// Builds catalog resource URLs from a base URL. No I/O.
#[derive(Debug, Clone)]
pub struct RouteComposer {
    base: Url,
}

impl RouteComposer {
    pub fn new(base: Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(PanelsError::Other(format!("Not a base URL: {}", base)));
        }
        Ok(Self { base })
    }

    pub fn parse(base: &str) -> Result<Self> {
        Self::new(Url::parse(base)?)
    }

    /// Lists characters.
    pub fn characters(&self) -> Url {
        self.compose(&["characters"])
    }

    /// Fetches a single character by id.
    pub fn character(&self, id: u64) -> Url {
        self.compose(&["characters", &id.to_string()])
    }

    /// Lists one kind of publication a character appears in.
    pub fn publications(&self, character_id: u64, kind: PublicationKind) -> Url {
        self.compose(&["characters", &character_id.to_string(), kind.segment()])
    }

    fn compose(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://gateway.marvel.com:443/v1/public/";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_characters_route() {
        let routes = RouteComposer::parse(BASE).unwrap();
        assert_eq!(
            routes.characters(),
            url("https://gateway.marvel.com:443/v1/public/characters")
        );
    }

    #[test]
    fn test_single_character_route() {
        let routes = RouteComposer::parse(BASE).unwrap();
        assert_eq!(
            routes.character(1),
            url("https://gateway.marvel.com:443/v1/public/characters/1")
        );
    }

    #[test]
    fn test_publications_route() {
        let routes = RouteComposer::parse(BASE).unwrap();
        assert_eq!(
            routes.publications(1017, PublicationKind::Story),
            url("https://gateway.marvel.com/v1/public/characters/1017/stories")
        );
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let routes = RouteComposer::parse("https://gateway.marvel.com/v1/public").unwrap();
        assert_eq!(
            routes.characters(),
            url("https://gateway.marvel.com/v1/public/characters")
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(RouteComposer::parse("mailto:someone@example.com").is_err());
        assert!(matches!(
            RouteComposer::parse("not a url"),
            Err(PanelsError::InvalidUrl(_))
        ));
    }
}
