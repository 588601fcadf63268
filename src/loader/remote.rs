use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::{wire, RequestSigner, RouteComposer};
use crate::app::{PanelsError, Result};
use crate::domain::{Character, Publication};
use crate::fetcher::{HttpClient, HttpResponse};
use crate::loader::{CharacterLoader, PublicationLoader, PublicationRequest};

/// Catalog loader backed by the remote HTTP API.
pub struct RemoteCatalog {
    http: Arc<dyn HttpClient + Send + Sync>,
    routes: RouteComposer,
    signer: RequestSigner,
}

impl RemoteCatalog {
    pub fn new(
        http: Arc<dyn HttpClient + Send + Sync>,
        routes: RouteComposer,
        signer: RequestSigner,
    ) -> Self {
        Self {
            http,
            routes,
            signer,
        }
    }

    async fn fetch(&self, url: &Url, page: u32, cancel: &CancellationToken) -> Result<HttpResponse> {
        let signed = self.signer.sign(url, i64::from(page));

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(PanelsError::Cancelled),
            response = self.http.get(&signed) => response?,
        };

        if response.status != 200 {
            // Path only: the query carries credentials.
            return Err(PanelsError::UnexpectedStatus {
                status: response.status,
                url: url.path().to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl PublicationLoader for RemoteCatalog {
    async fn publications(
        &self,
        request: PublicationRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Publication>> {
        let url = self.routes.publications(request.character_id, request.kind);
        let response = self.fetch(&url, request.page, cancel).await?;
        let items = wire::decode_publications(&response.body, request.kind)?;

        tracing::debug!(
            "Loaded {} {} for character {} (page {})",
            items.len(),
            request.kind,
            request.character_id,
            request.page
        );

        Ok(items)
    }
}

#[async_trait]
impl CharacterLoader for RemoteCatalog {
    async fn character(&self, id: u64, cancel: &CancellationToken) -> Result<Character> {
        let response = self.fetch(&self.routes.character(id), 0, cancel).await?;
        wire::decode_characters(&response.body)?
            .into_iter()
            .next()
            .ok_or(PanelsError::CharacterNotFound(id))
    }

    async fn characters(&self, page: u32, cancel: &CancellationToken) -> Result<Vec<Character>> {
        let response = self.fetch(&self.routes.characters(), page, cancel).await?;
        wire::decode_characters(&response.body)
    }
}
