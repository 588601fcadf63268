pub mod remote;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::app::Result;
use crate::domain::{Character, Publication, PublicationKind};

pub use remote::RemoteCatalog;

/// One page of one kind of publication for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationRequest {
    pub character_id: u64,
    pub kind: PublicationKind,
    pub page: u32,
}

#[async_trait]
pub trait PublicationLoader: Send + Sync {
    /// Load a page of publications. Resolves to `PanelsError::Cancelled`
    /// once `cancel` fires.
    async fn publications(
        &self,
        request: PublicationRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Publication>>;
}

#[async_trait]
pub trait CharacterLoader: Send + Sync {
    async fn character(&self, id: u64, cancel: &CancellationToken) -> Result<Character>;

    async fn characters(&self, page: u32, cancel: &CancellationToken) -> Result<Vec<Character>>;
}
