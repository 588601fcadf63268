use std::sync::Arc;

use tokio::runtime::Handle;

use crate::api::{RequestSigner, RouteComposer};
use crate::app::error::{PanelsError, Result};
use crate::config::Config;
use crate::feed::{HttpImages, MainThreadDispatch, PublicationFeedProvider, UiDispatcher};
use crate::fetcher::{HttpClient, ReqwestClient};
use crate::loader::RemoteCatalog;

pub struct AppContext {
    pub config: Config,
    pub http: Arc<dyn HttpClient + Send + Sync>,
    pub catalog: Arc<RemoteCatalog>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let http: Arc<dyn HttpClient + Send + Sync> = Arc::new(ReqwestClient::new(&config.api)?);
        let routes = RouteComposer::parse(&config.api.base_url)?;
        let signer = RequestSigner::from_config(&config.api);
        let catalog = Arc::new(RemoteCatalog::new(http.clone(), routes, signer));

        Ok(Self {
            config,
            http,
            catalog,
        })
    }

    /// Fail early when the catalog would reject every request.
    pub fn require_credentials(&self) -> Result<()> {
        if self.config.api.has_credentials() {
            return Ok(());
        }
        let path = Config::default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "config.toml".to_string());
        Err(PanelsError::Config(format!(
            "public_key and private_key must be set in the [api] section of {}",
            path
        )))
    }

    /// A feed whose work runs on `runtime` and whose notifications land on `ui`.
    pub fn feed(
        &self,
        runtime: Handle,
        ui: Arc<dyn UiDispatcher>,
    ) -> MainThreadDispatch<PublicationFeedProvider> {
        let images = Arc::new(HttpImages::new(self.http.clone(), runtime.clone()));
        let provider =
            PublicationFeedProvider::new(self.catalog.clone(), images.clone(), images, ui.clone());
        MainThreadDispatch::new(provider, runtime, ui)
    }
}
