pub mod http_client;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

pub use http_client::ReqwestClient;

/// Raw response of a GET; the status is not interpreted here.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse>;
}
