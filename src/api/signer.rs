use chrono::Utc;
use md5::{Digest, Md5};
use url::Url;

use crate::config::{ApiConfig, DEFAULT_PAGE_SIZE};

/// Adds pagination and authentication parameters to catalog URLs.
#[derive(Clone)]
pub struct RequestSigner {
    public_key: String,
    private_key: String,
    page_size: u32,
}

impl RequestSigner {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>, page_size: u32) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.public_key, &config.private_key, config.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Sign `url` for `page` using the current time as the timestamp.
    pub fn sign(&self, url: &Url, page: i64) -> Url {
        let ts = Utc::now().timestamp_millis().to_string();
        self.sign_at(url, page, &ts)
    }

    /// Sign `url` for `page` with an explicit timestamp.
    ///
    /// Any existing query string is replaced.
    pub fn sign_at(&self, url: &Url, page: i64, ts: &str) -> Url {
        let (offset, limit) = self.pagination(page);
        let mut signed = url.clone();
        signed.set_query(None);
        signed
            .query_pairs_mut()
            .append_pair("apikey", &self.public_key)
            .append_pair("ts", ts)
            .append_pair("hash", &self.checksum(ts))
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        signed
    }

    /// Lowercase hex of md5(ts + private key + public key).
    pub fn checksum(&self, ts: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(ts.as_bytes());
        hasher.update(self.private_key.as_bytes());
        hasher.update(self.public_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn pagination(&self, page: i64) -> (u64, u32) {
        let page = page.max(0) as u64;
        (page * u64::from(self.page_size), self.page_size)
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .finish()
    }
}
