use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use url::Url;

use crate::app::PanelsError;
use crate::fetcher::HttpClient;

/// Images kept in memory by [`HttpImages`] unless told otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Receives downloaded image bytes, e.g. an image view.
pub trait ImageTarget: fmt::Debug + Send + Sync {
    fn set_image(&self, bytes: Vec<u8>);
}

pub type ImageCompletion = Box<dyn FnOnce(Option<PanelsError>) + Send + 'static>;

/// Speculative background fetch. Fire-and-forget.
pub trait ImagePrefetcher: Send + Sync {
    fn prefetch(&self, url: &Url, cache_key: &str);
}

pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &Url, cache_key: &str, target: Arc<dyn ImageTarget>, completion: ImageCompletion);
}

/// Downloaded images by `url#cache_key`, oldest evicted first.
struct ImageCache {
    capacity: usize,
    entries: HashMap<String, Arc<Vec<u8>>>,
    order: VecDeque<String>,
    pending: HashSet<String>,
}

impl ImageCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            pending: HashSet::new(),
        }
    }

    fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: String, bytes: Arc<Vec<u8>>) {
        if self.entries.insert(key.clone(), bytes).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

fn cache_key(url: &Url, key: &str) -> String {
    format!("{}#{}", url, key)
}

/// Image collaborator that downloads through an [`HttpClient`].
///
/// Prefetched and loaded images land in a bounded in-memory cache that
/// later loads are served from. Callable from any thread; downloads run on
/// `runtime`.
pub struct HttpImages {
    http: Arc<dyn HttpClient + Send + Sync>,
    runtime: Handle,
    cache: Arc<Mutex<ImageCache>>,
}

impl HttpImages {
    pub fn new(http: Arc<dyn HttpClient + Send + Sync>, runtime: Handle) -> Self {
        Self::with_capacity(http, runtime, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(http: Arc<dyn HttpClient + Send + Sync>, runtime: Handle, capacity: usize) -> Self {
        Self {
            http,
            runtime,
            cache: Arc::new(Mutex::new(ImageCache::new(capacity))),
        }
    }

    pub fn is_cached(&self, url: &Url, key: &str) -> bool {
        lock(&self.cache).entries.contains_key(&cache_key(url, key))
    }

    async fn download(http: &(dyn HttpClient + Send + Sync), url: &Url) -> crate::app::Result<Vec<u8>> {
        let response = http.get(url).await?;
        if !response.is_success() {
            return Err(PanelsError::UnexpectedStatus {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }
}

fn lock(cache: &Mutex<ImageCache>) -> MutexGuard<'_, ImageCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ImagePrefetcher for HttpImages {
    fn prefetch(&self, url: &Url, key: &str) {
        let key = cache_key(url, key);
        {
            let mut cache = lock(&self.cache);
            if cache.entries.contains_key(&key) || !cache.pending.insert(key.clone()) {
                return;
            }
        }

        let http = self.http.clone();
        let cache = self.cache.clone();
        let url = url.clone();
        self.runtime.spawn(async move {
            let result = Self::download(http.as_ref(), &url).await;
            let mut cache = lock(&cache);
            cache.pending.remove(&key);
            match result {
                Ok(bytes) => {
                    tracing::debug!("Prefetched {} ({} bytes)", url, bytes.len());
                    cache.insert(key, Arc::new(bytes));
                }
                Err(e) => tracing::warn!("Prefetch of {} failed: {}", url, e),
            }
        });
    }
}

impl ImageLoader for HttpImages {
    fn load(&self, url: &Url, key: &str, target: Arc<dyn ImageTarget>, completion: ImageCompletion) {
        let key = cache_key(url, key);
        let cached = lock(&self.cache).get(&key);
        if let Some(bytes) = cached {
            tracing::debug!("Image {} served from cache", url);
            target.set_image(bytes.as_ref().clone());
            completion(None);
            return;
        }

        let http = self.http.clone();
        let cache = self.cache.clone();
        let url = url.clone();
        tracing::debug!("Loading image {}", key);

        self.runtime.spawn(async move {
            match Self::download(http.as_ref(), &url).await {
                Ok(bytes) => {
                    lock(&cache).insert(key, Arc::new(bytes.clone()));
                    target.set_image(bytes);
                    completion(None);
                }
                Err(e) => completion(Some(e)),
            }
        });
    }
}
