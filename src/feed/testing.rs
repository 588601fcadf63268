//! Fakes shared by the feed tests.

use std::collections::VecDeque;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::{PanelsError, Result};
use crate::domain::{Publication, PublicationKind};
use crate::feed::{ChangeCallback, FeedChange, ImageCompletion, ImageLoader, ImagePrefetcher, ImageTarget};
use crate::loader::{PublicationLoader, PublicationRequest};

pub fn publication(id: u64, title: &str) -> Publication {
    Publication::new(id, title, PublicationKind::Comic)
}

pub fn imaged(id: u64, title: &str) -> Publication {
    publication(id, title)
        .with_thumbnail(Url::parse(&format!("http://img.example.com/{}.jpg", id)).unwrap())
        .with_modified(format!("2020-01-0{}T00:00:00-0500", id % 9 + 1))
}

/// Loader that replays scripted responses, optionally held until released.
pub struct ScriptedLoader {
    responses: Mutex<VecDeque<Result<Vec<Publication>>>>,
    requests: Mutex<Vec<PublicationRequest>>,
    gate: Option<Semaphore>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every call waits for a `release`.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn respond(self, response: Result<Vec<Publication>>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<PublicationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn wait_for_requests(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.requests.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("loader was not called in time");
    }
}

#[async_trait]
impl PublicationLoader for ScriptedLoader {
    async fn publications(
        &self,
        request: PublicationRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Publication>> {
        self.requests.lock().unwrap().push(request);

        if let Some(gate) = &self.gate {
            tokio::select! {
                _ = cancel.cancelled() => return Err(PanelsError::Cancelled),
                permit = gate.acquire() => permit.expect("gate closed").forget(),
            }
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
pub struct RecordingPrefetcher {
    pub calls: Mutex<Vec<(Url, String)>>,
}

impl ImagePrefetcher for RecordingPrefetcher {
    fn prefetch(&self, url: &Url, cache_key: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((url.clone(), cache_key.to_string()));
    }
}

/// Reports each load with the name of the thread it ran on.
pub struct ReportingImageLoader {
    tx: Mutex<std_mpsc::Sender<(Url, String, Option<String>)>>,
}

impl ReportingImageLoader {
    pub fn new() -> (Self, std_mpsc::Receiver<(Url, String, Option<String>)>) {
        let (tx, rx) = std_mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }
}

impl ImageLoader for ReportingImageLoader {
    fn load(&self, url: &Url, cache_key: &str, target: Arc<dyn ImageTarget>, completion: ImageCompletion) {
        let thread = std::thread::current().name().map(String::from);
        target.set_image(url.as_str().as_bytes().to_vec());
        let _ = self
            .tx
            .lock()
            .unwrap()
            .send((url.clone(), cache_key.to_string(), thread));
        completion(None);
    }
}

#[derive(Debug, Default)]
pub struct MemoryTarget {
    pub image: Mutex<Option<Vec<u8>>>,
}

impl ImageTarget for MemoryTarget {
    fn set_image(&self, bytes: Vec<u8>) {
        *self.image.lock().unwrap() = Some(bytes);
    }
}

/// Observer that records every change it sees.
pub fn recorder() -> (Arc<Mutex<Vec<FeedChange>>>, ChangeCallback) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    (
        changes,
        Arc::new(move |change: &FeedChange| sink.lock().unwrap().push(change.clone())),
    )
}
