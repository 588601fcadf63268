use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::PanelsError;
use crate::domain::{Publication, PublicationKind};
use crate::feed::{
    run_on_ui, ChangeCallback, FeedAction, FeedChange, FeedDataProvider, ImageLoader,
    ImagePrefetcher, ImageTarget, LoadKind, ObserverSlot, PendingLoad, Subscription,
    UiDispatcher,
};
use crate::loader::{PublicationLoader, PublicationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPhase {
    Idle,
    Loading(LoadKind),
}

struct FeedState {
    items: Vec<Publication>,
    next_page: u32,
    phase: LoadPhase,
    last_error: Option<Arc<PanelsError>>,
}

/// Owns one character's feed of one publication kind.
///
/// At most one load is in flight; load actions arriving meanwhile are
/// dropped. Notifications fire on whichever thread completed the load.
pub struct PublicationFeedProvider {
    loader: Arc<dyn PublicationLoader>,
    prefetcher: Arc<dyn ImagePrefetcher>,
    images: Arc<dyn ImageLoader>,
    ui: Arc<dyn UiDispatcher>,
    state: Arc<Mutex<FeedState>>,
    observer: Arc<ObserverSlot>,
    cancel: CancellationToken,
}

/// Holds the `Loading` phase; falls back to `Idle` if dropped unfinished.
struct InFlight {
    state: Arc<Mutex<FeedState>>,
    kind: LoadKind,
    finished: bool,
}

impl InFlight {
    /// Return to `Idle` and apply the loader's result.
    fn complete(
        mut self,
        request: &PublicationRequest,
        result: crate::app::Result<Vec<Publication>>,
    ) -> Option<FeedChange> {
        let mut state = lock(&self.state);
        state.phase = LoadPhase::Idle;
        self.finished = true;

        let kind = self.kind;
        match result {
            Ok(items) => {
                state.last_error = None;
                info!(
                    "Loaded {} {} for character {} (page {})",
                    items.len(),
                    request.kind,
                    request.character_id,
                    request.page
                );
                match kind {
                    LoadKind::FromStart => {
                        state.items = items;
                        Some(FeedChange::Replaced {
                            count: state.items.len(),
                        })
                    }
                    LoadKind::More => {
                        let start = state.items.len();
                        state.items.extend(items);
                        Some(FeedChange::Appended {
                            range: start..state.items.len(),
                        })
                    }
                }
            }
            Err(PanelsError::Cancelled) => {
                debug!("{:?} load of page {} cancelled", kind, request.page);
                None
            }
            Err(e) => {
                warn!(
                    "Loading {} for character {} (page {}) failed: {}",
                    request.kind, request.character_id, request.page, e
                );
                let error = Arc::new(e);
                state.last_error = Some(error.clone());
                Some(FeedChange::LoadFailed { kind, error })
            }
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            lock(&self.state).phase = LoadPhase::Idle;
        }
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PublicationFeedProvider {
    pub fn new(
        loader: Arc<dyn PublicationLoader>,
        prefetcher: Arc<dyn ImagePrefetcher>,
        images: Arc<dyn ImageLoader>,
        ui: Arc<dyn UiDispatcher>,
    ) -> Self {
        Self {
            loader,
            prefetcher,
            images,
            ui,
            state: Arc::new(Mutex::new(FeedState {
                items: Vec::new(),
                next_page: 0,
                phase: LoadPhase::Idle,
                last_error: None,
            })),
            observer: Arc::new(ObserverSlot::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Enter `Loading` unless a load is already in flight.
    fn begin(&self, kind: LoadKind) -> Option<(InFlight, u32)> {
        let mut state = lock(&self.state);
        if let LoadPhase::Loading(current) = state.phase {
            debug!("Dropping {:?} load, {:?} load in flight", kind, current);
            return None;
        }

        state.phase = LoadPhase::Loading(kind);
        match kind {
            LoadKind::FromStart => state.next_page = 0,
            LoadKind::More => state.next_page += 1,
        }
        let page = state.next_page;

        Some((
            InFlight {
                state: self.state.clone(),
                kind,
                finished: false,
            },
            page,
        ))
    }

    fn load(
        &self,
        kind: LoadKind,
        character_id: u64,
        publication_kind: PublicationKind,
    ) -> Option<PendingLoad> {
        let (in_flight, page) = self.begin(kind)?;

        let request = PublicationRequest {
            character_id,
            kind: publication_kind,
            page,
        };
        let loader = self.loader.clone();
        let observer = self.observer.clone();
        let cancel = self.cancel.child_token();

        let load = async move {
            let result = loader.publications(request, &cancel).await;
            if let Some(change) = in_flight.complete(&request, result) {
                observer.notify(&change);
            }
        };
        Some(load.boxed())
    }

    fn image_sources(&self, indices: &[usize]) -> Vec<(Url, String)> {
        let state = lock(&self.state);
        indices
            .iter()
            .filter_map(|&index| match state.items.get(index) {
                Some(item) => item
                    .image_source()
                    .map(|(url, key)| (url.clone(), key.to_string())),
                None => {
                    debug!("Index {} out of range ({} items)", index, state.items.len());
                    None
                }
            })
            .collect()
    }

    fn prepare_for_display(&self, indices: &[usize]) {
        for (url, key) in self.image_sources(indices) {
            self.prefetcher.prefetch(&url, &key);
        }
    }

    fn set_hero_image(&self, index: usize, target: Arc<dyn ImageTarget>) {
        let Some((url, key)) = self.image_sources(&[index]).pop() else {
            return;
        };

        let images = self.images.clone();
        run_on_ui(self.ui.as_ref(), move || {
            images.load(
                &url,
                &key,
                target,
                Box::new(move |error| {
                    if let Some(e) = error {
                        warn!("Hero image for item {} failed: {}", index, e);
                    }
                }),
            );
        });
    }
}

#[async_trait]
impl FeedDataProvider for PublicationFeedProvider {
    fn items(&self) -> Vec<Publication> {
        lock(&self.state).items.clone()
    }

    fn len(&self) -> usize {
        lock(&self.state).items.len()
    }

    fn item(&self, index: usize) -> Option<Publication> {
        lock(&self.state).items.get(index).cloned()
    }

    fn next_page(&self) -> u32 {
        lock(&self.state).next_page
    }

    fn is_loading(&self) -> bool {
        matches!(lock(&self.state).phase, LoadPhase::Loading(_))
    }

    fn last_error(&self) -> Option<Arc<PanelsError>> {
        lock(&self.state).last_error.clone()
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.observer.subscribe(callback)
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.observer.unsubscribe(subscription)
    }

    fn start(&self, action: FeedAction) -> Option<PendingLoad> {
        match action {
            FeedAction::LoadFromStart { character_id, kind } => {
                self.load(LoadKind::FromStart, character_id, kind)
            }
            FeedAction::LoadMore { character_id, kind } => {
                self.load(LoadKind::More, character_id, kind)
            }
            FeedAction::PrepareForDisplay { indices } => {
                self.prepare_for_display(&indices);
                None
            }
            FeedAction::SetHeroImage { index, target } => {
                self.set_hero_image(index, target);
                None
            }
        }
    }

    fn cancel_pending(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PublicationFeedProvider {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
