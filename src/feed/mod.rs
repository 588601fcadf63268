//! Paginated publication feed for one character.
//!
//! ```text
//! UI thread ──dispatch──▶ MainThreadDispatch ──queue──▶ PublicationFeedProvider ──▶ PublicationLoader
//!     ▲                                                          │
//!     └──────────── FeedChange (marshalled onto the UI) ◀────────┘
//! ```
//!
//! [`PublicationFeedProvider`] owns the items, the page cursor and the
//! single-flight guard. [`MainThreadDispatch`] wraps any provider so that
//! actions start in order on one worker task while notifications land on the
//! UI thread.

pub mod dispatch;
pub mod images;
pub mod observer;
pub mod provider;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::app::PanelsError;
use crate::domain::{Publication, PublicationKind};

pub use dispatch::MainThreadDispatch;
pub use images::{HttpImages, ImageCompletion, ImageLoader, ImagePrefetcher, ImageTarget};
pub use observer::{ChangeCallback, ObserverSlot, Subscription};
pub use provider::PublicationFeedProvider;
pub use ui::{run_on_ui, UiDispatcher, UiHandle, UiThread};

/// Which kind of pagination request a load was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    FromStart,
    More,
}

/// Commands accepted by a feed provider.
#[derive(Debug, Clone)]
pub enum FeedAction {
    LoadFromStart {
        character_id: u64,
        kind: PublicationKind,
    },
    LoadMore {
        character_id: u64,
        kind: PublicationKind,
    },
    /// Prefetch thumbnails for the items about to be shown.
    PrepareForDisplay { indices: Vec<usize> },
    /// Load the thumbnail of one item into `target`.
    SetHeroImage {
        index: usize,
        target: Arc<dyn ImageTarget>,
    },
}

/// A loader round trip that was admitted by the single-flight guard and has
/// not completed yet.
pub type PendingLoad = BoxFuture<'static, ()>;

/// Payload of a change notification.
#[derive(Debug, Clone)]
pub enum FeedChange {
    /// Items were replaced wholesale by a load from start.
    Replaced { count: usize },
    /// A page was appended; `range` indexes the new tail.
    Appended { range: Range<usize> },
    /// A load failed. Items are unchanged.
    LoadFailed {
        kind: LoadKind,
        error: Arc<PanelsError>,
    },
}

#[async_trait]
pub trait FeedDataProvider: Send + Sync {
    /// Snapshot of the current items.
    fn items(&self) -> Vec<Publication>;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn item(&self, index: usize) -> Option<Publication> {
        self.items().get(index).cloned()
    }

    /// Page requested by the most recent load.
    fn next_page(&self) -> u32;

    fn is_loading(&self) -> bool;

    /// Error of the most recent failed load, cleared by the next success.
    fn last_error(&self) -> Option<Arc<PanelsError>>;

    /// Register the change observer, replacing any previous one.
    fn subscribe(&self, callback: ChangeCallback) -> Subscription;

    /// Remove the observer if `subscription` is still the current one.
    fn unsubscribe(&self, subscription: Subscription) -> bool;

    /// Apply everything `action` does before its first suspension point:
    /// the single-flight guard for loads, the whole action otherwise.
    ///
    /// Returns the admitted load, if any. Calling `start` for a sequence of
    /// actions and awaiting the returned loads elsewhere preserves their order.
    fn start(&self, action: FeedAction) -> Option<PendingLoad>;

    async fn perform(&self, action: FeedAction) {
        if let Some(load) = self.start(action) {
            load.await;
        }
    }

    /// Cancel any outstanding load. The provider is torn down afterwards.
    fn cancel_pending(&self);
}
