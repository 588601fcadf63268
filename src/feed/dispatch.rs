use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::PanelsError;
use crate::domain::Publication;
use crate::feed::{
    run_on_ui, ChangeCallback, FeedAction, FeedChange, FeedDataProvider, PendingLoad,
    Subscription, UiDispatcher,
};

/// Runs a provider's work on one tokio worker task and its notifications on
/// the UI thread.
///
/// Actions go through a single queue, so they start in the order they were
/// dispatched. Reads pass straight through. Dropping the wrapper cancels any
/// load the inner provider still has outstanding and stops the worker.
pub struct MainThreadDispatch<P: FeedDataProvider + 'static> {
    inner: Arc<P>,
    actions: mpsc::UnboundedSender<FeedAction>,
    ui: Arc<dyn UiDispatcher>,
}

impl<P: FeedDataProvider + 'static> MainThreadDispatch<P> {
    pub fn new(inner: P, runtime: Handle, ui: Arc<dyn UiDispatcher>) -> Self {
        let inner = Arc::new(inner);
        let (actions, rx) = mpsc::unbounded_channel();
        let worker = ActionWorker {
            inner: inner.clone(),
            runtime: runtime.clone(),
            rx,
        };
        runtime.spawn(worker.run());

        Self { inner, actions, ui }
    }

    pub fn inner(&self) -> &Arc<P> {
        &self.inner
    }

    /// Queue `action` for the worker and return immediately.
    pub fn dispatch(&self, action: FeedAction) {
        if let Err(e) = self.actions.send(action) {
            warn!("Feed worker stopped, dropping {:?}", e.0);
        }
    }
}

/// Drains the action queue on the runtime.
struct ActionWorker<P: FeedDataProvider + 'static> {
    inner: Arc<P>,
    runtime: Handle,
    rx: mpsc::UnboundedReceiver<FeedAction>,
}

impl<P: FeedDataProvider + 'static> ActionWorker<P> {
    async fn run(mut self) {
        debug!("Feed worker started");

        // `start` applies the guard in queue order; only the loader round
        // trip leaves the queue, so a load arriving meanwhile is dropped.
        while let Some(action) = self.rx.recv().await {
            if let Some(load) = self.inner.start(action) {
                self.runtime.spawn(load);
            }
        }

        debug!("Feed worker shutting down");
    }
}

#[async_trait]
impl<P: FeedDataProvider + 'static> FeedDataProvider for MainThreadDispatch<P> {
    fn items(&self) -> Vec<Publication> {
        self.inner.items()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn item(&self, index: usize) -> Option<Publication> {
        self.inner.item(index)
    }

    fn next_page(&self) -> u32 {
        self.inner.next_page()
    }

    fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    fn last_error(&self) -> Option<Arc<PanelsError>> {
        self.inner.last_error()
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let ui = self.ui.clone();
        self.inner.subscribe(Arc::new(move |change: &FeedChange| {
            let callback = callback.clone();
            let change = change.clone();
            run_on_ui(ui.as_ref(), move || callback(&change));
        }))
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.inner.unsubscribe(subscription)
    }

    /// Queues the action; `perform` therefore resolves without awaiting it.
    fn start(&self, action: FeedAction) -> Option<PendingLoad> {
        self.dispatch(action);
        None
    }

    fn cancel_pending(&self) {
        self.inner.cancel_pending();
    }
}

impl<P: FeedDataProvider + 'static> Drop for MainThreadDispatch<P> {
    fn drop(&mut self) {
        self.inner.cancel_pending();
    }
}
