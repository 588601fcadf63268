use std::io;
use std::thread::{self, JoinHandle, ThreadId};

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// The execution context that owns presentation state.
pub trait UiDispatcher: Send + Sync {
    fn is_ui_thread(&self) -> bool;

    /// Queue `job` to run on the UI thread.
    fn dispatch(&self, job: UiJob);
}

/// Run `job` on the UI thread: inline when already there, queued otherwise.
pub fn run_on_ui(ui: &dyn UiDispatcher, job: impl FnOnce() + Send + 'static) {
    if ui.is_ui_thread() {
        job();
    } else {
        ui.dispatch(Box::new(job));
    }
}

enum UiMessage {
    Run(UiJob),
    Shutdown,
}

/// Cloneable handle to a [`UiThread`].
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiMessage>,
    thread: ThreadId,
}

impl UiDispatcher for UiHandle {
    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    fn dispatch(&self, job: UiJob) {
        if self.tx.send(UiMessage::Run(job)).is_err() {
            warn!("UI thread has stopped, dropping job");
        }
    }
}

/// A dedicated thread draining a job queue, playing the role of the main thread.
pub struct UiThread {
    handle: UiHandle,
    join: Option<JoinHandle<()>>,
}

impl UiThread {
    pub fn spawn(name: &str) -> io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiMessage>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!("UI thread started");
                while let Some(msg) = rx.blocking_recv() {
                    match msg {
                        UiMessage::Run(job) => job(),
                        UiMessage::Shutdown => break,
                    }
                }
                debug!("UI thread stopped");
            })?;

        let handle = UiHandle {
            tx,
            thread: join.thread().id(),
        };

        Ok(Self {
            handle,
            join: Some(join),
        })
    }

    pub fn handle(&self) -> UiHandle {
        self.handle.clone()
    }

    /// Stop after the jobs already queued and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.handle.tx.send(UiMessage::Shutdown);
        if let Some(join) = self.join.take() {
            if join.thread().id() != thread::current().id() && join.join().is_err() {
                warn!("UI thread panicked");
            }
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    #[test]
    fn test_jobs_run_on_ui_thread_in_order() {
        let ui = UiThread::spawn("ui-order").unwrap();
        let handle = ui.handle();
        let (tx, rx) = std_mpsc::channel();

        for i in 0..3 {
            let tx = tx.clone();
            handle.dispatch(Box::new(move || {
                let name = thread::current().name().map(String::from);
                tx.send((i, name)).unwrap();
            }));
        }

        for expected in 0..3 {
            let (i, name) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(i, expected);
            assert_eq!(name.as_deref(), Some("ui-order"));
        }
    }

    #[test]
    fn test_run_on_ui_is_inline_when_already_there() {
        let ui = UiThread::spawn("ui-inline").unwrap();
        let handle = ui.handle();
        let (tx, rx) = std_mpsc::channel();

        let inner = handle.clone();
        handle.dispatch(Box::new(move || {
            assert!(inner.is_ui_thread());
            let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
            let flag = ran.clone();
            run_on_ui(&inner, move || flag.store(true, std::sync::atomic::Ordering::SeqCst));
            // Inline: already set before run_on_ui returns.
            tx.send(ran.load(std::sync::atomic::Ordering::SeqCst)).unwrap();
        }));

        assert!(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        assert!(!handle.is_ui_thread());
    }

    #[test]
    fn test_dispatch_after_shutdown_is_dropped() {
        let ui = UiThread::spawn("ui-shutdown").unwrap();
        let handle = ui.handle();
        ui.shutdown();

        let (tx, rx) = std_mpsc::channel::<()>();
        handle.dispatch(Box::new(move || tx.send(()).unwrap()));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
