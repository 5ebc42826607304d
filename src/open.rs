//! Opening inspectors from arbitrary threads.
//!
//! All window state lives on a single UI coordination thread, which drains a
//! [`UiQueue`]. Other threads talk to it through a cloneable [`UiDispatcher`]:
//! `submit` hands a task over and returns immediately, `invoke_and_wait`
//! additionally blocks until the task has run. [`open`] builds on that: it
//! marshals surface construction over and returns an [`OpenFuture`] that
//! resolves as soon as the window is visible. Whether and when the window is
//! later closed is observed separately through [`WindowHandle`].

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::MarshalingError;
use crate::inspector::{WindowId, WindowSet};
use crate::session::Session;

pub type UiTask = Box<dyn FnOnce(&mut WindowSet) + Send + 'static>;
type Waker = Box<dyn Fn() + Send + Sync>;

enum UiMessage {
    Run(UiTask),
    Shutdown,
}

struct Shared {
    alive: AtomicBool,
    ui_thread: OnceCell<ThreadId>,
    waker: OnceCell<Waker>,
}

/// Create the two ends of the UI task channel. The [`UiQueue`] must be moved
/// to (or created on) the UI coordination thread.
pub fn ui_channel() -> (UiDispatcher, UiQueue) {
    let (tx, rx) = mpsc::channel();
    let shared = Arc::new(Shared {
        alive: AtomicBool::new(true),
        ui_thread: OnceCell::new(),
        waker: OnceCell::new(),
    });
    (
        UiDispatcher {
            tx,
            shared: Arc::clone(&shared),
        },
        UiQueue { rx, shared },
    )
}

/// Result of draining the queue once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drained {
    pub ran: usize,
    pub shutdown: bool,
}

/// Receiving end, owned by the UI coordination thread.
pub struct UiQueue {
    rx: mpsc::Receiver<UiMessage>,
    shared: Arc<Shared>,
}

impl UiQueue {
    /// Called by the UI host once it can be woken up (e.g. request a repaint).
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        let _ = self.shared.waker.set(Box::new(waker));
    }

    fn claim_thread(&self) {
        let _ = self.shared.ui_thread.set(thread::current().id());
    }

    /// Run every task that is already queued, without blocking.
    pub fn run_pending(&self, windows: &mut WindowSet) -> Drained {
        self.claim_thread();
        let mut drained = Drained::default();
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::Run(task) => {
                    task(windows);
                    drained.ran += 1;
                }
                UiMessage::Shutdown => {
                    drained.shutdown = true;
                    break;
                }
            }
        }
        drained
    }

    /// Run tasks until a shutdown request arrives or every dispatcher is gone.
    pub fn run_blocking(&self, windows: &mut WindowSet) {
        self.claim_thread();
        while let Ok(msg) = self.rx.recv() {
            match msg {
                UiMessage::Run(task) => task(windows),
                UiMessage::Shutdown => break,
            }
        }
    }
}

impl Drop for UiQueue {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);
    }
}

/// Sending end. Cheap to clone and usable from any thread.
#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::Sender<UiMessage>,
    shared: Arc<Shared>,
}

impl UiDispatcher {
    pub fn is_available(&self) -> bool {
        self.shared.alive.load(Ordering::SeqCst)
    }

    pub fn is_ui_thread(&self) -> bool {
        self.shared.ui_thread.get() == Some(&thread::current().id())
    }

    fn send(&self, msg: UiMessage) -> Result<(), MarshalingError> {
        if !self.is_available() {
            return Err(MarshalingError::Unavailable);
        }
        self.tx.send(msg).map_err(|_| MarshalingError::Unavailable)?;
        if let Some(wake) = self.shared.waker.get() {
            wake();
        }
        Ok(())
    }

    /// Queue `task` for the UI thread and return immediately.
    pub fn submit(
        &self,
        task: impl FnOnce(&mut WindowSet) + Send + 'static,
    ) -> Result<(), MarshalingError> {
        self.send(UiMessage::Run(Box::new(task)))
    }

    /// Queue `task` and block until it has run on the UI thread.
    ///
    /// A panic inside `task` is caught on the UI thread and reported as
    /// [`MarshalingError::Construction`]. Must not be called from the UI
    /// thread itself.
    pub fn invoke_and_wait<R: Send + 'static>(
        &self,
        task: impl FnOnce(&mut WindowSet) -> R + Send + 'static,
    ) -> Result<R, MarshalingError> {
        if self.is_ui_thread() {
            return Err(MarshalingError::Construction(
                "invoke_and_wait called on the UI thread".into(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        self.submit(move |windows| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| task(windows)))
                .map_err(|payload| MarshalingError::Construction(panic_message(&payload)));
            let _ = tx.send(result);
        })?;
        futures::executor::block_on(rx).unwrap_or(Err(MarshalingError::Unavailable))
    }

    /// Ask the UI thread to stop draining. Queued tasks behind it never run.
    pub fn shutdown(&self) -> Result<(), MarshalingError> {
        self.send(UiMessage::Shutdown)
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// open
// ────────────────────────────────────────────────────────────────────────────

/// Open an inspector for `session`. Callable from any thread.
///
/// Fails immediately when no UI coordination thread is available. Otherwise a
/// short-lived `inspector-open` thread performs the single marshaling hop and
/// exits once the surface is shown; the returned future resolves at that
/// point, never at window close.
pub fn open(dispatcher: &UiDispatcher, session: Session) -> Result<OpenFuture, MarshalingError> {
    if !dispatcher.is_available() {
        return Err(MarshalingError::Unavailable);
    }
    let (tx, rx) = oneshot::channel();
    let ui = dispatcher.clone();
    let marshal = thread::Builder::new()
        .name("inspector-open".into())
        .spawn(move || {
            debug!("marshaling inspector construction to UI thread");
            let result = ui
                .invoke_and_wait(move |windows| windows.open(session))
                .and_then(|r| r);
            let _ = tx.send(result);
        })
        .map_err(|e| MarshalingError::Spawn(e.to_string()))?;
    // Detached: the thread ends as soon as the hop completes.
    drop(marshal);
    Ok(OpenFuture { rx })
}

/// Open an inspector, block until it has been closed, then stop the UI
/// thread. The UI thread is stopped on failure too, so a host waiting for its
/// first window does not wait forever.
pub fn open_until_closed(dispatcher: &UiDispatcher, session: Session) -> Result<(), MarshalingError> {
    let opened = open(dispatcher, session).and_then(OpenFuture::wait);
    let result = opened.map(|handle| {
        info!(window = %handle.id(), "inspector visible");
        handle.wait_closed();
    });
    if let Err(e) = &result {
        warn!(error = %e, "inspector did not open");
    }
    // The queue may already be gone; there is nothing left to stop then.
    let _ = dispatcher.shutdown();
    result
}

/// Resolves to the window handle once the inspector is visible.
#[must_use = "the inspector may fail to open; poll or wait on the future"]
pub struct OpenFuture {
    rx: oneshot::Receiver<Result<WindowHandle, MarshalingError>>,
}

impl OpenFuture {
    /// Block the current thread until the window is shown.
    pub fn wait(self) -> Result<WindowHandle, MarshalingError> {
        futures::executor::block_on(self)
    }
}

impl Future for OpenFuture {
    type Output = Result<WindowHandle, MarshalingError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.unwrap_or(Err(MarshalingError::Unavailable)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Window lifecycle
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowPhase {
    #[default]
    Constructing,
    Shown,
    Closed,
}

/// Shown/closed signals of one window, shared between the UI thread and handles.
#[derive(Debug, Default)]
pub struct Lifecycle {
    phase: Mutex<WindowPhase>,
    changed: Condvar,
}

impl Lifecycle {
    fn set(&self, phase: WindowPhase) {
        let mut p = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        *p = phase;
        self.changed.notify_all();
    }

    pub(crate) fn mark_shown(&self) {
        self.set(WindowPhase::Shown);
    }

    pub(crate) fn mark_closed(&self) {
        self.set(WindowPhase::Closed);
    }

    pub fn phase(&self) -> WindowPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_closed(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut p = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        while *p != WindowPhase::Closed {
            match deadline {
                None => {
                    p = self.changed.wait(p).unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    p = self
                        .changed
                        .wait_timeout(p, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        true
    }
}

/// Handle to an open inspector window.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    id: WindowId,
    lifecycle: Arc<Lifecycle>,
}

impl WindowHandle {
    pub(crate) fn new(id: WindowId, lifecycle: Arc<Lifecycle>) -> Self {
        Self { id, lifecycle }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn phase(&self) -> WindowPhase {
        self.lifecycle.phase()
    }

    pub fn is_visible(&self) -> bool {
        self.phase() == WindowPhase::Shown
    }

    pub fn is_closed(&self) -> bool {
        self.phase() == WindowPhase::Closed
    }

    /// Block until the user (or anyone) closes the window.
    pub fn wait_closed(&self) {
        self.lifecycle.wait_closed(None);
    }

    /// Like [`wait_closed`](Self::wait_closed) with a limit. Returns true if closed.
    pub fn wait_closed_timeout(&self, timeout: Duration) -> bool {
        self.lifecycle.wait_closed(Some(timeout))
    }

    /// Ask the UI thread to close this window.
    pub fn request_close(&self, dispatcher: &UiDispatcher) -> Result<(), MarshalingError> {
        let id = self.id;
        dispatcher.submit(move |windows| {
            windows.close(id);
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Headless UI thread
// ────────────────────────────────────────────────────────────────────────────

/// A UI coordination thread without any drawing, for tools and tests that
/// need the open/close protocol but no screen.
pub struct HeadlessUi {
    dispatcher: UiDispatcher,
    thread: Option<JoinHandle<()>>,
}

impl HeadlessUi {
    pub fn spawn() -> std::io::Result<Self> {
        let (dispatcher, queue) = ui_channel();
        let thread = thread::Builder::new()
            .name("inspector-ui".into())
            .spawn(move || {
                let mut windows = WindowSet::new();
                queue.run_blocking(&mut windows);
                info!(open = windows.len(), "headless UI thread stopping");
                // Dropping the set closes remaining windows, the queue marks the UI unavailable.
                drop(queue);
                drop(windows);
            })?;
        Ok(Self {
            dispatcher,
            thread: Some(thread),
        })
    }

    pub fn dispatcher(&self) -> &UiDispatcher {
        &self.dispatcher
    }

    /// Stop the UI thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = self.dispatcher.shutdown();
            let _ = handle.join();
        }
    }
}

impl Drop for HeadlessUi {
    fn drop(&mut self) {
        self.stop();
    }
}
