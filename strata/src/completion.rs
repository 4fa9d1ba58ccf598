//! One-shot completion handles for close notifications.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::LayerError;

/// A registrant waiting for an instance to close.
///
/// Resolving consumes the waiter, so it fires at most once.
pub enum ExitWaiter {
    /// Completes a [`Completion`] held by the registrant.
    Channel(oneshot::Sender<()>),
    /// Invoked synchronously while the instance is still attached.
    Callback(Box<dyn FnOnce() + Send>),
}

impl ExitWaiter {
    /// Create a waiter from a callback.
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::Callback(Box::new(f))
    }

    /// Create a channel waiter together with the completion it resolves.
    pub fn channel() -> (Self, Completion) {
        let (tx, rx) = oneshot::channel();
        (Self::Channel(tx), Completion::pending(rx))
    }

    /// Fire the waiter.
    pub fn resolve(self) {
        match self {
            // Receiver dropped = nobody is listening anymore.
            Self::Channel(tx) => {
                let _ = tx.send(());
            }
            Self::Callback(f) => f(),
        }
    }
}

impl std::fmt::Debug for ExitWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Channel(_) => f.write_str("ExitWaiter::Channel"),
            Self::Callback(_) => f.write_str("ExitWaiter::Callback"),
        }
    }
}

/// Future that resolves when the awaited instance has closed.
///
/// Yields `Err(LayerError::Abandoned)` if the instance was discarded
/// without closing (its waiter was dropped unresolved).
#[derive(Debug)]
#[must_use = "completions do nothing unless awaited"]
pub struct Completion {
    rx: Option<oneshot::Receiver<()>>,
}

impl Completion {
    /// A completion that is already resolved.
    pub fn ready() -> Self {
        Self { rx: None }
    }

    fn pending(rx: oneshot::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Check whether the completion resolved successfully, without waiting.
    pub fn is_resolved(&mut self) -> bool {
        match self.rx.as_mut() {
            None => true,
            Some(rx) => match rx.try_recv() {
                Ok(()) => {
                    self.rx = None;
                    true
                }
                Err(_) => false,
            },
        }
    }
}

impl Future for Completion {
    type Output = Result<(), LayerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(Ok(())) => {
                self.rx = None;
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(_)) => Poll::Ready(Err(LayerError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}
