//! Completion bridge between transport callbacks and callers.
//!
//! Each dispatched verb gets a [`CompletionSlot`] for the caller and a
//! [`ResponseListener`] for the transport. They share a [`Completer`], the
//! only place the result is written, so the slot resolves exactly once no
//! matter how many callbacks arrive or on which thread. The slot only holds a
//! weak reference: once the transport drops the listener unresolved, the slot
//! fails instead of waiting forever.

use log::debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::client::operations::ResponseDecoder;
use crate::client::transport::{Action, BoxedError, Connector, Listener, Message};
use crate::error::{Error, Result};

/// Single-shot writer side of a [`CompletionSlot`].
pub struct Completer<T> {
    sender: Mutex<Option<oneshot::Sender<Result<T>>>>,
}

impl<T> Completer<T> {
    /// Store `result` unless the slot is already resolved.
    ///
    /// Returns `true` when this call resolved the slot.
    pub fn resolve(&self, result: Result<T>) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => {
                // A dropped slot means the caller stopped waiting.
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Create a linked completer and slot for one `action`.
pub fn channel<T>(action: Action) -> (Arc<Completer<T>>, CompletionSlot<T>) {
    let (sender, receiver) = oneshot::channel();
    let completer = Arc::new(Completer {
        sender: Mutex::new(Some(sender)),
    });
    let slot = CompletionSlot {
        action,
        receiver,
        completer: Arc::downgrade(&completer),
        connector: Mutex::new(None),
    };
    (completer, slot)
}

/// Pending result of one operation. Await it to get the value or the error.
pub struct CompletionSlot<T> {
    action: Action,
    receiver: oneshot::Receiver<Result<T>>,
    completer: Weak<Completer<T>>,
    connector: Mutex<Option<Arc<dyn Connector>>>,
}

impl<T> CompletionSlot<T> {
    /// A slot that is already resolved with `result`.
    pub fn ready(action: Action, result: Result<T>) -> Self {
        let (completer, slot) = channel(action);
        completer.resolve(result);
        slot
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Whether a result (or a dropped listener) has settled the slot.
    pub fn is_resolved(&self) -> bool {
        self.completer
            .upgrade()
            .is_none_or(|completer| completer.is_resolved())
    }

    pub(crate) fn attach(&self, connector: Arc<dyn Connector>) {
        *self
            .connector
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(connector);
    }

    /// Best-effort cancel: close the connector and fail the slot with
    /// `cancelled` unless a result already arrived.
    pub fn cancel(&self) {
        let connector = self
            .connector
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let cancelled = self.completer.upgrade().is_some_and(|completer| {
            completer.resolve(Err(Error::transport(self.action, "cancelled")))
        });
        if cancelled {
            debug!("cancelled action={}", self.action);
        }
        if let Some(connector) = connector {
            connector.close();
        }
    }
}

impl<T> Future for CompletionSlot<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::transport(
                this.action,
                "connector closed without completing",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Listener that decodes transport messages for one action into its slot.
pub struct ResponseListener<D: ResponseDecoder> {
    action: Action,
    decoder: Mutex<D>,
    completer: Arc<Completer<D::Output>>,
}

impl<D: ResponseDecoder> ResponseListener<D> {
    pub fn new(action: Action, decoder: D, completer: Arc<Completer<D::Output>>) -> Self {
        Self {
            action,
            decoder: Mutex::new(decoder),
            completer,
        }
    }
}

impl<D: ResponseDecoder> Listener for ResponseListener<D> {
    fn on_message(&self, message: Message) {
        if self.completer.is_resolved() {
            return;
        }
        let decoded = self
            .decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .decode(message);
        match decoded {
            Ok(Some(value)) => {
                self.completer.resolve(Ok(value));
            }
            Ok(None) => {}
            Err(message) => {
                self.completer
                    .resolve(Err(Error::transport(self.action, message)));
            }
        }
    }

    fn on_complete(&self) {
        if self.completer.is_resolved() {
            return;
        }
        let finished = self
            .decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
        self.completer
            .resolve(finished.map_err(|message| Error::transport(self.action, message)));
    }

    fn on_error(&self, cause: BoxedError) {
        self.completer
            .resolve(Err(Error::transport(self.action, cause.to_string())));
    }
}
