//! Contract with the presentation collaborator.
//!
//! The core never renders anything. It hands the merged parameters to a
//! [`Presenter`] and returns the presenter's [`PresentationHandle`] unchanged.
//! Presenters must invoke the `on_open` hook synchronously from `present`, and
//! must not hold internal locks while doing so: hooks commonly call back into
//! the presenter (for example `click_confirm`).

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use crate::{
    Error, Result,
    params::{Param, ParameterSet},
};

/// Why a dialog closed without being confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// The cancel button was pressed.
    Cancel,
    /// The dialog was closed programmatically.
    Close,
    /// A newer dialog took its place.
    Replaced,
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cancel => "cancel",
            Self::Close => "close",
            Self::Replaced => "replaced",
        })
    }
}

/// Final outcome of a presented dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogResult {
    /// Confirmed value. `None` when dismissed.
    pub value: Option<Param>,
    /// Dismissal reason. `None` when confirmed.
    pub dismiss: Option<DismissReason>,
}

impl DialogResult {
    /// A confirmed result carrying `value`.
    pub fn confirmed(value: impl Into<Param>) -> Self {
        Self {
            value: Some(value.into()),
            dismiss: None,
        }
    }

    /// A dismissed result.
    pub fn dismissed(reason: DismissReason) -> Self {
        Self {
            value: None,
            dismiss: Some(reason),
        }
    }

    /// Returns true when the dialog was confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.dismiss.is_none()
    }
}

/// Node-like view of a rendered dialog part.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Text content of the node.
    pub text_content: String,
}

/// Eventual result of a presented dialog.
///
/// Awaiting the handle yields the presenter's result; a presenter that drops the
/// resolving side without sending anything produces [`Error::Abandoned`].
#[must_use = "a presentation handle does nothing unless awaited"]
pub struct PresentationHandle {
    /// Receiving side of the resolution channel.
    rx: oneshot::Receiver<Result<DialogResult>>,
}

impl PresentationHandle {
    /// Create an unresolved handle and the resolver that settles it.
    pub fn pending() -> (Resolver, Self) {
        let (tx, rx) = oneshot::channel();
        (Resolver { tx }, Self { rx })
    }

    /// A handle that is already settled with `result`.
    pub fn settled(result: Result<DialogResult>) -> Self {
        let (resolver, handle) = Self::pending();
        resolver.settle(result);
        handle
    }
}

impl fmt::Debug for PresentationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationHandle").finish_non_exhaustive()
    }
}

impl Future for PresentationHandle {
    type Output = Result<DialogResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.unwrap_or(Err(Error::Abandoned)))
    }
}

/// Settles exactly one [`PresentationHandle`].
#[derive(Debug)]
pub struct Resolver {
    /// Sending side of the resolution channel.
    tx: oneshot::Sender<Result<DialogResult>>,
}

impl Resolver {
    /// Settle the handle. A handle that was already dropped is ignored.
    pub fn settle(self, result: Result<DialogResult>) {
        let _ignored = self.tx.send(result);
    }

    /// Resolve with a confirmed value.
    pub fn confirm(self, value: impl Into<Param>) {
        self.settle(Ok(DialogResult::confirmed(value)));
    }

    /// Resolve as dismissed.
    pub fn dismiss(self, reason: DismissReason) {
        self.settle(Ok(DialogResult::dismissed(reason)));
    }

    /// Reject with a presentation error.
    pub fn reject(self, message: impl Into<String>) {
        self.settle(Err(Error::Presentation(message.into())));
    }
}

/// Capability surface the core requires from the presentation layer.
pub trait Presenter: Send + Sync {
    /// Show a dialog for fully merged `params`, firing `on_open` before returning.
    fn present(&self, params: &ParameterSet) -> PresentationHandle;

    /// Returns true while a dialog is open.
    fn is_visible(&self) -> bool;

    /// Title node of the open dialog.
    fn title(&self) -> Option<Element>;

    /// Content node of the open dialog.
    fn content(&self) -> Option<Element>;

    /// Confirm the open dialog.
    fn click_confirm(&self);

    /// Cancel the open dialog.
    fn click_cancel(&self);

    /// Close the open dialog without confirming it.
    fn close(&self);
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    #[test]
    fn pending_until_settled() {
        let (resolver, mut handle) = PresentationHandle::pending();
        assert!((&mut handle).now_or_never().is_none());
        resolver.confirm("v");
        let result = handle.now_or_never().expect("settled").expect("ok");
        assert_eq!(result, DialogResult::confirmed("v"));
    }

    #[test]
    fn dropped_resolver_abandons() {
        let (resolver, handle) = PresentationHandle::pending();
        drop(resolver);
        assert_eq!(handle.now_or_never(), Some(Err(Error::Abandoned)));
    }

    #[tokio::test]
    async fn rejection_propagates() {
        let (resolver, handle) = PresentationHandle::pending();
        resolver.reject("Unknown type 'bogus'");
        assert_eq!(
            handle.await,
            Err(Error::Presentation("Unknown type 'bogus'".into()))
        );
    }
}
