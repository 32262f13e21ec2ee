//! In-memory presenter.
//!
//! Models a single dialog slot without rendering anything. Useful for tests,
//! scripted environments, and the demo binary.

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    Error,
    params::{
        HTML, INPUT, INPUT_VALUE, ON_CLOSE, ON_OPEN, Param, ParameterSet, TEXT, TITLE, TYPE,
    },
    present::{DismissReason, Element, PresentationHandle, Presenter, Resolver},
};

/// Icon types the presenter knows how to draw.
pub const ICON_TYPES: &[&str] = &["success", "error", "warning", "info", "question"];

/// The dialog currently on screen.
struct OpenDialog {
    /// Merged parameters it was presented with.
    params: ParameterSet,
    /// Settles the caller's handle.
    resolver: Resolver,
}

/// Mutable presenter state.
#[derive(Default)]
struct State {
    /// Open dialog, if any.
    open: Option<OpenDialog>,
    /// Parameters of the most recently presented dialog.
    last: Option<ParameterSet>,
    /// Number of dialogs presented so far.
    presented: usize,
}

/// Presenter that keeps one dialog in memory and resolves it on demand.
#[derive(Default)]
pub struct HeadlessPresenter {
    /// Guarded state. Never held while hooks run.
    state: Mutex<State>,
}

impl HeadlessPresenter {
    /// Create a presenter with no open dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters of the most recently presented dialog.
    pub fn last_params(&self) -> Option<ParameterSet> {
        self.state.lock().last.clone()
    }

    /// Number of dialogs presented so far.
    pub fn presented_count(&self) -> usize {
        self.state.lock().presented
    }

    /// Take the open dialog and settle it with `settle`, then fire `on_close`.
    fn finish(&self, settle: impl FnOnce(&ParameterSet, Resolver)) {
        let Some(OpenDialog { params, resolver }) = self.state.lock().open.take() else {
            debug!("no open dialog");
            return;
        };
        settle(&params, resolver);
        fire_hook(&params, ON_CLOSE);
    }
}

/// Run the hook stored under `key`, if any.
fn fire_hook(params: &ParameterSet, key: &str) {
    if let Some(cb) = params.get_callback(key) {
        cb.call();
    }
}

/// Text shown for a value in a title or content node.
fn display_text(value: &Param) -> Option<String> {
    match value {
        Param::Text(s) => Some(s.clone()),
        Param::Number(n) => Some(n.to_string()),
        Param::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Value a confirmed dialog resolves with.
fn confirm_value(params: &ParameterSet) -> Param {
    match params.get(INPUT) {
        Some(Param::Undefined | Param::Null) | None => Param::Bool(true),
        Some(_) => params
            .get(INPUT_VALUE)
            .cloned()
            .unwrap_or_else(|| Param::Text(String::new())),
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&self, params: &ParameterSet) -> PresentationHandle {
        if let Some(kind) = params.get(TYPE)
            && !matches!(kind, Param::Null)
            && !kind.as_str().is_some_and(|k| ICON_TYPES.contains(&k))
        {
            return PresentationHandle::settled(Err(Error::Presentation(format!(
                "Unknown type '{}'; expected one of {}",
                display_text(kind).unwrap_or_default(),
                ICON_TYPES.join(", ")
            ))));
        }

        let (resolver, handle) = PresentationHandle::pending();
        let replaced = {
            let mut st = self.state.lock();
            st.presented += 1;
            st.last = Some(params.clone());
            st.open.replace(OpenDialog {
                params: params.clone(),
                resolver,
            })
        };
        if let Some(prev) = replaced {
            debug!("replacing open dialog");
            prev.resolver.dismiss(DismissReason::Replaced);
            fire_hook(&prev.params, ON_CLOSE);
        }
        fire_hook(params, ON_OPEN);
        handle
    }

    fn is_visible(&self) -> bool {
        self.state.lock().open.is_some()
    }

    fn title(&self) -> Option<Element> {
        let st = self.state.lock();
        let params = &st.open.as_ref()?.params;
        Some(Element {
            text_content: params.get(TITLE).and_then(display_text).unwrap_or_default(),
        })
    }

    fn content(&self) -> Option<Element> {
        let st = self.state.lock();
        let params = &st.open.as_ref()?.params;
        let text = [HTML, TEXT]
            .iter()
            .find_map(|k| params.get(k).and_then(display_text))
            .unwrap_or_default();
        Some(Element { text_content: text })
    }

    fn click_confirm(&self) {
        self.finish(|params, resolver| resolver.confirm(confirm_value(params)));
    }

    fn click_cancel(&self) {
        self.finish(|_, resolver| resolver.dismiss(DismissReason::Cancel));
    }

    fn close(&self) {
        self.finish(|_, resolver| resolver.dismiss(DismissReason::Close));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::FutureExt;

    use super::*;
    use crate::{
        params::{Callback, on_open},
        present::DialogResult,
    };

    #[test]
    fn confirm_without_input_yields_true() {
        let p = HeadlessPresenter::new();
        let handle = p.present(&ParameterSet::from([(TITLE, "hi")]));
        assert!(p.is_visible());
        assert_eq!(p.title().map(|e| e.text_content), Some("hi".into()));
        p.click_confirm();
        assert!(!p.is_visible());
        assert_eq!(
            handle.now_or_never(),
            Some(Ok(DialogResult::confirmed(true)))
        );
    }

    #[test]
    fn confirm_with_input_yields_input_value() {
        let p = HeadlessPresenter::new();
        let handle = p.present(&ParameterSet::from([(INPUT, "text"), (INPUT_VALUE, "v")]));
        p.click_confirm();
        assert_eq!(
            handle.now_or_never(),
            Some(Ok(DialogResult::confirmed("v")))
        );

        let handle = p.present(&ParameterSet::from([(INPUT, "text")]));
        p.click_confirm();
        assert_eq!(
            handle.now_or_never(),
            Some(Ok(DialogResult::confirmed("")))
        );
    }

    #[test]
    fn cancel_close_and_replace() {
        let p = HeadlessPresenter::new();
        let first = p.present(&ParameterSet::new());
        let second = p.present(&ParameterSet::new());
        assert_eq!(
            first.now_or_never(),
            Some(Ok(DialogResult::dismissed(DismissReason::Replaced)))
        );
        p.click_cancel();
        assert_eq!(
            second.now_or_never(),
            Some(Ok(DialogResult::dismissed(DismissReason::Cancel)))
        );
        let third = p.present(&ParameterSet::new());
        p.close();
        assert_eq!(
            third.now_or_never(),
            Some(Ok(DialogResult::dismissed(DismissReason::Close)))
        );
        assert_eq!(p.presented_count(), 3);
    }

    #[test]
    fn hooks_run_without_holding_the_lock() {
        let p = Arc::new(HeadlessPresenter::new());
        let closes = Arc::new(AtomicUsize::new(0));
        let inner = p.clone();
        let counter = closes.clone();
        let on_close = Callback::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let params = ParameterSet::from([on_open(move || inner.click_confirm())])
            .with(ON_CLOSE, on_close)
            .with(HTML, "body");
        let handle = p.present(&params);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(!p.is_visible());
        assert!(p.content().is_none());
        let last = p.last_params().expect("presented");
        assert_eq!(last.get_str(HTML), Some("body"));
        assert!(matches!(handle.now_or_never(), Some(Ok(r)) if r.is_confirmed()));
    }

    #[test]
    fn unknown_type_rejects() {
        let p = HeadlessPresenter::new();
        let handle = p.present(&ParameterSet::from([(TYPE, "bogus")]));
        assert!(!p.is_visible());
        assert!(matches!(
            handle.now_or_never(),
            Some(Err(Error::Presentation(msg))) if msg.starts_with("Unknown type 'bogus'")
        ));
    }
}
