//! Fire one dialog and report what the presenter saw.

use std::sync::{Arc, Weak};

use dialogkit::{
    Call, DialogResult, HeadlessPresenter, Invoker, MixinSpec, Param, ParameterSet, Presenter,
    load_profile, on_open,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    cli::{DialogArgs, pairs_to_params},
    error::{Error, Result},
};

/// What happened during a run.
#[derive(Debug)]
pub struct Report {
    /// Parameters recorded by the terminal dispatch.
    pub context: ParameterSet,
    /// How the dialog resolved.
    pub result: DialogResult,
    /// Number of dialogs the presenter showed.
    pub presented: usize,
}

impl Report {
    /// Render the report as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "context": self.context.to_json(),
            "result": {
                "value": self.result.value.as_ref().map_or(Value::Null, Param::to_json),
                "dismiss": self.result.dismiss.map(|r| r.to_string()),
            },
            "presented": self.presented,
        })
    }
}

/// Build the invoker described by `args`: profile first, then defaults, then the mixin.
pub fn build_invoker(args: &DialogArgs, presenter: Arc<HeadlessPresenter>) -> Result<Invoker> {
    let mut invoker = Invoker::new(presenter);
    if let Some(path) = &args.profile {
        invoker = load_profile(path)?.apply(&invoker)?;
    }
    if !args.defaults.is_empty() {
        invoker.set_defaults(&pairs_to_params(&args.defaults));
    }
    if !args.mixin.is_empty() {
        invoker = invoker.mixin([MixinSpec::data(pairs_to_params(&args.mixin))])?;
    }
    Ok(invoker)
}

/// Data mixin whose `on_open` hook answers the dialog.
fn responder(presenter: Weak<HeadlessPresenter>, cancel: bool) -> MixinSpec {
    MixinSpec::data([on_open(move || {
        let Some(p) = presenter.upgrade() else { return };
        if cancel {
            p.click_cancel();
        } else {
            p.click_confirm();
        }
    })])
}

/// Fire the dialog described by `args` and answer it from `on_open`.
pub async fn run(args: &DialogArgs) -> Result<Report> {
    let presenter = Arc::new(HeadlessPresenter::new());
    let invoker = build_invoker(args, presenter.clone())?
        .mixin([responder(Arc::downgrade(&presenter), args.cancel)])?;

    let shorthand = args.shorthand();
    let outcome = if args.set.is_empty() {
        debug!(args = shorthand.len(), "firing shorthand call");
        invoker.fire(Call::Shorthand(shorthand))
    } else {
        let mut params = invoker.args_to_params(&shorthand);
        params.overlay(&pairs_to_params(&args.set));
        debug!(keys = ?params.keys().collect::<Vec<_>>(), "firing object call");
        invoker.fire(params)
    };
    let handle = outcome.into_handle().ok_or(Error::NotPresented)?;

    if presenter.is_visible() {
        warn!("on_open was overridden; closing the dialog");
        presenter.close();
    }
    let result = handle.await?;
    info!(
        confirmed = result.is_confirmed(),
        dismiss = ?result.dismiss,
        "dialog resolved"
    );
    Ok(Report {
        context: invoker.get_current_context().params,
        result,
        presented: presenter.presented_count(),
    })
}
