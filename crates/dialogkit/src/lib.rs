//! dialogkit
//!
//! A dialog invoker that can be extended at runtime with mixins. The crate owns
//! the composition engine and leaves rendering to a [`Presenter`]:
//! - [`Invoker`]: the callable entry point and its static member surface
//! - [`MixinSpec`]: data overlays and behavior transforms applied by [`Invoker::mixin`]
//! - [`args_to_params`]: shorthand positional arguments to a [`ParameterSet`]
//! - [`ContextStore`] / [`DefaultsStore`]: the two pieces of shared state
//! - [`HeadlessPresenter`]: an in-memory presenter
//!
//! Dispatch merges, in ascending precedence, data-mixin defaults, user defaults
//! set with [`Invoker::set_defaults`], and the call's own parameters. Undefined
//! values never override defined ones.

mod config;
mod context;
mod defaults;
mod error;
mod headless;
mod invoker;
mod mixin;
mod normalize;
mod params;
mod present;

pub use config::{DialogProfile, load_profile, parse_profile};
pub use context::{Context, ContextStore};
pub use defaults::DefaultsStore;
pub use error::{ConfigError, Error, Result};
pub use headless::{HeadlessPresenter, ICON_TYPES};
pub use invoker::{Builtin, Call, Handler, Invoker, Method, Outcome, StaticMember};
pub use mixin::{Behavior, BehaviorFn, MixinSpec, Statics};
pub use normalize::{ArgsToParams, SHORTHAND_KEYS, args_to_params, default_args_to_params};
pub use params::{
    Callback, FOOTER, HTML, INPUT, INPUT_VALUE, KNOWN_PARAMS, ON_CLOSE, ON_OPEN, Param,
    ParameterSet, TEXT, TITLE, TYPE, is_known_param, on_open,
};
pub use present::{
    DialogResult, DismissReason, Element, PresentationHandle, Presenter, Resolver,
};
