//! The callable dialog entry point and its static member surface.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::{
    Error, Result,
    context::{self, Context, ContextStore},
    defaults::DefaultsStore,
    mixin::{self, MixinSpec},
    normalize::{self, ArgsToParams},
    params::{Param, ParameterSet},
    present::{Element, PresentationHandle, Presenter},
};

/// Replacement dispatch installed by a behavior mixin.
pub type Handler = Arc<dyn Fn(ParameterSet) -> Outcome + Send + Sync>;

/// Callable static member added by a behavior mixin.
pub type Method = Arc<dyn Fn(&[Param]) -> Param + Send + Sync>;

/// Static members every base invoker carries, in surface order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Derive a new invoker from mixin specs.
    Mixin,
    /// Merge user defaults.
    SetDefaults,
    /// Clear user defaults.
    ResetDefaults,
    /// Read the last recorded context.
    GetCurrentContext,
    /// Normalize shorthand arguments.
    ArgsToParams,
    /// Presenter: is a dialog open.
    IsVisible,
    /// Presenter: title node.
    GetTitle,
    /// Presenter: content node.
    GetContent,
    /// Presenter: confirm the open dialog.
    ClickConfirm,
    /// Presenter: cancel the open dialog.
    ClickCancel,
    /// Presenter: close the open dialog.
    Close,
}

impl Builtin {
    /// All builtins in surface order.
    pub const ALL: [Self; 11] = [
        Self::Mixin,
        Self::SetDefaults,
        Self::ResetDefaults,
        Self::GetCurrentContext,
        Self::ArgsToParams,
        Self::IsVisible,
        Self::GetTitle,
        Self::GetContent,
        Self::ClickConfirm,
        Self::ClickCancel,
        Self::Close,
    ];

    /// Member name on the static surface.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mixin => "mixin",
            Self::SetDefaults => "set_defaults",
            Self::ResetDefaults => "reset_defaults",
            Self::GetCurrentContext => "get_current_context",
            Self::ArgsToParams => "args_to_params",
            Self::IsVisible => "is_visible",
            Self::GetTitle => "get_title",
            Self::GetContent => "get_content",
            Self::ClickConfirm => "click_confirm",
            Self::ClickCancel => "click_cancel",
            Self::Close => "close",
        }
    }
}

/// One entry of an invoker's static surface.
#[derive(Clone)]
pub enum StaticMember {
    /// Built-in behavior provided by the core.
    Builtin(Builtin),
    /// Plain value.
    Value(Param),
    /// Callable member.
    Method(Method),
    /// Replacement shorthand mapping. Only valid under `args_to_params`.
    ArgsToParams(ArgsToParams),
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(b) => write!(f, "Builtin({})", b.name()),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
            Self::ArgsToParams(_) => f.write_str("ArgsToParams(..)"),
        }
    }
}

impl PartialEq for StaticMember {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Method(a), Self::Method(b)) => Arc::ptr_eq(a, b),
            (Self::ArgsToParams(a), Self::ArgsToParams(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Ordered static surface.
pub(crate) type StaticMap = IndexMap<String, StaticMember>;

/// Arguments of a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Object form, used as-is.
    Params(ParameterSet),
    /// Positional shorthand, normalized through `args_to_params`.
    Shorthand(Vec<Param>),
}

impl Call {
    /// Build a shorthand call from positional values.
    pub fn shorthand<I, P>(args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Self::Shorthand(args.into_iter().map(Into::into).collect())
    }
}

impl From<ParameterSet> for Call {
    fn from(params: ParameterSet) -> Self {
        Self::Params(params)
    }
}

impl From<Vec<Param>> for Call {
    fn from(args: Vec<Param>) -> Self {
        Self::Shorthand(args)
    }
}

impl From<&str> for Call {
    fn from(title: &str) -> Self {
        Self::Shorthand(vec![title.into()])
    }
}

/// What a dispatch returned.
#[derive(Debug)]
pub enum Outcome {
    /// The presenter's handle, returned unchanged.
    Presented(PresentationHandle),
    /// A value produced synchronously by a behavior handler.
    Ready(Param),
}

impl Outcome {
    /// The presentation handle, if the dispatch reached a presenter.
    pub fn into_handle(self) -> Option<PresentationHandle> {
        match self {
            Self::Presented(h) => Some(h),
            Self::Ready(_) => None,
        }
    }

    /// The synchronous value, if a handler produced one.
    pub fn into_ready(self) -> Option<Param> {
        match self {
            Self::Presented(_) => None,
            Self::Ready(v) => Some(v),
        }
    }
}

impl From<PresentationHandle> for Outcome {
    fn from(h: PresentationHandle) -> Self {
        Self::Presented(h)
    }
}

impl From<Param> for Outcome {
    fn from(v: Param) -> Self {
        Self::Ready(v)
    }
}

impl From<ParameterSet> for Outcome {
    fn from(v: ParameterSet) -> Self {
        Self::Ready(Param::Map(v))
    }
}

/// How an invoker turns call parameters into a result.
#[derive(Clone)]
pub(crate) enum Dispatch {
    /// Merge layers, record context, and hand off to the presenter.
    Present,
    /// Delegate to a behavior mixin's handler.
    Handler(Handler),
}

/// Immutable description shared by clones of one invoker.
struct Inner {
    /// Data-mixin overlays applied since the dispatch was last replaced.
    overlay: ParameterSet,
    /// Current dispatch.
    dispatch: Dispatch,
    /// Static surface.
    statics: StaticMap,
    /// User defaults, shared by the whole lineage.
    defaults: DefaultsStore,
    /// This invoker's context slot.
    context: ContextStore,
    /// Presentation collaborator.
    presenter: Arc<dyn Presenter>,
}

/// Callable dialog entry point.
///
/// Clones are cheap and refer to the same invoker. Extend it with
/// [`Invoker::mixin`], which returns a new invoker and leaves this one untouched.
#[derive(Clone)]
pub struct Invoker {
    /// Shared description.
    inner: Arc<Inner>,
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("overlay", &self.inner.overlay)
            .field("statics", &self.static_names())
            .finish_non_exhaustive()
    }
}

impl Invoker {
    /// Create a base invoker with fresh, empty defaults.
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self::with_defaults_store(presenter, DefaultsStore::new())
    }

    /// Create a base invoker that reads user defaults from `defaults`.
    pub fn with_defaults_store(presenter: Arc<dyn Presenter>, defaults: DefaultsStore) -> Self {
        let statics = Builtin::ALL
            .iter()
            .map(|b| (b.name().to_string(), StaticMember::Builtin(*b)))
            .collect();
        Self {
            inner: Arc::new(Inner {
                overlay: ParameterSet::new(),
                dispatch: Dispatch::Present,
                statics,
                defaults,
                context: ContextStore::new(),
                presenter,
            }),
        }
    }

    /// Derive a sibling description that shares defaults and presenter but owns a new context.
    pub(crate) fn derive(
        &self,
        overlay: ParameterSet,
        dispatch: Dispatch,
        statics: StaticMap,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                overlay,
                dispatch,
                statics,
                defaults: self.inner.defaults.clone(),
                context: ContextStore::new(),
                presenter: self.inner.presenter.clone(),
            }),
        }
    }

    pub(crate) fn overlay(&self) -> &ParameterSet {
        &self.inner.overlay
    }

    pub(crate) fn dispatch(&self) -> &Dispatch {
        &self.inner.dispatch
    }

    pub(crate) fn statics_map(&self) -> &StaticMap {
        &self.inner.statics
    }

    /// Returns true when both handles refer to the same invoker.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Invoke the dialog.
    ///
    /// Object calls are used as-is; shorthand calls go through
    /// [`Invoker::args_to_params`] exactly once. The result is whatever the
    /// current dispatch returns.
    pub fn fire(&self, call: impl Into<Call>) -> Outcome {
        let params = match call.into() {
            Call::Params(params) => params,
            Call::Shorthand(args) => self.args_to_params(&args),
        };
        let _scope = self.inner.context.enter();
        match &self.inner.dispatch {
            Dispatch::Present => self.present(&params),
            Dispatch::Handler(handler) => {
                let params = ParameterSet::layered([&self.inner.overlay, &params]);
                trace!(keys = ?params.keys().collect::<Vec<_>>(), "dispatch to mixin handler");
                handler(params)
            }
        }
    }

    /// Terminal dispatch: built-in defaults, then user defaults, then call params.
    fn present(&self, params: &ParameterSet) -> Outcome {
        let unknown = params.unknown_keys();
        if !unknown.is_empty() {
            warn!(keys = ?unknown, "unknown parameter names");
        }
        let defaults = self.inner.defaults.snapshot();
        let merged = ParameterSet::layered([&self.inner.overlay, &defaults, params]);
        debug!(keys = ?merged.keys().collect::<Vec<_>>(), "presenting dialog");
        self.inner.context.record_scoped(&merged);
        let _hidden = context::suspend();
        Outcome::Presented(self.inner.presenter.present(&merged))
    }

    /// Normalize shorthand arguments with this invoker's current mapping. Never dispatches.
    pub fn args_to_params(&self, args: &[Param]) -> ParameterSet {
        match self.inner.statics.get(Builtin::ArgsToParams.name()) {
            Some(StaticMember::ArgsToParams(mapping)) => mapping(args),
            _ => normalize::args_to_params(args),
        }
    }

    /// Apply `specs` left to right and return the resulting invoker.
    pub fn mixin(&self, specs: impl IntoIterator<Item = MixinSpec>) -> Result<Self> {
        mixin::compose(self, specs)
    }

    /// Merge `partial` over the user defaults shared by this lineage.
    pub fn set_defaults(&self, partial: &ParameterSet) {
        self.inner.defaults.set(partial);
    }

    /// Clear the user defaults shared by this lineage.
    pub fn reset_defaults(&self) {
        self.inner.defaults.reset();
    }

    /// Handle to the user defaults shared by this lineage.
    pub fn defaults_store(&self) -> &DefaultsStore {
        &self.inner.defaults
    }

    /// Defaults contributed by data mixins on this invoker.
    pub fn builtin_defaults(&self) -> &ParameterSet {
        &self.inner.overlay
    }

    /// Parameters recorded by the last dispatch that passed through this invoker.
    pub fn get_current_context(&self) -> Context {
        self.inner.context.current()
    }

    /// Returns true while the presenter shows a dialog.
    pub fn is_visible(&self) -> bool {
        self.inner.presenter.is_visible()
    }

    /// Title node of the open dialog.
    pub fn get_title(&self) -> Option<Element> {
        self.inner.presenter.title()
    }

    /// Content node of the open dialog.
    pub fn get_content(&self) -> Option<Element> {
        self.inner.presenter.content()
    }

    /// Confirm the open dialog.
    pub fn click_confirm(&self) {
        self.inner.presenter.click_confirm();
    }

    /// Cancel the open dialog.
    pub fn click_cancel(&self) {
        self.inner.presenter.click_cancel();
    }

    /// Close the open dialog.
    pub fn close(&self) {
        self.inner.presenter.close();
    }

    /// Static member names in surface order.
    pub fn static_names(&self) -> Vec<&str> {
        self.inner.statics.keys().map(String::as_str).collect()
    }

    /// Static members in surface order.
    pub fn statics(&self) -> impl Iterator<Item = (&str, &StaticMember)> {
        self.inner.statics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a static member.
    pub fn get_static(&self, name: &str) -> Option<&StaticMember> {
        self.inner.statics.get(name)
    }

    /// Call a static member by name with untyped arguments.
    ///
    /// Builtins behave like their typed counterparts, with results rendered as
    /// [`Param`]s. `mixin` needs typed specs and is not callable this way.
    pub fn call_static(&self, name: &str, args: &[Param]) -> Result<Param> {
        let member = self
            .get_static(name)
            .ok_or_else(|| Error::UnknownMember(name.to_string()))?;
        match member {
            StaticMember::Builtin(b) => self.call_builtin(*b, args),
            StaticMember::Method(method) => Ok(method(args)),
            StaticMember::ArgsToParams(mapping) => Ok(Param::Map(mapping(args))),
            StaticMember::Value(_) => Err(Error::NotCallable(name.to_string())),
        }
    }

    /// Untyped entry point for builtins.
    fn call_builtin(&self, builtin: Builtin, args: &[Param]) -> Result<Param> {
        let element_text =
            |e: Option<Element>| e.map_or(Param::Null, |e| Param::Text(e.text_content));
        match builtin {
            Builtin::Mixin => Err(Error::NotCallable(builtin.name().to_string())),
            Builtin::SetDefaults => match args {
                [Param::Map(partial)] => {
                    self.set_defaults(partial);
                    Ok(Param::Undefined)
                }
                _ => Err(Error::InvalidArgument(format!(
                    "{} expects a single parameter set",
                    builtin.name()
                ))),
            },
            Builtin::ResetDefaults => {
                self.reset_defaults();
                Ok(Param::Undefined)
            }
            Builtin::GetCurrentContext => Ok(Param::Map(
                ParameterSet::new().with("params", self.get_current_context().params),
            )),
            Builtin::ArgsToParams => Ok(Param::Map(normalize::args_to_params(args))),
            Builtin::IsVisible => Ok(Param::Bool(self.is_visible())),
            Builtin::GetTitle => Ok(element_text(self.get_title())),
            Builtin::GetContent => Ok(element_text(self.get_content())),
            Builtin::ClickConfirm => {
                self.click_confirm();
                Ok(Param::Undefined)
            }
            Builtin::ClickCancel => {
                self.click_cancel();
                Ok(Param::Undefined)
            }
            Builtin::Close => {
                self.close();
                Ok(Param::Undefined)
            }
        }
    }
}
