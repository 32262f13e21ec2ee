//! Mixin specs and the composer that applies them.
//!
//! A data spec overlays built-in defaults. A behavior spec is called with the
//! invoker as it was before the spec applied and returns a replacement dispatch
//! handler, optionally with static members to merge onto the surface. Each
//! application yields a new invoker; the input invoker is never mutated.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::{
    Error, Result,
    invoker::{Builtin, Dispatch, Handler, Invoker, Method, Outcome, StaticMember},
    normalize::ArgsToParams,
    params::{Param, ParameterSet},
};

/// Function form of a behavior spec.
pub type BehaviorFn = Arc<dyn Fn(&Invoker) -> Behavior + Send + Sync>;

/// One extension unit passed to [`Invoker::mixin`].
#[derive(Clone)]
pub enum MixinSpec {
    /// Default overlay. Call-time parameters still win over it.
    Data(ParameterSet),
    /// Behavior transform, called once with the pre-mixin invoker.
    Behavior(BehaviorFn),
}

impl fmt::Debug for MixinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(p) => f.debug_tuple("Data").field(p).finish(),
            Self::Behavior(_) => f.write_str("Behavior(..)"),
        }
    }
}

impl MixinSpec {
    /// A data spec.
    pub fn data(params: impl Into<ParameterSet>) -> Self {
        Self::Data(params.into())
    }

    /// A behavior spec.
    pub fn behavior(f: impl Fn(&Invoker) -> Behavior + Send + Sync + 'static) -> Self {
        Self::Behavior(Arc::new(f))
    }

    /// Interpret a JSON value as a data spec. Anything but an object is rejected.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) => match Param::from(value) {
                Param::Map(params) => Ok(Self::Data(params)),
                _ => Err(Error::InvalidMixin("expected an object".into())),
            },
            other => Err(Error::InvalidMixin(format!(
                "expected an object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<ParameterSet> for MixinSpec {
    fn from(params: ParameterSet) -> Self {
        Self::Data(params)
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Result of a behavior spec.
pub enum Behavior {
    /// Replace the dispatch.
    Handler(Handler),
    /// Replace the dispatch and merge static members.
    WithStatics(Handler, Statics),
}

impl Behavior {
    /// Replace the dispatch with `f`.
    pub fn handler<O: Into<Outcome>>(
        f: impl Fn(ParameterSet) -> O + Send + Sync + 'static,
    ) -> Self {
        Self::Handler(Arc::new(move |params| f(params).into()))
    }

    /// Replace the dispatch with `f` and merge `statics` onto the surface.
    pub fn with_statics<O: Into<Outcome>>(
        f: impl Fn(ParameterSet) -> O + Send + Sync + 'static,
        statics: Statics,
    ) -> Self {
        Self::WithStatics(Arc::new(move |params| f(params).into()), statics)
    }
}

/// Ordered static members contributed by a behavior spec.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Statics(IndexMap<String, StaticMember>);

impl Statics {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain value.
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: impl Into<Param>) -> Self {
        self.member(name, StaticMember::Value(value.into()))
    }

    /// Add a callable member.
    #[must_use]
    pub fn method(
        self,
        name: impl Into<String>,
        f: impl Fn(&[Param]) -> Param + Send + Sync + 'static,
    ) -> Self {
        let method: Method = Arc::new(f);
        self.member(name, StaticMember::Method(method))
    }

    /// Replace the shorthand mapping.
    #[must_use]
    pub fn args_to_params(self, mapping: ArgsToParams) -> Self {
        self.member(
            Builtin::ArgsToParams.name(),
            StaticMember::ArgsToParams(mapping),
        )
    }

    /// Add an arbitrary member. Checked when the spec is applied.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, member: StaticMember) -> Self {
        self.0.insert(name.into(), member);
        self
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StaticMember)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reject tables that would leave the surface inconsistent.
    fn validate(&self) -> Result<()> {
        let mapping_key = Builtin::ArgsToParams.name();
        for (name, member) in &self.0 {
            if name.is_empty() {
                return Err(Error::InvalidMixin("static member with an empty name".into()));
            }
            match member {
                StaticMember::Builtin(b) => {
                    return Err(Error::InvalidMixin(format!(
                        "'{}' cannot be re-exported as builtin '{}'",
                        name,
                        b.name()
                    )));
                }
                StaticMember::ArgsToParams(_) if name != mapping_key => {
                    return Err(Error::InvalidMixin(format!(
                        "a shorthand mapping can only be installed as '{}', not '{}'",
                        mapping_key, name
                    )));
                }
                StaticMember::Value(_) | StaticMember::Method(_) if name == mapping_key => {
                    return Err(Error::InvalidMixin(format!(
                        "'{}' must be a shorthand mapping",
                        mapping_key
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Apply `specs` to `base` left to right. Spec N sees the result of specs 1..N-1.
pub(crate) fn compose(
    base: &Invoker,
    specs: impl IntoIterator<Item = MixinSpec>,
) -> Result<Invoker> {
    let mut current = base.clone();
    for (index, spec) in specs.into_iter().enumerate() {
        current = apply(&current, spec).map_err(|e| match e {
            Error::InvalidMixin(msg) => Error::InvalidMixin(format!("spec {}: {}", index, msg)),
            other => other,
        })?;
    }
    Ok(current)
}

/// Apply a single spec.
fn apply(current: &Invoker, spec: MixinSpec) -> Result<Invoker> {
    match spec {
        MixinSpec::Data(params) => {
            debug!(keys = ?params.keys().collect::<Vec<_>>(), "applying data mixin");
            let mut overlay = current.overlay().clone();
            overlay.overlay(&params);
            Ok(current.derive(
                overlay,
                current.dispatch().clone(),
                current.statics_map().clone(),
            ))
        }
        MixinSpec::Behavior(f) => match f(current) {
            Behavior::Handler(handler) => {
                debug!("applying behavior mixin");
                Ok(current.derive(
                    ParameterSet::new(),
                    Dispatch::Handler(handler),
                    current.statics_map().clone(),
                ))
            }
            Behavior::WithStatics(handler, statics) => {
                statics.validate()?;
                debug!(
                    statics = ?statics.iter().map(|(k, _)| k).collect::<Vec<_>>(),
                    "applying behavior mixin with statics"
                );
                let mut merged = current.statics_map().clone();
                for (name, member) in statics.0 {
                    merged.insert(name, member);
                }
                Ok(current.derive(ParameterSet::new(), Dispatch::Handler(handler), merged))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{headless::HeadlessPresenter, normalize::default_args_to_params};

    fn base() -> Invoker {
        Invoker::new(Arc::new(HeadlessPresenter::new()))
    }

    #[test]
    fn data_spec_keeps_surface_and_dispatch() {
        let base = base();
        let derived = base
            .mixin([MixinSpec::data([("input", "text")])])
            .expect("mixin");
        assert!(!Invoker::ptr_eq(&base, &derived));
        assert_eq!(derived.static_names(), base.static_names());
        assert_eq!(derived.builtin_defaults().get_str("input"), Some("text"));
        assert!(base.builtin_defaults().is_empty());
    }

    #[test]
    fn data_specs_accumulate() {
        let derived = base()
            .mixin([
                MixinSpec::data([("title", "a"), ("footer", "a")]),
                MixinSpec::data([("footer", "b")]),
            ])
            .expect("mixin");
        assert_eq!(
            derived.builtin_defaults(),
            &ParameterSet::from([("title", "a"), ("footer", "b")])
        );
    }

    #[test]
    fn empty_spec_list_returns_same_invoker() {
        let base = base();
        let derived = base.mixin(Vec::new()).expect("mixin");
        assert!(Invoker::ptr_eq(&base, &derived));
    }

    #[test]
    fn statics_override_in_place_and_append() {
        let base = base();
        let derived = base
            .mixin([MixinSpec::behavior(|_| {
                Behavior::with_statics(
                    |p: ParameterSet| p,
                    Statics::new().value("close", "replaced").value("extra", 1),
                )
            })])
            .expect("mixin");
        let mut expected: Vec<&str> = base.static_names();
        expected.push("extra");
        assert_eq!(derived.static_names(), expected);
        assert_eq!(
            derived.get_static("close"),
            Some(&StaticMember::Value("replaced".into()))
        );
    }

    #[test]
    fn malformed_statics_fail_at_mixin_time() {
        let cases = [
            Statics::new().value("", 1),
            Statics::new().value("args_to_params", "nope"),
            Statics::new().member("parse", StaticMember::ArgsToParams(default_args_to_params())),
            Statics::new().member("alias", StaticMember::Builtin(Builtin::Close)),
        ];
        for statics in cases {
            let err = base()
                .mixin([MixinSpec::behavior(move |_| {
                    Behavior::with_statics(|p: ParameterSet| p, statics.clone())
                })])
                .expect_err("invalid statics");
            assert!(
                matches!(&err, Error::InvalidMixin(msg) if msg.starts_with("spec 0:")),
                "{err:?}"
            );
        }
    }

    #[test]
    fn json_specs() {
        let spec = MixinSpec::from_json(serde_json::json!({"input": "text"})).expect("object");
        assert!(matches!(spec, MixinSpec::Data(ref p) if p.get_str("input") == Some("text")));
        assert_eq!(
            MixinSpec::from_json(serde_json::json!("text")).expect_err("string"),
            Error::InvalidMixin("expected an object, found string".into())
        );
        assert!(MixinSpec::from_json(serde_json::json!([{}])).is_err());
    }
}
