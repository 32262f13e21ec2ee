//! Parameter values and ordered parameter sets.
//!
//! A [`ParameterSet`] is an open, insertion-ordered mapping from option name to
//! [`Param`]. Sets are combined with a shallow, key-wise, last-write-wins merge in
//! which [`Param::Undefined`] never replaces an existing value.

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, map};
use serde_json::{Number, Value};

/// Option key for the dialog title.
pub const TITLE: &str = "title";
/// Option key for the dialog body markup.
pub const HTML: &str = "html";
/// Option key for the plain-text dialog body.
pub const TEXT: &str = "text";
/// Option key for the dialog icon type.
pub const TYPE: &str = "type";
/// Option key for the dialog footer.
pub const FOOTER: &str = "footer";
/// Option key for the input kind.
pub const INPUT: &str = "input";
/// Option key for the initial input value.
pub const INPUT_VALUE: &str = "input_value";
/// Option key for the hook fired synchronously when a dialog opens.
pub const ON_OPEN: &str = "on_open";
/// Option key for the hook fired when a dialog resolves.
pub const ON_CLOSE: &str = "on_close";

/// Option names recognized by the presentation layer. Other names are accepted.
pub const KNOWN_PARAMS: &[&str] = &[
    TITLE,
    HTML,
    TEXT,
    TYPE,
    FOOTER,
    INPUT,
    INPUT_VALUE,
    "input_placeholder",
    "confirm_button_text",
    "cancel_button_text",
    "show_cancel_button",
    ON_OPEN,
    ON_CLOSE,
    "timer",
];

/// Returns true when `key` is part of the recognized option vocabulary.
pub fn is_known_param(key: &str) -> bool {
    KNOWN_PARAMS.contains(&key)
}

/// Shared zero-argument hook stored inside a parameter set.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    /// Wrap a closure.
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the hook.
    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An `on_open` entry, ready to insert into a [`ParameterSet`].
pub fn on_open(f: impl Fn() + Send + Sync + 'static) -> (&'static str, Param) {
    (ON_OPEN, Param::Callback(Callback::new(f)))
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Param {
    /// Explicitly unset. Never overrides a value during merges.
    #[default]
    Undefined,
    /// Explicit null. Overrides like any other value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Ordered list of values.
    List(Vec<Self>),
    /// Nested parameter set. A lone map argument is the object call form.
    Map(ParameterSet),
    /// Hook such as `on_open`.
    Callback(Callback),
}

impl Param {
    /// Returns true for [`Param::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Borrow the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested set, if any.
    pub fn as_map(&self) -> Option<&ParameterSet> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the hook, if any.
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// Render as JSON. Hooks become `"<callback>"`; undefined becomes null.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Undefined | Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(m) => m.to_json(),
            Self::Callback(_) => Value::String("<callback>".to_string()),
        }
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Param {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<ParameterSet> for Param {
    fn from(m: ParameterSet) -> Self {
        Self::Map(m)
    }
}

impl From<Callback> for Param {
    fn from(cb: Callback) -> Self {
        Self::Callback(cb)
    }
}

impl<T: Into<Self>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Undefined, Into::into)
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(obj) => {
                Self::Map(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Insertion-ordered mapping from option name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet(IndexMap<String, Param>);

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Param>) -> Option<Param> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Param> {
        self.0.get(key)
    }

    /// Look up a text value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Param::as_str)
    }

    /// Look up a hook.
    pub fn get_callback(&self, key: &str) -> Option<&Callback> {
        self.get(key).and_then(Param::as_callback)
    }

    /// Returns true when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.0.shift_remove(key)
    }

    /// Option names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> map::Iter<'_, String, Param> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply `other` on top of `self`: defined values win, undefined values are skipped.
    pub fn overlay(&mut self, other: &Self) {
        for (k, v) in other.iter() {
            if v.is_undefined() {
                continue;
            }
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Merge `layers` in ascending precedence into a fresh set.
    pub fn layered<'a>(layers: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut out = Self::new();
        for layer in layers {
            out.overlay(layer);
        }
        out
    }

    /// Names present in this set that are not part of [`KNOWN_PARAMS`].
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.keys().filter(|k| !is_known_param(k)).collect()
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

impl<K: Into<String>, V: Into<Param>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Param>, const N: usize> From<[(K, V); N]> for ParameterSet {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, Param);
    type IntoIter = map::IntoIter<String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a Param);
    type IntoIter = map::Iter<'a, String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_precedence() {
        let builtin = ParameterSet::from([("a", 1)]);
        let user = ParameterSet::from([("a", 2), ("b", 3)]);
        let call = ParameterSet::from([("b", 4)]);
        let merged = ParameterSet::layered([&builtin, &user, &call]);
        assert_eq!(merged, ParameterSet::from([("a", 2), ("b", 4)]));
    }

    #[test]
    fn undefined_never_overrides_but_null_does() {
        let mut base = ParameterSet::from([(HTML, "foo"), (FOOTER, "bar")]);
        base.overlay(
            &ParameterSet::new()
                .with(HTML, Param::Undefined)
                .with(FOOTER, Param::Null)
                .with(TITLE, Param::Undefined),
        );
        assert_eq!(base.get_str(HTML), Some("foo"));
        assert_eq!(base.get(FOOTER), Some(&Param::Null));
        assert!(!base.contains_key(TITLE));
    }

    #[test]
    fn overlay_keeps_first_insertion_order() {
        let mut base = ParameterSet::from([(TITLE, "a"), (HTML, "a")]);
        base.overlay(&ParameterSet::from([(FOOTER, "b"), (TITLE, "b")]));
        assert_eq!(base.keys().collect::<Vec<_>>(), vec![TITLE, HTML, FOOTER]);
        assert_eq!(base.get_str(TITLE), Some("b"));
    }

    #[test]
    fn json_conversion() {
        let v = serde_json::json!({"title": "t", "timer": 5, "show_cancel_button": true, "x": null});
        let set = match Param::from(v.clone()) {
            Param::Map(m) => m,
            other => panic!("expected map, got {other:?}"),
        };
        assert_eq!(set.get(TITLE), Some(&Param::Text("t".into())));
        assert_eq!(set.get("timer"), Some(&Param::Number(5.0)));
        assert_eq!(set.unknown_keys(), vec!["x"]);
        assert_eq!(
            set.to_json(),
            serde_json::json!({"title": "t", "timer": 5.0, "show_cancel_button": true, "x": null})
        );
    }

    #[test]
    fn callbacks_compare_by_identity() {
        let a = Callback::new(|| {});
        let b = Callback::new(|| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
