//! Dialog profiles: user defaults plus data mixins loaded from JSON.
//!
//! ```json
//! {
//!   "defaults": { "confirm_button_text": "OK" },
//!   "mixins": [{ "input": "text" }, { "footer": "v1" }]
//! }
//! ```

use std::{fs, path::Path, result::Result as StdResult};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    ConfigError, Result,
    error::excerpt_at,
    invoker::Invoker,
    mixin::{MixinSpec, json_kind},
    params::{Param, ParameterSet},
};

/// Profile document as written on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    /// User defaults.
    #[serde(default)]
    defaults: Map<String, Value>,
    /// Data mixins, applied in order.
    #[serde(default)]
    mixins: Vec<Value>,
}

/// Resolved profile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogProfile {
    /// Merged into the invoker's user defaults.
    pub defaults: ParameterSet,
    /// Applied as data mixins, in order.
    pub mixins: Vec<ParameterSet>,
}

impl DialogProfile {
    /// Install the defaults on `invoker`'s lineage and return the mixed-in invoker.
    pub fn apply(&self, invoker: &Invoker) -> Result<Invoker> {
        if !self.defaults.is_empty() {
            invoker.set_defaults(&self.defaults);
        }
        invoker.mixin(self.mixins.iter().cloned().map(MixinSpec::Data))
    }
}

/// Load a profile from disk.
pub fn load_profile(path: &Path) -> StdResult<DialogProfile, ConfigError> {
    let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let profile = parse_profile(&source, Some(path))?;
    debug!(
        path = %path.display(),
        defaults = profile.defaults.len(),
        mixins = profile.mixins.len(),
        "loaded dialog profile"
    );
    Ok(profile)
}

/// Parse a profile from `source`. `path` is only used for error reporting.
pub fn parse_profile(
    source: &str,
    path: Option<&Path>,
) -> StdResult<DialogProfile, ConfigError> {
    let raw: RawProfile = serde_json::from_str(source).map_err(|e| ConfigError::Parse {
        path: path.map(Path::to_path_buf),
        line: e.line(),
        col: e.column(),
        message: e.to_string(),
        excerpt: excerpt_at(source, e.line(), e.column()),
    })?;

    let defaults = Param::from(Value::Object(raw.defaults))
        .as_map()
        .cloned()
        .unwrap_or_default();

    let mut mixins = Vec::with_capacity(raw.mixins.len());
    for (i, value) in raw.mixins.into_iter().enumerate() {
        let kind = json_kind(&value);
        match MixinSpec::from_json(value) {
            Ok(MixinSpec::Data(params)) => mixins.push(params),
            _ => {
                return Err(ConfigError::Validation {
                    path: path.map(Path::to_path_buf),
                    message: format!("mixins[{}]: expected an object, found {}", i, kind),
                });
            }
        }
    }
    Ok(DialogProfile { defaults, mixins })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::headless::HeadlessPresenter;

    #[test]
    fn parses_defaults_and_mixins() {
        let profile = parse_profile(
            r#"{"defaults": {"html": "foo"}, "mixins": [{"input": "text"}, {"footer": "f"}]}"#,
            None,
        )
        .expect("valid profile");
        assert_eq!(profile.defaults, ParameterSet::from([("html", "foo")]));
        assert_eq!(
            profile.mixins,
            vec![
                ParameterSet::from([("input", "text")]),
                ParameterSet::from([("footer", "f")]),
            ]
        );
    }

    #[test]
    fn empty_document_is_empty_profile() {
        assert_eq!(parse_profile("{}", None), Ok(DialogProfile::default()));
    }

    #[test]
    fn non_object_mixin_is_a_validation_error() {
        let err = parse_profile(r#"{"mixins": [{}, "oops"]}"#, None).expect_err("invalid");
        assert_eq!(
            err,
            ConfigError::Validation {
                path: None,
                message: "mixins[1]: expected an object, found string".into(),
            }
        );
    }

    #[test]
    fn syntax_error_carries_location() {
        let src = "{\n  \"defaults\": {\n    \"title\" 1\n  }\n}";
        match parse_profile(src, Some(Path::new("p.json"))) {
            Err(ConfigError::Parse {
                line, excerpt, path, ..
            }) => {
                assert_eq!(line, 3);
                assert!(excerpt.contains('^'));
                assert_eq!(path.as_deref(), Some(Path::new("p.json")));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        assert!(matches!(
            parse_profile(r#"{"defaultz": {}}"#, None),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn apply_sets_defaults_and_mixes_in() {
        let base = Invoker::new(Arc::new(HeadlessPresenter::new()));
        let profile = DialogProfile {
            defaults: ParameterSet::from([("html", "d")]),
            mixins: vec![ParameterSet::from([("footer", "m")])],
        };
        let derived = profile.apply(&base).expect("apply");
        assert_eq!(derived.builtin_defaults().get_str("footer"), Some("m"));
        assert_eq!(base.defaults_store().snapshot().get_str("html"), Some("d"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err =
            load_profile(Path::new("/nonexistent/dialogkit/profile.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
