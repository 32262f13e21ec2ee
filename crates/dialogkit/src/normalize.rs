//! Shorthand argument normalization.

use std::sync::Arc;

use tracing::trace;

use crate::params::{HTML, Param, ParameterSet, TITLE, TYPE};

/// Canonical keys for the positional shorthand slots, in order.
pub const SHORTHAND_KEYS: [&str; 3] = [TITLE, HTML, TYPE];

/// A shorthand mapping installed on an invoker's `args_to_params` static.
pub type ArgsToParams = Arc<dyn Fn(&[Param]) -> ParameterSet + Send + Sync>;

/// Map positional shorthand arguments onto canonical option keys.
///
/// A lone [`Param::Map`] is already in object form and is returned unchanged.
/// Missing or undefined slots are left out of the result, and anything past the
/// third slot is ignored.
pub fn args_to_params(args: &[Param]) -> ParameterSet {
    if let [Param::Map(params)] = args {
        return params.clone();
    }
    if args.len() > SHORTHAND_KEYS.len() {
        trace!(
            extra = args.len() - SHORTHAND_KEYS.len(),
            "ignoring extra shorthand arguments"
        );
    }
    SHORTHAND_KEYS
        .iter()
        .zip(args)
        .filter(|(_, v)| !v.is_undefined())
        .map(|(k, v)| (*k, v.clone()))
        .collect()
}

/// The default mapping as an installable [`ArgsToParams`].
pub fn default_args_to_params() -> ArgsToParams {
    Arc::new(args_to_params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_slots() {
        let params = args_to_params(&["title".into(), "html".into(), "info".into()]);
        assert_eq!(
            params,
            ParameterSet::from([(TITLE, "title"), (HTML, "html"), (TYPE, "info")])
        );
    }

    #[test]
    fn omitted_slots_are_absent() {
        let params = args_to_params(&["bar".into()]);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec![TITLE]);

        let params = args_to_params(&[Param::Undefined, "body".into()]);
        assert_eq!(params, ParameterSet::from([(HTML, "body")]));

        assert!(args_to_params(&[]).is_empty());
    }

    #[test]
    fn null_slot_is_kept() {
        let params = args_to_params(&["t".into(), Param::Null]);
        assert_eq!(params.get(HTML), Some(&Param::Null));
    }

    #[test]
    fn object_form_passes_through() {
        let obj = ParameterSet::from([("footer", "f"), (TITLE, "t")]);
        assert_eq!(args_to_params(&[Param::Map(obj.clone())]), obj);
    }

    #[test]
    fn extra_arguments_ignored() {
        let params = args_to_params(&["a".into(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(params.len(), 3);
        assert_eq!(params.get_str(TYPE), Some("c"));
    }
}
