//! Command-line interface definitions for dialog-demo.

use std::path::PathBuf;

use clap::{Args, Parser};
use dialogkit::{Param, ParameterSet};
use logging::LogArgs;
use serde_json::Value;

/// Command-line interface for the `dialog-demo` binary.
#[derive(Parser, Debug)]
#[command(
    name = "dialog-demo",
    about = "Fire a dialog through the headless presenter and print what happened",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// The dialog to fire.
    #[command(flatten)]
    pub dialog: DialogArgs,

    /// Include captured log events in the report.
    #[arg(long)]
    pub capture_logs: bool,
}

/// What to fire and how to answer it.
#[derive(Args, Debug, Clone, Default)]
pub struct DialogArgs {
    /// Dialog title (shorthand argument 1).
    #[arg(value_name = "TITLE")]
    pub title: Option<String>,

    /// Dialog body (shorthand argument 2).
    #[arg(value_name = "HTML")]
    pub html: Option<String>,

    /// Icon type (shorthand argument 3).
    #[arg(value_name = "TYPE")]
    pub kind: Option<String>,

    /// Call parameter. Switches to the object call form.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub set: Vec<(String, Param)>,

    /// User default merged before firing.
    #[arg(long = "default", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub defaults: Vec<(String, Param)>,

    /// Entry of a data mixin applied before firing.
    #[arg(long = "mixin", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub mixin: Vec<(String, Param)>,

    /// JSON dialog profile with defaults and data mixins.
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Cancel the dialog instead of confirming it.
    #[arg(long)]
    pub cancel: bool,
}

impl DialogArgs {
    /// Positional shorthand arguments, with gaps left undefined.
    pub fn shorthand(&self) -> Vec<Param> {
        let mut args: Vec<Param> = [&self.title, &self.html, &self.kind]
            .into_iter()
            .map(|a| Param::from(a.clone()))
            .collect();
        while args.last().is_some_and(Param::is_undefined) {
            args.pop();
        }
        args
    }
}

/// Collect `KEY=VALUE` pairs into a parameter set.
pub fn pairs_to_params(pairs: &[(String, Param)]) -> ParameterSet {
    pairs.iter().cloned().collect()
}

/// Parse `KEY=VALUE`. Values that parse as JSON keep their type; anything else is text.
pub fn parse_pair(s: &str) -> Result<(String, Param), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str::<Value>(value)
        .map_or_else(|_| Param::from(value), Param::from);
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_keep_json_types() {
        assert_eq!(parse_pair("timer=5"), Ok(("timer".into(), Param::Number(5.0))));
        assert_eq!(parse_pair("footer=null"), Ok(("footer".into(), Param::Null)));
        assert_eq!(
            parse_pair("title=a=b"),
            Ok(("title".into(), Param::from("a=b")))
        );
        assert!(parse_pair("title").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn cli_parses_shorthand_and_pairs() {
        let cli = Cli::parse_from([
            "dialog-demo",
            "Hello",
            "--mixin",
            "footer=f",
            "--default",
            "html=d",
            "--cancel",
        ]);
        assert_eq!(cli.dialog.shorthand(), vec![Param::from("Hello")]);
        assert_eq!(
            pairs_to_params(&cli.dialog.mixin),
            ParameterSet::from([("footer", "f")])
        );
        assert!(cli.dialog.cancel);
        assert!(!cli.capture_logs);
    }

    #[test]
    fn shorthand_keeps_interior_gaps() {
        let args = DialogArgs {
            title: Some("t".into()),
            kind: Some("info".into()),
            ..DialogArgs::default()
        };
        assert_eq!(
            args.shorthand(),
            vec![Param::from("t"), Param::Undefined, Param::from("info")]
        );
    }
}
