//! CLI command definitions and argument helpers.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use mountplan::constants::ENV_LOG;
use mountplan::models::Document;

/// Install the stderr log subscriber.
///
/// `MOUNTPLAN_LOG` takes a full filter directive; without it the level is
/// `warn`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build a CLI overlay document from `key.path=value` assignments.
///
/// Later assignments win. A value that parses as JSON is used as such
/// (`true`, `3`, `[...]`, `{...}`); anything else is a string.
pub fn parse_set_overrides(assignments: &[String]) -> Result<Document, String> {
    let mut doc = Document::new();
    for assignment in assignments {
        let (path, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("invalid --set '{assignment}': expected KEY.PATH=VALUE"))?;
        let keys: Vec<&str> = path.split('.').collect();
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(format!("invalid --set '{assignment}': empty key in path"));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        set_path(&mut doc, &keys, value);
    }
    Ok(doc)
}

fn set_path(doc: &mut Document, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        return;
    };
    if rest.is_empty() {
        doc.insert(first.to_string(), value);
        return;
    }
    let child = doc
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Document::new()));
    if !child.is_object() {
        *child = Value::Object(Document::new());
    }
    if let Value::Object(map) = child {
        set_path(map, rest, value);
    }
}
