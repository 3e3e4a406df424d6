//! `${VAR}` / `${VAR:default}` expansion over configuration documents.
//!
//! Expansion walks strings, mappings and sequences; other values pass
//! through unchanged. Unset variables resolve to their default, or to the
//! empty string when no default is given. Unbalanced `${` is left as-is.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::env::Env;
use crate::models::Document;

/// `NAME` excludes `}` and `:`; `default` excludes `}` and may be empty.
static ENV_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").unwrap());

/// Expand every token in a document against the real process environment.
pub fn expand_env_vars(config: &Document) -> Document {
    expand_document(config, &Env::real())
}

/// Expand every token in a document against `env`.
pub fn expand_document(config: &Document, env: &Env) -> Document {
    config
        .iter()
        .map(|(k, v)| (k.clone(), expand_value(v, env)))
        .collect()
}

/// Expand tokens in any value, recursing into mappings and sequences.
pub fn expand_value(value: &Value, env: &Env) -> Value {
    match value {
        Value::String(s) => Value::String(expand_str(s, env)),
        Value::Object(map) => Value::Object(expand_document(map, env)),
        Value::Array(items) => Value::Array(items.iter().map(|v| expand_value(v, env)).collect()),
        other => other.clone(),
    }
}

/// Expand tokens in a single string, left to right.
pub fn expand_str(input: &str, env: &Env) -> String {
    ENV_TOKEN_RE
        .replace_all(input, |caps: &Captures| {
            let name = &caps[1];
            match env.var(name) {
                Ok(val) => val,
                Err(_) => caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .into_owned()
}

/// Returns `true` if the whole string is a single `${...}` reference.
pub fn is_env_reference(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn env() -> Env {
        Env::mock([("HOME_DIR", "/home/me"), ("MODEL", "claude"), ("EMPTY", "")])
    }

    #[test]
    fn plain_strings_unchanged() {
        assert_eq!(expand_str("no tokens here", &env()), "no tokens here");
        assert_eq!(expand_str("$HOME_DIR and {MODEL}", &env()), "$HOME_DIR and {MODEL}");
    }

    #[test]
    fn substitutes_set_variables() {
        assert_eq!(expand_str("${HOME_DIR}/cache", &env()), "/home/me/cache");
    }

    #[test]
    fn default_used_when_unset() {
        assert_eq!(expand_str("${MISSING_VAR:fallback}", &env()), "fallback");
    }

    #[test]
    fn default_ignored_when_set() {
        assert_eq!(expand_str("${MODEL:gpt-4}", &env()), "claude");
    }

    #[test]
    fn set_but_empty_variable_wins_over_default() {
        assert_eq!(expand_str("[${EMPTY:x}]", &env()), "[]");
    }

    #[test]
    fn unset_without_default_is_empty() {
        assert_eq!(expand_str("a${MISSING}b", &env()), "ab");
    }

    #[test]
    fn empty_default_allowed() {
        assert_eq!(expand_str("a${MISSING:}b", &env()), "ab");
    }

    #[test]
    fn multiple_tokens_in_one_string() {
        assert_eq!(
            expand_str("${MODEL}@${HOME_DIR}:${NOPE:1}", &env()),
            "claude@/home/me:1"
        );
    }

    #[test]
    fn default_may_contain_colons() {
        assert_eq!(
            expand_str("${URL:http://localhost:8080}", &env()),
            "http://localhost:8080"
        );
    }

    #[test]
    fn unbalanced_token_left_literal() {
        assert_eq!(expand_str("${MODEL", &env()), "${MODEL");
        assert_eq!(expand_str("prefix ${", &env()), "prefix ${");
    }

    #[test]
    fn recurses_into_containers() {
        let doc = json!({
            "providers": [{"module": "p", "config": {"model": "${MODEL}", "n": 3}}],
            "flag": true,
            "path": "${HOME_DIR}"
        });
        let expanded = expand_document(doc.as_object().unwrap(), &env());
        assert_eq!(
            Value::Object(expanded),
            json!({
                "providers": [{"module": "p", "config": {"model": "claude", "n": 3}}],
                "flag": true,
                "path": "/home/me"
            })
        );
    }

    #[test]
    fn keys_are_not_expanded() {
        let doc = json!({"${MODEL}": "x"});
        let expanded = expand_document(doc.as_object().unwrap(), &env());
        assert!(expanded.contains_key("${MODEL}"));
    }

    #[test]
    fn env_reference_shape() {
        assert!(is_env_reference("${FOO}"));
        assert!(is_env_reference("${FOO:bar}"));
        assert!(!is_env_reference("prefix ${FOO}"));
        assert!(!is_env_reference("sk-123"));
    }
}
