//! Built-in profile registry.
//!
//! Profiles are embedded via `include_str!` so they ship with the binary.
//! Only the raw text is exposed here; inheritance is resolved by the loader.

const BASE_MD: &str = include_str!("base.md");
const DEV_MD: &str = include_str!("dev.md");

/// List of all built-in profile names.
const BUILTIN_NAMES: &[&str] = &["base", "dev"];

/// Raw markdown source of a built-in profile.
pub fn get_builtin_source(name: &str) -> Option<&'static str> {
    match name {
        "base" => Some(BASE_MD),
        "dev" => Some(DEV_MD),
        _ => None,
    }
}

/// List all available built-in profile names.
pub fn list_builtin_names() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentFormat, parse_document};

    #[test]
    fn all_builtins_have_matching_names() {
        for name in BUILTIN_NAMES {
            let source = get_builtin_source(name).unwrap();
            let loaded = parse_document(source, DocumentFormat::Markdown)
                .unwrap_or_else(|e| panic!("built-in profile '{name}' failed to parse: {e}"));
            assert_eq!(loaded.document["profile"]["name"], *name);
            assert!(!loaded.body.is_empty());
        }
    }

    #[test]
    fn unknown_builtin_returns_none() {
        assert!(get_builtin_source("nonexistent").is_none());
    }
}
