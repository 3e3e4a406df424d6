//! Reading configuration documents from disk.
//!
//! Supported formats, chosen by file extension:
//!
//! - `.toml`
//! - `.yaml` / `.yml`
//! - `.json`
//! - `.md`: YAML frontmatter between `---` fences, followed by a markdown body
//!
//! Every format is normalised into a [`Document`] so the merge, expansion
//! and encryption layers never care where a document came from.

use std::path::{Path, PathBuf};

use serde_json::Value;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::models::Document;

/// Errors while reading or parsing a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Frontmatter(String),

    #[error("unsupported document format for {0} (expected .toml, .yaml, .yml, .json or .md)")]
    UnsupportedFormat(PathBuf),

    #[error("top-level value in {0} must be a mapping")]
    NotAMapping(String),
}

/// On-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentFormat {
    Toml,
    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,
    Json,
    #[strum(serialize = "md")]
    Markdown,
}

impl DocumentFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.to_lowercase().parse().ok())
    }
}

/// A parsed document plus the markdown body, when the source had one.
#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    pub document: Document,
    pub body: String,
}

/// Load a document from disk, choosing the parser by extension.
pub fn load_document(path: &Path) -> Result<LoadedDocument, DocumentError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&content, format).map_err(|e| match e {
        DocumentError::Parse { message, .. } => DocumentError::Parse {
            path: path.to_path_buf(),
            message,
        },
        DocumentError::NotAMapping(_) => DocumentError::NotAMapping(path.display().to_string()),
        DocumentError::Frontmatter(message) => DocumentError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse document text in a known format.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<LoadedDocument, DocumentError> {
    let parse_err = |message: String| DocumentError::Parse {
        path: PathBuf::new(),
        message,
    };

    let (value, body) = match format {
        DocumentFormat::Toml => (
            toml::from_str::<Value>(content).map_err(|e| parse_err(e.to_string()))?,
            String::new(),
        ),
        DocumentFormat::Yaml => (parse_yaml(content).map_err(parse_err)?, String::new()),
        DocumentFormat::Json => (
            serde_json::from_str::<Value>(content).map_err(|e| parse_err(e.to_string()))?,
            String::new(),
        ),
        DocumentFormat::Markdown => {
            let (frontmatter, body) = split_frontmatter(content).map_err(DocumentError::Frontmatter)?;
            let value = parse_yaml(&frontmatter)
                .map_err(|e| parse_err(format!("invalid frontmatter: {e}")))?;
            (value, body.trim().to_string())
        }
    };

    match value {
        Value::Object(document) => Ok(LoadedDocument { document, body }),
        // An empty YAML document parses as null.
        Value::Null => Ok(LoadedDocument {
            document: Document::new(),
            body,
        }),
        _ => Err(DocumentError::NotAMapping(format.to_string())),
    }
}

/// Render a document in the given format (markdown is not writable).
pub fn render_document(doc: &Document, format: DocumentFormat) -> Result<String, DocumentError> {
    let render_err = |message: String| DocumentError::Parse {
        path: PathBuf::new(),
        message,
    };
    match format {
        DocumentFormat::Toml => toml::to_string_pretty(doc).map_err(|e| render_err(e.to_string())),
        DocumentFormat::Yaml => serde_yaml_ng::to_string(doc).map_err(|e| render_err(e.to_string())),
        DocumentFormat::Json => {
            serde_json::to_string_pretty(doc).map_err(|e| render_err(e.to_string()))
        }
        DocumentFormat::Markdown => Err(DocumentError::UnsupportedFormat(PathBuf::from("*.md"))),
    }
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml_ng::from_str::<Value>(content).map_err(|e| e.to_string())
}

/// Split content into YAML frontmatter and markdown body.
pub fn split_frontmatter(content: &str) -> Result<(String, String), String> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err("document must start with YAML frontmatter (---)".to_string());
    }

    let after_first = &content[3..];
    let end = after_first
        .find("\n---")
        .ok_or_else(|| "unterminated YAML frontmatter (missing closing ---)".to_string())?;

    let frontmatter = after_first[..end].trim().to_string();
    let body = after_first[end + 4..].to_string();

    Ok((frontmatter, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), Some(DocumentFormat::Toml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("bundle.md")), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn parse_toml_document() {
        let loaded = parse_document("[bundle]\nname = \"x\"\n", DocumentFormat::Toml).unwrap();
        assert_eq!(Value::Object(loaded.document), json!({"bundle": {"name": "x"}}));
    }

    #[test]
    fn parse_markdown_document() {
        let content = "---\nbundle:\n  name: dev\n---\n\nYou are helpful.\n";
        let loaded = parse_document(content, DocumentFormat::Markdown).unwrap();
        assert_eq!(Value::Object(loaded.document), json!({"bundle": {"name": "dev"}}));
        assert_eq!(loaded.body, "You are helpful.");
    }

    #[test]
    fn empty_yaml_is_empty_document() {
        let loaded = parse_document("", DocumentFormat::Yaml).unwrap();
        assert!(loaded.document.is_empty());
    }

    #[test]
    fn non_mapping_rejected() {
        let err = parse_document("[1, 2]", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn missing_frontmatter() {
        assert!(split_frontmatter("No frontmatter here").is_err());
    }

    #[test]
    fn unterminated_frontmatter() {
        let err = split_frontmatter("---\nname: x\n").unwrap_err();
        assert!(err.contains("unterminated"));
    }

    #[test]
    fn load_document_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let err = load_document(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("parse"));
        assert!(msg.contains("bad.toml"));
    }

    #[test]
    fn load_document_not_found() {
        let err = load_document(Path::new("/tmp/mountplan_missing_doc.yaml")).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn render_toml_and_reparse() {
        let doc = json!({"profile": {"active": "dev"}, "config": {"providers": [{"module": "p"}]}});
        let text = render_document(doc.as_object().unwrap(), DocumentFormat::Toml).unwrap();
        let loaded = parse_document(&text, DocumentFormat::Toml).unwrap();
        assert_eq!(Value::Object(loaded.document), doc);
    }
}
