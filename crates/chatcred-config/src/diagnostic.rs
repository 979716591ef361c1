// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings diagnostics.
//!
//! Figment reports every problem it meets while extracting
//! [`ChatcredConfig`](crate::ChatcredConfig). Each one becomes a
//! [`ConfigError`] that miette can render with the offending line and, for
//! misspelled keys, the closest valid key by Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const MIN_SIMILARITY: f64 = 0.75;

/// One problem with the settings.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown settings key `{key}`")]
    #[diagnostic(
        code(chatcred::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, when one is close enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same table.
        valid_keys: String,
        #[label("not a chatcred setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(chatcred::config::invalid_value), help("expected {expected}"))]
    InvalidValue {
        key: String,
        detail: String,
        expected: String,
    },

    /// A value parsed but breaks a rule checked after loading.
    #[error("invalid settings: {message}")]
    #[diagnostic(code(chatcred::config::validation))]
    Validation { message: String },

    #[error("settings error: {0}")]
    #[diagnostic(code(chatcred::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? accepted here: {valid_keys}"),
        None => format!("accepted here: {valid_keys}"),
    }
}

/// Turn a figment extraction failure into diagnostics.
///
/// `toml_sources` pairs each settings file path with its content and is only
/// used to point at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let table: Vec<String> = error.path.clone();
            let key = table.join(".");
            match &error.kind {
                Kind::UnknownField(field, accepted) => {
                    let located = origin_of(&error, toml_sources)
                        .and_then(|(name, content)| locate(name, content, &table, field));
                    let (span, src) = match located {
                        Some((span, src)) => (Some(span), Some(src)),
                        None => (None, None),
                    };
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, &accepted[..]),
                        valid_keys: accepted.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => ConfigError::InvalidValue {
                    key,
                    detail: format!("found {found}"),
                    expected: expected.clone(),
                },
                // Custom `try_from` failures, e.g. an unknown storage mode.
                Kind::Message(message) if !key.is_empty() => ConfigError::InvalidValue {
                    key,
                    detail: message.clone(),
                    expected: "a supported value".to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The settings file an error came from. Inline sources carry no file
/// metadata, so a single known source is assumed to be it.
fn origin_of<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| source.file_path())
        .map(|path| path.display().to_string());

    let found = match file {
        Some(file) => toml_sources.iter().find(|(name, _)| *name == file),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };
    found.map(|(name, content)| (name.as_str(), content.as_str()))
}

fn locate(
    name: &str,
    content: &str,
    table: &[String],
    field: &str,
) -> Option<(SourceSpan, NamedSource<String>)> {
    let offset = find_key_offset(content, table, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.to_string()),
    ))
}

/// Byte offset of `field` as a key inside the table named by `path`.
///
/// Only the first path element is used to find the `[table]` header; an
/// empty path searches from the top of the document.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(table) => {
            let header = format!("[{table}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let is_key = line[indent..]
            .strip_prefix(field)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if is_key {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The valid key most similar to `unknown`, if any is similar enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every diagnostic to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misspelled_key_gets_closest_suggestion() {
        let valid = ["storage_mode", "external_file", "config_encrypt", "kdf_iterations"];
        assert_eq!(suggest_key("storag_mode", &valid).as_deref(), Some("storage_mode"));
    }

    #[test]
    fn unrelated_key_gets_no_suggestion() {
        let valid = ["state_dir", "main_config", "log_level"];
        assert_eq!(suggest_key("zzzzzz", &valid), None);
    }

    #[test]
    fn key_offset_skips_other_tables() {
        let content = "[client]\nlog_level = \"info\"\n\n[credential]\n  config_encrpyt = true\n";
        let path = vec!["credential".to_string()];
        let at = find_key_offset(content, &path, "config_encrpyt").unwrap();
        assert_eq!(&content[at..at + "config_encrpyt".len()], "config_encrpyt");
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[credential]\nexternal_file_mode = 1\nexternal_file = \"x\"\n";
        let path = vec!["credential".to_string()];
        let at = find_key_offset(content, &path, "external_file").unwrap();
        assert!(content[at..].starts_with("external_file ="));
    }
}
