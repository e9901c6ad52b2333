//! The `rivet.meta` package metadata model.
//!
//! The metadata file is line-oriented UTF-8 text. Each non-blank line is
//! `<key><whitespace><rest-of-line>`; keys may repeat (dependency lists are
//! repeated `dep` entries) and declaration order is preserved exactly.

use std::fmt;
use std::path::Path;

/// Fixed name of the metadata file inside a package root.
pub const META_FILE: &str = "rivet.meta";

/// Ordered, possibly-duplicate-keyed package metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Read and parse the metadata file at `path`.
    ///
    /// # Errors
    /// Returns an error only if the file cannot be read; no key validation is
    /// performed (unknown keys are retained and ignored by consumers).
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse_str(&content))
    }

    /// Parse metadata from text.
    ///
    /// Lines are stripped of surrounding whitespace; blank lines are skipped;
    /// each remaining line splits on the first whitespace run into (key, rest).
    /// A line with no whitespace is a key with an empty value.
    pub fn parse_str(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(char::is_whitespace) {
                Some((key, rest)) => entries.push((key.to_owned(), rest.trim_start().to_owned())),
                None => entries.push((line.to_owned(), String::new())),
            }
        }
        Self { entries }
    }

    /// The first value declared for `key`, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first value declared for `key`, or `default` if the key is absent.
    pub fn first_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.first(key).unwrap_or(default)
    }

    /// All values declared for `key`, lazily, in declaration order.
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl fmt::Display for Metadata {
    /// Render the canonical `<key> <value>` line form, one entry per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            if value.is_empty() {
                writeln!(f, "{key}")?;
            } else {
                writeln!(f, "{key} {value}")?;
            }
        }
        Ok(())
    }
}

/// Errors produced while loading metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The metadata file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_order_and_duplicates() {
        let meta = Metadata::parse_str("name demo\ndep a path ../a\ndep b path ../b\n");
        let keys: Vec<_> = meta.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["name", "dep", "dep"]);
    }

    #[test]
    fn parse_skips_blank_lines_and_trims() {
        let meta = Metadata::parse_str("  name demo  \n\n   \ntype lib\n");
        assert_eq!(meta.entries().len(), 2);
        assert_eq!(meta.first("name"), Some("demo"));
        assert_eq!(meta.first("type"), Some("lib"));
    }

    #[test]
    fn parse_splits_on_first_whitespace_run_only() {
        let meta = Metadata::parse_str("dep foo url http://example.com/a b.tar.gz\n");
        assert_eq!(meta.first("dep"), Some("foo url http://example.com/a b.tar.gz"));
    }

    #[test]
    fn parse_line_without_whitespace_is_empty_value() {
        let meta = Metadata::parse_str("flag\n");
        assert_eq!(meta.first("flag"), Some(""));
    }

    #[test]
    fn first_returns_first_declared_value() {
        let meta = Metadata::parse_str("dep one\ndep two\ndep three\n");
        assert_eq!(meta.first("dep"), Some("one"));
    }

    #[test]
    fn first_or_defaults_when_absent() {
        let meta = Metadata::parse_str("name demo\n");
        assert_eq!(meta.first_or("type", "bin"), "bin");
        assert_eq!(meta.first_or("name", "other"), "demo");
    }

    #[test]
    fn all_returns_every_value_in_order_and_no_others() {
        let meta = Metadata::parse_str("name demo\ndep one\nauthor x\ndep two\n");
        let deps: Vec<_> = meta.all("dep").collect();
        assert_eq!(deps, ["one", "two"]);
        assert_eq!(meta.all("missing").count(), 0);
    }

    #[test]
    fn all_is_restartable() {
        let meta = Metadata::parse_str("dep one\ndep two\n");
        assert_eq!(meta.all("dep").count(), 2);
        assert_eq!(meta.all("dep").count(), 2);
    }

    #[test]
    fn unknown_keys_are_retained() {
        let meta = Metadata::parse_str("name demo\nfrobnicate yes\n");
        assert_eq!(meta.first("frobnicate"), Some("yes"));
    }

    #[test]
    fn display_roundtrips_canonical_text() {
        let text = "name demo\ntype lib\ndep a path ../a\n";
        let meta = Metadata::parse_str(text);
        assert_eq!(meta.to_string(), text);
    }

    #[test]
    fn display_roundtrips_modulo_blank_lines() {
        let meta = Metadata::parse_str("name demo\n\n\ntype lib\n");
        assert_eq!(meta.to_string(), "name demo\ntype lib\n");
    }

    #[test]
    fn from_path_missing_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let result = Metadata::from_path(&tmp.path().join(META_FILE));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot read"), "error was: {err}");
    }

    #[test]
    fn from_path_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(META_FILE);
        std::fs::write(&path, "name demo\n").unwrap();
        let meta = Metadata::from_path(&path).unwrap();
        assert_eq!(meta.first("name"), Some("demo"));
    }
}
