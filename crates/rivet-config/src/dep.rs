//! Dependency declaration parsing.
//!
//! A dependency is declared as the value of a `dep` metadata key:
//! `<name> <method> <location...>`. The name is the logical link name used
//! when linking the dependent crate; it need not match the dependency's own
//! declared name. Everything after the second token is one location string.

use std::fmt;

/// How a dependency's source tree is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepMethod {
    /// `location` is a package root directory on the local filesystem.
    Path,
    /// `location` is a local `.tar.gz` archive of a package root.
    Local,
    /// `location` is a URL of a `.tar.gz` archive, fetched via the content cache.
    Url,
    /// `location` is a content identifier resolved through an IPFS gateway.
    Ipfs,
    /// `location` is a lookup key into the remote package index.
    Index,
}

impl DepMethod {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "local" => Some(Self::Local),
            "url" => Some(Self::Url),
            "ipfs" => Some(Self::Ipfs),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

impl fmt::Display for DepMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "path",
            Self::Local => "local",
            Self::Url => "url",
            Self::Ipfs => "ipfs",
            Self::Index => "index",
        };
        f.write_str(s)
    }
}

/// A single parsed dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepDecl {
    /// Logical link name for the dependent's compiler invocation.
    pub name: String,
    /// Source kind.
    pub method: DepMethod,
    /// Method-specific location (path, archive path, URL, CID, or index key).
    pub location: String,
}

impl DepDecl {
    /// Parse a declaration line of the form `<name> <method> <location...>`.
    ///
    /// # Errors
    /// Returns an error if fewer than three fields are present or the method
    /// is not one of `path`, `local`, `url`, `ipfs`, `index`.
    pub fn parse(line: &str) -> Result<Self, DepParseError> {
        let line = line.trim();

        let (name, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| DepParseError::Malformed {
                line: line.to_owned(),
            })?;
        let rest = rest.trim_start();
        let (method_str, location) =
            rest.split_once(char::is_whitespace)
                .ok_or_else(|| DepParseError::Malformed {
                    line: line.to_owned(),
                })?;
        let location = location.trim_start();
        if location.is_empty() {
            return Err(DepParseError::Malformed {
                line: line.to_owned(),
            });
        }

        let method = DepMethod::parse(method_str).ok_or_else(|| DepParseError::UnknownMethod {
            method: method_str.to_owned(),
            line: line.to_owned(),
        })?;

        Ok(Self {
            name: name.to_owned(),
            method,
            location: location.to_owned(),
        })
    }
}

/// Errors produced while parsing a dependency declaration.
#[derive(Debug, thiserror::Error)]
pub enum DepParseError {
    /// The line does not have the `<name> <method> <location>` shape.
    #[error("malformed dependency declaration `{line}` — expected `<name> <method> <location>`")]
    Malformed { line: String },

    /// The method token is not a recognized source kind.
    #[error("unknown dependency method `{method}` in `{line}` — expected path, local, url, ipfs, or index")]
    UnknownMethod { method: String, line: String },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_declaration() {
        let decl = DepDecl::parse("mylib path ../mylib").unwrap();
        assert_eq!(decl.name, "mylib");
        assert_eq!(decl.method, DepMethod::Path);
        assert_eq!(decl.location, "../mylib");
    }

    #[test]
    fn parse_all_methods() {
        for (text, method) in [
            ("a path /p", DepMethod::Path),
            ("a local /p.tar.gz", DepMethod::Local),
            ("a url http://example.com/p.tar.gz", DepMethod::Url),
            ("a ipfs QmHash", DepMethod::Ipfs),
            ("a index somepkg", DepMethod::Index),
        ] {
            assert_eq!(DepDecl::parse(text).unwrap().method, method);
        }
    }

    #[test]
    fn location_keeps_trailing_spaces_as_one_string() {
        let decl = DepDecl::parse("lib path /some dir/with spaces").unwrap();
        assert_eq!(decl.location, "/some dir/with spaces");
    }

    #[test]
    fn parse_tolerates_extra_separating_whitespace() {
        let decl = DepDecl::parse("  mylib   path   ../mylib  ").unwrap();
        assert_eq!(decl.name, "mylib");
        assert_eq!(decl.location, "../mylib");
    }

    #[test]
    fn missing_location_is_malformed() {
        assert!(DepDecl::parse("mylib path").is_err());
        assert!(DepDecl::parse("mylib path   ").is_err());
    }

    #[test]
    fn missing_method_is_malformed() {
        assert!(DepDecl::parse("mylib").is_err());
        assert!(DepDecl::parse("").is_err());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = DepDecl::parse("mylib git https://example.com/r.git").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("git"), "error was: {msg}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::DepDecl;

    use proptest::prelude::proptest;

    proptest! {
        /// Arbitrary input must never cause the parser to panic.
        #[test]
        fn parse_never_panics(line in ".*") {
            let _ = DepDecl::parse(&line);
        }
    }
}
