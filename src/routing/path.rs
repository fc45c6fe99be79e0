//! Path pattern matching.
//!
//! # Responsibilities
//! - Normalize registered and requested paths to `/` + trimmed form
//! - Compile `/user/{id}` style patterns
//! - Extract positional parameter values on match
//!
//! # Design Decisions
//! - Anchored at both ends: segment counts must agree
//! - Literal segments are case-sensitive
//! - A placeholder never matches an empty segment

use std::fmt;

use crate::routing::error::PatternError;
use crate::routing::pattern::{compile_tokens, param_names, Token};

/// Normalize a path to start with `/` and carry no trailing slash.
///
/// Any query string is dropped. The root normalizes to `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    format!("/{}", path.trim_matches('/'))
}

/// True for the root path (`/` or empty).
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// A compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    tokens: Vec<Token>,
}

impl PathPattern {
    /// Normalize and compile `path`.
    pub fn parse(path: &str) -> Result<Self, PatternError> {
        let source = normalize_path(path);
        let tokens = match source.strip_prefix('/') {
            Some("") | None => Vec::new(),
            Some(rest) => compile_tokens(&source, rest.split('/'))?,
        };
        Ok(Self { source, tokens })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in pattern order.
    pub fn param_names(&self) -> Vec<String> {
        param_names(&self.tokens)
    }

    /// True when the pattern has no placeholders.
    pub fn is_static(&self) -> bool {
        !self.tokens.iter().any(Token::is_param)
    }

    /// Match a normalized request path, returning positional parameters.
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        let rest = path.strip_prefix('/')?;
        let segments: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        if segments.len() != self.tokens.len() {
            return None;
        }

        let mut params = Vec::new();
        for (token, segment) in self.tokens.iter().zip(segments) {
            match token {
                Token::Literal(literal) if literal == segment => {}
                Token::Param(_) if !segment.is_empty() => params.push(segment.to_string()),
                _ => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
