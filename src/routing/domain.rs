//! Host normalization and domain pattern matching.
//!
//! # Responsibilities
//! - Normalize hosts: strip port, strip leading `www.`, lowercase
//! - Classify domain patterns as exact, parameterized or wildcard
//! - Extract named domain parameters on match
//!
//! # Pattern Forms
//! ```text
//! example.com              exact
//! {tenant}.app.example.com one label per placeholder, never crosses a dot
//! *.example.com            any subdomain, captured as `subdomain`
//! ```
//!
//! # Design Decisions
//! - Registration and request sides share one normalization routine
//! - Exact comparison is always tried first
//! - Wildcards never match the apex (`*.example.com` vs `example.com`)

use std::fmt;

use crate::routing::error::PatternError;
use crate::routing::params::DomainParams;
use crate::routing::pattern::{compile_tokens, Token};

/// Parameter name under which wildcard patterns capture the subdomain.
pub const SUBDOMAIN_PARAM: &str = "subdomain";

/// Normalize a request host for comparison.
///
/// Idempotent: normalizing twice yields the same string.
pub fn normalize_host(host: &str) -> String {
    strip_www(strip_port(host.trim()).trim_end_matches('.')).to_ascii_lowercase()
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep everything through the closing bracket.
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

fn strip_www(mut host: &str) -> &str {
    while host
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
    {
        host = &host[4..];
    }
    host
}

/// Structural form of a domain pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainKind {
    Exact,
    Parameterized(Vec<Token>),
    Wildcard { base: String },
}

/// A compiled, normalized domain pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    source: String,
    kind: DomainKind,
}

impl DomainPattern {
    /// Normalize and compile a domain pattern.
    ///
    /// Literal labels are lowercased; placeholder names keep their case.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = strip_www(strip_port(pattern.trim()).trim_end_matches('.'));
        if trimmed.is_empty() {
            return Err(PatternError::Empty);
        }

        let has_wildcard = trimmed.contains('*');
        let has_braces = trimmed.contains('{') || trimmed.contains('}');
        if has_wildcard && has_braces {
            return Err(PatternError::Mixed {
                pattern: pattern.to_string(),
            });
        }

        if has_wildcard {
            let base = trimmed
                .strip_prefix("*.")
                .filter(|base| !base.contains('*'))
                .ok_or_else(|| PatternError::MisplacedWildcard {
                    pattern: pattern.to_string(),
                })?;
            if base.split('.').any(str::is_empty) {
                return Err(PatternError::EmptyLabel {
                    pattern: pattern.to_string(),
                });
            }
            let base = base.to_ascii_lowercase();
            return Ok(Self {
                source: format!("*.{}", base),
                kind: DomainKind::Wildcard { base },
            });
        }

        if !has_braces {
            return Ok(Self {
                source: trimmed.to_ascii_lowercase(),
                kind: DomainKind::Exact,
            });
        }

        let tokens: Vec<Token> = compile_tokens(pattern, trimmed.split('.'))?
            .into_iter()
            .map(|token| match token {
                Token::Literal(label) => Token::Literal(label.to_ascii_lowercase()),
                param => param,
            })
            .collect();

        let mut seen: Vec<&str> = Vec::new();
        for token in &tokens {
            match token {
                Token::Literal(label) if label.is_empty() => {
                    return Err(PatternError::EmptyLabel {
                        pattern: pattern.to_string(),
                    })
                }
                Token::Param(name) if seen.contains(&name.as_str()) => {
                    return Err(PatternError::Duplicate {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    })
                }
                Token::Param(name) => seen.push(name),
                Token::Literal(_) => {}
            }
        }

        let source = tokens
            .iter()
            .map(|token| match token {
                Token::Literal(label) => label.clone(),
                Token::Param(name) => format!("{{{}}}", name),
            })
            .collect::<Vec<_>>()
            .join(".");

        Ok(Self {
            source,
            kind: DomainKind::Parameterized(tokens),
        })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> &DomainKind {
        &self.kind
    }

    /// Match a raw request host.
    pub fn match_host(&self, host: &str) -> Option<DomainParams> {
        self.match_normalized(&normalize_host(host))
    }

    /// Match a host already passed through [`normalize_host`].
    pub fn match_normalized(&self, host: &str) -> Option<DomainParams> {
        match &self.kind {
            DomainKind::Exact => (host == self.source).then(DomainParams::new),
            DomainKind::Parameterized(tokens) => match_labels(tokens, host),
            DomainKind::Wildcard { base } => {
                let subdomain = host.strip_suffix(base.as_str())?.strip_suffix('.')?;
                if subdomain.is_empty() || subdomain.split('.').any(str::is_empty) {
                    return None;
                }
                let mut params = DomainParams::new();
                params.push(SUBDOMAIN_PARAM, subdomain);
                Some(params)
            }
        }
    }
}

fn match_labels(tokens: &[Token], host: &str) -> Option<DomainParams> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() != tokens.len() {
        return None;
    }

    let mut params = DomainParams::new();
    for (token, label) in tokens.iter().zip(labels) {
        match token {
            Token::Literal(literal) if literal == label => {}
            Token::Param(name) if !label.is_empty() => params.push(name.as_str(), label),
            _ => return None,
        }
    }
    Some(params)
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
