//! Pattern compilation shared by path and domain patterns.
//!
//! A pattern is split on its separator (`/` for paths, `.` for hosts) and
//! every piece becomes a [`Token`]: either a literal that must match
//! exactly, or a `{name}` placeholder that captures one whole piece.
//!
//! # Design Decisions
//! - Token lists instead of regex: matching is a single linear pass
//! - Placeholders must span a whole segment/label (`{id}`, never `user-{id}`)
//! - Malformed placeholders are rejected here, at registration time

use crate::routing::error::PatternError;

/// One compiled piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Must equal the candidate piece byte for byte.
    Literal(String),
    /// Captures one non-empty candidate piece under this name.
    Param(String),
}

impl Token {
    pub fn is_param(&self) -> bool {
        matches!(self, Token::Param(_))
    }
}

/// Compile the already-split pieces of `pattern` into tokens.
pub fn compile_tokens<'p>(
    pattern: &str,
    pieces: impl IntoIterator<Item = &'p str>,
) -> Result<Vec<Token>, PatternError> {
    pieces
        .into_iter()
        .map(|piece| classify(pattern, piece))
        .collect()
}

fn classify(pattern: &str, piece: &str) -> Result<Token, PatternError> {
    let opens = piece.matches('{').count();
    let closes = piece.matches('}').count();

    if opens == 0 && closes == 0 {
        return Ok(Token::Literal(piece.to_string()));
    }

    let first_open = piece.find('{');
    let first_close = piece.find('}');
    if opens != closes || first_close < first_open {
        return Err(PatternError::Unbalanced {
            pattern: pattern.to_string(),
            segment: piece.to_string(),
        });
    }

    let name = match piece.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        Some(inner) if opens == 1 => inner,
        _ => {
            return Err(PatternError::Embedded {
                pattern: pattern.to_string(),
                segment: piece.to_string(),
            })
        }
    };

    if name.is_empty() {
        return Err(PatternError::EmptyName {
            pattern: pattern.to_string(),
        });
    }
    if !is_valid_name(name) {
        return Err(PatternError::InvalidName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    Ok(Token::Param(name.to_string()))
}

/// Placeholder names are ASCII alphanumerics and underscores.
fn is_valid_name(name: &str) -> bool {
    name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Names of the placeholders in `tokens`, in pattern order.
pub fn param_names(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Param(name) => Some(name.clone()),
            Token::Literal(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_param_tokens() {
        let tokens = compile_tokens("/user/{id}", ["user", "{id}"]).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Literal("user".into()), Token::Param("id".into())]
        );
        assert_eq!(param_names(&tokens), vec!["id".to_string()]);
    }

    #[test]
    fn test_malformed_placeholders_rejected() {
        assert!(matches!(
            compile_tokens("/user/{id", ["user", "{id"]),
            Err(PatternError::Unbalanced { .. })
        ));
        assert!(matches!(
            compile_tokens("/user/}id{", ["user", "}id{"]),
            Err(PatternError::Unbalanced { .. })
        ));
        assert!(matches!(
            compile_tokens("/user/{}", ["user", "{}"]),
            Err(PatternError::EmptyName { .. })
        ));
        assert!(matches!(
            compile_tokens("/user/{user-id}", ["user", "{user-id}"]),
            Err(PatternError::InvalidName { .. })
        ));
        assert!(matches!(
            compile_tokens("/user/u{id}", ["user", "u{id}"]),
            Err(PatternError::Embedded { .. })
        ));
        assert!(matches!(
            compile_tokens("/user/{a}{b}", ["user", "{a}{b}"]),
            Err(PatternError::Embedded { .. })
        ));
    }
}
