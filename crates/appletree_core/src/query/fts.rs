//! FTS5 match-expression builder for free-text filters.
//!
//! # Responsibility
//! - Convert user filter text into a column-scoped FTS5 expression.
//!
//! # Invariants
//! - Every term is emitted as a quoted phrase; FTS5 operators typed by the
//!   user are never interpreted.
//! - All terms must match (plain-text AND semantics).

/// Outcome of turning filter text into a match expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Blank input: the filter does not restrict results.
    All,
    /// Expression to bind against the FTS table.
    Expr(String),
    /// Input had no indexable terms (e.g. only punctuation); nothing matches.
    Nothing,
}

/// Builds a `column : "term" AND column : "term"` expression.
///
/// `column` must be a static FTS column name, never user input.
pub fn column_match(column: &'static str, text: &str) -> TextMatch {
    let text = text.trim();
    if text.is_empty() {
        return TextMatch::All;
    }

    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(|term| format!("{column} : {}", escape_fts_term(term)))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return TextMatch::Nothing;
    }

    TextMatch::Expr(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::{column_match, TextMatch};

    #[test]
    fn blank_text_matches_everything() {
        assert_eq!(column_match("name", ""), TextMatch::All);
        assert_eq!(column_match("name", "   "), TextMatch::All);
    }

    #[test]
    fn terms_are_quoted_and_joined() {
        assert_eq!(
            column_match("name", "St. John's"),
            TextMatch::Expr("name : \"St.\" AND name : \"John's\"".to_string())
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(
            column_match("level", "a\"b"),
            TextMatch::Expr("level : \"a\"\"b\"".to_string())
        );
    }

    #[test]
    fn punctuation_only_text_matches_nothing() {
        assert_eq!(column_match("name", "-- !!"), TextMatch::Nothing);
    }
}
