//! Field validation primitives and error accumulation.
//!
//! # Responsibility
//! - Provide pure predicates for field rules (presence, length, pattern,
//!   URL shape, set uniqueness and size).
//! - Accumulate field-keyed failures without short-circuiting.
//!
//! # Invariants
//! - The first message recorded for a field wins.
//! - Predicates never perform I/O.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use thiserror::Error;
use url::Url;

pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

/// Ten-digit numbers with optional `+`, area-code parentheses and `-`/space
/// separators, e.g. `+501-223-3456`, `(501) 223 3456`.
pub static PHONE_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?\(?[0-9]{3}\)?[\s-]?[0-9]{3}[\s-]?[0-9]{4}$").expect("valid phone regex")
});

/// Field-keyed validation failure returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: BTreeMap<String, String>,
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field} {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Returns the message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Accumulator for field rule failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no rule has failed.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` for `key` unless the key already has one.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    /// Records `message` for `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    /// Converts accumulated failures into a rejection of the whole input.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

pub fn not_empty(value: &str) -> bool {
    !value.is_empty()
}

/// Length is measured in bytes, not characters.
pub fn max_bytes(value: &str, max: usize) -> bool {
    value.len() <= max
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Accepts absolute `http`/`https` URLs that name a host.
pub fn valid_website(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

pub fn len_between<T>(values: &[T], min: usize, max: usize) -> bool {
    (min..=max).contains(&values.len())
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_for_a_key_wins() {
        let mut v = Validator::new();
        v.check(false, "name", "must be provided");
        v.check(false, "name", "must not be more than 200 bytes long");

        let err = v.into_result().expect_err("failed checks must reject");
        assert_eq!(err.field("name"), Some("must be provided"));
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn passing_checks_leave_validator_valid() {
        let mut v = Validator::new();
        v.check(true, "name", "must be provided");
        assert!(v.valid());
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn email_pattern_accepts_common_addresses() {
        assert!(matches("info@school.edu.bz", &EMAIL_RX));
        assert!(matches("first.last+tag@example.com", &EMAIL_RX));
        assert!(!matches("not-an-email", &EMAIL_RX));
        assert!(!matches("a@-bad.com", &EMAIL_RX));
    }

    #[test]
    fn phone_pattern_accepts_separated_numbers() {
        assert!(matches("+501-223-3456", &PHONE_RX));
        assert!(matches("(501) 223 3456", &PHONE_RX));
        assert!(matches("5012233456", &PHONE_RX));
        assert!(!matches("223-34", &PHONE_RX));
        assert!(!matches("phone", &PHONE_RX));
    }

    #[test]
    fn website_requires_http_scheme_and_host() {
        assert!(valid_website("https://ub.edu.bz"));
        assert!(valid_website("http://example.com/path?q=1"));
        assert!(!valid_website("ub.edu.bz"));
        assert!(!valid_website("ftp://example.com"));
        assert!(!valid_website("https://"));
    }

    #[test]
    fn set_helpers_check_uniqueness_and_size() {
        assert!(unique(&["online", "in-person"]));
        assert!(!unique(&["online", "online"]));
        assert!(len_between(&["a"], 1, 5));
        assert!(!len_between::<&str>(&[], 1, 5));
        assert!(!len_between(&["a", "b", "c", "d", "e", "f"], 1, 5));
    }

    #[test]
    fn display_lists_every_field() {
        let mut v = Validator::new();
        v.add_error("email", "must be provided");
        v.add_error("mode", "must not contain duplicate entries");
        let text = v.into_result().unwrap_err().to_string();
        assert!(text.contains("email must be provided"));
        assert!(text.contains("mode must not contain duplicate entries"));
    }
}
