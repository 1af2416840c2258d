//! Self-service portal access definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Reservation;

/// Opaque token granting one-shot self-service access to a [`Reservation`].
///
/// Issued on portal reservation creation and consumed when customer details
/// are submitted. A consumed [`Token`] never resolves to a [`Reservation`]
/// again.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Token(String);

impl Token {
    /// Generates a new unguessable [`Token`].
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Creates a new [`Token`] if the given `token` is valid.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        Self::check(&token).then_some(Self(token))
    }

    /// Checks whether the given `token` is a valid [`Token`].
    fn check(token: impl AsRef<str>) -> bool {
        let token = token.as_ref();
        !token.is_empty()
            && token.len() <= 64
            && token.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl FromStr for Token {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Token`")
    }
}

#[cfg(test)]
mod spec {
    use super::Token;

    #[test]
    fn generated_tokens_are_unique_and_parseable() {
        let first = Token::generate();
        let second = Token::generate();

        assert_ne!(first, second);
        let raw: &str = first.as_ref();
        assert_eq!(Token::new(raw), Some(first.clone()));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(Token::new(""), None);
        assert_eq!(Token::new("with spaces"), None);
        assert_eq!(Token::new("a".repeat(65)), None);
    }
}
