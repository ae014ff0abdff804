//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an [`Email`] can fail to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing left after trimming whitespace.
    #[error("email is required")]
    Empty,
    /// Longer than the SMTP path limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Missing the `@` separator, or has more than one.
    #[error("email must contain exactly one @ symbol")]
    BadSeparator,
    /// The mailbox (before `@`) is empty.
    #[error("email is missing the part before @")]
    EmptyMailbox,
    /// The domain (after `@`) is empty.
    #[error("email is missing the domain after @")]
    EmptyDomain,
    /// Contains whitespace inside the address.
    #[error("email must not contain whitespace")]
    Whitespace,
}

/// A syntactically plausible email address.
///
/// The client only checks shape before sending credentials or profile
/// changes to the backend; the backend decides whether the address exists.
/// Surrounding whitespace is trimmed, case is preserved.
///
/// ```
/// use cartwheel_core::Email;
///
/// let email = Email::parse("  shopper@example.com ").unwrap();
/// assert_eq!(email.as_str(), "shopper@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// assert!(Email::parse("no at sign").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an address (RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and trim an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (mailbox, domain) = s.split_once('@').ok_or(EmailError::BadSeparator)?;
        if domain.contains('@') {
            return Err(EmailError::BadSeparator);
        }
        if mailbox.is_empty() {
            return Err(EmailError::EmptyMailbox);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for ok in [
            "user@example.com",
            "first.last+tag@shop.example.co.uk",
            "a@b",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let email = Email::parse("\tadmin@store.test \n").unwrap();
        assert_eq!(email.as_str(), "admin@store.test");
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_rejects_separator_problems() {
        assert_eq!(Email::parse("nobody"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("@shop.test"), Err(EmailError::EmptyMailbox));
        assert_eq!(Email::parse("user@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_rejects_inner_whitespace() {
        assert_eq!(Email::parse("us er@shop.test"), Err(EmailError::Whitespace));
    }

    #[test]
    fn test_rejects_overlong() {
        let long = format!("{}@shop.test", "x".repeat(Email::MAX_LENGTH));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email: Email = "user@shop.test".parse().unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"user@shop.test\"");
    }
}
