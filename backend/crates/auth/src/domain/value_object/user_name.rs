//! User Name Value Object
//!
//! The public login handle of a collaborator account. Case-insensitive for
//! lookup: the canonical form (NFKC, trimmed, lowercase) is the uniqueness
//! key, while the original casing is preserved for display.
//!
//! Invariants (after normalization):
//! - length 3..=30 characters
//! - ASCII lowercase letters, digits and `_ . - +` only
//! - starts and ends with a letter, digit or `_`
//! - no consecutive dots, no whitespace

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for a username (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for a username (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Allowed special characters in a username
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-', '+'];

/// Error returned when username validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    InvalidStart { char: char },
    InvalidEnd { char: char },
    ConsecutiveDots,
    ContainsWhitespace,
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "Username is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "Username is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., -, + are allowed"
                )
            }
            Self::InvalidStart { char } => {
                write!(
                    f,
                    "Username cannot start with '{char}'. Must start with a-z, 0-9, or _"
                )
            }
            Self::InvalidEnd { char } => {
                write!(
                    f,
                    "Username cannot end with '{char}'. Must end with a-z, 0-9, or _"
                )
            }
            Self::ConsecutiveDots => {
                write!(f, "Username cannot contain consecutive dots (..)")
            }
            Self::ContainsWhitespace => {
                write!(f, "Username cannot contain whitespace")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized username
///
/// # Storage
/// - `original`: the user's input (trimmed, NFKC normalized, case kept)
/// - `canonical`: lowercase form used for uniqueness and lookups
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input.
    ///
    /// Applies normalization (NFKC, trim) and validates the canonical form.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize_original(input.as_ref());
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Canonical form of arbitrary input, without validation.
    ///
    /// Login lookups use this so that `Admin` and `admin` resolve to the
    /// same stored account.
    pub fn canonicalize(input: &str) -> String {
        Self::normalize_original(input).to_lowercase()
    }

    /// Get the original username (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Get the canonical (normalized, lowercase) username
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// Normalize input string (trim and NFKC, preserve case)
    fn normalize_original(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if canonical.chars().any(|c| c.is_whitespace()) {
            return Err(UserNameError::ContainsWhitespace);
        }

        for (pos, ch) in canonical.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: pos,
                });
            }
        }

        let first_char = canonical.chars().next().unwrap();
        if !Self::is_valid_start_end_char(first_char) {
            return Err(UserNameError::InvalidStart { char: first_char });
        }

        let last_char = canonical.chars().next_back().unwrap();
        if !Self::is_valid_start_end_char(last_char) {
            return Err(UserNameError::InvalidEnd { char: last_char });
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }

    #[inline]
    fn is_valid_start_end_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.original)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_names() {
        assert!(UserName::new("admin").is_ok());
        assert!(UserName::new("maria.silva").is_ok());
        assert!(UserName::new("user_42").is_ok());
        assert!(UserName::new("jo-ao").is_ok());
    }

    #[test]
    fn test_case_insensitive_canonical() {
        let name = UserName::new("Admin").unwrap();
        assert_eq!(name.original(), "Admin");
        assert_eq!(name.canonical(), "admin");
        assert_eq!(UserName::canonicalize("  ADMIN "), "admin");
    }

    #[test]
    fn test_length_limits() {
        assert!(matches!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { .. })
        ));
        assert!(matches!(
            UserName::new("a".repeat(31)),
            Err(UserNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("user name"),
            Err(UserNameError::ContainsWhitespace)
        ));
        assert!(matches!(
            UserName::new("usu@rio"),
            Err(UserNameError::InvalidCharacter { .. })
        ));
        assert!(matches!(
            UserName::new("a..b"),
            Err(UserNameError::ConsecutiveDots)
        ));
        assert!(matches!(
            UserName::new(".abc"),
            Err(UserNameError::InvalidStart { .. })
        ));
        assert!(matches!(
            UserName::new("abc."),
            Err(UserNameError::InvalidEnd { .. })
        ));
    }

    #[test]
    fn test_from_db_preserves_case() {
        let name = UserName::from_db("Maria");
        assert_eq!(name.original(), "Maria");
        assert_eq!(name.canonical(), "maria");
    }
}
