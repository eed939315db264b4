//! Account identity model.
//!
//! # Responsibility
//! - Parse and normalize caller/owner identities.
//!
//! # Invariants
//! - Stored form is `0x` followed by 40 lowercase hex digits.
//! - The all-zero address is never a valid identity; it is reserved as the
//!   "no owner" value of absent records.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_HEX_LEN: usize = 40;

/// Normalized account identity used as caller and task owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parses an account address, accepting any hex-digit case.
    ///
    /// # Errors
    /// - Returns `AccountIdError` when input is empty, lacks the `0x` prefix,
    ///   has the wrong length, contains non-hex digits, or is the zero address.
    pub fn parse(value: &str) -> Result<Self, AccountIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AccountIdError::Empty);
        }

        let digits = trimmed
            .strip_prefix(ADDRESS_PREFIX)
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AccountIdError::MissingPrefix(trimmed.to_string()))?;

        if digits.len() != ADDRESS_HEX_LEN {
            return Err(AccountIdError::InvalidLength {
                expected: ADDRESS_HEX_LEN,
                actual: digits.len(),
            });
        }

        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(AccountIdError::InvalidHex(trimmed.to_string()));
        }

        if digits.chars().all(|ch| ch == '0') {
            return Err(AccountIdError::ZeroAddress);
        }

        Ok(Self(format!("{ADDRESS_PREFIX}{}", digits.to_ascii_lowercase())))
    }

    /// Returns the normalized lowercase address string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

/// Account identity parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    Empty,
    MissingPrefix(String),
    InvalidLength { expected: usize, actual: usize },
    InvalidHex(String),
    ZeroAddress,
}

impl Display for AccountIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "account address must not be empty"),
            Self::MissingPrefix(value) => {
                write!(f, "account address must start with `0x`: {value}")
            }
            Self::InvalidLength { expected, actual } => write!(
                f,
                "account address must have {expected} hex digits, got {actual}"
            ),
            Self::InvalidHex(value) => {
                write!(f, "account address contains non-hex characters: {value}")
            }
            Self::ZeroAddress => write!(f, "the zero address is not a valid account"),
        }
    }
}

impl Error for AccountIdError {}

#[cfg(test)]
mod tests {
    use super::{AccountId, AccountIdError};

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let account = AccountId::parse("  0xABCDEF0123456789abcdef0123456789ABCDEF01 ")
            .expect("mixed case address should parse");
        assert_eq!(
            account.as_str(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn parse_accepts_uppercase_prefix() {
        let account = AccountId::parse("0X00000000000000000000000000000000000000aa")
            .expect("uppercase prefix should parse");
        assert!(account.as_str().starts_with("0x"));
    }

    #[test]
    fn equal_addresses_compare_equal_regardless_of_case() {
        let lower = AccountId::parse("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        let upper = AccountId::parse("0xABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn parse_rejects_malformed_values() {
        assert_eq!(AccountId::parse("   "), Err(AccountIdError::Empty));
        assert!(matches!(
            AccountId::parse("abcdef0123456789abcdef0123456789abcdef01"),
            Err(AccountIdError::MissingPrefix(_))
        ));
        assert_eq!(
            AccountId::parse("0x1234"),
            Err(AccountIdError::InvalidLength {
                expected: 40,
                actual: 4
            })
        );
        assert!(matches!(
            AccountId::parse("0xzzzdef0123456789abcdef0123456789abcdef01"),
            Err(AccountIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn parse_rejects_zero_address() {
        let err = AccountId::parse("0x0000000000000000000000000000000000000000")
            .expect_err("zero address must be rejected");
        assert_eq!(err, AccountIdError::ZeroAddress);
    }
}
