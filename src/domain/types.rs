//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (positive identifiers, sanitized
//! usernames, well-formed uuids and tokens) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::game::config::DEFAULT_PLAYER_NAME;

/// Longest username accepted, in characters.
pub const USERNAME_MAX_CHARS: usize = 50;
/// Length of an authentication token in hex characters.
pub const AUTH_TOKEN_LEN: usize = 64;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided string exceeded the allowed length.
    #[error("value must be at most {0} characters")]
    TooLong(usize),
    /// Provided uuid failed format validation.
    #[error("invalid uuid value")]
    InvalidUuid,
    /// Provided token is not 64 hex characters.
    #[error("invalid session token")]
    InvalidToken,
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(UserId, "Unique identifier for a player account.");
id_newtype!(RoundId, "Unique identifier for a persisted round.");
id_newtype!(AuthSessionId, "Unique identifier for an authentication session.");

/// Public, client-visible player identifier (hyphenated lower-case uuid).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlayerUuid(String);

impl PlayerUuid {
    /// Parses and normalizes a uuid string.
    pub fn new<S: AsRef<str>>(value: S) -> Result<Self, TypeConstraintError> {
        let parsed =
            Uuid::parse_str(value.as_ref().trim()).map_err(|_| TypeConstraintError::InvalidUuid)?;
        Ok(Self(parsed.hyphenated().to_string()))
    }

    /// Generates a fresh random uuid.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PlayerUuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PlayerUuid {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PlayerUuid {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerUuid> for String {
    fn from(value: PlayerUuid) -> Self {
        value.0
    }
}

/// Display name shown to other players: sanitized, trimmed, non-empty and at
/// most [`USERNAME_MAX_CHARS`] characters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    /// Constructs a sanitized, trimmed, non-empty value.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let sanitized = ammonia::clean(value.into().trim());
        let trimmed = sanitized.trim();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        if trimmed.chars().count() > USERNAME_MAX_CHARS {
            return Err(TypeConstraintError::TooLong(USERNAME_MAX_CHARS));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for Username {
    fn default() -> Self {
        Self(DEFAULT_PLAYER_NAME.to_string())
    }
}

impl Deref for Username {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Username {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Opaque session token stored in the identity cookie.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into();
        let well_formed = value.len() == AUTH_TOKEN_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !well_formed {
            return Err(TypeConstraintError::InvalidToken);
        }
        Ok(Self(value))
    }

    /// 256 random bits rendered as lower-case hex.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
