//! Round ID generation and management
//!
//! Round IDs identify one playthrough within a session. They are generated
//! randomly and displayed in octal format so the host can read them out
//! without digit confusion.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Minimum value for generated round IDs (in octal: 10000)
const MIN_VALUE: u16 = 0o10_000;
/// Maximum value for generated round IDs (in octal: 100000)
const MAX_VALUE: u16 = 0o100_000;

/// A unique identifier for one round of a session
///
/// IDs are generated within a fixed range so they always display as a
/// 5-digit octal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId(u16);

impl RoundId {
    /// Creates a new random round ID
    pub fn new() -> Self {
        Self(fastrand::u16(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoundId {
    /// Formats the round ID as a 5-digit octal number
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05o}", self.0)
    }
}

impl Serialize for RoundId {
    /// Serializes the round ID as an octal string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoundId {
    /// Deserializes a round ID from an octal string
    fn deserialize<D>(deserializer: D) -> Result<RoundId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RoundId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for RoundId {
    type Err = ParseIntError;

    /// Parses a round ID from an octal string representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string cannot be parsed as a valid
    /// octal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(u16::from_str_radix(s, 8)?))
    }
}
