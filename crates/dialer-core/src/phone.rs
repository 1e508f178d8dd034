//! Phone suffix normalization, validation, and display.
//!
//! The operator only keys in the last eight digits of a mobile number. The
//! full number is always [`PHONE_PREFIX`] followed by the suffix. Lookups use
//! the full number; the socket only ever receives the bare suffix.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed carrier prefix prepended to every suffix.
pub const PHONE_PREFIX: &str = "010";

/// Number of digits the operator enters.
pub const SUFFIX_LEN: usize = 8;

/// Reasons a raw input cannot become a [`PhoneSuffix`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    /// Fewer than [`SUFFIX_LEN`] digits remained after stripping.
    #[error("expected {SUFFIX_LEN} digits, got {0}")]
    TooShort(usize),
    /// More than [`SUFFIX_LEN`] digits remained after stripping.
    #[error("expected {SUFFIX_LEN} digits, got {0}")]
    TooLong(usize),
}

/// Exactly eight ASCII digits: the last eight digits of a phone number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneSuffix(String);

impl PhoneSuffix {
    /// Normalize raw input and validate it.
    ///
    /// Every character that is not `0`–`9` is dropped first, so
    /// `"1234-5678"` and `" 1234 5678 "` are accepted. Anything other than
    /// exactly eight remaining digits is rejected; input is never truncated.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match digits.len() {
            SUFFIX_LEN => Ok(Self(digits)),
            n if n < SUFFIX_LEN => Err(PhoneError::TooShort(n)),
            n => Err(PhoneError::TooLong(n)),
        }
    }

    /// The eight digits, as sent over the socket.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full 11-digit number used as the subscriber lookup key.
    pub fn full_number(&self) -> String {
        format!("{PHONE_PREFIX}{}", self.0)
    }
}

impl TryFrom<String> for PhoneSuffix {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneSuffix> for String {
    fn from(value: PhoneSuffix) -> Self {
        value.0
    }
}

impl fmt::Display for PhoneSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_partial(&self.0))
    }
}

/// Render in-progress keypad input as `010 - xxxx - xxxx`.
///
/// Only the first [`SUFFIX_LEN`] digits are shown; non-digits are ignored.
pub fn format_partial(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(SUFFIX_LEN)
        .collect();
    let (head, tail) = digits.split_at(digits.len().min(SUFFIX_LEN / 2));
    let head: String = head.iter().collect();
    let tail: String = tail.iter().collect();

    match (head.is_empty(), tail.is_empty()) {
        (true, _) => format!("{PHONE_PREFIX} - "),
        (false, true) => format!("{PHONE_PREFIX} - {head}"),
        (false, false) => format!("{PHONE_PREFIX} - {head} - {tail}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
