//! License key grammar.
//!
//! Keys are four dash-separated segments:
//!
//! - Tiered: `THYME-{TRIL|PREM}-XXXX-CCCC`
//! - Legacy: `THYME-XXXX-YYYY-CCCC`
//!
//! where every segment after the product tag is exactly four characters from
//! `[A-Z0-9]` and `CCCC` is the checksum. Parsing only checks the grammar;
//! checksum verification lives in [`crate::checksum`].

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed product tag that opens every key.
pub const PRODUCT_TAG: &str = "THYME";

/// Length of every segment after the product tag.
pub const SEGMENT_LEN: usize = 4;

/// Kind tag carried by tiered keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// `TRIL`: time-limited trial.
    Trial,
    /// `PREM`: paid premium license.
    Premium,
}

impl KeyKind {
    /// Returns the four-character tag used in the key string.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Trial => "TRIL",
            Self::Premium => "PREM",
        }
    }

    /// Looks up a kind from its key tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TRIL" => Some(Self::Trial),
            "PREM" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// The payload layout of a parsed key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyBody {
    /// `THYME-{kind}-{payload}-{checksum}`.
    Tiered { kind: KeyKind, payload: String },
    /// `THYME-{part1}-{part2}-{checksum}`.
    Legacy { part1: String, part2: String },
}

/// A well-formed license key. Well-formed does not mean valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LicenseKey {
    body: KeyBody,
    checksum: String,
}

impl LicenseKey {
    /// Prepares user input for [`LicenseKey::parse`]: trims surrounding
    /// whitespace and uppercases ASCII letters.
    #[must_use]
    pub fn normalize(input: &str) -> String {
        input.trim().to_ascii_uppercase()
    }

    /// Parses a key string against the tiered grammar first, then the
    /// legacy grammar. Parsing is case-sensitive; see [`Self::normalize`].
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedKey`] if the string matches neither.
    pub fn parse(text: &str) -> LicenseResult<Self> {
        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() != 4 {
            return Err(LicenseError::MalformedKey(format!(
                "expected 4 segments, found {}",
                parts.len()
            )));
        }

        if parts[0] != PRODUCT_TAG {
            return Err(LicenseError::MalformedKey(format!(
                "key must start with {PRODUCT_TAG}"
            )));
        }

        for (idx, part) in parts.iter().enumerate().skip(1) {
            if !is_segment(part) {
                return Err(LicenseError::MalformedKey(format!(
                    "segment {idx} must be {SEGMENT_LEN} characters of A-Z or 0-9"
                )));
            }
        }

        let body = match KeyKind::from_tag(parts[1]) {
            Some(kind) => KeyBody::Tiered {
                kind,
                payload: parts[2].to_string(),
            },
            None => KeyBody::Legacy {
                part1: parts[1].to_string(),
                part2: parts[2].to_string(),
            },
        };

        Ok(Self {
            body,
            checksum: parts[3].to_string(),
        })
    }

    /// Assembles a key from its parts. The caller supplies the checksum.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedKey`] if any segment is outside the
    /// grammar.
    pub fn from_parts(body: KeyBody, checksum: &str) -> LicenseResult<Self> {
        // Round-trip through the parser so both constructors share one grammar.
        Self::parse(&Self::assemble(body, checksum.to_string()).to_string())
    }

    /// Builds a key from segments already known to be in the alphabet.
    pub(crate) fn assemble(body: KeyBody, checksum: String) -> Self {
        Self { body, checksum }
    }

    /// Returns the key body.
    #[must_use]
    pub fn body(&self) -> &KeyBody {
        &self.body
    }

    /// Returns the kind tag, or `None` for legacy keys.
    #[must_use]
    pub fn kind(&self) -> Option<KeyKind> {
        match &self.body {
            KeyBody::Tiered { kind, .. } => Some(*kind),
            KeyBody::Legacy { .. } => None,
        }
    }

    /// Returns true for keys in the legacy four-segment layout.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self.body, KeyBody::Legacy { .. })
    }

    /// The segments covered by the checksum, in hashing order.
    #[must_use]
    pub fn checksum_input(&self) -> Vec<&str> {
        match &self.body {
            KeyBody::Tiered { payload, .. } => vec![payload.as_str()],
            KeyBody::Legacy { part1, part2 } => vec![part1.as_str(), part2.as_str()],
        }
    }

    /// Returns the checksum segment as written in the key.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            KeyBody::Tiered { kind, payload } => write!(
                f,
                "{PRODUCT_TAG}-{}-{payload}-{}",
                kind.tag(),
                self.checksum
            ),
            KeyBody::Legacy { part1, part2 } => {
                write!(f, "{PRODUCT_TAG}-{part1}-{part2}-{}", self.checksum)
            }
        }
    }
}

impl FromStr for LicenseKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_segment(part: &str) -> bool {
    part.len() == SEGMENT_LEN
        && part
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiered_key_takes_precedence_over_legacy() {
        let key = LicenseKey::parse("THYME-TRIL-7QX3-3322").unwrap();
        assert_eq!(key.kind(), Some(KeyKind::Trial));
        assert_eq!(key.checksum_input(), vec!["7QX3"]);
    }

    #[test]
    fn legacy_key_hashes_both_parts() {
        let key = LicenseKey::parse("THYME-AB12-CD34-A00D").unwrap();
        assert!(key.is_legacy());
        assert_eq!(key.checksum_input(), vec!["AB12", "CD34"]);
    }

    #[test]
    fn empty_segment_rejected() {
        assert!(LicenseKey::parse("THYME--AB12-BA54").is_err());
        assert!(LicenseKey::parse("THYME-PREM-AB12-").is_err());
    }

    #[test]
    fn multibyte_segment_rejected() {
        // Four bytes but not four ASCII characters.
        assert!(LicenseKey::parse("THYME-PREM-ÄB1-BA54").is_err());
    }
}
