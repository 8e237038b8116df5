//! Camera identifiers
//!
//! Cameras are addressed as `CCTV{n}` with `n` starting at 1. Grid slot `i`
//! and capture device `i` (in enumeration order) both belong to `CCTV{i+1}`.

use crate::error::CamwallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "CCTV";

/// Stable camera identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CctvId(String);

impl CctvId {
    /// Identifier for grid slot `index`
    pub fn from_slot_index(index: usize) -> Self {
        Self(format!("{}{}", PREFIX, index + 1))
    }

    /// Identifier with the given camera number (`n >= 1`)
    pub fn from_number(number: u32) -> Result<Self, CamwallError> {
        if number == 0 {
            return Err(CamwallError::InvalidCameraId {
                value: format!("{}{}", PREFIX, number),
            });
        }
        Ok(Self(format!("{}{}", PREFIX, number)))
    }

    /// Camera number (`CCTV7` → 7)
    pub fn number(&self) -> u32 {
        // Validated on construction.
        self.0[PREFIX.len()..].parse().unwrap_or(0)
    }

    /// Index of the capture device this camera reads from
    pub fn device_index(&self) -> usize {
        self.number().saturating_sub(1) as usize
    }

    /// Identifier that follows this one when registering a new camera.
    ///
    /// Fails once the camera number space is exhausted.
    pub fn next(&self) -> Result<Self, CamwallError> {
        let number = self
            .number()
            .checked_add(1)
            .ok_or_else(|| CamwallError::InvalidCameraId {
                value: format!("{}{}", PREFIX, u64::from(self.number()) + 1),
            })?;
        Ok(Self(format!("{}{}", PREFIX, number)))
    }

    /// Borrow as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CctvId {
    type Err = CamwallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CamwallError::InvalidCameraId {
            value: s.to_string(),
        };
        let digits = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u32 = digits.parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }
        // Normalize leading zeros so equal numbers compare equal.
        Ok(Self(format!("{}{}", PREFIX, number)))
    }
}

impl TryFrom<String> for CctvId {
    type Error = CamwallError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CctvId> for String {
    fn from(id: CctvId) -> Self {
        id.0
    }
}

impl fmt::Display for CctvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CctvId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier the next registered camera should receive, given the last one
pub fn next_cctv_id(last: Option<&CctvId>) -> Result<CctvId, CamwallError> {
    match last {
        Some(id) => id.next(),
        None => Ok(CctvId::from_slot_index(0)),
    }
}
