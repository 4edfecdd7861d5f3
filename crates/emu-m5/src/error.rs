//! Initialisation errors.
//!
//! Paging itself has no runtime failure: every port value and every slot
//! combination has a defined result. Only building a machine can fail.

use std::error::Error;
use std::fmt;

use crate::config::ExpansionVariant;

/// Error raised while configuring the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The expansion variant name is not one we know.
    UnknownVariant(String),
    /// A ROM image is larger than the space reserved for it.
    RomTooLarge {
        what: &'static str,
        len: usize,
        max: usize,
    },
    /// The JSON configuration could not be parsed.
    Parse(String),
    /// A snapshot was taken under a different expansion variant.
    SnapshotVariant {
        expected: ExpansionVariant,
        found: ExpansionVariant,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariant(name) => write!(f, "Unknown expansion variant: {name}"),
            Self::RomTooLarge { what, len, max } => {
                write!(f, "{what} is {len} bytes, at most {max} allowed")
            }
            Self::Parse(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::SnapshotVariant { expected, found } => write!(
                f,
                "Snapshot was taken with {found}, machine is configured for {expected}"
            ),
        }
    }
}

impl Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
