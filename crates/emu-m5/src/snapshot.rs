//! Save-state form of the paging controller.
//!
//! Only the selected mode is persisted. The overlay table and cartridge
//! sources are derived state: the table is rebuilt on restore and the
//! sources come from whatever is plugged in at the time.

use serde::{Deserialize, Serialize};

use crate::config::ExpansionVariant;
use crate::error::ConfigError;

/// Paging state captured by [`crate::BankController::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSnapshot {
    pub variant: ExpansionVariant,
    pub mode: u8,
}

impl PagingSnapshot {
    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot written by [`Self::to_json`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
