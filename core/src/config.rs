//! Engine configuration, loaded from a JSON file when one is supplied.
//! Every field has a default so a missing or partial file is fine.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Currency assumed when a transaction request carries none.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Prefix of generated transaction references ("TXN-YYYYMMDD-NNNNNN").
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// Minimum zero-padded width of the reference sequence part.
    #[serde(default = "default_reference_pad")]
    pub reference_pad: usize,

    /// Hard cap on a single client-listing page.
    #[serde(default = "default_page_cap")]
    pub page_cap: i64,
}

fn default_currency() -> String {
    "XAF".to_string()
}

fn default_reference_prefix() -> String {
    "TXN".to_string()
}

fn default_reference_pad() -> usize {
    6
}

fn default_page_cap() -> i64 {
    200
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            reference_prefix: default_reference_prefix(),
            reference_pad: default_reference_pad(),
            page_cap: default_page_cap(),
        }
    }
}

impl LedgerConfig {
    pub fn from_path(path: &Path) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_str(&text)?)
    }
}
