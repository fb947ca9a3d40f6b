//! VOICEPEAK narrator lookup.
//!
//! Short keys like `f1` or `c` map to the narrator names the synthesis
//! program expects after `--narrator`.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

const DEFAULT_NARRATORS: [(&str, &str); 7] = [
    ("f1", "Japanese Female 1"),
    ("f2", "Japanese Female 2"),
    ("f3", "Japanese Female 3"),
    ("m1", "Japanese Male 1"),
    ("m2", "Japanese Male 2"),
    ("m3", "Japanese Male 3"),
    ("c", "Japanese Female Child"),
];

/// Read-only key → narrator name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarratorTable {
    entries: BTreeMap<String, String>,
}

impl Default for NarratorTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_NARRATORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl NarratorTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Look up the narrator name for `key`. Unknown keys are an error.
    pub fn resolve(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::InvalidNarrator(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}
