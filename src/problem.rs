//! Problem-file loading: a JSON document holding the cake size and each
//! agent's segment list, in the same wire shape the original service spoke.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::segment::Preferences;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "cakeSize")]
    pub cake_size: f64,
    pub preferences: Preferences,
}

impl Problem {
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            fs::read_to_string(path).map_err(|err| format!("read {}: {err}", path.display()))?;
        serde_json::from_str(&contents).map_err(|err| format!("parse {}: {err}", path.display()))
    }
}
