//! Import settings.

use serde::{Deserialize, Serialize};

/// Settings for a CanorusML import.
///
/// Every field has a default, so a host can store partial settings:
/// ```
/// let options = canorusml::ImportOptions::from_json(r#"{ "max_depth": 16 }"#).unwrap();
/// assert!(options.repair_voices);
/// assert_eq!(options.max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Run the post-load repair pass when the document element closes.
    pub repair_voices: bool,
    /// Deepest element nesting accepted before the input is rejected.
    pub max_depth: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            repair_voices: true,
            max_depth: 64,
        }
    }
}

impl ImportOptions {
    /// Load options from a JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(ImportOptions::from_json("{}").unwrap(), ImportOptions::default());
    }

    #[test]
    fn partial_json_overrides_one_field() {
        let options = ImportOptions::from_json(r#"{ "repair_voices": false }"#).unwrap();
        assert!(!options.repair_voices);
        assert_eq!(options.max_depth, 64);
    }
}
