//! Engine Configuration
//!
//! Settings that shape how an engine runs without touching its topology.
//! Loadable from JSON so demos can keep them next to their other assets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Name recorded on every update span.
    pub label: Option<String>,

    /// Upper bound on the round count of a single update.
    pub max_rounds: Option<usize>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_max_rounds(mut self, limit: usize) -> Self {
        self.max_rounds = Some(limit);
        self
    }

    /// Parse from a JSON object. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("cascade")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.label(), "cascade");
    }

    #[test]
    fn parses_all_fields() {
        let config = EngineConfig::from_json(r#"{"label": "cube", "max_rounds": 8}"#).unwrap();
        assert_eq!(config, EngineConfig::new().with_label("cube").with_max_rounds(8));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(EngineConfig::from_json(r#"{"rounds": 2}"#).is_err());
    }

    #[test]
    fn json_output_parses_back() {
        let config = EngineConfig::new().with_max_rounds(4);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
