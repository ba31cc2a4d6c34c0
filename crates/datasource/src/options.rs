//! Node configuration. All options deserialize from JSON with missing
//! fields taking their defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDiffOptions {
    /// Report reordered items as moves instead of delete plus insert.
    pub find_moves: bool,
}

impl Default for AutoDiffOptions {
    fn default() -> Self {
        Self { find_moves: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffableSectionsOptions {
    /// Emit precise section/item events; otherwise a single `Apply`.
    pub animate_changes: bool,
}

impl Default for DiffableSectionsOptions {
    fn default() -> Self {
        Self {
            animate_changes: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyOptions {
    /// Replace the inner source with delete/insert events; otherwise `Apply`.
    pub animate_changes: bool,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            animate_changes: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let auto: AutoDiffOptions = serde_json::from_str("{}").unwrap();
        assert!(auto.find_moves);
        let proxy: ProxyOptions = serde_json::from_str(r#"{"animate_changes":false}"#).unwrap();
        assert!(!proxy.animate_changes);
        assert_eq!(
            serde_json::from_str::<DiffableSectionsOptions>("{}").unwrap(),
            DiffableSectionsOptions::default()
        );
    }
}
