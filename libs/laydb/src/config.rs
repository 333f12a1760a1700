//! Layout configuration.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::LayoutResult;

/// Settings applied when a [`Layout`](crate::Layout) is created.
///
/// # Example
///
/// ```
/// # use laydb::LayoutConfig;
/// let config = LayoutConfig::from_toml_str("editable = false\ndbu = 0.005").unwrap();
/// assert!(!config.editable);
/// assert_eq!(config.technology, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Whether shape containers support erase, replace and stable handles.
    pub editable: bool,
    /// The database unit in micrometers.
    pub dbu: f64,
    /// The technology the layout is associated with.
    pub technology: Option<ArcStr>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            editable: true,
            dbu: 0.001,
            technology: None,
        }
    }
}

impl LayoutConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> LayoutResult<Self> {
        Ok(toml::from_str(s)?)
    }
}
