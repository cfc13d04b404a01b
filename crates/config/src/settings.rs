// Application settings
// Loaded from ~/.config/tallygrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Hard cap on the minimum-share threshold, mirrored from the engine's
/// view layer. Settings above it are clamped at load, not rejected.
const MAX_MIN_SHARE_PCT: f64 = 25.0;

/// User-facing defaults for the analytics pipeline. Stored as plain
/// strings/numbers so the settings file stays readable and this crate
/// stays decoupled from engine types; the CLI does the mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default measure for new sheets: "count" or "sum".
    pub default_measure: String,

    /// Default chart kind: "bar", "pie", or "line".
    pub default_chart: String,

    /// Default sort direction: "asc" or "desc".
    pub default_sort: String,

    /// Default top-N cutoff. 0 = unlimited.
    pub default_top_n: usize,

    /// Default minimum-share threshold, percent, clamped to 0-25.
    pub default_min_share_pct: f64,

    /// Default label axis size for comparison mode.
    pub compare_top_n: usize,

    /// Copy the first sheet's role mapping to every sheet instead of
    /// detecting per sheet.
    pub lock_mapping: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_measure: "count".to_string(),
            default_chart: "bar".to_string(),
            default_sort: "desc".to_string(),
            default_top_n: 0,
            default_min_share_pct: 0.0,
            compare_top_n: 10,
            lock_mapping: false,
        }
    }
}

impl Settings {
    /// Settings file path: ~/.config/tallygrid/settings.json
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tallygrid").join("settings.json"))
    }

    /// Load settings, falling back to defaults on any failure
    /// (missing file, unreadable, malformed JSON). Loading never
    /// surfaces an error to the caller.
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load from an explicit path (None on any failure).
    pub fn load_from(path: &PathBuf) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let mut settings: Settings = serde_json::from_str(&content).ok()?;
        settings.clamp();
        Some(settings)
    }

    /// Save to the default location, creating parent directories.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::path().ok_or("no config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    fn clamp(&mut self) {
        self.default_min_share_pct = self.default_min_share_pct.clamp(0.0, MAX_MIN_SHARE_PCT);
    }
}
