use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::editor::EditorSettings;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_scroll_margin")]
    pub scroll_margin: u32,
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u32,
}

fn default_user_id() -> String {
    "local".to_string()
}
fn default_display_name() -> String {
    "Athlete".to_string()
}
fn default_theme() -> String {
    "sky".to_string()
}
fn default_animation_ms() -> u64 {
    500
}
fn default_scroll_margin() -> u32 {
    2
}
fn default_scroll_step() -> u32 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            display_name: default_display_name(),
            theme: default_theme(),
            animation_ms: default_animation_ms(),
            scroll_margin: default_scroll_margin(),
            scroll_step: default_scroll_step(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liftdeck")
            .join("config.toml")
    }

    /// Clamp values from hand-edited files into usable ranges.
    pub fn validate(&mut self) {
        if self.user_id.trim().is_empty() {
            self.user_id = default_user_id();
        }
        self.animation_ms = self.animation_ms.min(5_000);
        self.scroll_margin = self.scroll_margin.min(20);
        self.scroll_step = self.scroll_step.clamp(1, 50);
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            animation: Duration::from_millis(self.animation_ms),
            scroll_margin: self.scroll_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.user_id, "local");
        assert_eq!(config.animation_ms, 500);
        assert_eq!(config.scroll_margin, 2);
        assert_eq!(config.theme, "sky");
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
user_id = "alice"
animation_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.animation_ms, 250);
        assert_eq!(config.scroll_step, 3);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.user_id, deserialized.user_id);
        assert_eq!(config.animation_ms, deserialized.animation_ms);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.user_id = "   ".to_string();
        config.animation_ms = 60_000;
        config.scroll_step = 0;
        config.scroll_margin = 500;
        config.validate();
        assert_eq!(config.user_id, "local");
        assert_eq!(config.animation_ms, 5_000);
        assert_eq!(config.scroll_step, 1);
        assert_eq!(config.scroll_margin, 20);
    }

    #[test]
    fn test_editor_settings_follow_config() {
        let mut config = Config::default();
        config.animation_ms = 0;
        let settings = config.editor_settings();
        assert!(settings.animation.is_zero());
        assert_eq!(settings.scroll_margin, 2);
    }
}
