use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub accent_dim: String,
    pub card_bg: String,
    pub card_expanded_bg: String,
    pub border: String,
    pub border_focused: String,
    pub input_bg: String,
    pub cursor_bg: String,
    pub cursor_fg: String,
    pub handle: String,
    pub delete: String,
    pub nav_bg: String,
    pub nav_active: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// User themes in `<config_dir>/liftdeck/themes/` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("liftdeck")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => tracing::warn!(%e, name, "ignoring invalid user theme"),
                }
            }
        }

        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("sky").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#0f172a".to_string(),
            fg: "#e2e8f0".to_string(),
            muted: "#64748b".to_string(),
            accent: "#38bdf8".to_string(),
            accent_dim: "#0c4a6e".to_string(),
            card_bg: "#1e293b".to_string(),
            card_expanded_bg: "#172554".to_string(),
            border: "#334155".to_string(),
            border_focused: "#38bdf8".to_string(),
            input_bg: "#020617".to_string(),
            cursor_bg: "#e2e8f0".to_string(),
            cursor_fg: "#0f172a".to_string(),
            handle: "#94a3b8".to_string(),
            delete: "#f87171".to_string(),
            nav_bg: "#1e293b".to_string(),
            nav_active: "#38bdf8".to_string(),
            error: "#f87171".to_string(),
            warning: "#fbbf24".to_string(),
            success: "#4ade80".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn card_bg(&self) -> Color { Self::parse_color(&self.card_bg) }
    pub fn card_expanded_bg(&self) -> Color { Self::parse_color(&self.card_expanded_bg) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn input_bg(&self) -> Color { Self::parse_color(&self.input_bg) }
    pub fn cursor_bg(&self) -> Color { Self::parse_color(&self.cursor_bg) }
    pub fn cursor_fg(&self) -> Color { Self::parse_color(&self.cursor_fg) }
    pub fn handle(&self) -> Color { Self::parse_color(&self.handle) }
    pub fn delete(&self) -> Color { Self::parse_color(&self.delete) }
    pub fn nav_bg(&self) -> Color { Self::parse_color(&self.nav_bg) }
    pub fn nav_active(&self) -> Color { Self::parse_color(&self.nav_active) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}
