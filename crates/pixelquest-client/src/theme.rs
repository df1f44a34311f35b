use std::path::Path;

use crossterm::style::Color;
use serde::Deserialize;

use pixelquest_core::error::{GameError, Result};

/// Env var naming a theme TOML file.
pub const THEME_ENV: &str = "PIXELQUEST_THEME";

/// A character cell drawn in one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Glyph {
    pub symbol: char,
    pub color: Color,
}

impl Glyph {
    pub const fn new(symbol: char, color: Color) -> Self {
        Self { symbol, color }
    }
}

/// Per-world look of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorldStyle {
    pub sky: Color,
    pub platform: Glyph,
}

static FALLBACK_WORLD: WorldStyle = WorldStyle {
    sky: Color::DarkBlue,
    platform: Glyph::new('=', Color::DarkYellow),
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Index 0 is world 1. Worlds past the end reuse the last entry.
    pub worlds: Vec<WorldStyle>,
    pub lava: Glyph,
    pub player: Glyph,
    pub enemy: Glyph,
    pub power_up: Glyph,
    pub exit: Glyph,
    pub boss: Glyph,
    pub attack: Glyph,
    pub hud: Color,
    pub map_sky: Color,
    pub map_path: Glyph,
    pub node_open: Glyph,
    pub node_done: Glyph,
    pub node_boss: Glyph,
    pub banner_win: Color,
    pub banner_loss: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let grassland = WorldStyle {
            sky: Color::DarkBlue,
            platform: Glyph::new('=', Color::DarkYellow),
        };
        Self {
            worlds: vec![
                grassland,
                grassland,
                grassland,
                WorldStyle {
                    sky: Color::DarkGrey,
                    platform: Glyph::new('#', Color::Grey),
                },
                WorldStyle {
                    sky: Color::White,
                    platform: Glyph::new('=', Color::DarkYellow),
                },
            ],
            lava: Glyph::new('~', Color::Red),
            player: Glyph::new('@', Color::Yellow),
            enemy: Glyph::new('g', Color::DarkRed),
            power_up: Glyph::new('*', Color::Magenta),
            exit: Glyph::new('E', Color::Green),
            boss: Glyph::new('B', Color::Red),
            attack: Glyph::new('o', Color::Magenta),
            hud: Color::White,
            map_sky: Color::DarkBlue,
            map_path: Glyph::new('.', Color::White),
            node_open: Glyph::new('O', Color::Grey),
            node_done: Glyph::new('O', Color::Green),
            node_boss: Glyph::new('O', Color::Red),
            banner_win: Color::DarkGreen,
            banner_loss: Color::DarkRed,
        }
    }
}

impl Theme {
    /// Built-in theme unless `PIXELQUEST_THEME` names a file. A named file that
    /// fails to load is an error, not a silent fallback.
    pub fn load() -> Result<Self> {
        match std::env::var(THEME_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let asset_error = |reason: String| GameError::AssetLoad {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| asset_error(e.to_string()))?;
        let theme = Self::from_toml(&content).map_err(|e| asset_error(e.to_string()))?;
        tracing::info!(path = %path.display(), "Loaded theme");
        Ok(theme)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Style for a 1-based world number.
    pub fn world(&self, world: u8) -> &WorldStyle {
        let index = usize::from(world.saturating_sub(1));
        self.worlds
            .get(index)
            .or(self.worlds.last())
            .unwrap_or(&FALLBACK_WORLD)
    }
}
