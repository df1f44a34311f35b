use serde::{Deserialize, Serialize};

use pixelquest_core::error::{GameError, Result};

/// Highest health the HUD can show.
pub const HEALTH_CAP: u8 = 3;

/// Smallest screen edge every level layout and boss arena fits in.
pub const MIN_SCREEN_SIZE: f32 = 300.0;

/// Playfield size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Per-tick physics tunables. Units are pixels and ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Negative: y grows downward.
    pub jump_velocity: f32,
    pub move_speed: f32,
    /// How far below a platform top the player's feet may sit and still land.
    pub landing_tolerance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            max_fall_speed: 20.0,
            jump_velocity: -15.0,
            move_speed: 5.0,
            landing_tolerance: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u8,
    pub lives: u8,
    pub invincibility_ticks: u32,
    pub stomp_score: u32,
    pub powerup_score: u32,
    /// Horizontal respawn position.
    pub spawn_x: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: HEALTH_CAP,
            lives: 3,
            invincibility_ticks: 60,
            stomp_score: 100,
            powerup_score: 50,
            spawn_x: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// World bosses have `kamek_base_health + world` health.
    pub kamek_base_health: u32,
    pub final_boss_health: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            kamek_base_health: 4,
            final_boss_health: 10,
        }
    }
}

/// Banner durations (ticks) and the overworld walk speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub level_complete_ticks: u32,
    pub boss_defeated_ticks: u32,
    pub game_over_ticks: u32,
    pub campaign_won_ticks: u32,
    /// Fraction of an edge the map marker covers per tick.
    pub walk_step: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            level_complete_ticks: 60,
            boss_defeated_ticks: 120,
            game_over_ticks: 120,
            campaign_won_ticks: 180,
            walk_step: 0.02,
        }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub screen: ScreenConfig,
    pub tick_rate_hz: f32,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub boss: BossConfig,
    pub timing: TimingConfig,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            tick_rate_hz: 60.0,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            boss: BossConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("PIXELQUEST_CONFIG")
            .unwrap_or_else(|_| "config/pixelquest.toml".to_string());
        Self::load_from(&path)
    }

    /// Load `path`, falling back to defaults like [`PlatformerConfig::load`].
    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {path}");
                    config
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PlatformerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                PlatformerConfig::default()
            },
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GameError::Configuration(e.to_string()))
    }

    /// Reject tunables the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let checks: [(bool, &str); 10] = [
            (
                self.screen.width >= MIN_SCREEN_SIZE && self.screen.height >= MIN_SCREEN_SIZE,
                "screen must be at least 300x300",
            ),
            (self.tick_rate_hz > 0.0, "tick_rate_hz must be positive"),
            (self.physics.gravity > 0.0, "gravity must be positive"),
            (
                self.physics.max_fall_speed > 0.0,
                "max_fall_speed must be positive",
            ),
            (
                self.physics.jump_velocity < 0.0,
                "jump_velocity must be negative (upward)",
            ),
            (self.physics.move_speed > 0.0, "move_speed must be positive"),
            (
                (1..=HEALTH_CAP).contains(&self.player.max_health),
                "max_health must be between 1 and 3",
            ),
            (self.player.lives > 0, "lives must be at least 1"),
            (
                self.boss.final_boss_health > 0,
                "final_boss_health must be at least 1",
            ),
            (
                self.timing.walk_step > 0.0 && self.timing.walk_step <= 1.0,
                "walk_step must be in (0, 1]",
            ),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(GameError::Configuration((*msg).to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PlatformerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.screen.width, 800.0);
        assert_eq!(cfg.screen.height, 600.0);
        assert_eq!(cfg.tick_rate_hz, 60.0);
        assert_eq!(cfg.physics.jump_velocity, -15.0);
        assert_eq!(cfg.player.invincibility_ticks, 60);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = PlatformerConfig::from_toml(
            r#"
            [physics]
            gravity = 1.2

            [timing]
            game_over_ticks = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.physics.gravity, 1.2);
        assert_eq!(cfg.physics.move_speed, 5.0);
        assert_eq!(cfg.timing.game_over_ticks, 30);
        assert_eq!(cfg.timing.campaign_won_ticks, 180);
    }

    #[test]
    fn malformed_toml_is_configuration_error() {
        let err = PlatformerConfig::from_toml("physics = [").unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)));
    }

    #[test]
    fn downward_jump_rejected() {
        let mut cfg = PlatformerConfig::default();
        cfg.physics.jump_velocity = 15.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("jump_velocity"));
    }

    #[test]
    fn health_above_hud_cap_rejected() {
        let mut cfg = PlatformerConfig::default();
        cfg.player.max_health = 4;
        assert!(cfg.validate().is_err());
        cfg.player.max_health = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = PlatformerConfig::load_from("no/such/pixelquest.toml");
        assert_eq!(cfg.tick_rate_hz, 60.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn shipped_sample_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../config/pixelquest.toml");
        assert_eq!(PlatformerConfig::load_from(path), PlatformerConfig::default());
    }

    #[test]
    fn undersized_screen_rejected() {
        let mut cfg = PlatformerConfig::default();
        cfg.screen.width = 250.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("300x300"));

        cfg.screen.width = MIN_SCREEN_SIZE;
        cfg.screen.height = MIN_SCREEN_SIZE - 1.0;
        assert!(cfg.validate().is_err());

        cfg.screen.height = MIN_SCREEN_SIZE;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_tick_rate_rejected() {
        let cfg = PlatformerConfig {
            tick_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
