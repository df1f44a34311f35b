pub mod boss;
pub mod config;
pub mod entities;
pub mod level_gen;
pub mod overworld;
pub mod physics;
pub mod stage;

use serde::{Deserialize, Serialize};

use pixelquest_core::error::Result;
use pixelquest_core::events::{GameEvent, NodeId};
use pixelquest_core::game_trait::{Game, GameMetadata};
use pixelquest_core::input::FrameInput;

use config::{PlatformerConfig, TimingConfig};
use overworld::{Heading, Overworld};
use physics::PlayerState;
use stage::{Stage, StageOutcome};

/// Timed message screens shown between modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Banner {
    LevelComplete,
    BossDefeated,
    GameOver,
    CampaignWon,
}

impl Banner {
    pub fn duration(&self, timing: &TimingConfig) -> u32 {
        match self {
            Banner::LevelComplete => timing.level_complete_ticks,
            Banner::BossDefeated => timing.boss_defeated_ticks,
            Banner::GameOver => timing.game_over_ticks,
            Banner::CampaignWon => timing.campaign_won_ticks,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Banner::LevelComplete => "Level Complete!",
            Banner::BossDefeated => "Boss Defeated!",
            Banner::GameOver => "Game Over",
            Banner::CampaignWon => "You saved the kingdom!",
        }
    }
}

/// Top-level game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Overworld,
    Level,
    Boss,
    Banner(Banner),
    Finished,
}

/// A whole campaign: map, player and the stage being played, if any.
pub struct Session {
    config: PlatformerConfig,
    overworld: Overworld,
    player: PlayerState,
    stage: Option<Stage>,
    mode: Mode,
    banner_ticks: u32,
}

impl Session {
    pub fn new(config: PlatformerConfig) -> Self {
        let player = PlayerState::new(&config.player);
        Self {
            config,
            overworld: Overworld::new(),
            player,
            stage: None,
            mode: Mode::Overworld,
            banner_ticks: 0,
        }
    }

    /// Fresh session with the map marker standing on `node`.
    pub fn starting_at(config: PlatformerConfig, node: NodeId) -> Result<Self> {
        let mut session = Self::new(config);
        session.overworld.warp_to(node)?;
        Ok(session)
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn overworld(&self) -> &Overworld {
        &self.overworld
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// Ticks left on the current banner.
    pub fn banner_ticks(&self) -> u32 {
        self.banner_ticks
    }

    /// Frontend quit signal (window closed, Ctrl-C). Ends the session from any mode.
    pub fn quit(&mut self) {
        if self.mode != Mode::Finished {
            tracing::info!(mode = ?self.mode, "Quit requested");
            self.mode = Mode::Finished;
        }
    }

    fn tick_overworld(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        if input.cancel {
            tracing::info!("Leaving the map");
            self.mode = Mode::Finished;
            return vec![GameEvent::QuitRequested];
        }

        let mut events = Vec::new();
        let heading = match (input.left, input.right) {
            (true, false) => Some(Heading::Left),
            (false, true) => Some(Heading::Right),
            _ => None,
        };
        if let Some(heading) = heading {
            let from = self.overworld.current();
            if let Some(to) = self.overworld.step_towards(heading) {
                events.push(GameEvent::TravelStarted { from, to });
            }
        }

        if input.confirm {
            match self.enter_current() {
                Ok(event) => {
                    events.push(event);
                    return events;
                },
                Err(e) => tracing::debug!("Selection rejected: {e}"),
            }
        }

        if let Some(node) = self.overworld.advance_travel(self.config.timing.walk_step) {
            events.push(GameEvent::TravelFinished { node });
        }
        events
    }

    fn enter_current(&mut self) -> Result<GameEvent> {
        let node = self.overworld.enter(self.overworld.current())?;
        let stage = Stage::enter(node, &self.config);
        let event = GameEvent::LevelEntered {
            node: node.id,
            world: node.world,
            boss: node.is_boss,
        };
        tracing::info!(level = %node.level_id, world = node.world, boss = node.is_boss, "Level entered");

        self.player
            .place_at(self.config.player.spawn_x, stage.layout().spawn_y);
        self.player.invincibility = 0;
        self.mode = if stage.boss().is_some() {
            Mode::Boss
        } else {
            Mode::Level
        };
        self.stage = Some(stage);
        Ok(event)
    }

    fn tick_stage(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        let Some(stage) = self.stage.as_mut() else {
            self.mode = Mode::Overworld;
            return Vec::new();
        };
        let node = stage.node();
        let tick = stage.tick(&mut self.player, input, &self.config);
        let mut events = tick.events;

        match tick.outcome {
            None => {},
            Some(StageOutcome::Aborted) => {
                tracing::info!(node, "Level aborted");
                self.stage = None;
                self.mode = Mode::Overworld;
                events.push(GameEvent::LevelAborted { node });
            },
            Some(StageOutcome::Cleared) => {
                self.overworld.complete_current();
                tracing::info!(node, score = self.player.score, "Level completed");
                events.push(GameEvent::LevelCompleted { node });
                self.show_banner(Banner::LevelComplete);
            },
            Some(StageOutcome::BossDefeated) => {
                self.overworld.complete_current();
                tracing::info!(node, score = self.player.score, "Boss defeated");
                events.push(GameEvent::BossDefeated { node });
                if self.overworld.is_terminal(node) {
                    tracing::info!(score = self.player.score, "Campaign won");
                    events.push(GameEvent::CampaignWon {
                        score: self.player.score,
                    });
                    self.show_banner(Banner::CampaignWon);
                } else {
                    self.show_banner(Banner::BossDefeated);
                }
            },
            Some(StageOutcome::Defeated) => {
                tracing::info!(node, score = self.player.score, "Game over");
                events.push(GameEvent::GameOver {
                    score: self.player.score,
                });
                self.show_banner(Banner::GameOver);
            },
        }
        events
    }

    fn show_banner(&mut self, banner: Banner) {
        self.mode = Mode::Banner(banner);
        self.banner_ticks = banner.duration(&self.config.timing).max(1);
    }

    fn tick_banner(&mut self, banner: Banner) -> Vec<GameEvent> {
        self.banner_ticks = self.banner_ticks.saturating_sub(1);
        if self.banner_ticks > 0 {
            return Vec::new();
        }
        self.stage = None;
        match banner {
            Banner::CampaignWon => {
                self.mode = Mode::Finished;
                Vec::new()
            },
            Banner::GameOver => {
                // New run; map progress is kept.
                self.player = PlayerState::new(&self.config.player);
                self.mode = Mode::Overworld;
                vec![GameEvent::ReturnedToMap]
            },
            Banner::LevelComplete | Banner::BossDefeated => {
                self.mode = Mode::Overworld;
                vec![GameEvent::ReturnedToMap]
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PlatformerConfig::default())
    }
}

impl Game for Session {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "PixelQuest".to_string(),
            description: "Cross five worlds and defeat Baby Bowser!".to_string(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn update(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        match self.mode {
            Mode::Overworld => self.tick_overworld(input),
            Mode::Level | Mode::Boss => self.tick_stage(input),
            Mode::Banner(banner) => self.tick_banner(banner),
            Mode::Finished => Vec::new(),
        }
    }

    fn is_finished(&self) -> bool {
        self.mode == Mode::Finished
    }
}
