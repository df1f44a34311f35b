use serde::{Deserialize, Serialize};

use pixelquest_core::geometry::Rect;

use crate::config::{PhysicsConfig, PlayerConfig};
use crate::level_gen::{Platform, PlatformKind};

/// Player width for AABB collision.
pub const PLAYER_WIDTH: f32 = 40.0;
/// Player height for AABB collision.
pub const PLAYER_HEIGHT: f32 = 60.0;

/// The single player of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub on_ground: bool,
    pub health: u8,
    pub lives: u8,
    pub score: u32,
    /// Ticks of damage immunity remaining.
    pub invincibility: u32,
}

impl PlayerState {
    pub fn new(cfg: &PlayerConfig) -> Self {
        Self {
            x: cfg.spawn_x,
            y: 0.0,
            vy: 0.0,
            on_ground: false,
            health: cfg.max_health,
            lives: cfg.lives,
            score: 0,
            invincibility: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0
    }

    pub fn tick_invincibility(&mut self) {
        self.invincibility = self.invincibility.saturating_sub(1);
    }

    /// Apply one point of damage unless invincible. Returns whether it landed.
    pub fn take_hit(&mut self, invincibility_ticks: u32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.invincibility = invincibility_ticks;
        true
    }

    pub fn heal(&mut self, cap: u8) {
        self.health = self.health.saturating_add(1).min(cap);
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Teleport to a standing start with no vertical motion.
    pub fn place_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vy = 0.0;
        self.on_ground = false;
    }
}

/// Outcome of [`step_vertical`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalStep {
    /// Player rectangle at `y + vy`, evaluated before landing was resolved.
    /// Contact checks for the rest of the tick use this rectangle.
    pub probe: Rect,
    /// Index of the platform the player came to rest on, if any.
    pub landed_on: Option<usize>,
}

/// Move by `dir * move_speed`, clamped to the screen. The move is dropped if
/// the new rectangle would overlap a ledge.
pub fn move_horizontal(
    player: &mut PlayerState,
    dir: f32,
    platforms: &[Platform],
    physics: &PhysicsConfig,
    screen_width: f32,
) {
    if dir == 0.0 || !dir.is_finite() {
        return;
    }
    let new_x = (player.x + dir * physics.move_speed).clamp(0.0, screen_width - PLAYER_WIDTH);
    let moved = Rect::new(new_x, player.y, PLAYER_WIDTH, PLAYER_HEIGHT);
    let blocked = platforms
        .iter()
        .any(|p| p.kind == PlatformKind::Ledge && moved.overlaps(&p.rect));
    if !blocked {
        player.x = new_x;
    }
}

/// Start a jump if standing on something.
pub fn try_jump(player: &mut PlayerState, physics: &PhysicsConfig) -> bool {
    if !player.on_ground {
        return false;
    }
    player.vy = physics.jump_velocity;
    player.on_ground = false;
    true
}

/// Integrate gravity for one tick and resolve landing.
///
/// Landing is decided on the projected rectangle before the position is
/// committed: a falling player whose feet are no deeper than the landing
/// tolerance below a platform top, and whose projected rectangle overlaps
/// it, is snapped onto it even if the projection passes through.
pub fn step_vertical(
    player: &mut PlayerState,
    platforms: &[Platform],
    physics: &PhysicsConfig,
) -> VerticalStep {
    player.vy = (player.vy + physics.gravity).min(physics.max_fall_speed);
    let feet = player.rect().bottom();
    let probe = player.rect().offset(0.0, player.vy);

    let landed_on = platforms.iter().position(|p| {
        probe.overlaps(&p.rect)
            && player.vy > 0.0
            && feet <= p.rect.top() + physics.landing_tolerance
    });

    match landed_on {
        Some(idx) => {
            player.y = platforms[idx].rect.top() - PLAYER_HEIGHT;
            player.vy = 0.0;
            player.on_ground = true;
        },
        None => {
            player.y = probe.y;
            player.on_ground = false;
        },
    }

    // Ceiling
    if player.y < 0.0 {
        player.y = 0.0;
        player.vy = 0.0;
    }

    VerticalStep { probe, landed_on }
}
