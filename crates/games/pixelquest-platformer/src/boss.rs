use rand::Rng;
use serde::{Deserialize, Serialize};

use pixelquest_core::geometry::Rect;

use crate::config::ScreenConfig;

const KAMEK_WIDTH: f32 = 50.0;
const KAMEK_HEIGHT: f32 = 70.0;
const KAMEK_SPEED: f32 = 3.0;
/// Bob centre line and amplitude.
const KAMEK_BOB_BASE: f32 = 100.0;
const KAMEK_BOB_AMPLITUDE: f32 = 50.0;
/// Horizontal distance over which the bob completes one radian.
const KAMEK_BOB_PERIOD: f32 = 20.0;
const KAMEK_EDGE_MARGIN: f32 = 10.0;
const KAMEK_SHOOT_INTERVAL: u32 = 60;
const KAMEK_TELEPORT_INTERVAL: u32 = 300;

const BOWSER_WIDTH: f32 = 60.0;
const BOWSER_HEIGHT: f32 = 80.0;
/// Arena ground height the final boss stands on.
const ARENA_GROUND: f32 = 40.0;
/// Top of the climb in phase 3.
const BOWSER_CEILING: f32 = 100.0;
const SHOCKWAVE_INTERVAL: u32 = 120;
const SHOCKWAVE_GROWTH: f32 = 10.0;
const PHASE2_SHOT_INTERVAL: u32 = 90;
const PHASE3_SHOT_INTERVAL: u32 = 60;

const PROJECTILE_SPEED: f32 = 5.0;

/// World boss: flies a sine path, drops projectiles and teleports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KamekBoss {
    pub rect: Rect,
    pub health: u32,
    pub max_health: u32,
    pub direction: f32,
    shoot_timer: u32,
    teleport_timer: u32,
    pub projectiles: Vec<Rect>,
}

impl KamekBoss {
    pub fn new(max_health: u32, screen: ScreenConfig) -> Self {
        Self {
            rect: Rect::new(screen.width / 2.0, KAMEK_BOB_BASE, KAMEK_WIDTH, KAMEK_HEIGHT),
            health: max_health,
            max_health,
            direction: 1.0,
            shoot_timer: 0,
            teleport_timer: 0,
            projectiles: Vec::new(),
        }
    }

    pub fn update(&mut self, rng: &mut impl Rng, screen: ScreenConfig) {
        self.rect.x += KAMEK_SPEED * self.direction;
        self.rect.y = KAMEK_BOB_BASE + (self.rect.x / KAMEK_BOB_PERIOD).sin() * KAMEK_BOB_AMPLITUDE;
        if self.rect.right() > screen.width - KAMEK_EDGE_MARGIN
            || self.rect.left() < KAMEK_EDGE_MARGIN
        {
            self.direction = -self.direction;
        }

        self.shoot_timer += 1;
        if self.shoot_timer >= KAMEK_SHOOT_INTERVAL {
            self.projectiles
                .push(Rect::new(self.rect.center_x(), self.rect.bottom(), 10.0, 10.0));
            self.shoot_timer = 0;
        }

        self.teleport_timer += 1;
        if self.teleport_timer >= KAMEK_TELEPORT_INTERVAL {
            self.rect.x = rng.random_range(50..=(screen.width as i32 - 100)) as f32;
            self.rect.y = rng.random_range(50..=200) as f32;
            self.teleport_timer = 0;
        }

        for proj in &mut self.projectiles {
            proj.y += PROJECTILE_SPEED;
        }
        self.projectiles.retain(|p| p.y <= screen.height);
    }
}

/// Final boss with three health-gated phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyBowserBoss {
    pub rect: Rect,
    pub health: u32,
    pub max_health: u32,
    /// 1, 2 or 3. Never decreases.
    pub phase: u8,
    attack_timer: u32,
    pub projectiles: Vec<Rect>,
    pub shockwaves: Vec<Rect>,
}

impl BabyBowserBoss {
    pub fn new(max_health: u32, screen: ScreenConfig) -> Self {
        Self {
            rect: Rect::new(
                screen.width / 2.0,
                screen.height - ARENA_GROUND - BOWSER_HEIGHT,
                BOWSER_WIDTH,
                BOWSER_HEIGHT,
            ),
            health: max_health,
            max_health,
            phase: 1,
            attack_timer: 0,
            projectiles: Vec::new(),
            shockwaves: Vec::new(),
        }
    }

    /// Phase 2 at `health <= max * 7 / 10`, phase 3 at `health <= max * 3 / 10`.
    pub fn phase_threshold(&self, phase: u8) -> u32 {
        match phase {
            2 => self.max_health * 7 / 10,
            3 => self.max_health * 3 / 10,
            _ => self.max_health,
        }
    }

    /// Returns the new phase when one was entered this tick.
    pub fn update(&mut self, screen: ScreenConfig) -> Option<u8> {
        self.attack_timer += 1;
        match self.phase {
            1 => {
                if self.attack_timer >= SHOCKWAVE_INTERVAL {
                    // Occupies the bottom 10 px of the body, at standing height.
                    self.shockwaves.push(Rect::new(
                        self.rect.center_x() - 50.0,
                        self.rect.bottom() - 10.0,
                        100.0,
                        10.0,
                    ));
                    self.attack_timer = 0;
                }
            },
            2 => {
                if self.attack_timer >= PHASE2_SHOT_INTERVAL {
                    self.projectiles
                        .push(Rect::new(self.rect.right(), self.rect.center_y(), 20.0, 10.0));
                    self.attack_timer = 0;
                }
            },
            _ => {
                self.rect.y = (self.rect.y - 1.0).max(BOWSER_CEILING);
                if self.attack_timer >= PHASE3_SHOT_INTERVAL {
                    self.projectiles
                        .push(Rect::new(self.rect.center_x(), self.rect.bottom(), 10.0, 10.0));
                    self.attack_timer = 0;
                }
            },
        }

        let entered = if self.phase == 1 && self.health <= self.phase_threshold(2) {
            self.phase = 2;
            self.rect.inflate(20.0, 20.0);
            Some(2)
        } else if self.phase == 2 && self.health <= self.phase_threshold(3) {
            self.phase = 3;
            self.rect.y = BOWSER_CEILING;
            Some(3)
        } else {
            None
        };

        for wave in &mut self.shockwaves {
            wave.inflate(SHOCKWAVE_GROWTH, 0.0);
        }
        self.shockwaves.retain(|w| w.w <= screen.width);
        for proj in &mut self.projectiles {
            proj.x -= PROJECTILE_SPEED;
        }
        self.projectiles.retain(|p| p.x >= 0.0);

        entered
    }
}

/// The two boss variants. Shockwaves only exist for Baby Bowser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Boss {
    Kamek(KamekBoss),
    BabyBowser(BabyBowserBoss),
}

impl Boss {
    pub fn name(&self) -> &'static str {
        match self {
            Boss::Kamek(_) => "Kamek",
            Boss::BabyBowser(_) => "Baby Bowser",
        }
    }

    /// Advance one tick. Returns the phase entered, if any.
    pub fn update(&mut self, rng: &mut impl Rng, screen: ScreenConfig) -> Option<u8> {
        match self {
            Boss::Kamek(k) => {
                k.update(rng, screen);
                None
            },
            Boss::BabyBowser(b) => b.update(screen),
        }
    }

    /// Remove one health point. True exactly when health reaches zero.
    pub fn take_damage(&mut self) -> bool {
        let health = match self {
            Boss::Kamek(k) => &mut k.health,
            Boss::BabyBowser(b) => &mut b.health,
        };
        if *health == 0 {
            return false;
        }
        *health -= 1;
        *health == 0
    }

    pub fn rect(&self) -> Rect {
        match self {
            Boss::Kamek(k) => k.rect,
            Boss::BabyBowser(b) => b.rect,
        }
    }

    pub fn health(&self) -> u32 {
        match self {
            Boss::Kamek(k) => k.health,
            Boss::BabyBowser(b) => b.health,
        }
    }

    pub fn max_health(&self) -> u32 {
        match self {
            Boss::Kamek(k) => k.max_health,
            Boss::BabyBowser(b) => b.max_health,
        }
    }

    pub fn phase(&self) -> u8 {
        match self {
            Boss::Kamek(_) => 1,
            Boss::BabyBowser(b) => b.phase,
        }
    }

    pub fn projectiles(&self) -> &[Rect] {
        match self {
            Boss::Kamek(k) => &k.projectiles,
            Boss::BabyBowser(b) => &b.projectiles,
        }
    }

    pub fn shockwaves(&self) -> &[Rect] {
        match self {
            Boss::Kamek(_) => &[],
            Boss::BabyBowser(b) => &b.shockwaves,
        }
    }

    pub fn is_stomped_by(&self, player: &Rect, vy: f32) -> bool {
        let body = self.rect();
        player.overlaps(&body) && vy > 0.0 && player.bottom() < body.center_y()
    }

    /// Consume the first attack touching `target`. Returns whether one did.
    pub fn strike(&mut self, target: &Rect) -> bool {
        let (projectiles, shockwaves) = match self {
            Boss::Kamek(k) => (&mut k.projectiles, None),
            Boss::BabyBowser(b) => (&mut b.projectiles, Some(&mut b.shockwaves)),
        };
        if let Some(i) = projectiles.iter().position(|p| p.overlaps(target)) {
            projectiles.remove(i);
            return true;
        }
        let Some(waves) = shockwaves else {
            return false;
        };
        match waves.iter().position(|w| w.overlaps(target)) {
            Some(i) => {
                waves.remove(i);
                true
            },
            None => false,
        }
    }
}
