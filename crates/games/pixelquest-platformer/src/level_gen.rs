use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use pixelquest_core::geometry::Rect;

use crate::config::ScreenConfig;
use crate::entities::{ENEMY_SIZE, Enemy, POWERUP_SIZE, PowerUp};
use crate::physics::PLAYER_HEIGHT;

/// Thickness of every generated ledge.
const LEDGE_HEIGHT: f32 = 20.0;
/// Ground strip height along the bottom of the screen.
const GROUND_HEIGHT: f32 = 40.0;
/// Lava strip height (world 4), resting on the ground.
const LAVA_HEIGHT: f32 = 20.0;
/// Exit door size.
const EXIT_WIDTH: f32 = 50.0;
const EXIT_HEIGHT: f32 = 60.0;
/// Enemies per level never exceed this.
const MAX_ENEMIES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Ledge,
    Lava,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub const fn new(rect: Rect, kind: PlatformKind) -> Self {
        Self { rect, kind }
    }
}

/// Platforms and exit of one level. Derived purely from the level id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub platforms: Vec<Platform>,
    /// `None` on boss stages.
    pub exit: Option<Rect>,
    /// Vertical spawn and respawn position.
    pub spawn_y: f32,
}

impl LevelLayout {
    pub fn ledges(&self) -> impl Iterator<Item = &Platform> {
        self.platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Ledge)
    }

    pub fn lava(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.kind == PlatformKind::Lava)
    }
}

/// A layout plus its population, and the RNG stream that produced them.
/// The stream is handed on to the stage so boss behaviour stays seeded too.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub layout: LevelLayout,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUp>,
    pub rng: StdRng,
}

/// What to generate: the node's identity in the campaign.
#[derive(Debug, Clone, Copy)]
pub struct LevelParams<'a> {
    pub level_id: &'a str,
    pub world: u8,
    pub level_num: u8,
    pub is_boss: bool,
}

/// Seed for a level: the first 8 bytes of SHA-256(level_id), little endian.
pub fn seed_for(level_id: &str) -> u64 {
    let digest = Sha256::digest(level_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Deterministic platform layout for a level id.
pub fn layout_for(params: LevelParams<'_>, screen: ScreenConfig) -> LevelLayout {
    let mut rng = StdRng::seed_from_u64(seed_for(params.level_id));
    build_layout(&mut rng, params, screen)
}

/// Layout and entity placement, drawn from a single seeded stream.
pub fn generate_level(params: LevelParams<'_>, screen: ScreenConfig) -> GeneratedLevel {
    let seed = seed_for(params.level_id);
    tracing::debug!(level = params.level_id, seed, "Generating level");
    let mut rng = StdRng::seed_from_u64(seed);
    let layout = build_layout(&mut rng, params, screen);
    let (enemies, power_ups) = if params.is_boss {
        (Vec::new(), Vec::new())
    } else {
        populate(&mut rng, &layout, params.world)
    };
    GeneratedLevel {
        layout,
        enemies,
        power_ups,
        rng,
    }
}

fn build_layout(rng: &mut StdRng, params: LevelParams<'_>, screen: ScreenConfig) -> LevelLayout {
    let (w, h) = (screen.width, screen.height);
    let count = if params.is_boss {
        1
    } else {
        2 + u32::from(params.level_num)
    };

    let ground = Platform::new(
        Rect::new(0.0, h - GROUND_HEIGHT, w, GROUND_HEIGHT),
        PlatformKind::Ground,
    );
    let mut fixed = Vec::new();
    let mut ledges = Vec::new();

    match params.world {
        1 => {
            fixed.push(ground);
            drift_ledges(rng, &mut ledges, count, h, Drift {
                start_x: 150,
                step: 150,
                jitter: 50,
                dy: 60,
                width: (120, 220),
            });
        },
        2 => {
            fixed.push(ground);
            drift_ledges(rng, &mut ledges, count, h, Drift {
                start_x: 200,
                step: 180,
                jitter: 30,
                dy: 50,
                width: (150, 250),
            });
        },
        3 => {
            fixed.push(ground);
            let mut current_y = h - 100.0;
            for _ in 0..count {
                let x = rng.random_range(100..=(w as i32 - 200)) as f32;
                let y = current_y - rng.random_range(80..=120) as f32;
                let lw = rng.random_range(100..=180) as f32;
                ledges.push(ledge(x, y.max(100.0), lw));
                current_y = y;
            }
        },
        4 => {
            fixed.push(ground);
            fixed.push(Platform::new(
                Rect::new(0.0, h - GROUND_HEIGHT - LAVA_HEIGHT, w, LAVA_HEIGHT),
                PlatformKind::Lava,
            ));
            drift_ledges(rng, &mut ledges, count, h, Drift {
                start_x: 100 * i32::from(params.level_num),
                step: 200,
                jitter: 40,
                dy: 50,
                width: (180, 280),
            });
        },
        5 => {
            // Floating islands, no ground.
            for _ in 0..count + 2 {
                let x = rng.random_range(50..=(w as i32 - 150)) as f32;
                let y = rng.random_range(150..=(h as i32 - 150)) as f32;
                let lw = rng.random_range(120..=200) as f32;
                ledges.push(ledge(x, y, lw));
            }
        },
        _ => {
            // Final arena
            fixed.push(ground);
            let y = 300 + rng.random_range(-50..=50);
            ledges.push(ledge(100.0, y as f32, 600.0));
        },
    }

    ledges.retain(|p| within_bounds(&p.rect, w, h));
    let mut platforms = fixed;
    platforms.extend(ledges);

    let exit = if params.is_boss {
        None
    } else {
        exit_for(&platforms, w)
    };
    let spawn_y = spawn_y_for(&platforms, h);

    LevelLayout {
        platforms,
        exit,
        spawn_y,
    }
}

/// Parameters of the horizontal-drift strategies (worlds 1, 2 and 4).
struct Drift {
    start_x: i32,
    step: i32,
    jitter: i32,
    dy: i32,
    width: (i32, i32),
}

fn drift_ledges(rng: &mut StdRng, out: &mut Vec<Platform>, count: u32, h: f32, d: Drift) {
    let floor = h - 100.0;
    let mut last_y = floor;
    for i in 0..count as i32 {
        let x = d.start_x + i * d.step + rng.random_range(-d.jitter..=d.jitter);
        let y = (last_y + rng.random_range(-d.dy..=d.dy) as f32).min(floor);
        let lw = rng.random_range(d.width.0..=d.width.1) as f32;
        out.push(ledge((x as f32).max(50.0), y.max(100.0), lw));
        last_y = y;
    }
}

fn ledge(x: f32, y: f32, w: f32) -> Platform {
    Platform::new(Rect::new(x, y, w, LEDGE_HEIGHT), PlatformKind::Ledge)
}

/// Bounds/reachability filter for generated ledges.
fn within_bounds(r: &Rect, w: f32, h: f32) -> bool {
    r.right() > 50.0 && r.left() < w - 50.0 && r.bottom() < h - 20.0 && r.top() > 50.0
}

/// Exit door on the platform reaching furthest right. Ties go to the earlier
/// platform.
fn exit_for(platforms: &[Platform], w: f32) -> Option<Rect> {
    let target = platforms.iter().fold(None::<&Platform>, |best, p| match best {
        Some(b) if b.rect.right() >= p.rect.right() => Some(b),
        _ => Some(p),
    })?;
    Some(Rect::new(
        (target.rect.right() - EXIT_WIDTH).min(w - 60.0),
        target.rect.top() - EXIT_HEIGHT,
        EXIT_WIDTH,
        EXIT_HEIGHT,
    ))
}

fn spawn_y_for(platforms: &[Platform], h: f32) -> f32 {
    match platforms.first() {
        Some(first) if first.rect.top() < h - 50.0 => first.rect.top() - PLAYER_HEIGHT,
        _ => h - PLAYER_HEIGHT - 50.0,
    }
}

/// One ledge gets `min(world, 3)` enemies, one (possibly the same) gets a
/// power-up.
fn populate(rng: &mut StdRng, layout: &LevelLayout, world: u8) -> (Vec<Enemy>, Vec<PowerUp>) {
    let candidates: Vec<&Platform> = layout.ledges().collect();
    if candidates.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let home = candidates[rng.random_range(0..candidates.len())].rect;
    let enemies = (0..world.min(MAX_ENEMIES))
        .map(|_| {
            let x = random_x_on(rng, &home, ENEMY_SIZE);
            Enemy::new(x, home)
        })
        .collect();

    let shelf = candidates[rng.random_range(0..candidates.len())].rect;
    let x = random_x_on(rng, &shelf, POWERUP_SIZE);
    let power_ups = vec![PowerUp::new(x, shelf.top() - POWERUP_SIZE)];

    (enemies, power_ups)
}

/// Left edge for an entity of `size` placed on `platform` with a 10 px margin.
fn random_x_on(rng: &mut StdRng, platform: &Rect, size: f32) -> f32 {
    let lo = (platform.left() + 10.0) as i32;
    let hi = ((platform.right() - size - 10.0) as i32).max(lo);
    rng.random_range(lo..=hi) as f32
}
