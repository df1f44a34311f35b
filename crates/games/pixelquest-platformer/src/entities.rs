use serde::{Deserialize, Serialize};

use pixelquest_core::geometry::Rect;

/// Side length of the square enemy hitbox.
pub const ENEMY_SIZE: f32 = 30.0;
/// Enemy patrol speed in px/tick.
pub const ENEMY_SPEED: f32 = 2.0;
/// Side length of the square power-up hitbox.
pub const POWERUP_SIZE: f32 = 20.0;

/// Patrolling walker bound to the platform it spawned on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    pub speed: f32,
    /// +1 right, -1 left.
    pub direction: f32,
    pub platform: Rect,
}

impl Enemy {
    /// Standing on `platform` with its left edge at `x`, walking right.
    pub fn new(x: f32, platform: Rect) -> Self {
        Self {
            rect: Rect::new(x, platform.top() - ENEMY_SIZE, ENEMY_SIZE, ENEMY_SIZE),
            speed: ENEMY_SPEED,
            direction: 1.0,
            platform,
        }
    }

    /// Step along the platform, turning around instead of walking off it.
    pub fn patrol(&mut self) {
        let next = self.rect.offset(self.speed * self.direction, 0.0);
        if self.platform.spans_horizontally(&next) {
            self.rect = next;
        } else {
            self.direction = -self.direction;
        }
    }

    /// A stomp needs the player falling with feet above the enemy's middle.
    pub fn is_stomped_by(&self, player: &Rect, vy: f32) -> bool {
        vy > 0.0 && player.bottom() < self.rect.center_y()
    }
}

/// Static health pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub rect: Rect,
}

impl PowerUp {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, POWERUP_SIZE, POWERUP_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf() -> Rect {
        Rect::new(100.0, 300.0, 150.0, 20.0)
    }

    #[test]
    fn enemy_stands_on_its_platform() {
        let enemy = Enemy::new(120.0, shelf());
        assert_eq!(enemy.rect.bottom(), 300.0);
        assert_eq!(enemy.rect.w, ENEMY_SIZE);
        assert_eq!(enemy.direction, 1.0);
    }

    #[test]
    fn enemy_turns_at_platform_edge() {
        let mut enemy = Enemy::new(218.0, shelf());
        enemy.patrol();
        assert_eq!(enemy.rect.right(), 250.0);
        enemy.patrol();
        assert_eq!(enemy.direction, -1.0, "next step would overhang");
        assert_eq!(enemy.rect.right(), 250.0);
        enemy.patrol();
        assert_eq!(enemy.rect.x, 218.0);
    }

    #[test]
    fn stomp_requires_falling_from_above() {
        let enemy = Enemy::new(120.0, shelf());
        // Feet 5 px into the enemy's top half.
        let feet_high = Rect::new(110.0, 215.0, 40.0, 60.0);
        assert!(enemy.is_stomped_by(&feet_high, 4.0));
        assert!(!enemy.is_stomped_by(&feet_high, -4.0));
        assert!(!enemy.is_stomped_by(&feet_high, 0.0));

        // Side contact: feet below the enemy's centre.
        let side = Rect::new(90.0, 240.0, 40.0, 60.0);
        assert!(!enemy.is_stomped_by(&side, 4.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn enemy_never_leaves_platform_span(
                px in 0.0f32..600.0,
                pw in 40.0f32..300.0,
                offset in 0.0f32..0.9,
                ticks in 1usize..2000,
            ) {
                let platform = Rect::new(px, 300.0, pw, 20.0);
                let x = px + offset * (pw - ENEMY_SIZE);
                let mut enemy = Enemy::new(x, platform);
                for _ in 0..ticks {
                    enemy.patrol();
                    prop_assert!(
                        platform.spans_horizontally(&enemy.rect),
                        "enemy {:?} left {:?}", enemy.rect, platform
                    );
                }
            }
        }
    }
}
