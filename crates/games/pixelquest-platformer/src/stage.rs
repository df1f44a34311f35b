use rand::SeedableRng;
use rand::rngs::StdRng;

use pixelquest_core::events::{GameEvent, NodeId};
use pixelquest_core::input::FrameInput;

use crate::boss::{BabyBowserBoss, Boss, KamekBoss};
use crate::config::PlatformerConfig;
use crate::entities::{Enemy, PowerUp};
use crate::level_gen::{LevelLayout, generate_level};
use crate::overworld::{FINAL_NODE, OverworldNode};
use crate::physics::{PlayerState, move_horizontal, step_vertical, try_jump};

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Reached the exit.
    Cleared,
    BossDefeated,
    /// Last life lost.
    Defeated,
    /// Player backed out to the map.
    Aborted,
}

/// Result of one stage tick.
#[derive(Debug, Default)]
pub struct StageTick {
    pub events: Vec<GameEvent>,
    pub outcome: Option<StageOutcome>,
}

impl StageTick {
    /// Whether a hit ends the rest of this tick. After a respawn the
    /// pre-move contact rectangle no longer describes the player.
    fn ends_tick(&mut self, hurt: Hurt) -> bool {
        match hurt {
            Hurt::Survived => false,
            Hurt::Respawned => true,
            Hurt::Defeated => {
                self.outcome = Some(StageOutcome::Defeated);
                true
            },
        }
    }
}

/// What a hit did to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hurt {
    /// Absorbed or survived in place.
    Survived,
    /// Moved back to the spawn point.
    Respawned,
    /// Last life gone.
    Defeated,
}

/// A level or boss arena being played.
#[derive(Debug, Clone)]
pub struct Stage {
    node: NodeId,
    world: u8,
    layout: LevelLayout,
    enemies: Vec<Enemy>,
    power_ups: Vec<PowerUp>,
    boss: Option<Boss>,
    rng: StdRng,
}

impl Stage {
    /// Build the stage for `node` from its generated level.
    pub fn enter(node: &OverworldNode, config: &PlatformerConfig) -> Self {
        let level = generate_level(node.level_params(), config.screen);
        let boss = if !node.is_boss {
            None
        } else if node.id == FINAL_NODE {
            Some(Boss::BabyBowser(BabyBowserBoss::new(
                config.boss.final_boss_health,
                config.screen,
            )))
        } else {
            Some(Boss::Kamek(KamekBoss::new(
                config.boss.kamek_base_health + u32::from(node.world),
                config.screen,
            )))
        };
        Self {
            node: node.id,
            world: node.world,
            layout: level.layout,
            enemies: level.enemies,
            power_ups: level.power_ups,
            boss,
            rng: level.rng,
        }
    }

    /// Hand-built stage with no entities.
    pub fn from_layout(node: NodeId, world: u8, layout: LevelLayout, boss: Option<Boss>) -> Self {
        Self {
            node,
            world,
            layout,
            enemies: Vec::new(),
            power_ups: Vec::new(),
            boss,
            rng: StdRng::seed_from_u64(node as u64),
        }
    }

    pub fn with_enemies(mut self, enemies: Vec<Enemy>) -> Self {
        self.enemies = enemies;
        self
    }

    pub fn with_power_ups(mut self, power_ups: Vec<PowerUp>) -> Self {
        self.power_ups = power_ups;
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn world(&self) -> u8 {
        self.world
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    /// Advance one tick: input, physics, contacts, then AI.
    pub fn tick(
        &mut self,
        player: &mut PlayerState,
        input: &FrameInput,
        config: &PlatformerConfig,
    ) -> StageTick {
        let mut out = StageTick::default();
        if input.cancel {
            out.outcome = Some(StageOutcome::Aborted);
            return out;
        }

        let physics = &config.physics;
        move_horizontal(
            player,
            input.move_dir(),
            &self.layout.platforms,
            physics,
            config.screen.width,
        );
        if input.jump {
            try_jump(player, physics);
        }
        player.tick_invincibility();
        let probe = step_vertical(player, &self.layout.platforms, physics).probe;

        // Enemies: stomps always count, any other touch is a hit.
        let vy = player.vy;
        let mut stomps = 0;
        let mut touched = false;
        self.enemies.retain(|e| {
            if !probe.overlaps(&e.rect) {
                return true;
            }
            if e.is_stomped_by(&probe, vy) {
                stomps += 1;
                false
            } else {
                touched = true;
                true
            }
        });
        for _ in 0..stomps {
            player.add_score(config.player.stomp_score);
            out.events.push(GameEvent::EnemyStomped {
                score: player.score,
            });
        }
        if touched {
            let hurt = self.hurt(player, config, &mut out.events, false);
            if out.ends_tick(hurt) {
                return out;
            }
        }

        let before = self.power_ups.len();
        self.power_ups.retain(|pu| !probe.overlaps(&pu.rect));
        for _ in self.power_ups.len()..before {
            player.heal(config.player.max_health);
            player.add_score(config.player.powerup_score);
            out.events.push(GameEvent::PowerUpCollected {
                health: player.health,
                score: player.score,
            });
        }

        let in_lava = self
            .layout
            .lava()
            .is_some_and(|lava| probe.overlaps(&lava.rect));
        if in_lava && !player.is_invincible() {
            player.vy = physics.jump_velocity;
            let hurt = self.hurt(player, config, &mut out.events, false);
            if out.ends_tick(hurt) {
                return out;
            }
        }

        if player.y > config.screen.height {
            let hurt = self.hurt(player, config, &mut out.events, true);
            if out.ends_tick(hurt) {
                return out;
            }
        }

        if self.layout.exit.is_some_and(|exit| probe.overlaps(&exit)) {
            out.outcome = Some(StageOutcome::Cleared);
            return out;
        }

        for enemy in &mut self.enemies {
            enemy.patrol();
        }

        if let Some(outcome) = self.tick_boss(player, config, &mut out.events) {
            out.outcome = Some(outcome);
        }
        out
    }

    fn tick_boss(
        &mut self,
        player: &mut PlayerState,
        config: &PlatformerConfig,
        events: &mut Vec<GameEvent>,
    ) -> Option<StageOutcome> {
        let boss = self.boss.as_mut()?;
        if let Some(phase) = boss.update(&mut self.rng, config.screen) {
            tracing::info!(boss = boss.name(), phase, "Boss phase changed");
            events.push(GameEvent::BossPhaseChanged { phase });
        }

        let body = player.rect();
        if boss.is_stomped_by(&body, player.vy) {
            let defeated = boss.take_damage();
            events.push(GameEvent::BossDamaged {
                health: boss.health(),
            });
            player.vy = config.physics.jump_velocity / 2.0;
            if defeated {
                return Some(StageOutcome::BossDefeated);
            }
        }

        if !player.is_invincible()
            && boss.strike(&body)
            && self.hurt(player, config, events, false) == Hurt::Defeated
        {
            return Some(StageOutcome::Defeated);
        }
        None
    }

    /// Apply one invincibility-gated hit. A lost life refills health and
    /// respawns; `always_respawn` respawns even when the hit was absorbed.
    fn hurt(
        &self,
        player: &mut PlayerState,
        config: &PlatformerConfig,
        events: &mut Vec<GameEvent>,
        always_respawn: bool,
    ) -> Hurt {
        let hit = player.take_hit(config.player.invincibility_ticks);
        let mut respawn = always_respawn;
        if hit {
            events.push(GameEvent::PlayerDamaged {
                health: player.health,
            });
            if player.health == 0 {
                player.lives = player.lives.saturating_sub(1);
                events.push(GameEvent::LifeLost {
                    lives: player.lives,
                });
                if player.lives == 0 {
                    return Hurt::Defeated;
                }
                player.health = config.player.max_health;
                respawn = true;
            }
        }
        if respawn {
            player.place_at(config.player.spawn_x, self.layout.spawn_y);
            events.push(GameEvent::Respawned);
            return Hurt::Respawned;
        }
        Hurt::Survived
    }
}

#[cfg(test)]
mod tests {
    use pixelquest_core::geometry::Rect;

    use super::*;
    use crate::config::MIN_SCREEN_SIZE;
    use crate::level_gen::{Platform, PlatformKind};
    use crate::overworld::Overworld;
    use crate::physics::PLAYER_HEIGHT;

    fn cfg() -> PlatformerConfig {
        PlatformerConfig::default()
    }

    fn flat_layout() -> LevelLayout {
        LevelLayout {
            platforms: vec![Platform::new(
                Rect::new(0.0, 560.0, 800.0, 40.0),
                PlatformKind::Ground,
            )],
            exit: Some(Rect::new(740.0, 500.0, 50.0, 60.0)),
            spawn_y: 490.0,
        }
    }

    fn player_on_ground(x: f32) -> PlayerState {
        let mut p = PlayerState::new(&cfg().player);
        p.place_at(x, 560.0 - PLAYER_HEIGHT);
        p.on_ground = true;
        p
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn stomp_removes_enemy_and_scores() {
        let config = cfg();
        let shelf = Rect::new(0.0, 560.0, 800.0, 40.0);
        let enemy = Enemy::new(200.0, shelf);
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None).with_enemies(vec![enemy]);
        let mut player = PlayerState::new(&config.player);
        // Feet 6 px above the enemy's top, falling.
        player.place_at(195.0, 530.0 - PLAYER_HEIGHT - 6.0);
        player.vy = 8.0;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert!(stage.enemies().is_empty());
        assert_eq!(player.score, 100);
        assert_eq!(player.health, 3);
        assert_eq!(tick.events, vec![GameEvent::EnemyStomped { score: 100 }]);
    }

    #[test]
    fn side_contact_hurts_once_with_invincibility() {
        let config = cfg();
        let shelf = Rect::new(0.0, 560.0, 800.0, 40.0);
        let mut enemy = Enemy::new(230.0, shelf);
        enemy.speed = 0.0;
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None).with_enemies(vec![enemy]);
        let mut player = player_on_ground(200.0);

        let first = stage.tick(&mut player, &idle(), &config);
        assert_eq!(player.health, 2);
        assert_eq!(player.invincibility, 60);
        assert_eq!(first.events, vec![GameEvent::PlayerDamaged { health: 2 }]);

        // Still touching, but invincible.
        for _ in 0..59 {
            let tick = stage.tick(&mut player, &idle(), &config);
            assert!(tick.events.is_empty());
        }
        assert_eq!(player.health, 2);
        assert_eq!(stage.enemies().len(), 1);
    }

    #[test]
    fn power_up_heals_and_scores() {
        let config = cfg();
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None)
            .with_power_ups(vec![PowerUp::new(210.0, 540.0)]);
        let mut player = player_on_ground(200.0);
        player.health = 2;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert!(stage.power_ups().is_empty());
        assert_eq!(player.health, 3);
        assert_eq!(player.score, 50);
        assert_eq!(
            tick.events,
            vec![GameEvent::PowerUpCollected {
                health: 3,
                score: 50
            }]
        );
    }

    #[test]
    fn power_up_at_full_health_still_scores() {
        let config = cfg();
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None)
            .with_power_ups(vec![PowerUp::new(210.0, 540.0)]);
        let mut player = player_on_ground(200.0);
        stage.tick(&mut player, &idle(), &config);
        assert_eq!(player.health, 3);
        assert_eq!(player.score, 50);
    }

    #[test]
    fn falling_out_hurts_once_and_respawns() {
        let config = cfg();
        let layout = LevelLayout {
            platforms: Vec::new(),
            exit: None,
            spawn_y: 300.0,
        };
        let mut stage = Stage::from_layout(0, 5, layout, None);
        let mut player = PlayerState::new(&config.player);
        player.place_at(400.0, 595.0);
        player.vy = 10.0;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(player.health, 2);
        assert_eq!((player.x, player.y), (50.0, 300.0));
        assert_eq!(
            count(&tick.events, |e| matches!(e, GameEvent::PlayerDamaged { .. })),
            1
        );
        assert!(tick.events.contains(&GameEvent::Respawned));
    }

    #[test]
    fn falling_out_while_invincible_only_respawns() {
        let config = cfg();
        let layout = LevelLayout {
            platforms: Vec::new(),
            exit: None,
            spawn_y: 300.0,
        };
        let mut stage = Stage::from_layout(0, 5, layout, None);
        let mut player = PlayerState::new(&config.player);
        player.place_at(400.0, 595.0);
        player.vy = 10.0;
        player.invincibility = 30;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(player.health, 3);
        assert_eq!((player.x, player.y), (50.0, 300.0));
        assert_eq!(tick.events, vec![GameEvent::Respawned]);
    }

    #[test]
    fn lava_hurts_and_launches() {
        let config = cfg();
        let mut layout = flat_layout();
        layout.platforms.push(Platform::new(
            Rect::new(0.0, 540.0, 800.0, 20.0),
            PlatformKind::Lava,
        ));
        let mut stage = Stage::from_layout(0, 4, layout, None);
        let mut player = PlayerState::new(&config.player);
        player.place_at(300.0, 540.0 - PLAYER_HEIGHT);

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(player.health, 2);
        assert_eq!(player.vy, -15.0);
        assert_eq!(tick.events, vec![GameEvent::PlayerDamaged { health: 2 }]);
    }

    #[test]
    fn last_life_lost_defeats() {
        let config = cfg();
        let shelf = Rect::new(0.0, 560.0, 800.0, 40.0);
        let mut enemy = Enemy::new(230.0, shelf);
        enemy.speed = 0.0;
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None).with_enemies(vec![enemy]);
        let mut player = player_on_ground(200.0);
        player.health = 1;
        player.lives = 1;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(tick.outcome, Some(StageOutcome::Defeated));
        assert_eq!(player.lives, 0);
        assert!(tick.events.contains(&GameEvent::LifeLost { lives: 0 }));
    }

    #[test]
    fn lost_life_refills_health_and_respawns() {
        let config = cfg();
        let shelf = Rect::new(0.0, 560.0, 800.0, 40.0);
        let mut enemy = Enemy::new(230.0, shelf);
        enemy.speed = 0.0;
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None).with_enemies(vec![enemy]);
        let mut player = player_on_ground(200.0);
        player.health = 1;
        player.score = 700;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(tick.outcome, None);
        assert_eq!(player.lives, 2);
        assert_eq!(player.health, 3);
        assert_eq!(player.score, 700, "score survives a lost life");
        assert_eq!((player.x, player.y), (50.0, 490.0));
        assert!(tick.events.contains(&GameEvent::Respawned));
    }

    #[test]
    fn exit_clears_level() {
        let config = cfg();
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None);
        let mut player = player_on_ground(700.0);
        let moving = FrameInput {
            right: true,
            ..Default::default()
        };
        let mut outcome = None;
        for _ in 0..20 {
            outcome = stage.tick(&mut player, &moving, &config).outcome;
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(StageOutcome::Cleared));
    }

    #[test]
    fn cancel_aborts() {
        let config = cfg();
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None);
        let mut player = player_on_ground(100.0);
        let tick = stage.tick(
            &mut player,
            &FrameInput {
                cancel: true,
                ..Default::default()
            },
            &config,
        );
        assert_eq!(tick.outcome, Some(StageOutcome::Aborted));
    }

    #[test]
    fn world_one_boss_is_kamek_with_five_health() {
        let map = Overworld::new();
        let stage = Stage::enter(&map.nodes()[3], &cfg());
        let Some(Boss::Kamek(kamek)) = stage.boss() else {
            panic!("node 3 must hold a Kamek fight");
        };
        assert_eq!(kamek.max_health, 5);
        assert!(stage.enemies().is_empty());
        assert!(stage.layout().exit.is_none());
    }

    #[test]
    fn three_stomps_take_world_one_boss_from_five_to_two() {
        let config = cfg();
        let map = Overworld::new();
        let boss = Stage::enter(&map.nodes()[3], &config).boss().cloned();
        let mut stage = Stage::from_layout(3, 1, flat_layout(), boss);
        let mut player = PlayerState::new(&config.player);

        for expected in [4, 3, 2] {
            let Some(Boss::Kamek(kamek)) = stage.boss() else {
                panic!("node 3 must hold a Kamek fight");
            };
            // Drop onto where Kamek will be after this tick's move.
            let next_x = kamek.rect.x + 3.0 * kamek.direction;
            let next_y = 100.0 + (next_x / 20.0).sin() * 50.0;
            player.place_at(next_x + 5.0, next_y - PLAYER_HEIGHT + 10.0);
            player.vy = 2.0;

            let tick = stage.tick(&mut player, &idle(), &config);

            assert!(tick.events.contains(&GameEvent::BossDamaged { health: expected }));
            assert_eq!(player.vy, -7.5);
            assert_eq!(tick.outcome, None);
        }
        assert_eq!(stage.boss().map(Boss::health), Some(2));
    }

    #[test]
    fn dying_beside_the_exit_respawns_without_clearing() {
        let config = cfg();
        let shelf = Rect::new(0.0, 560.0, 800.0, 40.0);
        let mut stage = Stage::from_layout(0, 1, flat_layout(), None)
            .with_enemies(vec![Enemy::new(700.0, shelf)])
            .with_power_ups(vec![PowerUp::new(725.0, 520.0)]);
        // Straddles the enemy, the power-up and the exit door at x=740.
        let mut player = player_on_ground(720.0);
        player.health = 1;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(
            tick.events,
            vec![
                GameEvent::PlayerDamaged { health: 0 },
                GameEvent::LifeLost { lives: 2 },
                GameEvent::Respawned,
            ]
        );
        assert_eq!(tick.outcome, None);
        assert_eq!((player.x, player.y), (50.0, 490.0));
        assert_eq!(stage.power_ups().len(), 1);
    }

    #[test]
    fn smallest_valid_screen_runs_every_node() {
        let mut config = cfg();
        config.screen.width = MIN_SCREEN_SIZE;
        config.screen.height = MIN_SCREEN_SIZE;
        assert!(config.validate().is_ok());

        let map = Overworld::new();
        for node in map.nodes() {
            let mut stage = Stage::enter(node, &config);
            let mut player = PlayerState::new(&config.player);
            // Past Kamek's first teleport.
            for _ in 0..320 {
                player.invincibility = 1_000;
                stage.tick(&mut player, &idle(), &config);
            }
        }
    }

    #[test]
    fn final_node_is_baby_bowser() {
        let map = Overworld::new();
        let stage = Stage::enter(&map.nodes()[FINAL_NODE], &cfg());
        assert!(matches!(stage.boss(), Some(Boss::BabyBowser(_))));
        assert_eq!(stage.boss().map(Boss::max_health), Some(10));
    }

    #[test]
    fn boss_stomp_bounces_and_damages() {
        let config = cfg();
        let mut kamek = KamekBoss::new(5, config.screen);
        // Park it far from the edges; the update moves it 3 px right.
        kamek.rect = Rect::new(397.0, 100.0, 50.0, 70.0);
        let mut stage = Stage::from_layout(3, 1, flat_layout(), Some(Boss::Kamek(kamek)));
        let mut player = PlayerState::new(&config.player);

        // After the update Kamek sits at x=400 with y on its sine path.
        let boss_y = 100.0 + (400.0f32 / 20.0).sin() * 50.0;
        player.place_at(405.0, boss_y - PLAYER_HEIGHT + 10.0);
        player.vy = 2.0;

        let tick = stage.tick(&mut player, &idle(), &config);

        assert!(tick.events.contains(&GameEvent::BossDamaged { health: 4 }));
        assert_eq!(player.vy, -7.5);
        assert_eq!(tick.outcome, None);
    }

    #[test]
    fn boss_attack_hurts_and_is_consumed() {
        let config = cfg();
        let mut kamek = KamekBoss::new(5, config.screen);
        let mut player = player_on_ground(200.0);
        // Falls 5 px into the player this tick.
        kamek
            .projectiles
            .push(Rect::new(210.0, player.y - 8.0, 10.0, 10.0));
        let mut stage = Stage::from_layout(3, 1, flat_layout(), Some(Boss::Kamek(kamek)));

        let tick = stage.tick(&mut player, &idle(), &config);

        assert_eq!(player.health, 2);
        assert!(tick.events.contains(&GameEvent::PlayerDamaged { health: 2 }));
        assert!(stage.boss().is_some_and(|b| b.projectiles().is_empty()));
    }

    #[test]
    fn same_node_same_population() {
        let map = Overworld::new();
        let a = Stage::enter(&map.nodes()[9], &cfg());
        let b = Stage::enter(&map.nodes()[9], &cfg());
        assert_eq!(a.layout(), b.layout());
        assert_eq!(a.enemies(), b.enemies());
        assert_eq!(a.power_ups(), b.power_ups());
    }
}
