use serde::{Deserialize, Serialize};

/// Identifier of an overworld node.
pub type NodeId = usize;

/// Events emitted by the simulation during a tick.
///
/// These are gameplay outcomes, not errors: the frontend uses them for
/// feedback and the tests use them to count what happened in a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Map marker started walking toward a neighbouring node.
    TravelStarted { from: NodeId, to: NodeId },
    /// Map marker arrived; `node` is now current.
    TravelFinished { node: NodeId },
    LevelEntered { node: NodeId, world: u8, boss: bool },
    EnemyStomped { score: u32 },
    PowerUpCollected { health: u8, score: u32 },
    PlayerDamaged { health: u8 },
    LifeLost { lives: u8 },
    Respawned,
    BossDamaged { health: u32 },
    BossPhaseChanged { phase: u8 },
    BossDefeated { node: NodeId },
    LevelCompleted { node: NodeId },
    LevelAborted { node: NodeId },
    GameOver { score: u32 },
    CampaignWon { score: u32 },
    ReturnedToMap,
    QuitRequested,
}
