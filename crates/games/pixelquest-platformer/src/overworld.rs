use serde::{Deserialize, Serialize};

use pixelquest_core::error::{GameError, Result};
use pixelquest_core::events::NodeId;

use crate::level_gen::LevelParams;

/// Worlds with four regular nodes each.
pub const WORLDS: u8 = 5;
pub const LEVELS_PER_WORLD: u8 = 4;
/// Id of the final boss node.
pub const FINAL_NODE: NodeId = (WORLDS as usize) * (LEVELS_PER_WORLD as usize);
const FINAL_WORLD: u8 = WORLDS + 1;
const FINAL_LEVEL_ID: &str = "final_boss";
/// Map position of the final node, below the last world's boss.
const FINAL_POS: (f32, f32) = (550.0, 850.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverworldNode {
    pub id: NodeId,
    /// Map coordinates in pixels.
    pub pos: (f32, f32),
    pub level_id: String,
    /// 1-5, or 6 for the final boss.
    pub world: u8,
    /// 1-4 within its world; boss nodes are level 4.
    pub level_num: u8,
    pub is_boss: bool,
    pub completed: bool,
}

impl OverworldNode {
    pub fn level_params(&self) -> LevelParams<'_> {
        LevelParams {
            level_id: &self.level_id,
            world: self.world,
            level_num: self.level_num,
            is_boss: self.is_boss,
        }
    }
}

/// Map marker walking along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    pub from: NodeId,
    pub to: NodeId,
    /// 0.0 at `from`, 1.0 on arrival.
    pub progress: f32,
}

/// Horizontal direction of a travel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

/// Campaign map: fixed nodes and edges, the current node and any walk in
/// progress. Only `completed` flags and the position change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overworld {
    nodes: Vec<OverworldNode>,
    edges: Vec<(NodeId, NodeId)>,
    current: NodeId,
    travel: Option<Travel>,
}

impl Overworld {
    pub fn new() -> Self {
        let mut nodes = Vec::new();
        for world in 1..=WORLDS {
            for level in 1..=LEVELS_PER_WORLD {
                let id = nodes.len();
                nodes.push(OverworldNode {
                    id,
                    pos: (
                        100.0 + (id % 4) as f32 * 150.0,
                        100.0 + (id / 4) as f32 * 150.0,
                    ),
                    level_id: format!("world_{world}_level_{level}"),
                    world,
                    level_num: level,
                    is_boss: level == LEVELS_PER_WORLD,
                    completed: false,
                });
            }
        }
        nodes.push(OverworldNode {
            id: FINAL_NODE,
            pos: FINAL_POS,
            level_id: FINAL_LEVEL_ID.to_string(),
            world: FINAL_WORLD,
            level_num: LEVELS_PER_WORLD,
            is_boss: true,
            completed: false,
        });

        let edges = nodes
            .windows(2)
            .filter(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                a.world == b.world || (a.is_boss && b.world == a.world + 1)
            })
            .map(|pair| (pair[0].id, pair[1].id))
            .collect();

        Self {
            nodes,
            edges,
            current: 0,
            travel: None,
        }
    }

    pub fn nodes(&self) -> &[OverworldNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&OverworldNode> {
        self.nodes.get(id)
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &OverworldNode {
        &self.nodes[self.current]
    }

    pub fn travel(&self) -> Option<Travel> {
        self.travel
    }

    pub fn is_terminal(&self, id: NodeId) -> bool {
        id == FINAL_NODE
    }

    /// Marker position, interpolated along the edge while walking.
    pub fn marker_pos(&self) -> (f32, f32) {
        let here = self.nodes[self.current].pos;
        match self.travel {
            Some(t) => {
                let there = self.nodes[t.to].pos;
                (
                    here.0 + (there.0 - here.0) * t.progress,
                    here.1 + (there.1 - here.1) * t.progress,
                )
            },
            None => here,
        }
    }

    pub fn neighbours(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter_map(|&(a, b)| {
                if a == id {
                    Some(b)
                } else if b == id {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Neighbours the marker may walk to: lower ids always, higher ids once
    /// the current node is complete.
    pub fn accessible(&self) -> Vec<NodeId> {
        let unlocked = self.current_node().completed;
        self.neighbours(self.current)
            .into_iter()
            .filter(|&n| n <= self.current || unlocked)
            .collect()
    }

    /// Start walking to `to`.
    pub fn travel_to(&mut self, to: NodeId) -> Result<()> {
        if self.travel.is_some() {
            return Err(reject(to, "already travelling"));
        }
        if !self.accessible().contains(&to) {
            return Err(reject(to, "not reachable from the current node"));
        }
        self.travel = Some(Travel {
            from: self.current,
            to,
            progress: 0.0,
        });
        Ok(())
    }

    /// Walk to the nearest accessible neighbour in `heading`, if there is one.
    pub fn step_towards(&mut self, heading: Heading) -> Option<NodeId> {
        if self.travel.is_some() {
            return None;
        }
        let candidates = self.accessible().into_iter();
        let target = match heading {
            Heading::Right => candidates.filter(|&n| n > self.current).min(),
            Heading::Left => candidates.filter(|&n| n < self.current).max(),
        }?;
        self.travel_to(target).ok()?;
        Some(target)
    }

    /// Advance the walk by `step`. Returns the node arrived at.
    pub fn advance_travel(&mut self, step: f32) -> Option<NodeId> {
        let travel = self.travel.as_mut()?;
        travel.progress += step;
        if travel.progress < 1.0 {
            return None;
        }
        let arrived = travel.to;
        self.current = arrived;
        self.travel = None;
        Some(arrived)
    }

    /// Validate entering `id`: it must be the current node and the marker
    /// must be standing still.
    pub fn enter(&self, id: NodeId) -> Result<&OverworldNode> {
        if self.travel.is_some() {
            return Err(reject(id, "map marker is travelling"));
        }
        if id != self.current {
            return Err(reject(id, "only the current node can be entered"));
        }
        self.nodes
            .get(id)
            .ok_or_else(|| reject(id, "no such node"))
    }

    /// Mark the current node complete and move to the next node, if any.
    /// Returns the completed node.
    pub fn complete_current(&mut self) -> NodeId {
        let done = self.current;
        self.nodes[done].completed = true;
        if done + 1 < self.nodes.len() {
            self.current = done + 1;
        }
        done
    }

    /// Jump straight to `id`, cancelling any walk.
    pub fn warp_to(&mut self, id: NodeId) -> Result<()> {
        if id >= self.nodes.len() {
            return Err(reject(id, "no such node"));
        }
        self.current = id;
        self.travel = None;
        Ok(())
    }
}

impl Default for Overworld {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(node: NodeId, reason: &str) -> GameError {
    GameError::InvalidLevelSelection {
        node,
        reason: reason.to_string(),
    }
}
