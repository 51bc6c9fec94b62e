use crate::model::player::{FairnessMarker, PlayerId};
use serde::{Deserialize, Serialize};

/// Per-seat state worth keeping across a game boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub is_bot: bool,
    pub points: f32,
    pub marker: FairnessMarker,
}

/// A table frozen between games: seats in seating order, accumulated
/// points, fairness markers, and enough RNG bookkeeping to keep future
/// deals on the recorded sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub seed: u64,
    pub opening_hand_size: u8,
    pub games_completed: u32,
    pub deals_made: u32,
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
