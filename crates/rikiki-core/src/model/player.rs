use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// What the caller hands over when seating a table. Eligibility filtering
/// happens upstream; the engine takes the list as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub is_bot: bool,
}

impl PlayerRef {
    pub const fn new(id: PlayerId, is_bot: bool) -> Self {
        Self { id, is_bot }
    }
}

/// Tracks whether a seat has already taken its turn as the structurally
/// disadvantaged last bidder of a game's final one-card set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessMarker {
    Unset,
    Served,
    Pending,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    is_bot: bool,
    hand: Hand,
    bid: Option<u8>,
    tricks_won: u8,
    points: f32,
    marker: FairnessMarker,
}

impl Player {
    pub fn new(reference: PlayerRef) -> Self {
        Self {
            id: reference.id,
            is_bot: reference.is_bot,
            hand: Hand::new(),
            bid: None,
            tricks_won: 0,
            points: 0.0,
            marker: FairnessMarker::Unset,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn bid(&self) -> Option<u8> {
        self.bid
    }

    pub fn set_bid(&mut self, bid: u8) {
        self.bid = Some(bid);
    }

    pub fn tricks_won(&self) -> u8 {
        self.tricks_won
    }

    pub fn record_trick_won(&mut self) {
        self.tricks_won += 1;
    }

    pub fn points(&self) -> f32 {
        self.points
    }

    pub fn add_points(&mut self, points: f32) {
        // Normalize -0.0 so score displays never show a signed zero.
        self.points += if points == 0.0 { 0.0 } else { points };
    }

    pub fn set_points(&mut self, points: f32) {
        self.points = points;
    }

    pub fn marker(&self) -> FairnessMarker {
        self.marker
    }

    pub fn set_marker(&mut self, marker: FairnessMarker) {
        self.marker = marker;
    }

    /// A set is won by hitting the bid exactly, never by winning more.
    pub fn hit_bid(&self) -> bool {
        self.bid == Some(self.tricks_won)
    }

    pub fn deal(&mut self, hand: Hand) {
        self.hand = hand;
        self.bid = None;
        self.tricks_won = 0;
    }
}
