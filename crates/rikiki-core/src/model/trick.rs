use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// A trick slot before its player has acted. Deliberately not a `Card`,
/// so the marker can never be confused with a real play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardSlot {
    Unplayed,
    Played(Card),
}

impl CardSlot {
    pub const fn card(self) -> Option<Card> {
        match self {
            CardSlot::Played(card) => Some(card),
            CardSlot::Unplayed => None,
        }
    }

    pub const fn is_unplayed(self) -> bool {
        matches!(self, CardSlot::Unplayed)
    }
}

/// One slot per seat in turn order. The winner is tracked incrementally:
/// the opening card holds the trick until a later card beats it.
#[derive(Debug, Clone)]
pub struct Trick {
    slots: Vec<CardSlot>,
    winner: Option<usize>,
}

impl Trick {
    pub fn new(seats: usize) -> Self {
        Self {
            slots: vec![CardSlot::Unplayed; seats],
            winner: None,
        }
    }

    pub fn slots(&self) -> &[CardSlot] {
        &self.slots
    }

    pub fn plays_made(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_unplayed()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_unplayed())
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.slots
            .first()
            .and_then(|slot| slot.card())
            .map(|card| card.suit)
    }

    /// Index (in turn order) of the seat currently holding the trick.
    pub fn winner_slot(&self) -> Option<usize> {
        self.winner
    }

    pub fn winning_card(&self) -> Option<Card> {
        self.winner.and_then(|index| self.slots[index].card())
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.slots.iter().filter_map(|slot| slot.card())
    }

    /// Fills the next open slot. The engine validates legality before
    /// calling; slots always fill in turn order.
    pub(crate) fn record(&mut self, card: Card) {
        let index = self.plays_made();
        debug_assert!(index < self.slots.len(), "trick already complete");
        self.slots[index] = CardSlot::Played(card);

        let leads = match self.winning_card() {
            None => true,
            Some(winning) => card.beats(winning),
        };
        if leads {
            self.winner = Some(index);
        }
    }
}

/// A resolved trick, kept for the rest of the set so observers can replay
/// who shed which suit.
#[derive(Debug, Clone)]
pub struct TrickRecord {
    pub seats: Vec<PlayerId>,
    pub cards: Vec<Card>,
    pub winner: PlayerId,
}

impl TrickRecord {
    pub fn lead_suit(&self) -> Suit {
        self.cards[0].suit
    }
}
