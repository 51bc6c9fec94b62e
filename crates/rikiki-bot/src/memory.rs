use rikiki_core::game::GameState;
use rikiki_core::model::card::Card;
use rikiki_core::model::player::PlayerId;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::TrickRecord;
use std::collections::{HashMap, HashSet};

/// Which suits one opponent might still hold, from one observer's point
/// of view. Starts full and only ever shrinks within a set.
#[derive(Debug, Clone, Default)]
pub struct OpponentModel {
    void: [bool; 4],
}

impl OpponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn may_hold(&self, suit: Suit) -> bool {
        !self.void[suit.index()]
    }

    pub fn mark_void(&mut self, suit: Suit) {
        self.void[suit.index()] = true;
    }
}

/// Everything the bots remember about the current set: the discard pile
/// so far and, per bot, a model of every opponent. Rebuilt whenever the
/// engine moves to a new set.
#[derive(Debug, Default)]
pub struct SetMemory {
    stamp: Option<(u32, u32)>,
    played_out: HashSet<Card>,
    tricks_absorbed: usize,
    models: HashMap<PlayerId, HashMap<PlayerId, OpponentModel>>,
}

impl SetMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the memory in line with the engine: rebuilds at a set
    /// boundary, folds in tricks resolved since the last look, then reads
    /// voids off the unfinished trick so a shed suit counts immediately.
    pub fn sync(&mut self, state: &GameState) {
        let stamp = (state.games_completed(), state.set_number());
        if self.stamp != Some(stamp) {
            self.rebuild(state);
            self.stamp = Some(stamp);
        }

        let history = state.trick_history();
        for record in &history[self.tricks_absorbed..] {
            self.absorb(record);
        }
        self.tricks_absorbed = history.len();

        let table: Vec<Card> = state
            .trick_slots()
            .iter()
            .filter_map(|slot| slot.card())
            .collect();
        self.note_voids(&state.turn_order(), &table);
    }

    /// A suit fully accounted for by the discard pile plus the bot's own
    /// remaining cards cannot be in anyone else's hand.
    pub fn apply_exhaustion(&mut self, state: &GameState, bot: PlayerId) {
        let per_suit = state.deck().cards_per_suit();
        let table: Vec<Card> = state
            .trick_slots()
            .iter()
            .filter_map(|slot| slot.card())
            .collect();
        let held: Vec<Card> = state
            .player(bot)
            .map(|player| player.hand().remaining().collect())
            .unwrap_or_default();

        for suit in Suit::ALL {
            let known = self
                .played_out
                .iter()
                .chain(table.iter())
                .chain(held.iter())
                .filter(|card| card.suit == suit)
                .count();
            if known == per_suit {
                if let Some(models) = self.models.get_mut(&bot) {
                    for model in models.values_mut() {
                        model.mark_void(suit);
                    }
                }
            }
        }
    }

    pub fn played_out(&self) -> &HashSet<Card> {
        &self.played_out
    }

    /// Whether `observer` still considers it possible that `opponent`
    /// holds a card of `suit`. Unknown pairs stay possible.
    pub fn may_hold(&self, observer: PlayerId, opponent: PlayerId, suit: Suit) -> bool {
        self.models
            .get(&observer)
            .and_then(|models| models.get(&opponent))
            .map(|model| model.may_hold(suit))
            .unwrap_or(true)
    }

    fn rebuild(&mut self, state: &GameState) {
        self.played_out.clear();
        self.tricks_absorbed = 0;
        self.models.clear();

        let seats: Vec<(PlayerId, bool)> =
            state.players().map(|p| (p.id(), p.is_bot())).collect();
        for &(bot, is_bot) in &seats {
            if !is_bot {
                continue;
            }
            let others = seats
                .iter()
                .filter(|&&(other, _)| other != bot)
                .map(|&(other, _)| (other, OpponentModel::new()))
                .collect();
            self.models.insert(bot, others);
        }
    }

    fn absorb(&mut self, record: &TrickRecord) {
        self.note_voids(&record.seats, &record.cards);
        self.played_out.extend(record.cards.iter().copied());
    }

    /// Follow-rule deductions: playing off the lead proves the lead suit
    /// is gone, and playing a plain card off the lead proves trump is
    /// gone too.
    fn note_voids(&mut self, seats: &[PlayerId], cards: &[Card]) {
        let Some(lead) = cards.first().map(|card| card.suit) else {
            return;
        };
        for (seat, card) in seats.iter().zip(cards).skip(1) {
            if card.suit == lead {
                continue;
            }
            for models in self.models.values_mut() {
                if let Some(model) = models.get_mut(seat) {
                    model.mark_void(lead);
                    if !card.is_trump() {
                        model.mark_void(Suit::TRUMP);
                    }
                }
            }
        }
    }
}
