use crate::memory::SetMemory;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rikiki_core::game::{Decider, GameState};
use rikiki_core::model::card::Card;
use rikiki_core::model::player::PlayerId;
use rikiki_core::model::suit::Suit;
use tracing::debug;

/// Heuristic automated player. Bids by estimating winnable tricks from
/// rank strength and tracked information, then plays toward hitting that
/// bid exactly rather than winning as much as possible.
pub struct BotStrategy {
    memory: SetMemory,
    rng: SmallRng,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SeekWin,
    SeekLoss,
}

impl BotStrategy {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Tie-breaks are the only random choices a bot makes; seeding them
    /// makes whole games replayable.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            memory: SetMemory::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

}

impl Default for BotStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Decider for BotStrategy {
    fn decide_bid(&mut self, state: &GameState, seat: PlayerId) -> u8 {
        self.memory.sync(state);
        let obs = Observation::new(state, &self.memory, seat);
        let estimate = estimate_tricks(&obs);

        let mut bid = estimate.floor() as i32;
        if state.forbidden_last_bid() == Some(bid as u8) {
            // Nudge off the forbidden total, never past the hand size.
            if bid == 0 || (estimate > f64::from(bid) && bid < i32::from(state.hand_size())) {
                bid += 1;
            } else {
                bid -= 1;
            }
        }
        debug!(seat = %seat, estimate, bid, "bid decided");
        bid as u8
    }

    fn decide_card(&mut self, state: &GameState, seat: PlayerId) -> Card {
        self.memory.sync(state);
        self.memory.apply_exhaustion(state, seat);

        let mut legal = state.legal_plays(seat);
        legal.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.suit.cmp(&b.suit)));
        if legal.len() == 1 {
            return legal[0];
        }

        let obs = Observation::new(state, &self.memory, seat);
        if no_rank_gaps(&legal, &obs) {
            // The legal cards are informationally identical.
            return legal[self.rng.gen_range(0..legal.len())];
        }

        let player = state.player(seat).expect("deciding seat is at the table");
        let needed = i32::from(player.bid().unwrap_or(0)) - i32::from(player.tricks_won());
        let remaining = player.hand().remaining_count() as i32;
        let mode = if needed < 0 {
            Mode::SeekLoss
        } else if remaining < needed {
            Mode::SeekWin
        } else if estimate_tricks(&obs) > f64::from(needed) {
            Mode::SeekLoss
        } else {
            Mode::SeekWin
        };

        let card = match mode {
            Mode::SeekWin => seek_win(&mut self.rng, &legal, &obs),
            Mode::SeekLoss => seek_loss(&mut self.rng, &legal, &obs),
        };
        debug!(seat = %seat, mode = ?mode, card = %card, "card decided");
        card
    }
}

/// Read-only view of everything one bot may base a decision on: its own
/// hand, the table, the discard pile, and its opponent models.
struct Observation<'a> {
    state: &'a GameState,
    memory: &'a SetMemory,
    seat: PlayerId,
    held: Vec<Card>,
    table: Vec<Card>,
    order: Vec<PlayerId>,
    position: usize,
}

impl<'a> Observation<'a> {
    fn new(state: &'a GameState, memory: &'a SetMemory, seat: PlayerId) -> Self {
        let held = state
            .player(seat)
            .expect("observing seat is at the table")
            .hand()
            .remaining()
            .collect();
        let table = state
            .trick_slots()
            .iter()
            .filter_map(|slot| slot.card())
            .collect();
        let order = state.turn_order();
        let position = order
            .iter()
            .position(|&id| id == seat)
            .expect("observing seat is in the turn order");
        Self {
            state,
            memory,
            seat,
            held,
            table,
            order,
            position,
        }
    }

    fn known(&self) -> impl Iterator<Item = &Card> {
        self.memory
            .played_out()
            .iter()
            .chain(self.table.iter())
            .chain(self.held.iter())
    }

    fn known_in_suit(&self, suit: Suit) -> usize {
        self.known().filter(|card| card.suit == suit).count()
    }

    /// Every card above this one in its suit is already accounted for.
    fn is_highest_remaining(&self, card: Card) -> bool {
        let top = self.state.deck().highest_rank().value();
        let higher = self
            .known()
            .filter(|known| known.suit == card.suit && known.rank > card.rank)
            .count();
        higher == usize::from(top - card.rank.value())
    }

    /// Every card below this one in its suit is already accounted for.
    fn is_lowest_remaining(&self, card: Card) -> bool {
        let bottom = self.state.deck().lowest_rank().value();
        let lower = self
            .known()
            .filter(|known| known.suit == card.suit && known.rank < card.rank)
            .count();
        lower == usize::from(card.rank.value() - bottom)
    }

    fn winning_card(&self) -> Option<Card> {
        self.state.winning_card()
    }

    fn last_to_act(&self) -> bool {
        self.position + 1 == self.order.len()
    }

    fn opponents_to_act(&self) -> &[PlayerId] {
        &self.order[self.position + 1..]
    }

    /// No opponent still to act would trump a lead of this suit.
    fn suit_could_win(&self, suit: Suit) -> bool {
        self.opponents_to_act().iter().all(|&opp| {
            self.memory.may_hold(self.seat, opp, suit)
                || !self.memory.may_hold(self.seat, opp, Suit::TRUMP)
        })
    }

    /// Some opponent still to act can follow higher or trump in.
    fn suit_could_lose(&self, suit: Suit) -> bool {
        self.opponents_to_act().iter().any(|&opp| {
            self.memory.may_hold(self.seat, opp, suit)
                || self.memory.may_hold(self.seat, opp, Suit::TRUMP)
        })
    }

    fn opponents_all_trump_void(&self) -> bool {
        self.state
            .players()
            .map(|player| player.id())
            .filter(|&id| id != self.seat)
            .all(|id| !self.memory.may_hold(self.seat, id, Suit::TRUMP))
    }
}

/// Expected tricks for the observed hand. Cards above the deck-density
/// threshold count in full, lower trumps keep a residual chance, lower
/// plain cards fade out linearly.
fn estimate_tricks(obs: &Observation<'_>) -> f64 {
    let deck = obs.state.deck();
    let top = f64::from(deck.highest_rank().value());
    let per_suit = deck.cards_per_suit() as f64;
    let players = obs.state.player_count() as f64;
    let threshold = top - per_suit / players + 1.0;

    let mut estimate = 0.0;
    for &card in &obs.held {
        let value = f64::from(card.rank.value());
        let shortfall = threshold - value;
        estimate += if value > threshold || obs.is_highest_remaining(card) {
            1.0
        } else if card.is_trump() {
            if obs.opponents_all_trump_void() {
                1.0
            } else if shortfall < 1.0 {
                shortfall.max(0.5)
            } else {
                0.5
            }
        } else if shortfall < 1.0 {
            shortfall
        } else {
            0.0
        };
    }
    estimate
}

/// True when the legal cards sit in one suit and every rank between them
/// is already in the discard pile: no choice among them can matter.
/// Cards on the live trick stay out of it, since they still decide the
/// current winner.
fn no_rank_gaps(legal: &[Card], obs: &Observation<'_>) -> bool {
    let suit = legal[0].suit;
    if legal.iter().any(|card| card.suit != suit) {
        return false;
    }
    let low = legal[0];
    let high = legal[legal.len() - 1];
    let span = usize::from(high.rank.value() - low.rank.value()) + 1;
    let expected_out = span - legal.len();
    if expected_out == 0 {
        return true;
    }
    let out = obs
        .memory
        .played_out()
        .iter()
        .filter(|card| {
            card.suit == suit && card.rank > low.rank && card.rank < high.rank
        })
        .count();
    out == expected_out
}

fn seek_win(rng: &mut SmallRng, legal: &[Card], obs: &Observation<'_>) -> Card {
    match obs.winning_card() {
        None => {
            // Leading: press the strongest claim we can make.
            let sure: Vec<Card> = legal
                .iter()
                .copied()
                .filter(|&card| obs.is_highest_remaining(card))
                .collect();
            let pool = if sure.is_empty() {
                let best = legal[legal.len() - 1].rank;
                legal.iter().copied().filter(|c| c.rank == best).collect()
            } else {
                sure
            };
            let pool = retain_or_all(pool, |card| obs.suit_could_win(card.suit));
            pick_scarcest(rng, &pool, obs)
        }
        Some(winning) => {
            let beating: Vec<Card> = legal
                .iter()
                .copied()
                .filter(|&card| card.beats(winning))
                .collect();
            let sure: Vec<Card> = beating
                .iter()
                .copied()
                .filter(|&card| obs.is_highest_remaining(card))
                .collect();
            if !sure.is_empty() {
                let pool = retain_or_all(sure, |card| obs.suit_could_win(card.suit));
                return pick_scarcest(rng, &pool, obs);
            }
            if obs.last_to_act() && !beating.is_empty() {
                // The cheapest card that takes the trick outright.
                return beating[0];
            }
            legal[0]
        }
    }
}

fn seek_loss(rng: &mut SmallRng, legal: &[Card], obs: &Observation<'_>) -> Card {
    match obs.winning_card() {
        None => {
            // Leading: offer the card most likely to be overtaken.
            let sure: Vec<Card> = legal
                .iter()
                .copied()
                .filter(|&card| obs.is_lowest_remaining(card))
                .collect();
            let pool = if sure.is_empty() {
                let worst = legal[0].rank;
                legal.iter().copied().filter(|c| c.rank == worst).collect()
            } else {
                sure
            };
            let pool = retain_or_all(pool, |card| obs.suit_could_lose(card.suit));
            pick_scarcest(rng, &pool, obs)
        }
        Some(winning) => {
            let ducks: Vec<Card> = legal
                .iter()
                .copied()
                .filter(|&card| !card.beats(winning))
                .collect();
            if !ducks.is_empty() {
                return discard_choice(&ducks, obs);
            }
            if obs.last_to_act() {
                // The trick is ours either way; shed the heaviest card.
                return discard_choice(legal, obs);
            }
            // Overtake as cheaply as possible and hope to be overtaken.
            legal[0]
        }
    }
}

/// Fewest known cards in the suit means the most unseen ones, and so the
/// most room for the guess to come true. Ties break randomly.
fn pick_scarcest(rng: &mut SmallRng, pool: &[Card], obs: &Observation<'_>) -> Card {
    let mut best: Vec<Card> = Vec::new();
    let mut best_known = usize::MAX;
    for &card in pool {
        let known = obs.known_in_suit(card.suit);
        if known < best_known {
            best_known = known;
            best.clear();
        }
        if known == best_known {
            best.push(card);
        }
    }
    best[rng.gen_range(0..best.len())]
}

/// The card to get rid of: spare guaranteed losers, empty short suits
/// first, otherwise shed the highest.
fn discard_choice(cards: &[Card], obs: &Observation<'_>) -> Card {
    let shed: Vec<Card> = cards
        .iter()
        .copied()
        .filter(|&card| !obs.is_lowest_remaining(card))
        .collect();
    let pool = if shed.is_empty() { cards.to_vec() } else { shed };
    for &card in pool.iter().rev() {
        let in_suit = obs.held.iter().filter(|held| held.suit == card.suit).count();
        if in_suit == 1 {
            return card;
        }
    }
    pool[pool.len() - 1]
}

fn retain_or_all<F>(pool: Vec<Card>, keep: F) -> Vec<Card>
where
    F: Fn(&Card) -> bool,
{
    let kept: Vec<Card> = pool.iter().copied().filter(|card| keep(card)).collect();
    if kept.is_empty() { pool } else { kept }
}
