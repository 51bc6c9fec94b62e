use crate::game::points;
use crate::game::serialization::{GameSnapshot, PlayerSnapshot};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{FairnessMarker, Player, PlayerId, PlayerRef};
use crate::model::suit::Suit;
use crate::model::trick::{CardSlot, Trick, TrickRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::fmt;

/// Sets never start above ten cards even when the deck could serve more.
pub const MAX_HAND_SIZE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bidding,
    Playing,
    SetDone,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    UnsupportedPlayerCount(usize),
    DuplicatePlayer(PlayerId),
    UnevenHands,
    ForeignCard(Card),
    DuplicateCard(Card),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::UnsupportedPlayerCount(count) => {
                write!(f, "cannot seat {count} players")
            }
            SetupError::DuplicatePlayer(id) => write!(f, "{id} is seated twice"),
            SetupError::UnevenHands => write!(f, "every seat needs the same non-zero hand size"),
            SetupError::ForeignCard(card) => {
                write!(f, "{card} does not belong to this table's deck")
            }
            SetupError::DuplicateCard(card) => write!(f, "{card} was dealt twice"),
        }
    }
}

impl std::error::Error for SetupError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidError {
    NotBidding,
    UnknownPlayer(PlayerId),
    OutOfTurn { expected: PlayerId, actual: PlayerId },
    AboveHandSize { bid: u8, hand_size: u8 },
    ForbiddenExactTotal { bid: u8 },
}

impl fmt::Display for BidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidError::NotBidding => write!(f, "no bidding is in progress"),
            BidError::UnknownPlayer(id) => write!(f, "{id} is not seated at this table"),
            BidError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to bid next but got {actual}")
            }
            BidError::AboveHandSize { bid, hand_size } => {
                write!(f, "bid {bid} exceeds the hand size {hand_size}")
            }
            BidError::ForbiddenExactTotal { bid } => {
                write!(f, "last bid {bid} would make the bids add up to the hand size")
            }
        }
    }
}

impl std::error::Error for BidError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    NotPlaying,
    UnknownPlayer(PlayerId),
    OutOfTurn { expected: PlayerId, actual: PlayerId },
    CardNotHeld(Card),
    MustFollowSuit(Suit),
    MustPlayTrump,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::NotPlaying => write!(f, "no trick is in progress"),
            PlayError::UnknownPlayer(id) => write!(f, "{id} is not seated at this table"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            PlayError::CardNotHeld(card) => write!(f, "{card} is not held"),
            PlayError::MustFollowSuit(suit) => write!(f, "must follow the {suit} lead"),
            PlayError::MustPlayTrump => write!(f, "must play trump when unable to follow"),
        }
    }
}

impl std::error::Error for PlayError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetStartError {
    SetStillRunning,
    GameExhausted,
}

impl fmt::Display for SetStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetStartError::SetStillRunning => write!(f, "the current set has not finished"),
            SetStartError::GameExhausted => {
                write!(f, "the one-card set has been played; start a new game")
            }
        }
    }
}

impl std::error::Error for SetStartError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceError {
    RejectedBid(BidError),
    RejectedCard(PlayError),
}

impl fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvanceError::RejectedBid(err) => write!(f, "bot bid rejected: {err}"),
            AdvanceError::RejectedCard(err) => write!(f, "bot card rejected: {err}"),
        }
    }
}

impl std::error::Error for AdvanceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    Recorded,
    BiddingComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: PlayerId },
    SetCompleted { winner: PlayerId },
}

/// Decision seam for automated players. Implementations read the engine
/// through its query surface and never mutate it; every move they return
/// is re-validated by the same submit API human callers use.
pub trait Decider {
    fn decide_bid(&mut self, state: &GameState, seat: PlayerId) -> u8;
    fn decide_card(&mut self, state: &GameState, seat: PlayerId) -> Card;
}

/// Authoritative table state: seating, the per-set deal, bidding, tricks,
/// scoring, and the fairness rotation across games.
#[derive(Debug, Clone)]
pub struct GameState {
    players: Vec<Player>,
    seating: Vec<usize>,
    set_order: Vec<usize>,
    turn_order: Vec<usize>,
    deck: Deck,
    rng: StdRng,
    seed: u64,
    opening_hand_size: u8,
    hand_size: u8,
    set_number: u32,
    games_completed: u32,
    deals_made: u32,
    bids_placed: usize,
    current_trick: Trick,
    history: Vec<TrickRecord>,
    phase: Phase,
}

impl GameState {
    pub fn new(players: Vec<PlayerRef>, seed: u64) -> Result<Self, SetupError> {
        let deck = Deck::for_players(players.len());
        let opening = (deck.len() / players.len().max(1)) as u8;
        Self::with_opening(players, seed, opening.min(MAX_HAND_SIZE))
    }

    /// Starts games at a smaller opening hand size than the deck allows.
    /// Useful for short games and deterministic tests.
    pub fn with_opening(
        players: Vec<PlayerRef>,
        seed: u64,
        opening_hand_size: u8,
    ) -> Result<Self, SetupError> {
        let mut state = Self::assemble(players, seed, opening_hand_size)?;
        state.start_game();
        Ok(state)
    }

    /// Seats the table without dealing anything yet.
    fn assemble(
        players: Vec<PlayerRef>,
        seed: u64,
        opening_hand_size: u8,
    ) -> Result<Self, SetupError> {
        let count = players.len();
        if !points::supports(count) {
            return Err(SetupError::UnsupportedPlayerCount(count));
        }
        for (index, reference) in players.iter().enumerate() {
            if players[..index].iter().any(|other| other.id == reference.id) {
                return Err(SetupError::DuplicatePlayer(reference.id));
            }
        }

        let deck = Deck::for_players(count);
        let ceiling = ((deck.len() / count) as u8).min(MAX_HAND_SIZE);
        let opening = opening_hand_size.clamp(1, ceiling);

        Ok(Self {
            players: players.into_iter().map(Player::new).collect(),
            seating: (0..count).collect(),
            set_order: Vec::new(),
            turn_order: Vec::new(),
            deck,
            rng: StdRng::seed_from_u64(seed),
            seed,
            opening_hand_size: opening,
            hand_size: opening,
            set_number: 0,
            games_completed: 0,
            deals_made: 0,
            bids_placed: 0,
            current_trick: Trick::new(count),
            history: Vec::new(),
            phase: Phase::GameOver,
        })
    }

    /// Seats the table with a scripted deal instead of a shuffle and opens
    /// bidding on it. Meant for rehearsing exact positions; the fairness
    /// cycle is left untouched.
    pub fn from_hands(
        players: Vec<PlayerRef>,
        hands: Vec<Vec<Card>>,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let mut state = Self::assemble(players, seed, 1)?;
        if hands.len() != state.players.len() {
            return Err(SetupError::UnevenHands);
        }
        let size = hands[0].len();
        if size == 0 || hands.iter().any(|hand| hand.len() != size) {
            return Err(SetupError::UnevenHands);
        }
        let mut seen = HashSet::new();
        for &card in hands.iter().flatten() {
            if !state.deck.cards().contains(&card) {
                return Err(SetupError::ForeignCard(card));
            }
            if !seen.insert(card) {
                return Err(SetupError::DuplicateCard(card));
            }
        }

        state.opening_hand_size = size as u8;
        state.hand_size = size as u8;
        state.set_order = state.seating.clone();
        for (slot, cards) in hands.into_iter().enumerate() {
            let index = state.set_order[slot];
            state.players[index].deal(Hand::with_cards(cards));
        }
        state.turn_order = state.set_order.clone();
        state.current_trick = Trick::new(state.players.len());
        state.phase = Phase::Bidding;
        Ok(state)
    }

    /// Captures the state that survives a game boundary. Restoring resumes
    /// at the start of the next game, as mid-set state is never persisted.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            seed: self.seed,
            opening_hand_size: self.opening_hand_size,
            games_completed: self.games_completed,
            deals_made: self.deals_made,
            players: self
                .seating
                .iter()
                .map(|&index| {
                    let player = &self.players[index];
                    PlayerSnapshot {
                        id: player.id(),
                        is_bot: player.is_bot(),
                        points: player.points(),
                        marker: player.marker(),
                    }
                })
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<Self, SetupError> {
        let references = snapshot
            .players
            .iter()
            .map(|player| PlayerRef::new(player.id, player.is_bot))
            .collect();
        let mut state = Self::assemble(references, snapshot.seed, snapshot.opening_hand_size)?;

        // Replay the shuffles drawn before the snapshot so future deals
        // continue the recorded sequence.
        let mut burner = state.deck.clone();
        for _ in 0..snapshot.deals_made {
            burner.shuffle_in_place(&mut state.rng);
        }
        state.deals_made = snapshot.deals_made;
        state.games_completed = snapshot.games_completed;
        for (player, saved) in state.players.iter_mut().zip(&snapshot.players) {
            player.set_points(saved.points);
            player.set_marker(saved.marker);
        }

        state.start_game();
        Ok(state)
    }

    /// Begins a fresh game: fairness rotation, full hand size, new deal.
    /// Callable at any time; a game abandoned mid-way does not count
    /// toward the fairness cycle.
    pub fn start_game(&mut self) {
        let completed = matches!(self.phase, Phase::GameOver) && self.games_completed > 0;
        for player in &mut self.players {
            if player.marker() == FairnessMarker::Pending {
                let marker = if completed {
                    FairnessMarker::Served
                } else {
                    FairnessMarker::Unset
                };
                player.set_marker(marker);
            }
        }
        if self
            .players
            .iter()
            .all(|player| player.marker() == FairnessMarker::Served)
        {
            for player in &mut self.players {
                player.set_marker(FairnessMarker::Unset);
            }
        }

        // Rotate the seating until the seat that will be last to bid in the
        // final one-card set has not served that role in the current cycle.
        for _ in 0..self.players.len() {
            let predicted = self.predicted_final_last_bidder();
            if self.players[predicted].marker() == FairnessMarker::Served {
                self.seating.rotate_left(1);
            } else {
                self.players[predicted].set_marker(FairnessMarker::Pending);
                break;
            }
        }

        self.set_number = 0;
        self.hand_size = self.opening_hand_size;
        self.set_order = self.seating.clone();
        self.deal_set();
    }

    /// Deals the next, one-card-smaller set. After the one-card set the
    /// game is exhausted and only `start_game` can continue.
    pub fn start_set(&mut self) -> Result<(), SetStartError> {
        match self.phase {
            Phase::SetDone => {}
            Phase::GameOver => return Err(SetStartError::GameExhausted),
            Phase::Bidding | Phase::Playing => return Err(SetStartError::SetStillRunning),
        }
        self.set_number += 1;
        self.hand_size -= 1;
        self.set_order.rotate_left(1);
        self.deal_set();
        Ok(())
    }

    pub fn submit_bid(&mut self, seat: PlayerId, bid: u8) -> Result<BidOutcome, BidError> {
        if self.phase != Phase::Bidding {
            return Err(BidError::NotBidding);
        }
        if self.player(seat).is_none() {
            return Err(BidError::UnknownPlayer(seat));
        }
        let index = self.set_order[self.bids_placed];
        let expected = self.players[index].id();
        if seat != expected {
            return Err(BidError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        if bid > self.hand_size {
            return Err(BidError::AboveHandSize {
                bid,
                hand_size: self.hand_size,
            });
        }
        if self.bids_placed + 1 == self.players.len()
            && self.bid_total() + bid == self.hand_size
        {
            return Err(BidError::ForbiddenExactTotal { bid });
        }

        self.players[index].set_bid(bid);
        self.bids_placed += 1;
        if self.bids_placed == self.players.len() {
            self.phase = Phase::Playing;
            Ok(BidOutcome::BiddingComplete)
        } else {
            Ok(BidOutcome::Recorded)
        }
    }

    pub fn submit_card(&mut self, seat: PlayerId, card: Card) -> Result<PlayOutcome, PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::NotPlaying);
        }
        if self.player(seat).is_none() {
            return Err(PlayError::UnknownPlayer(seat));
        }
        let position = self.current_trick.plays_made();
        let index = self.turn_order[position];
        let expected = self.players[index].id();
        if seat != expected {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        let hand = self.players[index].hand();
        if !hand.contains(card) {
            return Err(PlayError::CardNotHeld(card));
        }
        if let Some(lead) = self.current_trick.lead_suit() {
            if card.suit != lead {
                if hand.has_suit(lead) {
                    return Err(PlayError::MustFollowSuit(lead));
                }
                if !card.is_trump() && hand.has_suit(Suit::TRUMP) {
                    return Err(PlayError::MustPlayTrump);
                }
            }
        }

        self.players[index].hand_mut().play(card);
        self.current_trick.record(card);
        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner_slot = self
            .current_trick
            .winner_slot()
            .expect("complete trick has a winner");
        let winner_index = self.turn_order[winner_slot];
        self.players[winner_index].record_trick_won();
        let winner = self.players[winner_index].id();

        self.history.push(TrickRecord {
            seats: self
                .turn_order
                .iter()
                .map(|&index| self.players[index].id())
                .collect(),
            cards: self.current_trick.cards().collect(),
            winner,
        });

        if self.history.len() == self.hand_size as usize {
            self.apply_scores();
            self.phase = if self.hand_size == 1 {
                self.games_completed += 1;
                Phase::GameOver
            } else {
                Phase::SetDone
            };
            return Ok(PlayOutcome::SetCompleted { winner });
        }

        self.turn_order.rotate_left(winner_slot);
        self.current_trick = Trick::new(self.players.len());
        Ok(PlayOutcome::TrickCompleted { winner })
    }

    /// Runs every pending bot decision through the regular submit API,
    /// stopping at the next human turn or set boundary.
    pub fn advance_bots(&mut self, decider: &mut dyn Decider) -> Result<(), AdvanceError> {
        loop {
            let Some(seat) = self.current_player() else {
                return Ok(());
            };
            let is_bot = self
                .player(seat)
                .map(Player::is_bot)
                .unwrap_or(false);
            if !is_bot {
                return Ok(());
            }
            if self.phase == Phase::Bidding {
                let bid = decider.decide_bid(self, seat);
                self.submit_bid(seat, bid)
                    .map_err(AdvanceError::RejectedBid)?;
            } else {
                let card = decider.decide_card(self, seat);
                self.submit_card(seat, card)
                    .map_err(AdvanceError::RejectedCard)?;
            }
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn hand_size(&self) -> u8 {
        self.hand_size
    }

    pub fn opening_hand_size(&self) -> u8 {
        self.opening_hand_size
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn games_completed(&self) -> u32 {
        self.games_completed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_bidding(&self) -> bool {
        self.phase == Phase::Bidding
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_set_done(&self) -> bool {
        self.phase == Phase::SetDone
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn player(&self, seat: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == seat)
    }

    /// Bidding order of the current set; the last entry is the seat under
    /// the exact-total restriction.
    pub fn bidding_order(&self) -> Vec<PlayerId> {
        self.set_order
            .iter()
            .map(|&index| self.players[index].id())
            .collect()
    }

    /// Play order of the current trick, winner of the previous trick first.
    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .map(|&index| self.players[index].id())
            .collect()
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        let index = match self.phase {
            Phase::Bidding => self.set_order[self.bids_placed],
            Phase::Playing => self.turn_order[self.current_trick.plays_made()],
            Phase::SetDone | Phase::GameOver => return None,
        };
        Some(self.players[index].id())
    }

    pub fn bids_placed(&self) -> usize {
        self.bids_placed
    }

    pub fn bid_total(&self) -> u8 {
        self.players
            .iter()
            .filter_map(Player::bid)
            .sum()
    }

    /// How far the placed bids overshoot the hand size. Negative means the
    /// set is under-bid and somebody must take unwanted tricks.
    pub fn bid_surplus(&self) -> i32 {
        i32::from(self.bid_total()) - i32::from(self.hand_size)
    }

    /// The one value the last bidder may not choose, once everyone else
    /// has bid.
    pub fn forbidden_last_bid(&self) -> Option<u8> {
        if self.phase == Phase::Bidding && self.bids_placed + 1 == self.players.len() {
            self.hand_size.checked_sub(self.bid_total())
        } else {
            None
        }
    }

    pub fn trick_number(&self) -> usize {
        self.history.len()
    }

    pub fn trick_slots(&self) -> &[CardSlot] {
        self.current_trick.slots()
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.current_trick.lead_suit()
    }

    pub fn winning_card(&self) -> Option<Card> {
        self.current_trick.winning_card()
    }

    pub fn provisional_winner(&self) -> Option<PlayerId> {
        self.current_trick
            .winner_slot()
            .map(|slot| self.players[self.turn_order[slot]].id())
    }

    pub fn trick_history(&self) -> &[TrickRecord] {
        &self.history
    }

    /// The cards `seat` could legally put on the current trick.
    pub fn legal_plays(&self, seat: PlayerId) -> Vec<Card> {
        let Some(player) = self.player(seat) else {
            return Vec::new();
        };
        let hand = player.hand();
        match self.current_trick.lead_suit() {
            Some(lead) if hand.has_suit(lead) => {
                hand.remaining().filter(|card| card.suit == lead).collect()
            }
            Some(_) if hand.has_suit(Suit::TRUMP) => {
                hand.remaining().filter(|card| card.is_trump()).collect()
            }
            _ => hand.remaining().collect(),
        }
    }

    fn predicted_final_last_bidder(&self) -> usize {
        let count = self.seating.len();
        let rotation = (self.opening_hand_size as usize - 1) % count;
        self.seating[(rotation + count - 1) % count]
    }

    fn deal_set(&mut self) {
        let count = self.players.len();
        let mut deal = self.deck.clone();
        deal.shuffle_in_place(&mut self.rng);
        self.deals_made += 1;
        let mut cards = deal.cards().iter().copied();

        let mut dealt: Vec<Vec<Card>> = vec![Vec::with_capacity(self.hand_size as usize); count];
        for _ in 0..self.hand_size {
            for slot in 0..count {
                dealt[slot].push(cards.next().expect("deck covers the hand size"));
            }
        }
        for (slot, hand) in dealt.into_iter().enumerate() {
            let index = self.set_order[slot];
            self.players[index].deal(Hand::with_cards(hand));
        }

        self.bids_placed = 0;
        self.history.clear();
        self.current_trick = Trick::new(count);
        self.turn_order = self.set_order.clone();
        self.phase = Phase::Bidding;
    }

    fn apply_scores(&mut self) {
        let winner_count = self.players.iter().filter(|p| p.hit_bid()).count();
        let count = self.players.len();
        debug_assert!(winner_count < count, "bid restriction precludes a clean sweep");
        if winner_count == 0 {
            return;
        }
        let win_points = points::winner_points(count, winner_count);
        let lose_points = -(winner_count as f32 * win_points) / (count - winner_count) as f32;
        for player in &mut self.players {
            let delta = if player.hit_bid() {
                win_points
            } else {
                lose_points
            };
            player.add_points(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BidError, BidOutcome, Decider, GameState, PlayError, PlayOutcome, SetStartError,
        SetupError,
    };
    use crate::model::card::Card;
    use crate::model::player::{FairnessMarker, PlayerId, PlayerRef};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn refs(count: usize) -> Vec<PlayerRef> {
        (0..count)
            .map(|i| PlayerRef::new(PlayerId(i as u32), true))
            .collect()
    }

    /// Minimal legal driver: bids zero unless forbidden, plays the first
    /// legal card.
    struct Lowball;

    impl Decider for Lowball {
        fn decide_bid(&mut self, state: &GameState, _seat: PlayerId) -> u8 {
            match state.forbidden_last_bid() {
                Some(0) => 1,
                _ => 0,
            }
        }

        fn decide_card(&mut self, state: &GameState, seat: PlayerId) -> Card {
            state.legal_plays(seat)[0]
        }
    }

    #[test]
    fn opening_hand_size_follows_deck_and_cap() {
        assert_eq!(GameState::new(refs(4), 1).unwrap().hand_size(), 10);
        assert_eq!(GameState::new(refs(3), 1).unwrap().hand_size(), 10);
        assert_eq!(GameState::new(refs(6), 1).unwrap().hand_size(), 8);
        assert_eq!(GameState::new(refs(7), 1).unwrap().hand_size(), 7);
    }

    #[test]
    fn unsupported_player_counts_are_refused() {
        assert_eq!(
            GameState::new(refs(1), 0).unwrap_err(),
            SetupError::UnsupportedPlayerCount(1)
        );
        assert_eq!(
            GameState::new(refs(8), 0).unwrap_err(),
            SetupError::UnsupportedPlayerCount(8)
        );
    }

    #[test]
    fn duplicate_seats_are_refused() {
        let mut players = refs(3);
        players[2] = players[0];
        assert_eq!(
            GameState::new(players, 0).unwrap_err(),
            SetupError::DuplicatePlayer(PlayerId(0))
        );
    }

    #[test]
    fn every_player_gets_a_full_sorted_hand() {
        let state = GameState::new(refs(5), 9).unwrap();
        for player in state.players() {
            assert_eq!(player.hand().len(), 10);
            assert_eq!(player.hand().remaining_count(), 10);
            let ranks: Vec<_> = player.hand().remaining().map(|c| c.rank).collect();
            let mut sorted = ranks.clone();
            sorted.sort();
            assert_eq!(ranks, sorted);
        }
        assert!(state.is_bidding());
    }

    #[test]
    fn bids_are_taken_in_seating_order() {
        let mut state = GameState::new(refs(4), 3).unwrap();
        let order = state.bidding_order();
        assert_eq!(state.current_player(), Some(order[0]));
        assert_eq!(
            state.submit_bid(order[1], 0).unwrap_err(),
            BidError::OutOfTurn {
                expected: order[0],
                actual: order[1],
            }
        );
        assert_eq!(state.submit_bid(order[0], 2), Ok(BidOutcome::Recorded));
        assert_eq!(state.current_player(), Some(order[1]));
    }

    #[test]
    fn bid_above_hand_size_is_rejected() {
        let mut state = GameState::with_opening(refs(3), 3, 5).unwrap();
        let order = state.bidding_order();
        assert_eq!(
            state.submit_bid(order[0], 6).unwrap_err(),
            BidError::AboveHandSize {
                bid: 6,
                hand_size: 5,
            }
        );
        assert_eq!(state.player(order[0]).unwrap().bid(), None);
    }

    #[test]
    fn last_bidder_cannot_complete_the_hand_size() {
        let mut state = GameState::with_opening(refs(3), 3, 5).unwrap();
        let order = state.bidding_order();
        state.submit_bid(order[0], 1).unwrap();
        state.submit_bid(order[1], 2).unwrap();

        assert_eq!(state.forbidden_last_bid(), Some(2));
        assert_eq!(
            state.submit_bid(order[2], 2).unwrap_err(),
            BidError::ForbiddenExactTotal { bid: 2 }
        );
        assert!(state.is_bidding());
        assert_eq!(state.player(order[2]).unwrap().bid(), None);

        assert_eq!(
            state.submit_bid(order[2], 1),
            Ok(BidOutcome::BiddingComplete)
        );
        assert!(state.is_playing());
        assert_eq!(state.bid_surplus(), -1);
    }

    #[test]
    fn follow_rules_are_enforced() {
        let mut state = GameState::with_opening(refs(4), 11, 10).unwrap();
        let order = state.bidding_order();
        for (i, seat) in order.iter().enumerate() {
            let bid = if i + 1 == order.len() && state.forbidden_last_bid() == Some(0) {
                1
            } else {
                0
            };
            state.submit_bid(*seat, bid).unwrap();
        }

        let leader = state.current_player().unwrap();
        let lead = state.legal_plays(leader)[0];
        state.submit_card(leader, lead).unwrap();

        let follower = state.current_player().unwrap();
        let hand: Vec<_> = state.player(follower).unwrap().hand().remaining().collect();
        let holds_lead = hand.iter().any(|card| card.suit == lead.suit);
        if holds_lead {
            if let Some(&off_suit) = hand.iter().find(|card| card.suit != lead.suit) {
                assert_eq!(
                    state.submit_card(follower, off_suit).unwrap_err(),
                    PlayError::MustFollowSuit(lead.suit)
                );
            }
        }
        let legal = state.legal_plays(follower);
        assert!(state.submit_card(follower, legal[0]).is_ok());
    }

    #[test]
    fn trump_discard_wins_over_higher_lead_suit() {
        // Replays the canonical example: 9S led, KS follows, 2H trumps,
        // AS arrives too late.
        let mut trick = crate::model::trick::Trick::new(4);
        trick.record(Card::new(Rank::Nine, Suit::Spades));
        trick.record(Card::new(Rank::King, Suit::Spades));
        trick.record(Card::new(Rank::Two, Suit::Hearts));
        trick.record(Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(trick.winner_slot(), Some(2));
    }

    #[test]
    fn playing_a_full_set_scores_zero_sum_and_ends_it() {
        let mut state = GameState::with_opening(refs(4), 17, 4).unwrap();
        let mut bot = Lowball;
        state.advance_bots(&mut bot).unwrap();

        assert!(state.is_set_done() || state.is_game_over());
        let tricks: u8 = state.players().map(|p| p.tricks_won()).sum();
        assert_eq!(tricks, 4);
        let total: f32 = state.players().map(|p| p.points()).sum();
        assert!(total.abs() < 1e-4, "points must net to zero, got {total}");
    }

    #[test]
    fn sets_shrink_until_the_game_is_exhausted() {
        let mut state = GameState::with_opening(refs(3), 5, 3).unwrap();
        let mut bot = Lowball;

        state.advance_bots(&mut bot).unwrap();
        assert_eq!(state.hand_size(), 3);
        state.start_set().unwrap();
        assert_eq!(state.hand_size(), 2);
        state.advance_bots(&mut bot).unwrap();
        state.start_set().unwrap();
        assert_eq!(state.hand_size(), 1);
        state.advance_bots(&mut bot).unwrap();

        assert!(state.is_game_over());
        assert_eq!(state.start_set().unwrap_err(), SetStartError::GameExhausted);
        assert_eq!(state.games_completed(), 1);

        state.start_game();
        assert!(state.is_bidding());
        assert_eq!(state.hand_size(), 3);
    }

    #[test]
    fn set_rotation_moves_the_first_bidder() {
        let mut state = GameState::with_opening(refs(4), 23, 3).unwrap();
        let mut bot = Lowball;
        let first_order = state.bidding_order();

        state.advance_bots(&mut bot).unwrap();
        state.start_set().unwrap();

        let second_order = state.bidding_order();
        assert_eq!(second_order[0], first_order[1]);
        assert_eq!(second_order[3], first_order[0]);
    }

    #[test]
    fn trick_winner_leads_the_next_trick() {
        let mut state = GameState::with_opening(refs(4), 29, 5).unwrap();
        let order = state.bidding_order();
        for (i, seat) in order.iter().enumerate() {
            let bid = if i + 1 == order.len() && state.forbidden_last_bid() == Some(1) {
                2
            } else {
                1
            };
            state.submit_bid(*seat, bid).unwrap();
        }

        let mut outcome = None;
        while outcome.is_none() {
            let seat = state.current_player().unwrap();
            let card = state.legal_plays(seat)[0];
            match state.submit_card(seat, card).unwrap() {
                PlayOutcome::TrickCompleted { winner } => outcome = Some(winner),
                PlayOutcome::Played => {}
                PlayOutcome::SetCompleted { .. } => unreachable!("five tricks remain"),
            }
        }

        let winner = outcome.unwrap();
        assert_eq!(state.turn_order()[0], winner);
        assert_eq!(state.current_player(), Some(winner));
        assert_eq!(
            state.player(winner).unwrap().tricks_won(),
            1
        );
    }

    #[test]
    fn queries_are_stable_between_mutations() {
        let state = GameState::new(refs(4), 31).unwrap();
        assert_eq!(state.bidding_order(), state.bidding_order());
        assert_eq!(state.current_player(), state.current_player());
        assert_eq!(state.trick_slots(), state.trick_slots());
        assert_eq!(state.bid_total(), state.bid_total());
    }

    #[test]
    fn fairness_rotation_serves_every_seat_once_per_cycle() {
        for &count in &[3usize, 4, 5] {
            let mut state = GameState::with_opening(refs(count), 41, 3).unwrap();
            let mut bot = Lowball;
            let mut pending_counts = vec![0u32; count];

            for _ in 0..2 * count {
                let pending: Vec<_> = state
                    .players()
                    .filter(|p| p.marker() == FairnessMarker::Pending)
                    .map(|p| p.id())
                    .collect();
                assert_eq!(pending.len(), 1, "exactly one seat is pending per game");
                pending_counts[pending[0].0 as usize] += 1;

                loop {
                    state.advance_bots(&mut bot).unwrap();
                    if state.is_game_over() {
                        break;
                    }
                    state.start_set().unwrap();
                }
                state.start_game();
            }

            assert!(
                pending_counts.iter().all(|&c| c == 2),
                "{count} players: uneven fairness counts {pending_counts:?}"
            );
        }
    }

    #[test]
    fn abandoned_games_do_not_advance_the_fairness_cycle() {
        let mut state = GameState::with_opening(refs(3), 43, 2).unwrap();
        let before: Vec<_> = state
            .players()
            .filter(|p| p.marker() == FairnessMarker::Pending)
            .map(|p| p.id())
            .collect();

        // Restart mid-game: the pending seat reverts instead of serving.
        state.start_game();
        let after: Vec<_> = state
            .players()
            .filter(|p| p.marker() == FairnessMarker::Pending)
            .map(|p| p.id())
            .collect();
        assert_eq!(before, after);
        assert!(
            state
                .players()
                .all(|p| p.marker() != FairnessMarker::Served)
        );
    }
}
