use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Three players or fewer play with the short pack (ranks 7 and up).
const SHORT_PACK_CUTOFF: usize = 3;
const SHORT_PACK_LOWEST: Rank = Rank::Seven;

/// The card universe for one table. Kept around in full, not just as the
/// undealt remainder, so callers can reason about what exists at all.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    lowest_rank: Rank,
}

impl Deck {
    pub fn for_players(player_count: usize) -> Self {
        let lowest_rank = if player_count > SHORT_PACK_CUTOFF {
            Rank::Two
        } else {
            SHORT_PACK_LOWEST
        };

        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                if rank >= lowest_rank {
                    cards.push(Card::new(rank, suit));
                }
            }
        }

        Self { cards, lowest_rank }
    }

    pub fn shuffled_for_players<R: rand::Rng + ?Sized>(player_count: usize, rng: &mut R) -> Self {
        let mut deck = Self::for_players(player_count);
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(player_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled_for_players(player_count, &mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards_per_suit(&self) -> usize {
        self.cards.len() / Suit::ALL.len()
    }

    pub const fn highest_rank(&self) -> Rank {
        Rank::Ace
    }

    pub const fn lowest_rank(&self) -> Rank {
        self.lowest_rank
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::rank::Rank;
    use std::collections::HashSet;

    #[test]
    fn four_player_deck_has_52_unique_cards() {
        let deck = Deck::for_players(4);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(deck.len(), 52);
        assert_eq!(unique.len(), 52);
        assert_eq!(deck.cards_per_suit(), 13);
        assert_eq!(deck.lowest_rank(), Rank::Two);
    }

    #[test]
    fn three_player_deck_drops_ranks_below_seven() {
        let deck = Deck::for_players(3);
        assert_eq!(deck.len(), 32);
        assert_eq!(deck.cards_per_suit(), 8);
        assert_eq!(deck.lowest_rank(), Rank::Seven);
        assert!(deck.cards().iter().all(|card| card.rank >= Rank::Seven));
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(4, 42);
        let deck_b = Deck::shuffled_with_seed(4, 42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_is_a_permutation_of_the_same_cards() {
        let ordered: HashSet<_> = Deck::for_players(5).cards().iter().copied().collect();
        let shuffled: HashSet<_> = Deck::shuffled_with_seed(5, 7)
            .cards()
            .iter()
            .copied()
            .collect();
        assert_eq!(ordered, shuffled);
    }
}
