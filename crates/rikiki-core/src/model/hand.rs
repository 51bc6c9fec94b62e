use crate::model::card::Card;
use crate::model::suit::Suit;

/// One hand slot per trick of the current set. A played card leaves a
/// `Played` hole behind so the hand keeps its dealt length and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSlot {
    Held(Card),
    Played,
}

impl HandSlot {
    pub const fn card(self) -> Option<Card> {
        match self {
            HandSlot::Held(card) => Some(card),
            HandSlot::Played => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hand {
    slots: Vec<HandSlot>,
}

impl Hand {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Builds a hand from dealt cards, ordered by rank with the suit index
    /// as a fixed display tiebreak.
    pub fn with_cards(mut cards: Vec<Card>) -> Self {
        cards.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.suit.cmp(&b.suit)));
        Self {
            slots: cards.into_iter().map(HandSlot::Held).collect(),
        }
    }

    pub fn slots(&self) -> &[HandSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn remaining(&self) -> impl Iterator<Item = Card> + '_ {
        self.slots.iter().filter_map(|slot| slot.card())
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining().count()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.remaining().any(|held| held == card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.remaining().any(|held| held.suit == suit)
    }

    /// Marks the slot holding `card` as played. Returns false if the card
    /// is not (or no longer) held.
    pub fn play(&mut self, card: Card) -> bool {
        match self
            .slots
            .iter()
            .position(|slot| slot.card() == Some(card))
        {
            Some(index) => {
                self.slots[index] = HandSlot::Played;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Hand, HandSlot};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn dealt_cards_sort_by_rank_then_suit() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Clubs),
        ]);
        let ordered: Vec<_> = hand.remaining().collect();
        assert_eq!(ordered[0], Card::new(Rank::Seven, Suit::Clubs));
        assert_eq!(ordered[1], Card::new(Rank::Seven, Suit::Hearts));
        assert_eq!(ordered[2], Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn playing_keeps_the_slot_count() {
        let seven = Card::new(Rank::Seven, Suit::Clubs);
        let mut hand = Hand::with_cards(vec![seven, Card::new(Rank::Ten, Suit::Diamonds)]);

        assert!(hand.play(seven));
        assert_eq!(hand.len(), 2);
        assert_eq!(hand.remaining_count(), 1);
        assert_eq!(hand.slots()[0], HandSlot::Played);
        assert!(!hand.contains(seven));
    }

    #[test]
    fn playing_an_absent_card_is_refused() {
        let mut hand = Hand::with_cards(vec![Card::new(Rank::Ace, Suit::Clubs)]);
        assert!(!hand.play(Card::new(Rank::Ace, Suit::Spades)));
        let ace_clubs = Card::new(Rank::Ace, Suit::Clubs);
        assert!(hand.play(ace_clubs));
        assert!(!hand.play(ace_clubs));
    }

    #[test]
    fn has_suit_sees_only_held_cards() {
        let heart = Card::new(Rank::Nine, Suit::Hearts);
        let mut hand = Hand::with_cards(vec![heart, Card::new(Rank::Nine, Suit::Clubs)]);
        assert!(hand.has_suit(Suit::Hearts));
        hand.play(heart);
        assert!(!hand.has_suit(Suit::Hearts));
    }
}
