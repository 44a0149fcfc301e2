use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::card::{Card, Rank, Suit};

/// One standard 52-card deck, suits ♠ ♥ ♦ ♣ and ranks 2 through A.
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Fisher-Yates over a copy of `deck`; the input is left untouched.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

pub struct Shoe {
    pub num_decks: u8,
    cards: Vec<Card>,
    dealt: usize,
    size: usize,
    penetration_threshold: u8,
    rng: SmallRng,
}

impl Shoe {
    pub fn new(num_decks: u8, penetration_threshold: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut shoe = Shoe {
            num_decks: num_decks.max(1),
            cards: Vec::new(),
            dealt: 0,
            size: 0,
            penetration_threshold,
            rng,
        };
        shoe.reshuffle();
        shoe
    }

    /// A shoe that deals `cards` in the given order, first card first.
    ///
    /// Reshuffling it replaces the stack with freshly shuffled decks.
    pub fn stacked(cards: Vec<Card>) -> Self {
        let mut cards = cards;
        cards.reverse();
        let size = cards.len();
        Shoe {
            num_decks: 1,
            cards,
            dealt: 0,
            size,
            penetration_threshold: 0,
            rng: SmallRng::seed_from_u64(0),
        }
    }

    pub fn reshuffle(&mut self) {
        let mut cards = Vec::with_capacity(self.num_decks as usize * 52);
        for _ in 0..self.num_decks {
            cards.extend(create_deck());
        }
        self.cards = shuffle_deck(&cards, &mut self.rng);
        self.size = self.cards.len();
        self.dealt = 0;
        log::debug!("shoe reshuffled: {} cards", self.size);
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let card = self.cards.pop()?;
        self.dealt += 1;
        Some(card)
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    /// Percentage of the shoe dealt since the last shuffle.
    pub fn penetration(&self) -> f64 {
        if self.size == 0 {
            return 100.0;
        }
        (self.dealt as f64 / self.size as f64) * 100.0
    }

    pub fn should_reshuffle(&self) -> bool {
        self.dealt > 0 && self.penetration() >= self.penetration_threshold as f64
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::rngs::StdRng;

    use super::*;

    fn sorted_keys(cards: &[Card]) -> Vec<String> {
        let mut keys: Vec<String> = cards.iter().map(|card| card.to_string()).collect();
        keys.sort();
        keys
    }

    #[test]
    fn deck_has_52_unique_cards() {
        let deck = create_deck();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<(Suit, Rank)> = deck.iter().map(|card| (card.suit, card.rank)).collect();
        assert_eq!(unique.len(), 52);
        assert!(deck.iter().all(|card| !card.face_down));
    }

    #[test]
    fn deck_order_is_suit_major() {
        let deck = create_deck();
        assert_eq!(deck[0], Card::new(Suit::Spades, Rank::Two));
        assert_eq!(deck[12], Card::new(Suit::Spades, Rank::Ace));
        assert_eq!(deck[51], Card::new(Suit::Clubs, Rank::Ace));
    }

    #[test]
    fn deck_values_sum_to_380() {
        let total: u32 = create_deck().iter().map(|card| u32::from(card.value)).sum();
        assert_eq!(total, 380);
    }

    #[test]
    fn shuffle_is_a_permutation_and_leaves_input_alone() {
        let deck = create_deck();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let shuffled = shuffle_deck(&deck, &mut rng);
            assert_eq!(shuffled.len(), deck.len());
            assert_eq!(sorted_keys(&shuffled), sorted_keys(&deck));
        }
        assert_eq!(deck, create_deck());
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle_deck(&[], &mut rng).is_empty());
        let one = [Card::new(Suit::Hearts, Rank::Five)];
        assert_eq!(shuffle_deck(&one, &mut rng), one.to_vec());
    }

    #[test]
    fn shuffle_moves_cards_and_depends_on_seed() {
        let deck = create_deck();
        let first = shuffle_deck(&deck, &mut StdRng::seed_from_u64(1));
        let second = shuffle_deck(&deck, &mut StdRng::seed_from_u64(2));
        assert_ne!(first, deck);
        assert_ne!(second, deck);
        assert_ne!(first, second);
        assert_eq!(first, shuffle_deck(&deck, &mut StdRng::seed_from_u64(1)));
    }

    #[test]
    fn every_ordering_of_three_cards_is_equally_likely() {
        let cards = [
            Card::new(Suit::Spades, Rank::Two),
            Card::new(Suit::Spades, Rank::Three),
            Card::new(Suit::Spades, Rank::Four),
        ];
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts: HashMap<Vec<Rank>, u32> = HashMap::new();
        for _ in 0..60_000 {
            let order = shuffle_deck(&cards, &mut rng).iter().map(|card| card.rank).collect();
            *counts.entry(order).or_default() += 1;
        }
        // 10_000 expected per ordering, standard deviation is about 91.
        assert_eq!(counts.len(), 6);
        for (order, count) in counts {
            assert!((9_500..=10_500).contains(&count), "{order:?} seen {count} times");
        }
    }

    #[test]
    fn each_card_lands_in_each_position_evenly() {
        let cards: Vec<Card> = [Rank::Five, Rank::Six, Rank::Seven, Rank::Eight]
            .into_iter()
            .map(|rank| Card::new(Suit::Hearts, rank))
            .collect();
        let mut rng = StdRng::seed_from_u64(4);
        let mut seen = [[0u32; 4]; 4];
        for _ in 0..40_000 {
            for (position, card) in shuffle_deck(&cards, &mut rng).iter().enumerate() {
                let index = cards.iter().position(|c| c == card).unwrap();
                seen[index][position] += 1;
            }
        }
        for row in seen {
            for count in row {
                assert!((9_500..=10_500).contains(&count), "position count {count}");
            }
        }
    }

    #[test]
    fn seeded_shoe_is_not_in_deck_order() {
        let mut shoe = Shoe::new(1, 0, Some(5));
        let dealt: Vec<Card> = std::iter::from_fn(|| shoe.deal_card()).collect();
        let mut fresh = create_deck();
        fresh.reverse();
        assert_eq!(dealt.len(), 52);
        assert_ne!(dealt, fresh);
    }

    #[test]
    fn seeded_shoes_deal_the_same_sequence() {
        let mut a = Shoe::new(1, 0, Some(42));
        let mut b = Shoe::new(1, 0, Some(42));
        for _ in 0..52 {
            assert_eq!(a.deal_card(), b.deal_card());
        }
        assert_eq!(a.deal_card(), None);
    }

    #[test]
    fn stacked_shoe_deals_in_order() {
        let first = Card::new(Suit::Hearts, Rank::Ace);
        let second = Card::new(Suit::Clubs, Rank::Two);
        let mut shoe = Shoe::stacked(vec![first, second]);
        assert!(!shoe.should_reshuffle());
        assert_eq!(shoe.deal_card(), Some(first));
        assert_eq!(shoe.deal_card(), Some(second));
        assert_eq!(shoe.deal_card(), None);
    }

    #[test]
    fn penetration_tracks_dealt_cards() {
        let mut shoe = Shoe::new(2, 50, Some(3));
        assert_eq!(shoe.remaining_cards(), 104);
        for _ in 0..51 {
            shoe.deal_card();
        }
        assert!(!shoe.should_reshuffle());
        shoe.deal_card();
        assert!((shoe.penetration() - 50.0).abs() < f64::EPSILON);
        assert!(shoe.should_reshuffle());

        shoe.reshuffle();
        assert_eq!(shoe.remaining_cards(), 104);
        assert!(!shoe.should_reshuffle());
    }
}
