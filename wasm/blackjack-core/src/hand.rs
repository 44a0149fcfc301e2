use serde::Serialize;

use crate::card::Card;

/// Total of the face-up cards and whether an ace is still counted as 11.
pub fn hand_value(cards: &[Card]) -> (u32, bool) {
    let mut total = 0u32;
    let mut aces = 0;

    for card in cards.iter().filter(|card| !card.face_down) {
        total += u32::from(card.value);
        if card.rank.is_ace() {
            aces += 1;
        }
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total, aces > 0)
}

pub fn calculate_score(cards: &[Card]) -> u32 {
    hand_value(cards).0
}

pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && cards.iter().all(|card| !card.face_down) && calculate_score(cards) == 21
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Hand::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
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

    /// Score of the cards currently visible.
    pub fn score(&self) -> u32 {
        calculate_score(&self.cards)
    }

    /// Score as if every card were turned up.
    pub fn full_score(&self) -> u32 {
        let revealed: Vec<Card> = self.cards.iter().map(|card| card.turned_up()).collect();
        calculate_score(&revealed)
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|card| !card.face_down)
    }

    pub fn is_soft(&self) -> bool {
        hand_value(&self.cards).1
    }

    pub fn is_bust(&self) -> bool {
        self.score() > 21
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn reveal(&mut self) {
        for card in &mut self.cards {
            *card = card.turned_up();
        }
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&rank| Card::new(Suit::Spades, rank)).collect()
    }

    #[test]
    fn empty_hand_scores_zero() {
        assert_eq!(calculate_score(&[]), 0);
        assert_eq!(Hand::new().score(), 0);
    }

    #[test]
    fn ace_king_is_twenty_one() {
        assert_eq!(calculate_score(&cards(&[Rank::Ace, Rank::King])), 21);
    }

    #[test]
    fn one_of_two_aces_is_reduced() {
        assert_eq!(calculate_score(&cards(&[Rank::Ace, Rank::Ace, Rank::Nine])), 21);
    }

    #[test]
    fn bust_without_aces_is_not_reduced() {
        assert_eq!(calculate_score(&cards(&[Rank::Ten, Rank::Nine, Rank::Five])), 24);
    }

    #[test]
    fn every_ace_reduces_when_needed() {
        let hand = cards(&[Rank::Ace, Rank::Ace, Rank::Ace, Rank::Ace, Rank::King, Rank::Nine]);
        assert_eq!(hand_value(&hand), (23, false));
    }

    #[test]
    fn soft_flag_follows_unreduced_ace() {
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Six])), (17, true));
        assert_eq!(hand_value(&cards(&[Rank::Ace, Rank::Six, Rank::Ten])), (17, false));
    }

    #[test]
    fn face_down_cards_count_for_nothing() {
        let hand = vec![
            Card::new(Suit::Hearts, Rank::Nine),
            Card::new(Suit::Clubs, Rank::Ace).turned_down(),
        ];
        assert_eq!(calculate_score(&hand), 9);
        assert!(!is_blackjack(&hand));
    }

    #[test]
    fn hand_reveal_and_full_score() {
        let mut hand = Hand::new();
        hand.push(Card::new(Suit::Hearts, Rank::King));
        hand.push(Card::new(Suit::Clubs, Rank::Ace).turned_down());
        assert_eq!(hand.score(), 10);
        assert_eq!(hand.full_score(), 21);
        assert_eq!(hand.visible_cards().count(), 1);
        assert!(!hand.is_blackjack());

        hand.reveal();
        assert_eq!(hand.score(), 21);
        assert!(hand.is_blackjack());
        assert!(hand.is_soft());
    }

    #[test]
    fn three_card_twenty_one_is_not_blackjack() {
        let mut hand = Hand::new();
        for rank in [Rank::Seven, Rank::Seven, Rank::Seven] {
            hand.push(Card::new(Suit::Diamonds, rank));
        }
        assert_eq!(hand.score(), 21);
        assert!(!hand.is_blackjack());
        assert!(!hand.is_bust());
    }
}
