use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♣")]
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    /// Blackjack value with the ace at its high value of 11.
    pub fn value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
        }
    }

    pub fn is_ace(self) -> bool {
        self == Rank::Ace
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.label() == label)
            .ok_or_else(|| format!("unknown rank '{label}'"))
    }
}

/// A playing card as the table sees it.
///
/// Cards are plain values; flipping one face down or up yields a new copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "CardView", from = "CardInput")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub value: u8,
    pub face_down: bool,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card {
            suit,
            rank,
            value: rank.value(),
            face_down: false,
        }
    }

    pub fn turned_down(self) -> Self {
        Card {
            face_down: true,
            ..self
        }
    }

    pub fn turned_up(self) -> Self {
        Card {
            face_down: false,
            ..self
        }
    }

    /// Asset path the front end loads, e.g. `/cards/K♦.png`. Tens use `1`.
    pub fn image_path(&self) -> String {
        let rank = self.rank.label().chars().next().unwrap_or('?');
        format!("/cards/{}{}.png", rank, self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardView {
    suit: Suit,
    rank: Rank,
    value: u8,
    image: String,
    face_down: bool,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        CardView {
            suit: card.suit,
            rank: card.rank,
            value: card.value,
            image: card.image_path(),
            face_down: card.face_down,
        }
    }
}

// Callers may omit `value`; it is always re-derived from the rank.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardInput {
    suit: Suit,
    rank: Rank,
    #[serde(default, alias = "isFaceDown")]
    face_down: bool,
}

impl From<CardInput> for Card {
    fn from(input: CardInput) -> Self {
        let card = Card::new(input.suit, input.rank);
        if input.face_down {
            card.turned_down()
        } else {
            card
        }
    }
}
