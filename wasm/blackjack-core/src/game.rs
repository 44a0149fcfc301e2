use serde::Serialize;

use crate::{
    card::Card,
    config::TableConfig,
    deck::Shoe,
    error::TableError,
    hand::{hand_value, Hand},
    progression::{DealerProgress, OutfitStage, Wallet},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    CardsDealt,
    Betting,
    PlayerTurn,
    DealerTurn,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::CardsDealt => "CARDS_DEALT",
            Phase::Betting => "BETTING",
            Phase::PlayerTurn => "PLAYER_TURN",
            Phase::DealerTurn => "DEALER_TURN",
            Phase::GameOver => "GAME_OVER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Push,
    Blackjack,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub outcome: Outcome,
    pub bet: u64,
    /// Coins returned to the wallet, stake included.
    pub payout: u64,
    pub player_score: u32,
    pub dealer_score: u32,
}

/// Something the dealer persona should react to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableEvent {
    Dealt,
    RoundStarted { bet: u64 },
    PlayerHit { score: u32 },
    PlayerTwentyOne,
    PlayerBust { score: u32 },
    PlayerDoubled { bet: u64 },
    PlayerStood { score: u32 },
    DealerDrew { card: Card, score: u32 },
    RoundSettled { outcome: Outcome, payout: u64 },
    OutfitUnlocked { stage: usize, name: String },
    OutfitTeaser { price: u64 },
}

impl TableEvent {
    pub fn prompt(&self) -> String {
        match self {
            TableEvent::Dealt => "New round starting! Cards will be dealt automatically. Encourage the player and comment on their previous performance.".to_string(),
            TableEvent::RoundStarted { .. } => "The game has started! The player now needs to decide whether to hit or stand.".to_string(),
            TableEvent::PlayerHit { score } => format!("Player hit and now has {score}. Comment on their hand and give encouragement."),
            TableEvent::PlayerTwentyOne => "Player hit 21! Congratulate them and build excitement for the dealer's turn.".to_string(),
            TableEvent::PlayerBust { .. } => "Player busted! React to this outcome with empathy and encourage them for the next round.".to_string(),
            TableEvent::PlayerDoubled { bet } => format!("Player doubled down and now has {bet} coins on the table. Build the tension."),
            TableEvent::PlayerStood { score } => format!("Player decided to stand with {score}. Comment on their decision and build anticipation for the dealer's turn."),
            TableEvent::DealerDrew { card, score } => format!("I drew {card} and now have {score}."),
            TableEvent::RoundSettled { outcome, .. } => match outcome {
                Outcome::Win => "The player won this round! Congratulate them and encourage them for the next round.".to_string(),
                Outcome::Blackjack => "The player hit a blackjack! Celebrate with them.".to_string(),
                Outcome::Push => "Push! Your bet is returned.".to_string(),
                Outcome::Lose => "Dealer wins. Better luck next time!".to_string(),
            },
            TableEvent::OutfitUnlocked { name, .. } => format!("You're doing so well! I changed to my {name} outfit just for you..."),
            TableEvent::OutfitTeaser { price } => format!("You're on fire! Want to see my next outfit? It costs {price} coins..."),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub phase: Phase,
    pub balance: u64,
    pub current_bet: u64,
    pub player_cards: Vec<Card>,
    pub dealer_cards: Vec<Card>,
    pub player_score: u32,
    pub dealer_score: u32,
    pub last_result: Option<RoundResult>,
    pub outfit_stage: usize,
    pub outfit_stage_count: usize,
    pub chips: Vec<u64>,
}

/// One player seated with one dealer persona.
pub struct Table {
    config: TableConfig,
    shoe: Shoe,
    wallet: Wallet,
    bet: u64,
    player: Hand,
    dealer: Hand,
    phase: Phase,
    last_result: Option<RoundResult>,
    stages: Vec<OutfitStage>,
    progress: DealerProgress,
    events: Vec<TableEvent>,
}

impl Table {
    pub fn new(config: TableConfig) -> Result<Self, TableError> {
        let shoe = Shoe::new(config.num_decks, config.penetration_threshold, config.seed);
        Table::with_shoe(config, shoe)
    }

    pub fn with_shoe(config: TableConfig, shoe: Shoe) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Table {
            wallet: Wallet::new(config.starting_coins),
            config,
            shoe,
            bet: 0,
            player: Hand::new(),
            dealer: Hand::new(),
            phase: Phase::CardsDealt,
            last_result: None,
            stages: Vec::new(),
            progress: DealerProgress::default(),
            events: Vec::new(),
        })
    }

    pub fn set_outfit_stages(&mut self, stages: Vec<OutfitStage>, progress: DealerProgress) {
        self.stages = stages;
        self.progress = progress;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn current_bet(&self) -> u64 {
        self.bet
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    pub fn player_score(&self) -> u32 {
        self.player.score()
    }

    /// Score of the dealer's face-up cards only.
    pub fn dealer_score(&self) -> u32 {
        self.dealer.score()
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn progress(&self) -> &DealerProgress {
        &self.progress
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> TableState {
        TableState {
            phase: self.phase,
            balance: self.wallet.balance(),
            current_bet: self.bet,
            player_cards: self.player.cards().to_vec(),
            dealer_cards: self.dealer.cards().to_vec(),
            player_score: self.player.score(),
            dealer_score: self.dealer.score(),
            last_result: self.last_result.clone(),
            outfit_stage: self.progress.current_stage,
            outfit_stage_count: self.stages.len(),
            chips: self.config.chips.clone(),
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), TableError> {
        if self.phase != expected {
            return Err(TableError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<Card, TableError> {
        self.shoe.deal_card().ok_or(TableError::ShoeEmpty)
    }

    /// Starts a new round: two cards each, the dealer's second face down.
    pub fn deal(&mut self) -> Result<(), TableError> {
        if !matches!(self.phase, Phase::CardsDealt | Phase::GameOver) {
            return Err(TableError::WrongPhase {
                expected: Phase::GameOver,
                actual: self.phase,
            });
        }
        self.player.clear();
        self.dealer.clear();
        self.bet = 0;
        self.last_result = None;

        if self.shoe.should_reshuffle() || self.shoe.remaining_cards() < 4 {
            self.shoe.reshuffle();
        }

        let first = self.draw()?;
        let second = self.draw()?;
        let up = self.draw()?;
        let hole = self.draw()?;
        self.player.push(first);
        self.player.push(second);
        self.dealer.push(up);
        self.dealer.push(hole.turned_down());

        self.phase = Phase::Betting;
        self.events.push(TableEvent::Dealt);
        log::debug!("dealt {first}, {second} against {up}");
        Ok(())
    }

    pub fn place_bet(&mut self, amount: u64) -> Result<(), TableError> {
        self.expect_phase(Phase::Betting)?;
        if amount == 0 {
            return Err(TableError::InvalidBet);
        }
        let total = self.bet.checked_add(amount).ok_or(TableError::InvalidBet)?;
        if total > self.wallet.balance() {
            return Err(TableError::InsufficientCoins {
                needed: total,
                available: self.wallet.balance(),
            });
        }
        self.bet = total;
        Ok(())
    }

    pub fn clear_bet(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::Betting)?;
        self.bet = 0;
        Ok(())
    }

    /// Takes the stake and hands the turn to the player.
    pub fn start(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::Betting)?;
        if self.bet == 0 {
            return Err(TableError::NoBet);
        }
        self.wallet.debit(self.bet)?;
        self.phase = Phase::PlayerTurn;
        self.events.push(TableEvent::RoundStarted { bet: self.bet });
        log::info!("round started with bet {}", self.bet);

        if self.player.is_blackjack() {
            self.dealer.reveal();
            let outcome = if self.dealer.is_blackjack() {
                Outcome::Push
            } else {
                Outcome::Blackjack
            };
            self.settle(outcome)?;
        }
        Ok(())
    }

    pub fn hit(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::PlayerTurn)?;
        let card = self.draw()?;
        self.player.push(card);
        let score = self.player.score();

        if score > 21 {
            self.events.push(TableEvent::PlayerBust { score });
            self.dealer.reveal();
            self.settle(Outcome::Lose)?;
        } else if score == 21 {
            self.events.push(TableEvent::PlayerTwentyOne);
        } else {
            self.events.push(TableEvent::PlayerHit { score });
        }
        Ok(())
    }

    /// Doubles the stake, takes exactly one card and stands.
    pub fn double_down(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::PlayerTurn)?;
        if self.player.len() != 2 {
            return Err(TableError::CannotDouble);
        }
        if self.wallet.balance() < self.bet {
            return Err(TableError::InsufficientCoins {
                needed: self.bet,
                available: self.wallet.balance(),
            });
        }
        let card = self.draw()?;
        self.wallet.debit(self.bet)?;
        self.bet = self.bet.saturating_mul(2);
        self.events.push(TableEvent::PlayerDoubled { bet: self.bet });
        self.player.push(card);

        let score = self.player.score();
        if score > 21 {
            self.events.push(TableEvent::PlayerBust { score });
            self.dealer.reveal();
            self.settle(Outcome::Lose)
        } else {
            self.events.push(TableEvent::PlayerStood { score });
            self.play_dealer()
        }
    }

    pub fn stand(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::PlayerTurn)?;
        self.events.push(TableEvent::PlayerStood {
            score: self.player.score(),
        });
        self.play_dealer()
    }

    fn dealer_should_draw(&self) -> bool {
        let (score, soft) = hand_value(self.dealer.cards());
        let stands_on = self.config.dealer_stands_on;
        score < stands_on || (self.config.dealer_hits_soft_17 && soft && score == stands_on)
    }

    fn play_dealer(&mut self) -> Result<(), TableError> {
        self.phase = Phase::DealerTurn;
        self.dealer.reveal();

        while self.dealer_should_draw() {
            let Some(card) = self.shoe.deal_card() else {
                log::warn!("shoe ran out during dealer turn at {}", self.dealer.score());
                break;
            };
            self.dealer.push(card);
            self.events.push(TableEvent::DealerDrew {
                card,
                score: self.dealer.score(),
            });
        }

        let player = self.player.score();
        let dealer = self.dealer.score();
        let outcome = if dealer > 21 || player > dealer {
            Outcome::Win
        } else if player == dealer {
            Outcome::Push
        } else {
            Outcome::Lose
        };
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Outcome) -> Result<(), TableError> {
        let payout = match outcome {
            Outcome::Win => self.bet.saturating_mul(2),
            Outcome::Push => self.bet,
            Outcome::Lose => 0,
            Outcome::Blackjack => {
                let (num, den) = self.config.blackjack_payout()?;
                let bonus = u128::from(self.bet) * u128::from(num) / u128::from(den);
                self.bet.saturating_add(u64::try_from(bonus).unwrap_or(u64::MAX))
            }
        };
        self.wallet.credit(payout);

        let result = RoundResult {
            outcome,
            bet: self.bet,
            payout,
            player_score: self.player.score(),
            dealer_score: self.dealer.score(),
        };
        log::info!(
            "round settled: {:?} {} vs {}, bet {}, payout {}",
            outcome,
            result.player_score,
            result.dealer_score,
            result.bet,
            payout
        );
        self.events.push(TableEvent::RoundSettled { outcome, payout });
        self.last_result = Some(result);
        self.phase = Phase::GameOver;

        if matches!(outcome, Outcome::Win | Outcome::Blackjack) && !self.stages.is_empty() {
            self.record_win();
        }
        Ok(())
    }

    fn record_win(&mut self) {
        if let Some(stage) = self.progress.record_win(&self.stages) {
            let name = self.stages[stage].name.clone();
            self.events.push(TableEvent::OutfitUnlocked { stage, name });
        } else if let Some(price) = self
            .progress
            .teaser_price(&self.stages, self.config.teaser_price_step)
        {
            self.events.push(TableEvent::OutfitTeaser { price });
        }
    }

    /// Buys an outfit stage at the table's fixed unlock price.
    pub fn unlock_outfit(&mut self, stage: usize) -> Result<(), TableError> {
        self.progress.unlock_with_coins(
            &self.stages,
            stage,
            &mut self.wallet,
            self.config.outfit_unlock_price,
        )?;
        let name = self.stages[stage].name.clone();
        self.events.push(TableEvent::OutfitUnlocked { stage, name });
        Ok(())
    }

    /// One-line summary of the table handed to the dealer persona.
    pub fn status_context(&self) -> String {
        let mut parts = vec![
            format!("Game Phase: {}", self.phase.as_str()),
            format!("Player has {} coins", self.wallet.balance()),
            format!("Player's bet is {} coins", self.bet),
        ];

        if !self.player.is_empty() {
            parts.push(format!("Player's score: {}", self.player.score()));
            parts.push(format!("Player's cards: {}", join_cards(self.player.cards().iter())));
        }

        if !self.dealer.is_empty() {
            if self.dealer.visible_cards().next().is_some() {
                parts.push(format!("My visible cards: {}", join_cards(self.dealer.visible_cards())));
                if matches!(self.phase, Phase::DealerTurn | Phase::GameOver) {
                    parts.push(format!("My visible score: {}", self.dealer.score()));
                }
            }
            if self.phase == Phase::GameOver {
                parts.push(format!("My final score: {}", self.dealer.full_score()));
            }
        }

        parts.push(format!(
            "My current outfit stage: {}/{}",
            self.progress.current_stage + 1,
            self.stages.len().max(1)
        ));
        parts.join(" | ")
    }
}

fn join_cards<'a>(cards: impl Iterator<Item = &'a Card>) -> String {
    cards.map(|card| card.to_string()).collect::<Vec<_>>().join(", ")
}
