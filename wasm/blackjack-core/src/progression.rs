use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitStage {
    pub name: String,
    /// Wins with this dealer that unlock the stage; 0 means coins only.
    #[serde(default)]
    pub wins_to_unlock: u32,
    #[serde(default)]
    pub coins_to_unlock: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    coins: u64,
}

impl Wallet {
    pub fn new(coins: u64) -> Self {
        Wallet { coins }
    }

    pub fn balance(&self) -> u64 {
        self.coins
    }

    pub fn credit(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), TableError> {
        if amount > self.coins {
            return Err(TableError::InsufficientCoins {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }
}

/// How far a player has come with one dealer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerProgress {
    pub current_stage: usize,
    pub wins_with_dealer: u32,
}

impl DealerProgress {
    /// Counts a win and returns the stage it unlocked, if any.
    pub fn record_win(&mut self, stages: &[OutfitStage]) -> Option<usize> {
        self.wins_with_dealer += 1;
        let next = self.current_stage + 1;
        let stage = stages.get(next)?;
        if stage.wins_to_unlock > 0 && self.wins_with_dealer >= stage.wins_to_unlock {
            self.current_stage = next;
            log::info!(
                "outfit stage {} ({}) unlocked after {} wins",
                next,
                stage.name,
                self.wins_with_dealer
            );
            return Some(next);
        }
        None
    }

    pub fn unlock_with_coins(
        &mut self,
        stages: &[OutfitStage],
        stage: usize,
        wallet: &mut Wallet,
        price: u64,
    ) -> Result<(), TableError> {
        if stage >= stages.len() {
            return Err(TableError::UnknownStage(stage));
        }
        if self.current_stage >= stage {
            return Err(TableError::StageAlreadyUnlocked(stage));
        }
        wallet.debit(price)?;
        self.current_stage = stage;
        log::info!("outfit stage {} bought for {} coins", stage, price);
        Ok(())
    }

    /// Coins the dealer asks for the next stage, when one is left.
    pub fn teaser_price(&self, stages: &[OutfitStage], step: u64) -> Option<u64> {
        let next = self.current_stage + 1;
        if next < stages.len() {
            Some((next as u64 + 1) * step)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages() -> Vec<OutfitStage> {
        vec![
            OutfitStage { name: "Professional".into(), wins_to_unlock: 0, coins_to_unlock: 0 },
            OutfitStage { name: "Dinner".into(), wins_to_unlock: 2, coins_to_unlock: 100 },
            OutfitStage { name: "Casual".into(), wins_to_unlock: 0, coins_to_unlock: 100 },
        ]
    }

    #[test]
    fn wins_unlock_the_next_stage_at_threshold() {
        let stages = stages();
        let mut progress = DealerProgress::default();
        assert_eq!(progress.record_win(&stages), None);
        assert_eq!(progress.record_win(&stages), Some(1));
        assert_eq!(progress.current_stage, 1);
        assert_eq!(progress.wins_with_dealer, 2);
    }

    #[test]
    fn coin_only_stages_never_unlock_by_wins() {
        let stages = stages();
        let mut progress = DealerProgress { current_stage: 1, wins_with_dealer: 5 };
        for _ in 0..10 {
            assert_eq!(progress.record_win(&stages), None);
        }
        assert_eq!(progress.current_stage, 1);
    }

    #[test]
    fn last_stage_stops_progression() {
        let stages = stages();
        let mut progress = DealerProgress { current_stage: 2, wins_with_dealer: 0 };
        assert_eq!(progress.record_win(&stages), None);
        assert_eq!(progress.teaser_price(&stages, 250), None);
    }

    #[test]
    fn buying_a_stage_debits_the_wallet() {
        let stages = stages();
        let mut progress = DealerProgress::default();
        let mut wallet = Wallet::new(150);
        progress.unlock_with_coins(&stages, 2, &mut wallet, 100).unwrap();
        assert_eq!(progress.current_stage, 2);
        assert_eq!(wallet.balance(), 50);
    }

    #[test]
    fn buying_fails_cleanly() {
        let stages = stages();
        let mut progress = DealerProgress { current_stage: 1, wins_with_dealer: 0 };
        let mut wallet = Wallet::new(50);

        assert_eq!(
            progress.unlock_with_coins(&stages, 1, &mut wallet, 100),
            Err(TableError::StageAlreadyUnlocked(1))
        );
        assert_eq!(
            progress.unlock_with_coins(&stages, 7, &mut wallet, 100),
            Err(TableError::UnknownStage(7))
        );
        assert_eq!(
            progress.unlock_with_coins(&stages, 2, &mut wallet, 100),
            Err(TableError::InsufficientCoins { needed: 100, available: 50 })
        );
        assert_eq!(progress.current_stage, 1);
        assert_eq!(wallet.balance(), 50);
    }

    #[test]
    fn teaser_price_scales_with_stage() {
        let stages = stages();
        let progress = DealerProgress::default();
        assert_eq!(progress.teaser_price(&stages, 250), Some(500));
    }

    #[test]
    fn wallet_debit_guards_balance() {
        let mut wallet = Wallet::new(10);
        wallet.credit(5);
        assert!(wallet.debit(15).is_ok());
        assert_eq!(wallet.balance(), 0);
        assert!(wallet.debit(1).is_err());
    }
}
