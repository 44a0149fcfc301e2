use serde::Deserialize;

use crate::error::TableError;

fn default_num_decks() -> u8 {
    1
}

fn default_dealer_stands_on() -> u32 {
    17
}

fn default_blackjack_pays() -> String {
    "3:2".to_string()
}

fn default_chips() -> Vec<u64> {
    vec![5, 25, 50, 100, 250]
}

fn default_starting_coins() -> u64 {
    1000
}

fn default_outfit_unlock_price() -> u64 {
    100
}

fn default_teaser_price_step() -> u64 {
    250
}

/// Table rules and economy settings.
///
/// Every field has a default, so `{}` is a valid config. A penetration
/// threshold of 0 means a fresh shuffle before every round.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_num_decks")]
    pub num_decks: u8,
    #[serde(default)]
    pub penetration_threshold: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_dealer_stands_on")]
    pub dealer_stands_on: u32,
    #[serde(default)]
    pub dealer_hits_soft_17: bool,
    #[serde(default = "default_blackjack_pays")]
    pub blackjack_pays: String,
    #[serde(default = "default_chips")]
    pub chips: Vec<u64>,
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,
    #[serde(default = "default_outfit_unlock_price")]
    pub outfit_unlock_price: u64,
    #[serde(default = "default_teaser_price_step")]
    pub teaser_price_step: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            num_decks: default_num_decks(),
            penetration_threshold: 0,
            seed: None,
            dealer_stands_on: default_dealer_stands_on(),
            dealer_hits_soft_17: false,
            blackjack_pays: default_blackjack_pays(),
            chips: default_chips(),
            starting_coins: default_starting_coins(),
            outfit_unlock_price: default_outfit_unlock_price(),
            teaser_price_step: default_teaser_price_step(),
        }
    }
}

impl TableConfig {
    pub fn from_json(raw: &str) -> Result<Self, TableError> {
        let config: TableConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.num_decks == 0 {
            return Err(TableError::InvalidConfig("num_decks must be at least 1".to_string()));
        }
        if !(12..=21).contains(&self.dealer_stands_on) {
            return Err(TableError::InvalidConfig(format!(
                "dealer_stands_on {} outside 12..=21",
                self.dealer_stands_on
            )));
        }
        if self.penetration_threshold > 100 {
            return Err(TableError::InvalidConfig(format!(
                "penetration_threshold {} above 100",
                self.penetration_threshold
            )));
        }
        if self.chips.is_empty() || self.chips.contains(&0) {
            return Err(TableError::InvalidConfig("chips must be non-empty and positive".to_string()));
        }
        self.blackjack_payout()?;
        Ok(())
    }

    /// Multiplier applied to the bet for a natural.
    pub fn blackjack_payout(&self) -> Result<(u64, u64), TableError> {
        match self.blackjack_pays.as_str() {
            "3:2" => Ok((3, 2)),
            "6:5" => Ok((6, 5)),
            "1:1" => Ok((1, 1)),
            other => Err(TableError::InvalidConfig(format!("unsupported blackjack payout '{other}'"))),
        }
    }
}
