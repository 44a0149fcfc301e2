use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
pub mod logger;
pub mod progression;

use crate::{
    card::Card,
    config::TableConfig,
    error::TableError,
    game::{Table, TableEvent},
    progression::{DealerProgress, OutfitStage},
};

fn table_error(err: TableError) -> JsValue {
    JsValue::from_str(&format!("Table error: {err}"))
}

fn read_cards(value: &JsValue) -> Result<Vec<Card>, JsValue> {
    serde_wasm_bindgen::from_value(value.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))
}

// JS numbers above 2^53 - 1 are no longer exact integers.
const MAX_SAFE_COINS: f64 = 9_007_199_254_740_991.0;

fn whole_coins(amount: f64) -> Result<u64, TableError> {
    if !amount.is_finite() || amount < 0.0 || amount.fract() != 0.0 || amount > MAX_SAFE_COINS {
        return Err(TableError::InvalidBet);
    }
    Ok(amount as u64)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

#[wasm_bindgen]
pub fn init_logging(level: &str) {
    console_error_panic_hook::set_once();
    logger::install(logger::parse_level(level));
}

#[wasm_bindgen]
pub fn create_deck() -> Result<JsValue, JsValue> {
    to_js(&deck::create_deck())
}

#[wasm_bindgen]
pub fn shuffle_deck(cards: &JsValue, seed: Option<f64>) -> Result<JsValue, JsValue> {
    use rand::{rngs::SmallRng, SeedableRng};

    let cards = read_cards(cards)?;
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed as u64),
        None => SmallRng::from_entropy(),
    };
    to_js(&deck::shuffle_deck(&cards, &mut rng))
}

#[wasm_bindgen]
pub fn calculate_score(cards: &JsValue) -> Result<u32, JsValue> {
    let cards = read_cards(cards)?;
    Ok(hand::calculate_score(&cards))
}

#[derive(Serialize)]
struct PromptedEvent<'a> {
    #[serde(flatten)]
    event: &'a TableEvent,
    prompt: String,
}

#[wasm_bindgen]
pub struct BlackjackTable {
    table: Table,
    listener: Option<Function>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(config: &JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let config = if config.is_undefined() || config.is_null() {
            TableConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config.clone())
                .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?
        };
        let table = Table::new(config).map_err(table_error)?;
        Ok(BlackjackTable {
            table,
            listener: None,
        })
    }

    pub fn set_event_listener(&mut self, listener: Function) {
        self.listener = Some(listener);
    }

    pub fn set_outfit_stages(&mut self, stages: &JsValue, progress: &JsValue) -> Result<(), JsValue> {
        let stages: Vec<OutfitStage> = serde_wasm_bindgen::from_value(stages.clone())
            .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;
        let progress: DealerProgress = if progress.is_undefined() || progress.is_null() {
            DealerProgress::default()
        } else {
            serde_wasm_bindgen::from_value(progress.clone())
                .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?
        };
        self.table.set_outfit_stages(stages, progress);
        Ok(())
    }

    pub fn deal(&mut self) -> Result<(), JsValue> {
        let result = self.table.deal();
        self.finish(result)
    }

    pub fn place_bet(&mut self, amount: f64) -> Result<(), JsValue> {
        let result = whole_coins(amount).and_then(|amount| self.table.place_bet(amount));
        self.finish(result)
    }

    pub fn clear_bet(&mut self) -> Result<(), JsValue> {
        let result = self.table.clear_bet();
        self.finish(result)
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        let result = self.table.start();
        self.finish(result)
    }

    pub fn hit(&mut self) -> Result<(), JsValue> {
        let result = self.table.hit();
        self.finish(result)
    }

    pub fn double_down(&mut self) -> Result<(), JsValue> {
        let result = self.table.double_down();
        self.finish(result)
    }

    pub fn stand(&mut self) -> Result<(), JsValue> {
        let result = self.table.stand();
        self.finish(result)
    }

    pub fn unlock_outfit(&mut self, stage: usize) -> Result<(), JsValue> {
        let result = self.table.unlock_outfit(stage);
        self.finish(result)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.table.state())
    }

    pub fn status_context(&self) -> String {
        self.table.status_context()
    }

    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.table.drain_events();
        let prompted: Vec<PromptedEvent> = events
            .iter()
            .map(|event| PromptedEvent {
                event,
                prompt: event.prompt(),
            })
            .collect();
        to_js(&prompted)
    }

    // With a listener attached, events go straight to it instead of queueing.
    fn finish(&mut self, result: Result<(), TableError>) -> Result<(), JsValue> {
        if let Some(listener) = &self.listener {
            forward_events(self.table.drain_events(), |event| {
                let payload = serde_wasm_bindgen::to_value(event).map_err(|err| err.to_string())?;
                listener
                    .call2(&JsValue::NULL, &payload, &JsValue::from_str(&event.prompt()))
                    .map(|_| ())
                    .map_err(|err| format!("{err:?}"))
            });
        }
        result.map_err(table_error)
    }
}

/// Hands every event to `send`; a failed one is logged and skipped.
fn forward_events<F>(events: Vec<TableEvent>, mut send: F) -> usize
where
    F: FnMut(&TableEvent) -> Result<(), String>,
{
    let mut delivered = 0;
    for event in &events {
        match send(event) {
            Ok(()) => delivered += 1,
            Err(err) => log::warn!("dropping {event:?} for listener: {err}"),
        }
    }
    delivered
}
