use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Engine settings. Every field has a default, so partial config files are fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Card faces dealt, in pairing order
    pub palette: Vec<CardType>,
    pub starting_lives: i32,
    pub timings: Timings,
    pub keys: StorageKeys,
    /// Fixed deal seed, OS entropy when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: CardType::ALL.to_vec(),
            starting_lives: DEFAULT_LIVES,
            timings: Timings::default(),
            keys: StorageKeys::default(),
            seed: None,
        }
    }
}

/// How long the presentation layer gets between engine steps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Flip request until the card counts as revealed
    pub reveal_ms: u64,
    /// Second reveal until the pair is compared
    pub compare_ms: u64,
    /// Mismatch until the cards are face down and flippable again
    pub conceal_ms: u64,
}

impl Timings {
    pub const INSTANT: Timings = Timings {
        reveal_ms: 0,
        compare_ms: 0,
        conceal_ms: 0,
    };

    pub const fn reveal(&self) -> Duration {
        Duration::from_millis(self.reveal_ms)
    }

    pub const fn compare(&self) -> Duration {
        Duration::from_millis(self.compare_ms)
    }

    pub const fn conceal(&self) -> Duration {
        Duration::from_millis(self.conceal_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reveal_ms: 500,
            compare_ms: 500,
            conceal_ms: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub session: String,
    pub level: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: "CardGameSaveData".to_owned(),
            level: "PlayerLevel".to_owned(),
        }
    }
}
