use serde::{Deserialize, Serialize};

use crate::*;

/// Resumable capture of a session: grid dimensions, counters, and per-card face and matched flag.
///
/// Field names follow the JSON save format, saves written before the move/lives/turn/match
/// counters existed still decode with those counters at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub rows: Coord,
    pub columns: Coord,
    pub score: u32,
    pub combo: u32,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub lives: i32,
    #[serde(default)]
    pub turn_number: u32,
    #[serde(default)]
    pub match_number: u32,
    pub grid_card_types: Vec<CardType>,
    pub grid_card_matched: Vec<bool>,
}

impl SaveSnapshot {
    pub fn capture(size: GridSize, state: &SessionState, grid: &Grid) -> Self {
        Self {
            rows: size.rows,
            columns: size.columns,
            score: state.score,
            combo: state.combo,
            moves: state.moves,
            lives: state.lives,
            turn_number: state.turn_number,
            match_number: state.match_number,
            grid_card_types: grid.iter().map(Card::card_type).collect(),
            grid_card_matched: grid.iter().map(Card::is_matched).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| GameError::CorruptSave(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| GameError::CorruptSave(err.to_string()))
    }

    /// Checks that the card lists agree with the declared dimensions.
    pub fn validate(&self) -> Result<GridSize> {
        let size = GridSize::new_unchecked(self.rows, self.columns);
        let expected = usize::from(size.total_cards());

        if expected == 0 {
            return Err(GameError::CorruptSave(format!("empty {size} grid")));
        }
        if self.grid_card_types.len() != expected || self.grid_card_matched.len() != expected {
            return Err(GameError::CorruptSave(format!(
                "{size} grid needs {expected} cards, save has {} types and {} matched flags",
                self.grid_card_types.len(),
                self.grid_card_matched.len()
            )));
        }

        Ok(size)
    }

    /// Rebuilds the grid. Matched cards come back matched, everything else face down.
    pub fn restore_grid(&self) -> Result<Grid> {
        let size = self.validate()?;
        let cards = self
            .grid_card_types
            .iter()
            .zip(&self.grid_card_matched)
            .map(|(&card_type, &matched)| {
                if matched {
                    Card::restored_matched(card_type)
                } else {
                    Card::new(card_type)
                }
            })
            .collect();
        Grid::from_cards(size, cards)
    }

    /// Rebuilds the counters on top of `level`. Non-positive lives fall back to `default_lives`, or
    /// to [`DEFAULT_LIVES`] when that is not positive either.
    pub fn restore_state(&self, level: u32, default_lives: i32) -> SessionState {
        let size = GridSize::new_unchecked(self.rows, self.columns);
        let matched_cards = self.grid_card_matched.iter().filter(|&&matched| matched).count();
        if matched_cards % 2 != 0 {
            log::warn!("Save marks {matched_cards} cards matched, an odd count, truncating pairs");
        }
        let matched_pairs = CardCount::try_from(matched_cards / 2).unwrap_or(CardCount::MAX);

        let mut state = SessionState::new(level, self.lives);
        state.score = self.score;
        state.combo = self.combo;
        state.moves = self.moves;
        state.turn_number = self.turn_number;
        state.match_number = self.match_number;
        state.reset_pairs(size);
        state.matched_pairs = matched_pairs.min(state.total_pairs);
        if state.lives <= 0 {
            let lives = if default_lives > 0 { default_lives } else { DEFAULT_LIVES };
            log::debug!("Restored lives {} reset to {lives}", state.lives);
            state.lives = lives;
        }
        state
    }
}
