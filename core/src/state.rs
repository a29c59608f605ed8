use serde::{Deserialize, Serialize};

use crate::*;

pub const MATCH_POINTS: u32 = 10;
pub const MISMATCH_PENALTY: u32 = 2;
pub const DEFAULT_LIVES: i32 = 3;

/// Score and progress counters for the running session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub combo: u32,
    pub moves: u32,
    pub lives: i32,
    pub level: u32,
    pub turn_number: u32,
    pub match_number: u32,
    pub total_pairs: CardCount,
    pub matched_pairs: CardCount,
}

impl SessionState {
    pub fn new(level: u32, lives: i32) -> Self {
        Self {
            score: 0,
            combo: 0,
            moves: 0,
            lives,
            level: level.max(level::FIRST_LEVEL),
            turn_number: 0,
            match_number: 0,
            total_pairs: 0,
            matched_pairs: 0,
        }
    }

    /// Resets pair tracking for a freshly dealt grid.
    pub fn reset_pairs(&mut self, size: GridSize) {
        self.total_pairs = size.total_pairs();
        self.matched_pairs = 0;
    }

    /// Scores a matched pair, returns the combo after the increment.
    pub fn apply_match(&mut self) -> u32 {
        self.combo += 1;
        self.score = self.score.saturating_add(MATCH_POINTS.saturating_mul(self.combo));
        self.matched_pairs = (self.matched_pairs + 1).min(self.total_pairs);
        self.match_number += 1;
        self.finish_turn();
        self.combo
    }

    pub fn apply_mismatch(&mut self) {
        self.combo = 0;
        self.score = self.score.saturating_sub(MISMATCH_PENALTY);
        self.lives = self.lives.saturating_sub(1);
        self.finish_turn();
    }

    fn finish_turn(&mut self) {
        self.moves += 1;
        self.turn_number += 1;
    }

    pub fn all_pairs_matched(&self) -> bool {
        self.matched_pairs >= self.total_pairs
    }

    /// Moves on to the next level. Score and lives carry over.
    pub fn advance_level(&mut self) {
        self.level = self.level.saturating_add(1);
        self.moves = 0;
        self.turn_number = 0;
        self.combo = 0;
        self.match_number = 0;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(level::FIRST_LEVEL, DEFAULT_LIVES)
    }
}
