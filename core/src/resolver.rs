use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Outcome of comparing two revealed cards
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Match,
    Mismatch,
}

impl Resolution {
    pub fn compare(first: CardType, second: CardType) -> Self {
        if first == second {
            Self::Match
        } else {
            Self::Mismatch
        }
    }

    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Holds revealed cards waiting for a partner. Positions only, the grid keeps owning the cards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlipResolver {
    pending: SmallVec<[Coord2; 2]>,
}

impl FlipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a revealed card. Once two are buffered both are drained, oldest first, and
    /// returned as the pair to compare.
    pub fn record(&mut self, pos: Coord2) -> Option<(Coord2, Coord2)> {
        self.pending.push(pos);
        if self.pending.len() < 2 {
            return None;
        }

        let first = self.pending.remove(0);
        let second = self.pending.remove(0);
        Some((first, second))
    }

    pub fn pending(&self) -> &[Coord2] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
