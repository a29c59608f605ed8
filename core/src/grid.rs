use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cards laid out in rows and columns. Iteration order is row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cards: Array2<Card>,
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cards: Array2::from_shape_fn((0, 0), |_| Card::new(CardType::Checkmark)),
        }
    }

    pub fn from_cards(size: GridSize, cards: Vec<Card>) -> Result<Self> {
        let shape = (usize::from(size.rows), usize::from(size.columns));
        let cards = Array2::from_shape_vec(shape, cards).map_err(|_| GameError::InvalidGridShape)?;
        Ok(Self { cards })
    }

    /// Lays out a freshly dealt deck face down. An empty deck gives an empty grid.
    pub fn from_deck(size: GridSize, deck: &[CardType]) -> Result<Self> {
        if deck.is_empty() {
            return Ok(Self::empty());
        }
        Self::from_cards(size, deck.iter().copied().map(Card::new).collect())
    }

    pub fn size(&self) -> GridSize {
        let (rows, columns) = self.cards.dim();
        GridSize::new_unchecked(
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, columns) = self.cards.dim();
        if usize::from(coords.0) < rows && usize::from(coords.1) < columns {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Card> {
        self.cards.get(coords.to_nd_index())
    }

    pub(crate) fn get_mut(&mut self, coords: Coord2) -> Option<&mut Card> {
        self.cards.get_mut(coords.to_nd_index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Cards with their positions, row by row
    pub fn iter_with_coords(&self) -> impl Iterator<Item = (Coord2, &Card)> {
        self.cards
            .indexed_iter()
            .map(|((row, column), card)| ((row as Coord, column as Coord), card))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<Coord2> for Grid {
    type Output = Card;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cards[coords.to_nd_index()]
    }
}
