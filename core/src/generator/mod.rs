use crate::*;
pub use random::*;

mod random;

/// Produces the card faces for a grid, in row-major order.
pub trait DeckGenerator {
    fn deal(&mut self, size: GridSize, palette: &[CardType]) -> Vec<CardType>;
}

/// Builds the unshuffled deck: each palette entry twice, cycling through the palette when there are
/// more pairs than faces. An odd card total gets one extra copy of the first face.
pub fn pair_sequence(size: GridSize, palette: &[CardType]) -> Vec<CardType> {
    let total = usize::from(size.total_cards());

    let Some(&first) = palette.first() else {
        log::warn!("Empty card palette, dealing an empty {size} grid");
        return Vec::new();
    };

    let mut deck = Vec::with_capacity(total);
    for i in 0..total / 2 {
        let card_type = palette[i % palette.len()];
        deck.push(card_type);
        deck.push(card_type);
    }

    if deck.len() < total {
        log::warn!("Odd card total for {size} grid, leftover {first:?} can never be matched");
        deck.push(first);
    }

    deck
}

/// In-place Fisher-Yates: position `i` is swapped with a uniformly chosen position in `[i, n)`.
pub fn shuffle<T, R: rand::Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    let len = items.len();
    for i in 0..len.saturating_sub(1) {
        let j = rng.random_range(i..len);
        items.swap(i, j);
    }
}
