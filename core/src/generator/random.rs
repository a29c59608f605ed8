use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Uniformly shuffled deck generation. The rng advances across deals, so consecutive grids from
/// the same generator are independent.
#[derive(Clone, Debug)]
pub struct RandomDeckGenerator {
    rng: SmallRng,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn deal(&mut self, size: GridSize, palette: &[CardType]) -> Vec<CardType> {
        let mut deck = pair_sequence(size, palette);
        shuffle(&mut self.rng, &mut deck);
        log::trace!("Dealt {size} grid: {deck:?}");
        deck
    }
}
