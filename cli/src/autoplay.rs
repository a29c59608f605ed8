use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use pairs_core::*;

/// Player that never forgets a face it has seen. It only learns faces through reveals.
#[derive(Debug, Default)]
pub struct MemoryPlayer {
    seen: HashMap<Coord2, CardType>,
}

impl MemoryPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plays turns until the current level is cleared.
    pub fn play_level<S, G>(&mut self, session: &mut GameSession<S, G>) -> Result<()>
    where
        S: KeyValueStore,
        G: DeckGenerator,
    {
        self.seen.clear();
        let turn_limit = usize::from(session.grid_size().total_cards()) * 2;

        for _ in 0..turn_limit {
            if session.phase() != SessionPhase::Playing {
                log::info!("Cleared level in {} moves", session.state().moves);
                return Ok(());
            }
            self.take_turn(session)?;
        }
        if session.phase() == SessionPhase::Playing {
            bail!("level not cleared after {turn_limit} turns");
        }
        Ok(())
    }

    fn take_turn<S, G>(&mut self, session: &mut GameSession<S, G>) -> Result<()>
    where
        S: KeyValueStore,
        G: DeckGenerator,
    {
        if let Some((first, second)) = self.known_pair(session) {
            session.flip(first);
            session.flip(second);
            session.settle();
            return Ok(());
        }

        let first = self.unseen(session).context("no face-down card left")?;
        self.flip_and_look(session, first);

        let first_type = *self.seen.get(&first).context("flipped card was not seen")?;
        let second = self
            .seen
            .iter()
            .find(|&(&pos, &card_type)| pos != first && card_type == first_type && is_open(session, pos))
            .map(|(&pos, _)| pos)
            .or_else(|| self.unseen(session))
            .context("no partner card to flip")?;
        self.flip_and_look(session, second);
        session.settle();
        Ok(())
    }

    fn flip_and_look<S, G>(&mut self, session: &mut GameSession<S, G>, pos: Coord2)
    where
        S: KeyValueStore,
        G: DeckGenerator,
    {
        session.flip(pos);
        let reveal = session.config().timings.reveal();
        session.advance(reveal);
        if let Ok(card) = session.card_at(pos) {
            self.seen.insert(pos, card.card_type());
        }
    }

    fn known_pair<S, G>(&self, session: &GameSession<S, G>) -> Option<(Coord2, Coord2)>
    where
        S: KeyValueStore,
        G: DeckGenerator,
    {
        let mut by_type: HashMap<CardType, Coord2> = HashMap::new();
        let mut open: Vec<_> = self
            .seen
            .iter()
            .filter(|&(&pos, _)| is_open(session, pos))
            .collect();
        open.sort();
        for (&pos, &card_type) in open {
            if let Some(partner) = by_type.insert(card_type, pos) {
                return Some((partner, pos));
            }
        }
        None
    }

    fn unseen<S, G>(&self, session: &GameSession<S, G>) -> Option<Coord2>
    where
        S: KeyValueStore,
        G: DeckGenerator,
    {
        session
            .grid()
            .iter_with_coords()
            .find(|(pos, card)| card.is_flippable() && !self.seen.contains_key(pos))
            .map(|(pos, _)| pos)
    }
}

fn is_open<S, G>(session: &GameSession<S, G>, pos: Coord2) -> bool
where
    S: KeyValueStore,
    G: DeckGenerator,
{
    session
        .card_at(pos)
        .map(|card| card.is_flippable())
        .unwrap_or(false)
}
