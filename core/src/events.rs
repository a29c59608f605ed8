use serde::{Deserialize, Serialize};

use crate::*;

/// Notification sent to observers whenever the session changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    GridReady(GridSize),
    CardFlipped(Coord2),
    CardRevealed(Coord2),
    CardConcealed(Coord2),
    /// Sent for every match, whatever the combo
    PairMatched(Coord2, Coord2),
    PairMismatched(Coord2, Coord2),
    ScoreChanged(u32),
    MovesChanged(u32),
    LivesChanged(i32),
    LevelChanged(u32),
    MatchCountChanged(u32),
    TurnCountChanged(u32),
    /// Sent right after [`GameEvent::PairMatched`] when the combo is above one, so a combo match
    /// fires both
    ComboChanged(u32),
    LevelWon,
}

pub trait GameObserver {
    fn notify(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> GameObserver for F {
    fn notify(&mut self, event: &GameEvent) {
        self(event)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Observer list, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    entries: Vec<(SubscriptionId, Box<dyn GameObserver>)>,
    next_id: u64,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("Event {event:?}");
        for (_, observer) in &mut self.entries {
            observer.notify(&event);
        }
    }
}

impl core::fmt::Debug for Observers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
