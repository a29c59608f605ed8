use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing dealt yet
    Idle,
    Playing,
    /// Every pair matched, waiting for the next level to be requested
    LevelWon,
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Deferred engine steps standing in for the presentation layer's animations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Reveal(Coord2),
    Compare(Coord2, Coord2),
    Conceal(Coord2),
}

/// A player's run through the levels: owns the grid, the counters and the save slots.
///
/// All mutation goes through the methods here. Flips only take effect as the virtual clock is
/// advanced with [`GameSession::advance`] or [`GameSession::settle`].
pub struct GameSession<S, G = RandomDeckGenerator> {
    config: EngineConfig,
    slots: SaveSlots<S>,
    generator: G,
    grid: Grid,
    size: GridSize,
    state: SessionState,
    phase: SessionPhase,
    resolver: FlipResolver,
    scheduler: Scheduler<PendingAction>,
    in_flight: u8,
    observers: Observers,
}

impl<S: KeyValueStore> GameSession<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let generator = match config.seed {
            Some(seed) => RandomDeckGenerator::new(seed),
            None => RandomDeckGenerator::from_entropy(),
        };
        Self::with_generator(store, config, generator)
    }
}

impl<S: KeyValueStore, G: DeckGenerator> GameSession<S, G> {
    pub fn with_generator(store: S, config: EngineConfig, generator: G) -> Self {
        let slots = SaveSlots::new(store, config.keys.clone());
        let state = SessionState::new(level::FIRST_LEVEL, config.starting_lives);
        Self {
            config,
            slots,
            generator,
            grid: Grid::empty(),
            size: level::grid_size_for(level::FIRST_LEVEL),
            state,
            phase: SessionPhase::Idle,
            resolver: FlipResolver::new(),
            scheduler: Scheduler::new(),
            in_flight: 0,
            observers: Observers::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Logical dimensions of the current grid, for framing the view.
    pub fn grid_size(&self) -> GridSize {
        self.size
    }

    /// Dimensions the next call to [`GameSession::next_level`] will deal.
    pub fn next_grid_size(&self) -> GridSize {
        level::grid_size_for(self.state.level)
    }

    pub fn card_at(&self, coords: Coord2) -> Result<&Card> {
        let coords = self.grid.validate_coords(coords)?;
        Ok(&self.grid[coords])
    }

    pub fn store(&self) -> &S {
        self.slots.store()
    }

    pub fn into_store(self) -> S {
        self.slots.into_store()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Whether no flip, comparison or close is waiting on the clock
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Positions revealed and waiting for a partner
    pub fn pending_flips(&self) -> &[Coord2] {
        self.resolver.pending()
    }

    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Resumes the saved session when there is a usable one, otherwise deals a fresh grid for the
    /// stored player level.
    pub fn start_or_resume(&mut self) {
        let level = self.slots.load_level().unwrap_or(level::FIRST_LEVEL);
        self.observers.emit(GameEvent::GameStarted);

        let resumed = match self.slots.load_snapshot() {
            Ok(Some(snapshot)) => match self.restore_at_level(&snapshot, level) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Discarding saved game: {err}");
                    false
                }
            },
            Ok(None) => false,
            Err(err) => {
                log::warn!("Discarding saved game: {err}");
                false
            }
        };

        if resumed {
            log::info!("Resumed {} grid at level {}", self.size, self.state.level);
        } else {
            self.state = SessionState::new(level, self.config.starting_lives);
            self.deal(level::grid_size_for(level));
            log::info!("Started {} grid at level {}", self.size, self.state.level);
        }
        self.emit_counters();

        if resumed {
            self.complete_cleared_restore();
        }
    }

    /// Replaces the saved state with `snapshot`, keeping the current level. A snapshot whose grid
    /// is already cleared completes the level right away.
    pub fn restore(&mut self, snapshot: &SaveSnapshot) -> Result<()> {
        self.restore_at_level(snapshot, self.state.level)?;
        self.emit_counters();
        self.complete_cleared_restore();
        Ok(())
    }

    fn complete_cleared_restore(&mut self) {
        if self.state.all_pairs_matched() {
            log::warn!("Saved grid was already cleared");
            self.complete_level();
        }
    }

    fn restore_at_level(&mut self, snapshot: &SaveSnapshot, level: u32) -> Result<()> {
        let grid = snapshot.restore_grid()?;
        self.reset_transients();
        self.size = grid.size();
        self.grid = grid;
        self.state = snapshot.restore_state(level, self.config.starting_lives);
        self.phase = SessionPhase::Playing;
        self.observers.emit(GameEvent::GridReady(self.size));
        Ok(())
    }

    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot::capture(self.size, &self.state, &self.grid)
    }

    /// Deals a new grid. Sides are clamped to the manual play range; pending flips are dropped.
    pub fn new_grid(&mut self, rows: Coord, columns: Coord) {
        self.deal(GridSize::new(rows, columns));
    }

    /// Deals the grid for the current level, which [`GameSession::complete_level`] has already
    /// advanced.
    pub fn next_level(&mut self) {
        self.deal(self.next_grid_size());
    }

    fn deal(&mut self, size: GridSize) {
        self.reset_transients();

        let deck = self.generator.deal(size, &self.config.palette);
        self.grid = Grid::from_deck(size, &deck).unwrap_or_else(|err| {
            log::error!("Dealt {} cards for a {size} grid: {err}", deck.len());
            Grid::empty()
        });
        self.size = size;
        self.state.reset_pairs(size);
        self.phase = SessionPhase::Playing;
        log::debug!("Dealt {size} grid with {} pairs", self.state.total_pairs);

        self.persist();
        self.observers.emit(GameEvent::GridReady(size));
    }

    fn reset_transients(&mut self) {
        self.scheduler.clear();
        self.resolver.clear();
        self.in_flight = 0;
    }

    /// Starts turning a hidden card over. At most two cards can be in flight before their
    /// comparison resolves; anything else is ignored.
    pub fn flip(&mut self, coords: Coord2) -> FlipOutcome {
        if self.phase != SessionPhase::Playing {
            log::debug!("Ignoring flip at {coords:?}, session is {:?}", self.phase);
            return FlipOutcome::Ignored;
        }
        if self.in_flight >= 2 {
            log::debug!("Ignoring flip at {coords:?}, waiting on a comparison");
            return FlipOutcome::Ignored;
        }
        let Some(card) = self.grid.get_mut(coords) else {
            log::debug!("Ignoring flip at {coords:?}, outside the grid");
            return FlipOutcome::Ignored;
        };
        if !card.begin_flip() {
            log::debug!("Ignoring flip at {coords:?}, card is {:?}", card.state());
            return FlipOutcome::Ignored;
        }

        self.in_flight += 1;
        self.scheduler
            .schedule(self.config.timings.reveal(), PendingAction::Reveal(coords));
        log::debug!("Flip card at {coords:?}");
        self.observers.emit(GameEvent::CardFlipped(coords));
        FlipOutcome::Flipped
    }

    /// Moves the clock forward, running everything that comes due. Returns how many steps ran.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        let mut steps = 0;
        while let Some(action) = self.scheduler.pop_due(deadline) {
            self.run(action);
            steps += 1;
        }
        self.scheduler.advance_clock(deadline);
        steps
    }

    /// Runs every pending step, including ones scheduled along the way.
    pub fn settle(&mut self) -> usize {
        let mut steps = 0;
        while let Some(action) = self.scheduler.pop_due(Duration::MAX) {
            self.run(action);
            steps += 1;
        }
        steps
    }

    fn run(&mut self, action: PendingAction) {
        log::trace!("Running {action:?} at {:?}", self.scheduler.now());
        match action {
            PendingAction::Reveal(coords) => self.reveal(coords),
            PendingAction::Compare(first, second) => self.compare(first, second),
            PendingAction::Conceal(coords) => {
                if let Some(card) = self.grid.get_mut(coords) {
                    card.conceal();
                    self.observers.emit(GameEvent::CardConcealed(coords));
                }
            }
        }
    }

    fn reveal(&mut self, coords: Coord2) {
        let Some(card) = self.grid.get_mut(coords) else {
            return;
        };
        card.reveal();
        self.observers.emit(GameEvent::CardRevealed(coords));

        if let Some((first, second)) = self.resolver.record(coords) {
            self.scheduler.schedule(
                self.config.timings.compare(),
                PendingAction::Compare(first, second),
            );
        }
    }

    fn compare(&mut self, first: Coord2, second: Coord2) {
        self.in_flight = self.in_flight.saturating_sub(2);

        let (Some(a), Some(b)) = (self.grid.get(first), self.grid.get(second)) else {
            return;
        };
        let resolution = Resolution::compare(a.card_type(), b.card_type());
        log::debug!("Compare {first:?} and {second:?}: {resolution:?}");

        match resolution {
            Resolution::Match => {
                for coords in [first, second] {
                    if let Some(card) = self.grid.get_mut(coords) {
                        card.mark_matched();
                    }
                }
                let combo = self.state.apply_match();
                self.observers.emit(GameEvent::PairMatched(first, second));
                if combo > 1 {
                    self.observers.emit(GameEvent::ComboChanged(combo));
                }
                self.observers.emit(GameEvent::ScoreChanged(self.state.score));
                self.observers
                    .emit(GameEvent::MatchCountChanged(self.state.match_number));
            }
            Resolution::Mismatch => {
                self.state.apply_mismatch();
                let delay = self.config.timings.conceal();
                self.scheduler.schedule(delay, PendingAction::Conceal(first));
                self.scheduler.schedule(delay, PendingAction::Conceal(second));
                self.observers.emit(GameEvent::PairMismatched(first, second));
                self.observers.emit(GameEvent::ScoreChanged(self.state.score));
                self.observers.emit(GameEvent::LivesChanged(self.state.lives));
            }
        }
        self.observers.emit(GameEvent::MovesChanged(self.state.moves));
        self.observers
            .emit(GameEvent::TurnCountChanged(self.state.turn_number));

        self.persist();

        if resolution.is_match() {
            self.complete_level();
        }
    }

    /// Wraps up the level once every pair is matched: clears the save, advances and stores the
    /// level, and announces the win. The next grid is only dealt by [`GameSession::next_level`].
    ///
    /// Returns whether the level was completed by this call.
    pub fn complete_level(&mut self) -> bool {
        if self.phase != SessionPhase::Playing || !self.state.all_pairs_matched() {
            return false;
        }

        self.phase = SessionPhase::LevelWon;
        if let Err(err) = self.slots.clear_snapshot() {
            log::error!("Could not clear saved game: {err}");
        }

        log::info!(
            "Level {} won with score {}, combo {}",
            self.state.level,
            self.state.score,
            self.state.combo
        );
        self.state.advance_level();
        if let Err(err) = self.slots.save_level(self.state.level) {
            log::error!("Could not save player level: {err}");
        }

        self.observers.emit(GameEvent::MovesChanged(self.state.moves));
        self.observers
            .emit(GameEvent::TurnCountChanged(self.state.turn_number));
        self.observers
            .emit(GameEvent::MatchCountChanged(self.state.match_number));
        self.observers.emit(GameEvent::LevelChanged(self.state.level));
        self.observers.emit(GameEvent::LevelWon);
        true
    }

    fn persist(&mut self) {
        if let Err(err) = self.slots.save_snapshot(&self.snapshot()) {
            log::error!("Could not save game: {err}");
        }
    }

    fn emit_counters(&mut self) {
        let state = self.state;
        self.observers.emit(GameEvent::ScoreChanged(state.score));
        self.observers.emit(GameEvent::MovesChanged(state.moves));
        self.observers.emit(GameEvent::LivesChanged(state.lives));
        self.observers.emit(GameEvent::LevelChanged(state.level));
        self.observers
            .emit(GameEvent::MatchCountChanged(state.match_number));
        self.observers
            .emit(GameEvent::TurnCountChanged(state.turn_number));
        if state.combo > 1 {
            self.observers.emit(GameEvent::ComboChanged(state.combo));
        }
    }
}

impl<S, G> core::fmt::Debug for GameSession<S, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameSession")
            .field("size", &self.size)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("in_flight", &self.in_flight)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use CardType::*;

    /// Deals pairs side by side: A A B B C C ...
    struct Unshuffled;

    impl DeckGenerator for Unshuffled {
        fn deal(&mut self, size: GridSize, palette: &[CardType]) -> Vec<CardType> {
            pair_sequence(size, palette)
        }
    }

    type Session = GameSession<MemoryStore, Unshuffled>;
    type EventLog = Rc<RefCell<Vec<GameEvent>>>;

    const MS: Duration = Duration::from_millis(1);

    fn config(palette: &[CardType]) -> EngineConfig {
        EngineConfig {
            palette: palette.to_vec(),
            ..EngineConfig::default()
        }
    }

    fn session_with(store: MemoryStore, palette: &[CardType]) -> (Session, EventLog) {
        let mut session = GameSession::with_generator(store, config(palette), Unshuffled);
        let events: EventLog = Rc::default();
        let sink = Rc::clone(&events);
        session.subscribe(move |event: &GameEvent| sink.borrow_mut().push(*event));
        (session, events)
    }

    /// Fresh 2x2 level-one session over faces `[Star, Cross]`:
    /// (0,0) and (0,1) are stars, (1,0) and (1,1) are crosses.
    fn started() -> (Session, EventLog) {
        let (mut session, events) = session_with(MemoryStore::new(), &[Star, Cross]);
        session.start_or_resume();
        events.borrow_mut().clear();
        (session, events)
    }

    fn flip_pair(session: &mut Session, first: Coord2, second: Coord2) {
        assert_eq!(session.flip(first), FlipOutcome::Flipped);
        assert_eq!(session.flip(second), FlipOutcome::Flipped);
        session.settle();
    }

    fn count(events: &EventLog, wanted: GameEvent) -> usize {
        events.borrow().iter().filter(|&&event| event == wanted).count()
    }

    #[test]
    fn fresh_start_deals_level_one() {
        let (mut session, events) = session_with(MemoryStore::new(), &[Star, Cross]);
        session.start_or_resume();

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.grid_size(), GridSize::new(2, 2));
        assert_eq!(session.state().total_pairs, 2);
        assert_eq!(session.state().lives, DEFAULT_LIVES);
        assert!(session.store().contains("CardGameSaveData"));

        let faces: Vec<_> = session.grid().iter().map(Card::card_type).collect();
        assert_eq!(faces, vec![Star, Star, Cross, Cross]);

        assert_eq!(
            *events.borrow(),
            vec![
                GameEvent::GameStarted,
                GameEvent::GridReady(GridSize::new(2, 2)),
                GameEvent::ScoreChanged(0),
                GameEvent::MovesChanged(0),
                GameEvent::LivesChanged(3),
                GameEvent::LevelChanged(1),
                GameEvent::MatchCountChanged(0),
                GameEvent::TurnCountChanged(0),
            ]
        );
    }

    #[test]
    fn matching_pair_scores_and_notifies_in_order() {
        let (mut session, events) = started();

        flip_pair(&mut session, (0, 0), (0, 1));

        assert_eq!(session.card_at((0, 0)).unwrap().state(), CardState::Matched);
        assert_eq!(session.card_at((0, 1)).unwrap().state(), CardState::Matched);
        let state = session.state();
        assert_eq!((state.score, state.combo, state.matched_pairs), (10, 1, 1));
        assert_eq!((state.moves, state.turn_number, state.match_number), (1, 1, 1));

        assert_eq!(
            *events.borrow(),
            vec![
                GameEvent::CardFlipped((0, 0)),
                GameEvent::CardFlipped((0, 1)),
                GameEvent::CardRevealed((0, 0)),
                GameEvent::CardRevealed((0, 1)),
                GameEvent::PairMatched((0, 0), (0, 1)),
                GameEvent::ScoreChanged(10),
                GameEvent::MatchCountChanged(1),
                GameEvent::MovesChanged(1),
                GameEvent::TurnCountChanged(1),
            ]
        );
        // one pair short of the total never wins
        assert_eq!(count(&events, GameEvent::LevelWon), 0);
        assert!(session.store().contains("CardGameSaveData"));
    }

    #[test]
    fn clearing_the_grid_wins_once_and_clears_save() {
        let (mut session, events) = started();

        flip_pair(&mut session, (0, 0), (0, 1));
        flip_pair(&mut session, (1, 0), (1, 1));

        assert_eq!(count(&events, GameEvent::LevelWon), 1);
        assert_eq!(count(&events, GameEvent::ComboChanged(2)), 1);
        let combo_at = events
            .borrow()
            .iter()
            .position(|&event| event == GameEvent::ComboChanged(2));
        let matched_at = events
            .borrow()
            .iter()
            .position(|&event| event == GameEvent::PairMatched((1, 0), (1, 1)));
        assert_eq!(matched_at.map(|at| at + 1), combo_at);
        assert_eq!(session.phase(), SessionPhase::LevelWon);
        assert!(!session.store().contains("CardGameSaveData"));
        assert_eq!(session.store().get("PlayerLevel").unwrap().as_deref(), Some("2"));

        let state = session.state();
        assert_eq!(state.score, 30);
        assert_eq!(state.level, 2);
        assert_eq!((state.moves, state.turn_number, state.combo, state.match_number), (0, 0, 0, 0));

        assert!(!session.complete_level());
        assert_eq!(session.flip((0, 0)), FlipOutcome::Ignored);
        assert_eq!(count(&events, GameEvent::LevelWon), 1);
        assert_eq!(events.borrow().last(), Some(&GameEvent::LevelWon));
    }

    #[test]
    fn next_level_deals_advanced_size() {
        let (mut session, _) = started();
        flip_pair(&mut session, (0, 0), (0, 1));
        flip_pair(&mut session, (1, 0), (1, 1));

        assert_eq!(session.grid_size(), GridSize::new(2, 2));
        assert_eq!(session.next_grid_size(), GridSize::new(2, 3));

        session.next_level();

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.grid_size(), GridSize::new(2, 3));
        assert_eq!(session.state().total_pairs, 3);
        assert_eq!(session.state().matched_pairs, 0);
        assert!(session.store().contains("CardGameSaveData"));
    }

    #[test]
    fn mismatch_closes_cards_and_costs_a_life() {
        let (mut session, events) = started();
        session.state.score = 1;

        flip_pair(&mut session, (0, 0), (1, 0));

        for coords in [(0, 0), (1, 0)] {
            let card = session.card_at(coords).unwrap();
            assert_eq!(card.state(), CardState::Hidden);
            assert!(card.is_flippable());
        }
        let state = session.state();
        assert_eq!((state.score, state.combo, state.lives), (0, 0, 2));
        assert_eq!(state.moves, 1);
        assert_eq!(count(&events, GameEvent::PairMismatched((0, 0), (1, 0))), 1);
        assert_eq!(count(&events, GameEvent::CardConcealed((1, 0))), 1);
    }

    #[test]
    fn mismatch_resets_combo() {
        let (mut session, _) = session_with(MemoryStore::new(), &[Star, Cross, Circle]);
        session.new_grid(2, 3);

        flip_pair(&mut session, (0, 0), (0, 1));
        assert_eq!(session.state().combo, 1);
        flip_pair(&mut session, (0, 2), (1, 1));

        assert_eq!(session.state().combo, 0);
        assert_eq!(session.state().score, 8);
    }

    #[test]
    fn lives_can_run_out_without_ending_play() {
        let (mut session, _) = started();

        for _ in 0..3 {
            flip_pair(&mut session, (0, 0), (1, 1));
        }

        assert_eq!(session.state().lives, 0);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.flip((0, 0)), FlipOutcome::Flipped);
    }

    #[test]
    fn steps_wait_for_the_clock() {
        let (mut session, _) = started();

        session.flip((0, 0));
        assert_eq!(session.card_at((0, 0)).unwrap().state(), CardState::Hidden);
        assert!(!session.card_at((0, 0)).unwrap().is_flippable());

        assert_eq!(session.advance(MS * 499), 0);
        assert_eq!(session.advance(MS), 1);
        assert_eq!(session.card_at((0, 0)).unwrap().state(), CardState::Revealed);
        assert_eq!(session.pending_flips(), &[(0, 0)]);

        session.flip((0, 1));
        session.advance(MS * 500);
        assert_eq!(session.card_at((0, 1)).unwrap().state(), CardState::Revealed);
        assert!(session.pending_flips().is_empty());
        assert_eq!(session.state().moves, 0);

        session.advance(MS * 500);
        assert_eq!(session.state().moves, 1);
        assert!(session.is_settled());
        assert_eq!(session.now(), MS * 1500);
    }

    #[test]
    fn mismatched_cards_stay_locked_until_closed() {
        let (mut session, _) = started();
        session.flip((0, 0));
        session.flip((1, 0));
        session.advance(MS * 1000);

        assert_eq!(session.state().lives, 2);
        assert_eq!(session.card_at((0, 0)).unwrap().state(), CardState::Revealed);
        assert_eq!(session.flip((0, 0)), FlipOutcome::Ignored);

        session.advance(MS * 100);
        assert_eq!(session.flip((0, 0)), FlipOutcome::Flipped);
    }

    #[test]
    fn third_flip_waits_for_comparison() {
        let (mut session, _) = session_with(MemoryStore::new(), &[Star, Cross]);
        session.new_grid(2, 4);

        session.flip((0, 0));
        session.flip((0, 2));
        assert_eq!(session.flip((1, 0)), FlipOutcome::Ignored);
        assert_eq!(session.card_at((1, 0)).unwrap().state(), CardState::Hidden);
        assert!(session.card_at((1, 0)).unwrap().is_flippable());

        session.settle();
        assert_eq!(session.flip((1, 0)), FlipOutcome::Flipped);
    }

    #[test]
    fn flipping_face_up_cards_changes_nothing() {
        let (mut session, events) = started();
        flip_pair(&mut session, (0, 0), (0, 1));
        session.flip((1, 0));
        session.settle();

        let before = (*session.state(), session.snapshot(), events.borrow().len());
        assert_eq!(session.flip((0, 0)), FlipOutcome::Ignored);
        assert_eq!(session.flip((1, 0)), FlipOutcome::Ignored);
        assert_eq!(session.flip((7, 7)), FlipOutcome::Ignored);
        session.settle();

        assert_eq!((*session.state(), session.snapshot(), events.borrow().len()), before);
        assert_eq!(session.card_at((1, 0)).unwrap().state(), CardState::Revealed);
    }

    #[test]
    fn new_grid_drops_pending_comparison() {
        let (mut session, _) = started();
        session.flip((0, 0));
        session.flip((0, 1));
        session.advance(MS * 500);
        assert!(!session.is_settled());

        session.new_grid(2, 3);
        session.settle();

        assert_eq!(session.state().moves, 0);
        assert_eq!(session.state().score, 0);
        assert!(session.grid().iter().all(|card| card.state() == CardState::Hidden));
        assert!(session.pending_flips().is_empty());
        assert_eq!(session.flip((0, 0)), FlipOutcome::Flipped);
    }

    #[test]
    fn snapshot_restores_into_new_session() {
        let (mut session, _) = session_with(MemoryStore::new(), &[Star, Cross, Circle]);
        session.start_or_resume();
        session.new_grid(2, 3);
        flip_pair(&mut session, (0, 0), (0, 1));
        flip_pair(&mut session, (0, 2), (1, 1));
        let saved = session.snapshot();
        let original_state = *session.state();

        let (mut resumed, events) = session_with(session.into_store(), &[Star, Cross, Circle]);
        resumed.start_or_resume();

        assert_eq!(*resumed.state(), original_state);
        assert_eq!(resumed.snapshot(), saved);
        assert_eq!(resumed.grid_size(), GridSize::new(2, 3));
        assert_eq!(resumed.card_at((0, 1)).unwrap().state(), CardState::Matched);
        assert_eq!(resumed.card_at((1, 1)).unwrap().state(), CardState::Hidden);
        assert_eq!(count(&events, GameEvent::LivesChanged(2)), 1);
        assert_eq!(count(&events, GameEvent::ScoreChanged(8)), 1);
    }

    #[test]
    fn revealed_cards_restore_face_down() {
        let (mut session, _) = started();
        session.flip((0, 0));
        session.settle();
        let saved = session.snapshot();

        let (mut other, _) = session_with(MemoryStore::new(), &[Star, Cross]);
        other.restore(&saved).unwrap();

        assert_eq!(other.card_at((0, 0)).unwrap().state(), CardState::Hidden);
        assert_eq!(other.snapshot(), saved);
    }

    #[test]
    fn corrupt_save_falls_back_to_fresh_game() {
        let mut store = MemoryStore::new();
        store.set("CardGameSaveData", "{\"rows\": 2, \"columns\"").unwrap();
        let (mut session, _) = session_with(store, &[Star, Cross]);

        session.start_or_resume();

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.grid_size(), GridSize::new(2, 2));
        assert!(session.store().get("CardGameSaveData").unwrap().is_some());
        let stored = session.store().get("CardGameSaveData").unwrap().unwrap();
        assert!(SaveSnapshot::from_json(&stored).is_ok());
    }

    #[test]
    fn size_mismatched_save_falls_back_to_fresh_game() {
        let saved = SaveSnapshot {
            rows: 3,
            columns: 4,
            score: 99,
            combo: 0,
            moves: 0,
            lives: 3,
            turn_number: 0,
            match_number: 0,
            grid_card_types: vec![Star; 4],
            grid_card_matched: vec![false; 4],
        };
        let mut store = MemoryStore::new();
        store.set("CardGameSaveData", &saved.to_json().unwrap()).unwrap();
        let (mut session, _) = session_with(store, &[Star, Cross]);

        session.start_or_resume();

        assert_eq!(session.state().score, 0);
        assert_eq!(session.grid_size(), GridSize::new(2, 2));
    }

    #[test]
    fn restored_lives_below_one_reset_to_default() {
        let saved = SaveSnapshot {
            rows: 2,
            columns: 2,
            score: 4,
            combo: 0,
            moves: 5,
            lives: -2,
            turn_number: 5,
            match_number: 0,
            grid_card_types: vec![Cross, Star, Star, Cross],
            grid_card_matched: vec![false; 4],
        };
        let mut store = MemoryStore::new();
        store.set("CardGameSaveData", &saved.to_json().unwrap()).unwrap();
        let (mut session, _) = session_with(store, &[Star, Cross]);

        session.start_or_resume();

        assert_eq!(session.state().lives, 3);
        assert_eq!(session.state().moves, 5);
        assert_eq!(session.card_at((0, 1)).unwrap().card_type(), Star);
    }

    fn cleared_save() -> SaveSnapshot {
        SaveSnapshot {
            rows: 2,
            columns: 2,
            score: 20,
            combo: 2,
            moves: 2,
            lives: 3,
            turn_number: 2,
            match_number: 2,
            grid_card_types: vec![Star, Star, Cross, Cross],
            grid_card_matched: vec![true; 4],
        }
    }

    #[test]
    fn resume_of_cleared_save_completes_level() {
        let mut store = MemoryStore::new();
        store.set("CardGameSaveData", &cleared_save().to_json().unwrap()).unwrap();
        let (mut session, events) = session_with(store, &[Star, Cross]);

        session.start_or_resume();

        assert_eq!(session.phase(), SessionPhase::LevelWon);
        assert_eq!(session.state().level, 2);
        assert_eq!(session.state().score, 20);
        assert!(!session.store().contains("CardGameSaveData"));
        assert_eq!(session.store().get("PlayerLevel").unwrap().as_deref(), Some("2"));
        assert_eq!(count(&events, GameEvent::LevelWon), 1);
        assert_eq!(events.borrow().last(), Some(&GameEvent::LevelWon));
    }

    #[test]
    fn restoring_cleared_snapshot_completes_level() {
        let (mut session, events) = started();

        session.restore(&cleared_save()).unwrap();

        assert_eq!(session.phase(), SessionPhase::LevelWon);
        assert_eq!(session.state().level, 2);
        assert_eq!(count(&events, GameEvent::LevelWon), 1);
        assert!(!session.complete_level());
    }

    #[test]
    fn odd_grid_wins_with_leftover_hidden() {
        let (mut session, events) = started();
        session.new_grid(3, 3);
        assert_eq!(session.state().total_pairs, 4);

        // stars at (0,0) (0,1) (1,1) (1,2), crosses at (0,2) (1,0) (2,0) (2,1), extra star at (2,2)
        flip_pair(&mut session, (0, 0), (0, 1));
        flip_pair(&mut session, (0, 2), (1, 0));
        flip_pair(&mut session, (1, 1), (1, 2));
        assert_eq!(session.phase(), SessionPhase::Playing);
        flip_pair(&mut session, (2, 0), (2, 1));

        assert_eq!(session.phase(), SessionPhase::LevelWon);
        assert_eq!(session.state().matched_pairs, 4);
        let leftover = session.card_at((2, 2)).unwrap();
        assert_eq!(leftover.card_type(), Star);
        assert_eq!(leftover.state(), CardState::Hidden);
        assert_eq!(count(&events, GameEvent::LevelWon), 1);
        assert_eq!(session.flip((2, 2)), FlipOutcome::Ignored);
    }

    #[test]
    fn non_positive_starting_lives_still_restores_playable_lives() {
        let mut saved = cleared_save();
        saved.lives = 0;
        saved.grid_card_matched = vec![false; 4];
        let config = EngineConfig {
            starting_lives: 0,
            palette: vec![Star, Cross],
            ..EngineConfig::default()
        };
        let mut session = GameSession::with_generator(MemoryStore::new(), config, Unshuffled);

        session.restore(&saved).unwrap();

        assert_eq!(session.state().lives, DEFAULT_LIVES);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn fresh_start_uses_stored_level() {
        let mut store = MemoryStore::new();
        store.set("PlayerLevel", "3").unwrap();
        let (mut session, _) = session_with(store, &[Star, Cross]);

        session.start_or_resume();

        assert_eq!(session.state().level, 3);
        assert_eq!(session.grid_size(), GridSize::new(3, 4));
    }

    #[test]
    fn empty_palette_deals_empty_grid() {
        let (mut session, _) = session_with(MemoryStore::new(), &[]);
        session.start_or_resume();

        assert!(session.grid().is_empty());
        assert_eq!(session.grid_size(), GridSize::new(2, 2));
        assert_eq!(session.flip((0, 0)), FlipOutcome::Ignored);
        assert!(!session.complete_level());
    }

    #[test]
    fn unsubscribed_observer_hears_nothing() {
        let (mut session, events) = session_with(MemoryStore::new(), &[Star, Cross]);
        let other: EventLog = Rc::default();
        let sink = Rc::clone(&other);
        let id = session.subscribe(move |event: &GameEvent| sink.borrow_mut().push(*event));

        assert!(session.unsubscribe(id));
        session.start_or_resume();

        assert!(other.borrow().is_empty());
        assert!(!events.borrow().is_empty());
    }

    #[test]
    fn seeded_sessions_deal_alike() {
        let config = EngineConfig {
            seed: Some(11),
            ..EngineConfig::default()
        };
        let mut a = GameSession::new(MemoryStore::new(), config.clone());
        let mut b = GameSession::new(MemoryStore::new(), config);
        a.new_grid(6, 6);
        b.new_grid(6, 6);

        assert_eq!(a.snapshot(), b.snapshot());
    }
}
