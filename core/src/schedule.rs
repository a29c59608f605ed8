use core::time::Duration;

/// Deferred actions on a virtual clock.
///
/// Nothing runs on its own: the owner advances the clock and pops whatever has come due, which
/// keeps animation-length waits deterministic under test.
#[derive(Clone, Debug)]
pub struct Scheduler<A> {
    now: Duration,
    queue: Vec<Scheduled<A>>,
    next_seq: u64,
}

#[derive(Clone, Debug)]
struct Scheduled<A> {
    due: Duration,
    seq: u64,
    action: A,
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due: self.now.saturating_add(delay),
            seq,
            action,
        });
    }

    /// Due time of the earliest pending action
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.iter().map(|entry| entry.due).min()
    }

    /// Pops the earliest action due at or before `deadline`, moving the clock to its due time.
    /// Actions due at the same time come out in the order they were scheduled.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<A> {
        let (index, _) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))?;

        let entry = self.queue.remove(index);
        self.now = self.now.max(entry.due);
        Some(entry.action)
    }

    /// Moves the clock forward without running anything
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Drops every pending action. The clock keeps its time.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}
