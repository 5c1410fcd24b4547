//! Chess clock model (spec 3 / 4.5): base time plus a Fischer (unconditional)
//! increment, a Bronstein (conditional) increment, a move delay, and an
//! ordered chain of later time controls that swap in at a given move number
//! (e.g. "40 moves in 90 minutes, then game in 30 minutes").
//!
//! `next_time_controls` boxes its `Clock` payload because the type is
//! otherwise recursive (a clock's next phase is itself a clock).

#[derive(Clone, Debug, PartialEq)]
pub struct Clock {
    pub base_time_ms: u64,
    /// Fischer increment: credited every move regardless of time spent.
    pub unconditional_increment_ms: u64,
    /// Bronstein increment: credited up to the time actually spent thinking.
    pub conditional_increment_ms: u64,
    pub delay_ms: u64,
    pub next_time_controls: Vec<(u32, Box<Clock>)>,
}

impl Clock {
    pub fn new(base_time_ms: u64) -> Self {
        Clock {
            base_time_ms,
            unconditional_increment_ms: 0,
            conditional_increment_ms: 0,
            delay_ms: 0,
            next_time_controls: Vec::new(),
        }
    }

    pub fn with_increment(base_time_ms: u64, unconditional_increment_ms: u64) -> Self {
        Clock {
            unconditional_increment_ms,
            ..Clock::new(base_time_ms)
        }
    }

    /// Debit `amount_ms` from the base time, never below zero.
    pub fn spent_time(&mut self, amount_ms: u64) {
        self.base_time_ms = self.base_time_ms.saturating_sub(amount_ms);
    }

    /// Credit the increments due after a move that took `spent_ms` to play.
    /// The unconditional increment is always added; the conditional one is
    /// capped by the time actually spent (spec 3: "conditional increment
    /// (Bronstein)" — never refunds more than was used).
    pub fn credit_increment(&mut self, spent_ms: u64) {
        self.base_time_ms += self.unconditional_increment_ms;
        self.base_time_ms += self.conditional_increment_ms.min(spent_ms);
    }

    /// Swap in the next chained time control once `move_number` reaches it
    /// (spec 4.5: "a multi-session time control"). The chain carried by the
    /// replacement clock is preserved, so further swaps still fire later.
    pub fn advance(&mut self, move_number: u32) {
        if let Some(idx) = self
            .next_time_controls
            .iter()
            .position(|(threshold, _)| move_number >= *threshold)
        {
            let (_, next) = self.next_time_controls.remove(idx);
            *self = *next;
        }
    }
}
