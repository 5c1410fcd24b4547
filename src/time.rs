//! Cooperative time management (spec 4.5): translates a clock snapshot and
//! a `go` command into a wall-clock search budget, launches the searcher on
//! a dedicated thread, cancels it on expiry, and harvests the decision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::board::ChessMove;
use crate::catalogue::{OpeningBook, Tablebases};
use crate::clock::Clock;
use crate::position::Position;
use crate::search::Searcher;
use crate::tt::TranspositionTable;
use crate::types::Score;

/// The outcome of one `perform_search` call.
pub struct SearchOutcome {
    pub decision: Option<ChessMove>,
    pub score: Score,
    pub depth: u32,
    pub nodes: u64,
    pub tt: TranspositionTable,
}

/// Owns the live clock plus a copy of the original time control (spec 4.5:
/// "`TimeManager` keeps both the live `time_control` and a deep copy of the
/// original for `new_game()`").
pub struct TimeManager {
    pub time_control: Clock,
    original: Clock,
    pub moves_to_go: u32,
    pub done: bool,
}

impl TimeManager {
    pub fn new(clock: Clock, moves_to_go: u32) -> Self {
        TimeManager {
            time_control: clock.clone(),
            original: clock,
            moves_to_go: moves_to_go.max(1),
            done: false,
        }
    }

    /// Reset to the original time control (spec 4.5's `Clock::new_game()`,
    /// realized here on the manager since it owns the original snapshot).
    pub fn new_game(&mut self) {
        self.time_control = self.original.clone();
        self.done = false;
    }

    /// `allocate_time()` (spec 4.5): seconds this move may spend, capped at
    /// half the remaining base time.
    pub fn allocate_time(&self) -> f64 {
        let available_ms = self.time_control.base_time_ms;
        let base_alloc_ms = (available_ms / self.moves_to_go as u64) as f64
            + self.time_control.unconditional_increment_ms as f64
            + self.time_control.conditional_increment_ms as f64;
        let cap_ms = 0.5 * available_ms as f64;
        base_alloc_ms.min(cap_ms) / 1000.0
    }

    /// `perform_search(p, open_lookup, tb_lookup)` (spec 4.5). Runs on the
    /// calling (manager) thread: spawns the searcher, sleeps for the
    /// allocated budget, then signals cancellation and joins.
    ///
    /// `stop` is supplied by the caller rather than created here, so a
    /// driver (e.g. the UCI loop) can hold its own clone and honor an
    /// explicit `stop` command before the allocated time elapses.
    #[allow(clippy::too_many_arguments)]
    pub fn perform_search(
        &mut self,
        position: Position,
        tt: TranspositionTable,
        max_depth: u32,
        use_opening_book: bool,
        use_tablebase: bool,
        book: Option<Arc<OpeningBook>>,
        tablebases: Option<Arc<Tablebases>>,
        stop: Arc<AtomicBool>,
        mut on_depth: impl FnMut(&Searcher) + Send + 'static,
    ) -> SearchOutcome {
        self.done = false;
        let t = self.allocate_time();
        self.time_control.spent_time((t * 1000.0) as u64);

        let mut searcher = Searcher::new(position, tt, use_opening_book, use_tablebase, book, tablebases);
        searcher.set_stop(stop.clone());

        let handle = thread::spawn(move || {
            searcher.run(max_depth, |s| on_depth(s));
            searcher
        });

        // Infinite analysis (t == 0, e.g. UCI `go infinite`) never schedules
        // a stop event on its own; the caller must issue an explicit `stop`.
        if t > 0.0 {
            thread::sleep(Duration::from_secs_f64(t));
            stop.store(true, Ordering::Relaxed);
        }

        let searcher = handle.join().expect("search thread panicked");
        self.done = true;

        SearchOutcome {
            decision: searcher.decision,
            score: searcher.last_score,
            depth: searcher.depth,
            nodes: searcher.nodes,
            tt: searcher.into_tt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_time_basic() {
        let tm = TimeManager::new(Clock::new(60_000), 30);
        let t = tm.allocate_time();
        assert!(t > 0.0 && t <= 2.0);
    }

    #[test]
    fn test_allocate_time_capped_at_half_remaining() {
        let tm = TimeManager::new(Clock::with_increment(1000, 900), 1);
        // base_alloc = 1000/1 + 900 = 1900ms, cap = 500ms -> result 0.5s
        assert_eq!(tm.allocate_time(), 0.5);
    }

    #[test]
    fn test_new_game_restores_original_clock() {
        let mut tm = TimeManager::new(Clock::new(60_000), 30);
        tm.time_control.spent_time(59_000);
        tm.new_game();
        assert_eq!(tm.time_control.base_time_ms, 60_000);
    }

    #[test]
    fn test_perform_search_produces_a_decision() {
        crate::board::init();
        let position = Position::new(crate::board::Board::default());
        let mut tm = TimeManager::new(Clock::new(2000), 30);
        let outcome = tm.perform_search(
            position,
            TranspositionTable::new(),
            4,
            false,
            false,
            None,
            None,
            Arc::new(AtomicBool::new(false)),
            |_| {},
        );
        assert!(outcome.decision.is_some());
        assert!(tm.done);
    }
}
