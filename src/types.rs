use std::path::PathBuf;

use crate::board::ChessMove;

pub type Score = i32;

/// One side has checkmated the other; used as the absolute score ceiling.
pub const SCORE_WIN: Score = 100_000;
/// Draw utility.
pub const SCORE_DRAW: Score = 0;
/// A value strictly below any achievable score, used to seed `assigned_value`
/// before a move has been explored (spec step 4.4.2.8).
pub const UNSEARCHED: Score = -(SCORE_WIN + 1);

pub const MAX_PLY: usize = 128;
pub const DEFAULT_MAX_DEPTH: u32 = 64;
pub const PAWN_VALUE: Score = 100;

/// The (α, β) window negamax is seeded with at the root (spec 4.4.2:
/// `negamax(p, depth, −∞, +∞)`). Wide enough that no real evaluation ever
/// reaches it, and its negation never overflows `Score`.
pub const INFINITY: Score = Score::MAX / 2;

/// Tablebase probes are only attempted at or below this many men on the board.
pub const MAX_TB_PIECES: u32 = 4;

/// Configuration for one engine instance. Mutated live by UCI `setoption`.
pub struct EngineConfig {
    pub syzygy_path: Option<PathBuf>,
    pub opening_book_path: Option<PathBuf>,
    pub max_depth: u32,
    pub use_opening_book: bool,
    pub use_tablebase: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            syzygy_path: None,
            opening_book_path: Some(PathBuf::from("data/performance.bin")),
            max_depth: DEFAULT_MAX_DEPTH,
            use_opening_book: true,
            use_tablebase: true,
        }
    }
}

/// Outcome of one `perform_search` call, harvested by the UCI driver.
pub struct SearchResult {
    pub best_move: Option<ChessMove>,
    pub score: Score,
    pub depth: u32,
    pub nodes: u64,
}
