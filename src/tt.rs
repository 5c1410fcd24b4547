//! Transposition table (spec 3 / 4.3): an insertion-only mapping from
//! position key to cached entry. No eviction, no replacement policy — the
//! teacher's depth-preferred aging scheme is deliberately not carried over
//! (spec 3: "Insertion-only overwrite on collision (last write wins); no
//! eviction in the specified core").

use std::collections::HashMap;

use crate::board::ChessMove;
use crate::position::Position;
use crate::types::{Score, MAX_PLY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    LowerBound,
    UpperBound,
}

/// `+∞` sentinel for tablebase-resolved entries (spec 3).
pub const DEPTH_INFINITY: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct TTEntry {
    pub score: Score,
    pub depth: u32,
    pub moves: Vec<ChessMove>,
    pub node_type: NodeType,
}

#[derive(Default)]
pub struct TranspositionTable {
    entries: HashMap<String, TTEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TTEntry> {
        self.entries.get(key)
    }

    /// Last write wins; no replacement policy (spec 4.3).
    pub fn put(&mut self, key: String, entry: TTEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Classifies a stored score against the window it was searched with (spec 4.3):
/// `α_original` is the α value at the *entry* to the call that produced `score`,
/// before that call's own widening — the caller must snapshot it up front.
pub fn calc_node_type(score: Score, alpha_original: Score, beta: Score) -> NodeType {
    if score >= beta {
        NodeType::LowerBound
    } else if score <= alpha_original {
        NodeType::UpperBound
    } else {
        NodeType::Exact
    }
}

/// Principal variation extraction (spec 4.3): follow `entry.moves[0]` from
/// `position`, push it, look up the resulting position, continue until the
/// key is absent. Used for logging and testing only — never consulted by
/// the search itself. Takes its own copy of `position` so the walk can push
/// without disturbing the caller's.
///
/// Bounded by `MAX_PLY` as a practical guard against an unbounded walk
/// should a stored `moves` list ever cycle back to an already-visited key;
/// the spec's termination condition ("until key absent") is otherwise
/// followed literally.
pub fn extract_pv(tt: &TranspositionTable, position: &Position) -> Vec<ChessMove> {
    let mut pv = Vec::new();
    let mut pos = position.clone();

    for _ in 0..MAX_PLY {
        let mv = match tt.get(&pos.key()).and_then(|e| e.moves.first().copied()) {
            Some(mv) => mv,
            None => break,
        };
        pv.push(mv);
        pos.push(mv);
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: Score) -> TTEntry {
        TTEntry {
            score,
            depth: 4,
            moves: Vec::new(),
            node_type: NodeType::Exact,
        }
    }

    #[test]
    fn test_round_trip() {
        let mut tt = TranspositionTable::new();
        tt.put("k".to_string(), entry(10));
        assert_eq!(tt.get("k").unwrap().score, 10);
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let mut tt = TranspositionTable::new();
        tt.put("k".to_string(), entry(10));
        tt.put("k".to_string(), entry(20));
        assert_eq!(tt.get("k").unwrap().score, 20);
    }

    #[test]
    fn test_miss_is_none() {
        let tt = TranspositionTable::new();
        assert!(tt.get("absent").is_none());
    }

    #[test]
    fn test_node_type_classification() {
        assert_eq!(calc_node_type(0, -1, 1), NodeType::Exact);
        assert_eq!(calc_node_type(-1, -1, 1), NodeType::UpperBound);
        assert_eq!(calc_node_type(1, -1, 1), NodeType::LowerBound);
    }

    #[test]
    fn test_extract_pv_follows_moves_until_key_absent() {
        crate::board::init();
        use crate::board::{Board, ChessMove, File, Rank, Square};

        let start = Position::new(Board::default());
        let e2e4 = ChessMove::new(
            Square::make_square(Rank::from_index(1), File::from_index(4)),
            Square::make_square(Rank::from_index(3), File::from_index(4)),
            None,
        );
        let mut after_e4 = start.clone();
        after_e4.push(e2e4);
        let e7e5 = ChessMove::new(
            Square::make_square(Rank::from_index(6), File::from_index(4)),
            Square::make_square(Rank::from_index(4), File::from_index(4)),
            None,
        );

        let mut tt = TranspositionTable::new();
        tt.put(
            start.key(),
            TTEntry {
                score: 10,
                depth: 2,
                moves: vec![e2e4],
                node_type: NodeType::Exact,
            },
        );
        tt.put(
            after_e4.key(),
            TTEntry {
                score: -10,
                depth: 1,
                moves: vec![e7e5],
                node_type: NodeType::Exact,
            },
        );

        let pv = extract_pv(&tt, &start);
        assert_eq!(pv, vec![e2e4, e7e5]);
    }

    #[test]
    fn test_extract_pv_empty_when_no_entry() {
        crate::board::init();
        use crate::board::Board;
        let tt = TranspositionTable::new();
        let pos = Position::new(Board::default());
        assert!(extract_pv(&tt, &pos).is_empty());
    }
}
