//! Static move ordering (spec 4.2). A one-shot priority pass, not a
//! hash-move/killer/history scheme — the search layer itself refines move
//! order across iterations by sorting on `assigned_value` (spec 4.4.2.10).

use crate::board::{Board, ChessMove, Piece};
use crate::evaluation::MATERIAL_VALUES;

const KING_VALUE: f64 = MATERIAL_VALUES[5] as f64;

/// A legal move paired with its ordering-local priority (spec 9: "ordering-
/// local arrays or tuples `(move, score)`; Move stays immutable" rather than
/// mutating fields onto Move in place).
#[derive(Clone, Copy, Debug)]
pub struct PrioritizedMove {
    pub mv: ChessMove,
    pub priority: f64,
}

/// Static priority of `mv` at `board` (spec 4.2).
fn priority(board: &Board, mv: ChessMove) -> f64 {
    let after = board.make_move_new(mv);
    if !after.checkers().is_empty() {
        return 21.0;
    }

    if let Some(victim) = board.piece_on(mv.get_dest()) {
        let attacker = board
            .piece_on(mv.get_source())
            .expect("move source square has no piece");
        return mvv_lva(victim, attacker);
    }

    // En passant: the destination square is empty, so the capture check above
    // misses it even though it is a genuine capture.
    if let Some(ep_sq) = board.en_passant() {
        if mv.get_dest() == ep_sq && board.piece_on(mv.get_source()) == Some(Piece::Pawn) {
            return mvv_lva(Piece::Pawn, Piece::Pawn);
        }
    }

    if advances(board, mv) {
        return 1.0;
    }

    0.0
}

/// `victim_value + (king_value - aggressor_value) / king_value` (spec 4.2.2) —
/// captured high-value piece first, cheaper attacker breaking ties via a
/// fractional bonus in (0, 1].
fn mvv_lva(victim: Piece, aggressor: Piece) -> f64 {
    let victim_value = MATERIAL_VALUES[victim.to_index()] as f64;
    let aggressor_value = MATERIAL_VALUES[aggressor.to_index()] as f64;
    victim_value + (KING_VALUE - aggressor_value) / KING_VALUE
}

fn advances(board: &Board, mv: ChessMove) -> bool {
    let src_rank = mv.get_source().rank().to_index();
    let dst_rank = mv.get_dest().rank().to_index();
    match board.side_to_move() {
        crate::board::Color::White => dst_rank > src_rank,
        crate::board::Color::Black => dst_rank < src_rank,
    }
}

/// All legal moves, sorted by static priority descending (spec 4.2: sort
/// stability is not required).
pub fn prioritized(board: &Board) -> Vec<PrioritizedMove> {
    use crate::board::MoveGen;
    let mut scored: Vec<PrioritizedMove> = MoveGen::new_legal(board)
        .map(|mv| PrioritizedMove {
            mv,
            priority: priority(board, mv),
        })
        .collect();
    scored.sort_unstable_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap());
    scored
}

/// The legal moves whose destination square is occupied — the literal
/// "captures" definition spec 4.2 uses for quiescence, which deliberately
/// excludes en passant (whose destination square is empty).
pub fn quiescence_moves(board: &Board) -> Vec<PrioritizedMove> {
    use crate::board::MoveGen;
    let mut scored: Vec<PrioritizedMove> = MoveGen::new_legal(board)
        .filter(|mv| board.piece_on(mv.get_dest()).is_some())
        .map(|mv| {
            let victim = board.piece_on(mv.get_dest()).unwrap();
            let attacker = board.piece_on(mv.get_source()).unwrap();
            PrioritizedMove {
                mv,
                priority: mvv_lva(victim, attacker),
            }
        })
        .collect();
    scored.sort_unstable_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap());
    scored
}

/// The best-scoring quiescence move, if any (spec 4.2's `best_capture`).
pub fn best_capture(board: &Board) -> Option<ChessMove> {
    quiescence_moves(board).into_iter().next().map(|pm| pm.mv)
}
