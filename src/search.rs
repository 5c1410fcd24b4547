//! Iterative-deepening alpha-beta negamax search with quiescence extension
//! (spec 4.4). This module owns the tree-walk; catalogue probes (§4.6),
//! move ordering (§4.2), and evaluation (§4.1) are consumed as collaborators
//! rather than reimplemented here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::{ChessMove, Color};
use crate::catalogue::{self, OpeningBook, Tablebases};
use crate::evaluation::{self, Evaluation};
use crate::ordering;
use crate::position::Position;
use crate::tt::{calc_node_type, NodeType, TTEntry, TranspositionTable, DEPTH_INFINITY};
use crate::types::{Score, INFINITY, MAX_TB_PIECES, SCORE_WIN, UNSEARCHED};

/// One completed iterative-deepening depth, kept for the decision stack
/// (spec 3: "decision stack (audit log of per-depth best moves)").
#[derive(Clone, Copy, Debug)]
pub struct Decision {
    pub mv: ChessMove,
    pub score: Score,
    pub depth: u32,
}

/// Mutable state for one `go` invocation (spec 3's "Searcher state"). Owns
/// the position and transposition table for the duration of the search;
/// both are handed back to the caller once the search thread joins (spec 5:
/// "the TT owned by the searcher; expose it to the manager only after
/// join").
pub struct Searcher {
    position: Position,
    tt: TranspositionTable,
    evaluation: Evaluation,
    pub depth: u32,
    pub last_score: Score,
    /// The committed best move: only depths that ran to completion before
    /// the stop signal fired ever update this (spec 3 invariant 4).
    pub decision: Option<ChessMove>,
    pub decision_stack: Vec<Decision>,
    use_opening_book: bool,
    use_tablebase: bool,
    book: Option<Arc<OpeningBook>>,
    tablebases: Option<Arc<Tablebases>>,
    pub stop: Arc<AtomicBool>,
    pub nodes: u64,
}

impl Searcher {
    pub fn new(
        position: Position,
        tt: TranspositionTable,
        use_opening_book: bool,
        use_tablebase: bool,
        book: Option<Arc<OpeningBook>>,
        tablebases: Option<Arc<Tablebases>>,
    ) -> Self {
        Searcher {
            position,
            tt,
            evaluation: Evaluation::default(),
            depth: 0,
            last_score: 0,
            decision: None,
            decision_stack: Vec::new(),
            use_opening_book,
            use_tablebase,
            book,
            tablebases,
            stop: Arc::new(AtomicBool::new(false)),
            nodes: 0,
        }
    }

    /// A clone of the stop flag, handed to the time manager so it can
    /// request cancellation from another thread (spec 5).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Replaces the internal stop flag with one supplied by the caller, so a
    /// driver can hold its own handle before the search is even spawned
    /// (needed for a UCI `stop` command that must be able to cancel a search
    /// whose timer has not yet fired).
    pub fn set_stop(&mut self, stop: Arc<AtomicBool>) {
        self.stop = stop;
    }

    /// Consumes the searcher, returning its transposition table to the
    /// caller (spec 4.5 step 6: "Harvest `searcher.decision` and
    /// `searcher.transposition_table`").
    pub fn into_tt(self) -> TranspositionTable {
        self.tt
    }

    fn sign(&self) -> Score {
        if self.position.side_to_move() == Color::White {
            1
        } else {
            -1
        }
    }

    fn evaluate_signed(&self) -> Score {
        self.evaluation.evaluate(&self.position) * self.sign()
    }

    /// Iterative deepening (spec 4.4.1). Calls `on_depth` after every
    /// completed depth is committed, so a driver can print UCI `info` lines
    /// without this module knowing about UCI.
    pub fn run<F: FnMut(&Searcher)>(&mut self, max_depth: u32, mut on_depth: F) {
        // S6: a position that is already over is reported as "no move",
        // without entering the depth loop at all.
        if self.position.is_game_over() {
            self.decision = None;
            return;
        }

        let stage = evaluation::game_stage(&self.position);
        if self.use_opening_book && stage == crate::pst::GameStage::Opening {
            if let Some(book) = self.book.clone() {
                if let Some(mv) = catalogue::opening_lookup(&book, self.position.board()) {
                    self.decision = Some(mv);
                    self.last_score = 0;
                    self.depth = 0;
                    self.stop.store(true, Ordering::Relaxed);
                    on_depth(self);
                    return;
                }
            }
        }

        // Guarantees a non-null decision even if cancellation lands before
        // depth 1 finishes (spec 4.4.1 step 3).
        self.decision = self.position.legal_moves().into_iter().next();

        for depth in 1..=max_depth {
            let (mv, score) = self.alpha_beta(depth);

            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            if let Some(mv) = mv {
                self.decision = Some(mv);
                self.last_score = score;
                self.depth = depth;
                self.decision_stack.push(Decision { mv, score, depth });
                on_depth(self);
            }

            if score.abs() >= SCORE_WIN {
                break;
            }
        }
    }

    /// `αβ_search(p, depth)` (spec 4.4.2): runs negamax over the full
    /// window, then reads back the move the search settled on.
    fn alpha_beta(&mut self, depth: u32) -> (Option<ChessMove>, Score) {
        let score = self.negamax(depth, -INFINITY, INFINITY);
        let key = self.position.key();
        let mv = self.tt.get(&key).and_then(|e| e.moves.first().copied());
        (mv, score)
    }

    fn negamax(&mut self, depth: u32, mut alpha: Score, mut beta: Score) -> Score {
        self.nodes += 1;
        let alpha_original = alpha;
        let key = self.position.key();
        let entry = self.tt.get(&key).cloned();

        if let Some(e) = &entry {
            if e.depth >= depth {
                match e.node_type {
                    NodeType::Exact => return e.score,
                    _ if alpha >= beta => return e.score,
                    NodeType::LowerBound => alpha = alpha.max(e.score),
                    NodeType::UpperBound => beta = beta.min(e.score),
                }
            }
        }

        if self.stop.load(Ordering::Relaxed) {
            return self.evaluate_signed();
        }

        if self.position.is_game_over() {
            return self.evaluate_signed();
        }

        if self.use_tablebase && self.position.piece_count() <= MAX_TB_PIECES {
            let sign = self.sign();
            if let Some(score) = self.probe_tablebase(&key, sign) {
                return score;
            }
        }

        if depth == 0 {
            return quiesce(&mut self.position, &self.evaluation, alpha, beta);
        }

        let moves: Vec<ChessMove> = match &entry {
            Some(e) if !e.moves.is_empty() => e.moves.clone(),
            _ => ordering::prioritized(self.position.board())
                .into_iter()
                .map(|pm| pm.mv)
                .collect(),
        };

        if moves.is_empty() {
            return self.evaluate_signed();
        }

        let mut scored: Vec<(ChessMove, Score)> =
            moves.into_iter().map(|mv| (mv, UNSEARCHED)).collect();

        for pair in scored.iter_mut() {
            self.position.push(pair.0);
            let v = -self.negamax(depth - 1, -beta, -alpha);
            self.position.pop();
            pair.1 = v;

            if v >= beta {
                alpha = beta;
                break;
            }
            if v > alpha {
                alpha = v;
            }
        }

        scored.sort_unstable_by(|a, b| b.1.cmp(&a.1));

        if !self.stop.load(Ordering::Relaxed) {
            let node_type = calc_node_type(alpha, alpha_original, beta);
            self.tt.put(
                key,
                TTEntry {
                    score: alpha,
                    depth,
                    moves: scored.into_iter().map(|(mv, _)| mv).collect(),
                    node_type,
                },
            );
        }

        alpha
    }

    /// Isolates the tablebase path: any probe failure (missing table,
    /// position outside coverage, FEN bridge error) is modeled as `None`
    /// rather than a thrown exception, so a failure here can never escape
    /// into the surrounding negamax call (spec 4.6, spec 7).
    fn probe_tablebase(&mut self, key: &str, sign: Score) -> Option<Score> {
        let tb = self.tablebases.clone()?;
        let board = self.position.board();
        let wdl = match tb.endgame_wdl(board) {
            Some(wdl) => wdl,
            None => {
                // `catalogue::Tablebases::endgame_wdl` already logged the
                // underlying cause; this falls through to the normal search
                // path rather than ever propagating (spec 4.6, spec 7).
                eprintln!("tablebase probe failed for {key}: falling through to normal search");
                return None;
            }
        };
        let mv = tb.endgame_move(board);
        let score = catalogue::tablebase_score(wdl, sign);
        // `node_type` is unspecified by spec 4.6 for tablebase entries; a
        // resolved WDL is an exact value rather than a search bound, so
        // `Exact` is the natural choice.
        self.tt.put(
            key.to_string(),
            TTEntry {
                score,
                depth: DEPTH_INFINITY,
                moves: mv.into_iter().collect(),
                node_type: NodeType::Exact,
            },
        );
        Some(score)
    }
}

/// `quiesce(p, α, β)` (spec 4.4.3): a minimal quiescence that only probes
/// the single best capture per node — a principal-variation probe through
/// captures, not a full capture-tree search. Free of search state (no TT,
/// no stop flag) because the spec defines it purely in terms of position
/// and evaluation.
pub fn quiesce(pos: &mut Position, eval: &Evaluation, mut alpha: Score, beta: Score) -> Score {
    let sign = if pos.side_to_move() == Color::White { 1 } else { -1 };
    let stand_pat = eval.evaluate(pos) * sign;

    if stand_pat > beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mv = match ordering::best_capture(pos.board()) {
        Some(mv) => mv,
        None => return alpha,
    };

    pos.push(mv);
    let v = -quiesce(pos, eval, -beta, -alpha);
    pos.pop();

    if v >= beta {
        return beta;
    }
    if v > alpha {
        alpha = v;
    }
    alpha
}
