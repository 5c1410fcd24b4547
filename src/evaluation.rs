//! Linear material + piece-square evaluation (spec 4.1), supplemented with the
//! pawn-structure and mobility features SPEC_FULL.md 4.1 adds on top of the
//! distilled spec's two primary features.

use crate::board::{BitBoard, Color, MoveGen, Piece, ALL_SQUARES};
use crate::position::{GameResult, Position};
use crate::pst::{self, GameStage};
use crate::types::{Score, SCORE_DRAW, SCORE_WIN};

/// Centipawn material values, indexed by `Piece::to_index()`.
pub const MATERIAL_VALUES: [Score; 6] = [100, 320, 330, 500, 900, 20_000];

/// One term of the closed feature set (spec 9: "tagged-variant enumeration of
/// features" in place of the distilled spec's dynamic function list).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feature {
    Material,
    PieceSquare,
    PawnStructure,
    Mobility,
}

/// Ordered (feature, weight) pairs, summed into a single score (spec 3/4.1).
pub struct Evaluation {
    features: Vec<Feature>,
    weights: Vec<Score>,
}

impl Evaluation {
    pub fn new() -> Self {
        Evaluation {
            features: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Append a feature. Panics if the features/weights lists are already out
    /// of step — the one fatal, construction-time-only error this evaluation
    /// raises (spec 7).
    pub fn add_feature(&mut self, feature: Feature, weight: Score) {
        self.check_consistency();
        self.features.push(feature);
        self.weights.push(weight);
    }

    pub fn remove_feature(&mut self, feature: Feature) {
        if let Some(i) = self.features.iter().position(|f| *f == feature) {
            self.features.remove(i);
            self.weights.remove(i);
        }
    }

    fn check_consistency(&self) {
        assert_eq!(
            self.features.len(),
            self.weights.len(),
            "evaluation features and weights have diverged"
        );
    }

    /// The spec's "simplified" evaluation: material + piece-square only.
    pub fn simplified() -> Self {
        let mut e = Evaluation::new();
        e.add_feature(Feature::Material, 1);
        e.add_feature(Feature::PieceSquare, 1);
        e
    }

    /// `simplified()` plus the pawn-structure and mobility features SPEC_FULL.md
    /// supplements from the original implementation's `heuristics.py`.
    pub fn with_supplemental_features() -> Self {
        let mut e = Evaluation::simplified();
        e.add_feature(Feature::PawnStructure, 1);
        e.add_feature(Feature::Mobility, 1);
        e
    }

    pub fn evaluate(&self, pos: &Position) -> Score {
        if pos.is_game_over() {
            return utility(pos);
        }
        self.check_consistency();
        self.features
            .iter()
            .zip(self.weights.iter())
            .map(|(f, w)| w * feature_value(*f, pos))
            .sum()
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::with_supplemental_features()
    }
}

fn utility(pos: &Position) -> Score {
    match pos.result() {
        GameResult::WhiteWins => SCORE_WIN,
        GameResult::BlackWins => -SCORE_WIN,
        GameResult::Draw => SCORE_DRAW,
    }
}

/// Crude by design (spec 9: "game-stage classification is heuristic and crude").
pub(crate) fn game_stage(pos: &Position) -> GameStage {
    let pieces = pos.piece_count();
    if pos.fullmove_number() < 10 && pieces > 14 {
        GameStage::Opening
    } else if pieces < 12 {
        GameStage::EndGame
    } else {
        GameStage::MiddleGame
    }
}

fn feature_value(feature: Feature, pos: &Position) -> Score {
    match feature {
        Feature::Material => material(pos),
        Feature::PieceSquare => piece_square(pos),
        Feature::PawnStructure => pawn_structure(pos),
        Feature::Mobility => mobility(pos),
    }
}

fn material(pos: &Position) -> Score {
    let mut total = 0;
    for sq in ALL_SQUARES {
        if let Some(piece) = pos.piece_at(sq) {
            let color = pos.color_at(sq).unwrap();
            let v = MATERIAL_VALUES[piece.to_index()];
            total += if color == Color::White { v } else { -v };
        }
    }
    total
}

fn piece_square(pos: &Position) -> Score {
    let stage = game_stage(pos);
    let mut total = 0;
    for sq in ALL_SQUARES {
        if let Some(piece) = pos.piece_at(sq) {
            let color = pos.color_at(sq).unwrap();
            total += pst::value(piece, color, sq, stage);
        }
    }
    total
}

fn file_counts(bb: BitBoard) -> [u32; 8] {
    let mut counts = [0u32; 8];
    for sq in bb.iter() {
        counts[sq.file().to_index()] += 1;
    }
    counts
}

/// Doubled/isolated pawns penalized, passed pawns rewarded; grounded in
/// `heuristics.py`'s `pawn_structure`, simplified to a single per-pawn scan.
fn pawn_structure(pos: &Position) -> Score {
    let board = pos.board();
    let white = board.pieces(Piece::Pawn) & board.color_combined(Color::White);
    let black = board.pieces(Piece::Pawn) & board.color_combined(Color::Black);
    side_pawn_score(white, black, Color::White) - side_pawn_score(black, white, Color::Black)
}

fn side_pawn_score(own: BitBoard, enemy: BitBoard, color: Color) -> Score {
    let own_files = file_counts(own);
    let mut score = 0;

    for sq in own.iter() {
        let file = sq.file().to_index();
        let rank = sq.rank().to_index();

        if own_files[file] > 1 {
            score -= 10;
        }

        let left = if file > 0 { own_files[file - 1] } else { 0 };
        let right = if file + 1 < 8 { own_files[file + 1] } else { 0 };
        if left == 0 && right == 0 {
            score -= 15;
        }

        let passed = enemy.iter().all(|esq| {
            let efile = esq.file().to_index();
            let erank = esq.rank().to_index();
            if efile.abs_diff(file) > 1 {
                return true;
            }
            match color {
                Color::White => erank <= rank,
                Color::Black => erank >= rank,
            }
        });
        if passed {
            score += 20;
        }
    }

    score
}

/// Legal-move-count differential, approximated for the side not to move via a
/// null move (spec 9's tolerance for crude heuristics extends to this
/// supplemental feature too — it is not part of the distilled spec).
fn mobility(pos: &Position) -> Score {
    let stm = pos.side_to_move();
    let my_moves = pos.legal_moves().len() as Score;
    let other_moves = pos
        .board()
        .null_move()
        .map(|nb| MoveGen::new_legal(&nb).count() as Score)
        .unwrap_or(0);
    let diff = my_moves - other_moves;
    if stm == Color::White {
        diff
    } else {
        -diff
    }
}
