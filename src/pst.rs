//! Piece-square tables for the simplified evaluation (spec 4.1).
//!
//! Tables are written rank-8-first, exactly as they read on a board diagram with
//! White's home rank at the bottom row of the source listing. Values are looked
//! up with mirrored *indexing* rather than mirrored *arrays* for Black (spec 9:
//! "must either mirror the arrays or mirror the indexing — but not both").

use crate::board::{Color, Piece, Square};

pub type Table = [[i32; 8]; 8];

#[rustfmt::skip]
pub const PAWNS: Table = [
    [  0,  0,  0,  0,  0,  0,  0,  0],
    [ 50, 50, 50, 50, 50, 50, 50, 50],
    [ 10, 10, 20, 30, 30, 20, 10, 10],
    [  5,  5, 10, 25, 25, 10,  5,  5],
    [  0,  0,  0, 20, 20,  0,  0,  0],
    [  5, -5,-10,  0,  0,-10, -5,  5],
    [  5, 10, 10,-20,-20, 10, 10,  5],
    [  0,  0,  0,  0,  0,  0,  0,  0],
];

#[rustfmt::skip]
pub const KNIGHTS: Table = [
    [-50,-40,-30,-30,-30,-30,-40,-50],
    [-40,-20,  0,  0,  0,  0,-20,-40],
    [-30,  0, 10, 15, 15, 10,  0,-30],
    [-30,  5, 15, 20, 20, 15,  5,-30],
    [-30,  0, 15, 20, 20, 15,  0,-30],
    [-30,  5, 10, 15, 15, 10,  5,-30],
    [-40,-20,  0,  5,  5,  0,-20,-40],
    [-50,-40,-30,-30,-30,-30,-40,-50],
];

#[rustfmt::skip]
pub const BISHOPS: Table = [
    [-20,-10,-10,-10,-10,-10,-10,-20],
    [-10,  0,  0,  0,  0,  0,  0,-10],
    [-10,  0,  5, 10, 10,  5,  0,-10],
    [-10,  5,  5, 10, 10,  5,  5,-10],
    [-10,  0, 10, 10, 10, 10,  0,-10],
    [-10, 10, 10, 10, 10, 10, 10,-10],
    [-10,  5,  0,  0,  0,  0,  5,-10],
    [-20,-10,-10,-10,-10,-10,-10,-20],
];

#[rustfmt::skip]
pub const ROOKS: Table = [
    [  0,  0,  0,  0,  0,  0,  0,  0],
    [  5, 10, 10, 10, 10, 10, 10,  5],
    [ -5,  0,  0,  0,  0,  0,  0, -5],
    [ -5,  0,  0,  0,  0,  0,  0, -5],
    [ -5,  0,  0,  0,  0,  0,  0, -5],
    [ -5,  0,  0,  0,  0,  0,  0, -5],
    [ -5,  0,  0,  0,  0,  0,  0, -5],
    [  0,  0,  0,  5,  5,  0,  0,  0],
];

#[rustfmt::skip]
pub const QUEENS: Table = [
    [-20,-10,-10, -5, -5,-10,-10,-20],
    [-10,  0,  0,  0,  0,  0,  0,-10],
    [-10,  0,  5,  5,  5,  5,  0,-10],
    [ -5,  0,  5,  5,  5,  5,  0, -5],
    [  0,  0,  5,  5,  5,  5,  0, -5],
    [-10,  5,  5,  5,  5,  5,  0,-10],
    [-10,  0,  5,  0,  0,  0,  0,-10],
    [-20,-10,-10, -5, -5,-10,-10,-20],
];

#[rustfmt::skip]
pub const KING_MIDDLEGAME: Table = [
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-30,-40,-40,-50,-50,-40,-40,-30],
    [-20,-30,-30,-40,-40,-30,-30,-20],
    [-10,-20,-20,-20,-20,-20,-20,-10],
    [ 20, 20,  0,  0,  0,  0, 20, 20],
    [ 20, 30, 10,  0,  0, 10, 30, 20],
];

#[rustfmt::skip]
pub const KING_ENDGAME: Table = [
    [-50,-40,-30,-20,-20,-30,-40,-50],
    [-30,-20,-10,  0,  0,-10,-20,-30],
    [-30,-10, 20, 30, 30, 20,-10,-30],
    [-30,-10, 30, 40, 40, 30,-10,-30],
    [-30,-10, 30, 40, 40, 30,-10,-30],
    [-30,-10, 20, 30, 30, 20,-10,-30],
    [-30,-30,  0,  0,  0,  0,-30,-30],
    [-50,-30,-30,-30,-30,-30,-30,-50],
];

/// Discrete game-stage classification (spec 4.1); used only by PST lookup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStage {
    Opening,
    MiddleGame,
    EndGame,
}

fn table_for(piece: Piece, stage: GameStage) -> &'static Table {
    match piece {
        Piece::Pawn => &PAWNS,
        Piece::Knight => &KNIGHTS,
        Piece::Bishop => &BISHOPS,
        Piece::Rook => &ROOKS,
        Piece::Queen => &QUEENS,
        Piece::King => match stage {
            GameStage::Opening | GameStage::MiddleGame => &KING_MIDDLEGAME,
            GameStage::EndGame => &KING_ENDGAME,
        },
    }
}

/// PST contribution of `piece` of `color` sitting on `sq`, already signed (positive for
/// White, negative for Black) so callers can simply sum it into material.
pub fn value(piece: Piece, color: Color, sq: Square, stage: GameStage) -> i32 {
    let table = table_for(piece, stage);
    let rank = sq.rank().to_index();
    let file = sq.file().to_index();
    match color {
        Color::White => table[7 - rank][file],
        Color::Black => -table[rank][file],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{File, Rank};

    #[test]
    fn test_symmetry() {
        for &piece in &Piece::ALL {
            for stage in [GameStage::Opening, GameStage::MiddleGame, GameStage::EndGame] {
                for r in 0..8 {
                    for f in 0..8 {
                        let sq = Square::make_square(Rank::from_index(r), File::from_index(f));
                        let mirror = Square::make_square(Rank::from_index(7 - r), File::from_index(f));
                        let white = value(piece, Color::White, sq, stage);
                        let black_mirror = value(piece, Color::Black, mirror, stage);
                        assert_eq!(white, -black_mirror);
                    }
                }
            }
        }
    }

    #[test]
    fn test_pawn_center_push_bonus() {
        let e4 = Square::make_square(Rank::from_index(3), File::from_index(4));
        assert_eq!(value(Piece::Pawn, Color::White, e4, GameStage::MiddleGame), 20);
    }

    #[test]
    fn test_king_table_selection() {
        let e1 = Square::make_square(Rank::from_index(0), File::from_index(4));
        let mg = value(Piece::King, Color::White, e1, GameStage::MiddleGame);
        let eg = value(Piece::King, Color::White, e1, GameStage::EndGame);
        assert_ne!(mg, eg);
    }
}
