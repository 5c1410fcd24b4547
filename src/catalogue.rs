//! Opening book and tablebase probes (spec 4.6): two pure-lookup services
//! defined by their contracts only. Both failure modes are non-fatal — a
//! missing file or an out-of-coverage position degrades to "no answer",
//! never a panic (spec 7).
//!
//! No maintained Rust crate speaks the Gaviota format the original
//! implementation targeted, so tablebase coverage here is backed by Syzygy
//! (`WDL`/`DTZ` files) via `shakmaty-syzygy` instead, bridging this crate's
//! `Board` to `shakmaty`'s own board type at the FEN boundary (spec 4.6
//! "Backing format substitution").
//!
//! The opening book's 16-byte records follow the published Polyglot layout,
//! but the `key` field here is this engine's own Zobrist hash rather than
//! the standard Polyglot zobrist hash — so a book produced by this engine's
//! own tooling round-trips, but an externally-sourced `performance.bin` from
//! another Polyglot-speaking engine will not address correctly. Recorded in
//! DESIGN.md, not hidden.

use std::path::Path;

use rand::seq::SliceRandom;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use shakmaty_syzygy::{Tablebase, Wdl};

use crate::board::{Board, ChessMove, File, MoveGen, Piece, Rank, Square};
use crate::types::Score;

/// One 16-byte Polyglot-shaped record: `{key, move, weight, learn}`.
struct BookEntry {
    key: u64,
    mv: u16,
    #[allow(dead_code)]
    weight: u16,
}

/// A sorted-by-key in-memory opening repertoire.
pub struct OpeningBook {
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    /// Parse a flat array of 16-byte big-endian records from `path`.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut entries: Vec<BookEntry> = bytes
            .chunks_exact(16)
            .map(|chunk| BookEntry {
                key: u64::from_be_bytes(chunk[0..8].try_into().unwrap()),
                mv: u16::from_be_bytes(chunk[8..10].try_into().unwrap()),
                weight: u16::from_be_bytes(chunk[10..12].try_into().unwrap()),
            })
            .collect();
        entries.sort_unstable_by_key(|e| e.key);
        Ok(OpeningBook { entries })
    }

    /// `opening_moves(p)` (spec 4.6): every book move registered for `board`,
    /// filtered to ones that are still legal (a stale book entry is silently
    /// dropped, not an error).
    pub fn opening_moves(&self, board: &Board) -> Vec<ChessMove> {
        let key = board.get_hash();
        let start = self.entries.partition_point(|e| e.key < key);
        self.entries[start..]
            .iter()
            .take_while(|e| e.key == key)
            .filter_map(|e| decode_polyglot_move(e.mv))
            .filter(|mv| board.legal(*mv))
            .collect()
    }
}

/// `opening_lookup(p)` (spec 4.6): a uniformly random element of
/// `opening_moves(p)`, or none if the book has nothing registered.
pub fn opening_lookup(book: &OpeningBook, board: &Board) -> Option<ChessMove> {
    let moves = book.opening_moves(board);
    moves.choose(&mut rand::thread_rng()).copied()
}

fn decode_polyglot_move(raw: u16) -> Option<ChessMove> {
    let dst = Square::make_square(
        Rank::from_index(((raw & 0x3F) >> 3) as usize),
        File::from_index((raw & 0x7) as usize),
    );
    let src = Square::make_square(
        Rank::from_index((((raw >> 6) & 0x3F) >> 3) as usize),
        File::from_index(((raw >> 6) & 0x7) as usize),
    );
    let promotion = match (raw >> 12) & 0x7 {
        1 => Some(Piece::Knight),
        2 => Some(Piece::Bishop),
        3 => Some(Piece::Rook),
        4 => Some(Piece::Queen),
        _ => None,
    };
    Some(ChessMove::new(src, dst, promotion))
}

/// Tablebase-backed endgame probes (spec 4.6), keyed on `MAX_TB_PIECES`
/// elsewhere (this type itself has no piece-count opinion).
pub struct Tablebases {
    tablebase: Tablebase<Chess>,
}

impl Tablebases {
    /// Load Syzygy tables from `path`. Returns `None` on a missing directory
    /// or a directory with no usable tables — both are ordinary "no
    /// tablebase available" outcomes, not errors (spec 7).
    pub fn new(path: &Path) -> Option<Self> {
        if !path.is_dir() {
            return None;
        }
        let mut tablebase = Tablebase::new();
        tablebase.add_directory(path).ok()?;
        Some(Tablebases { tablebase })
    }

    fn to_shakmaty(board: &Board) -> Option<Chess> {
        let fen: Fen = board.to_string().parse().ok()?;
        fen.into_position(CastlingMode::Standard).ok()
    }

    /// `endgame_wdl(p)` (spec 4.6): white's perspective, +1/0/-1. `None` on
    /// any probe failure (missing table, position outside coverage, bad FEN
    /// bridge) — callers treat absence as "fall through to normal search".
    /// Logged at the probe site itself (spec 7: "caught at the probe site in
    /// negamax; logged"), not just passed up as a bare `None`.
    pub fn endgame_wdl(&self, board: &Board) -> Option<i32> {
        let pos = match Self::to_shakmaty(board) {
            Some(pos) => pos,
            None => {
                eprintln!("tablebase probe failed: could not bridge {board} to a shakmaty position");
                return None;
            }
        };
        match self.tablebase.probe_wdl_after_zeroing(&pos) {
            Ok(wdl) => Some(wdl_to_perspective(wdl, board)),
            Err(err) => {
                eprintln!("tablebase probe failed: {err}");
                None
            }
        }
    }

    /// `endgame_dtm(p)` (spec 4.6), approximated from Syzygy's DTZ output —
    /// the closest quantity the format actually exposes (spec 4.6 "Backing
    /// format substitution").
    pub fn endgame_dtm(&self, board: &Board) -> Option<i32> {
        let pos = Self::to_shakmaty(board)?;
        self.tablebase.probe_dtz(&pos).ok().map(|dtz| dtz.0 as i32)
    }

    /// `endgame_move(p)` (spec 9): the corrected comparator. The side to
    /// move, if winning, plays the legal move minimizing the opponent's
    /// resulting DTM (mate fastest); if losing, the move maximizing it
    /// (survive longest). The source's buggy variant — maximize DTM
    /// unconditionally — is deliberately not reproduced (spec 9 "Tablebase
    /// move selection is known buggy").
    pub fn endgame_move(&self, board: &Board) -> Option<ChessMove> {
        let wdl = self.endgame_wdl(board)?;
        let winning = wdl != 0;
        MoveGen::new_legal(board)
            .filter_map(|mv| {
                let after = board.make_move_new(mv);
                self.endgame_dtm(&after).map(|dtm| (mv, dtm))
            })
            .min_by_key(|(_, dtm)| if winning { *dtm } else { -*dtm })
            .map(|(mv, _)| mv)
    }
}

fn wdl_to_perspective(wdl: Wdl, board: &Board) -> i32 {
    use crate::board::Color;
    let side_result = match wdl {
        Wdl::Win | Wdl::CursedWin => 1,
        Wdl::Draw => 0,
        Wdl::Loss | Wdl::BlessedLoss => -1,
    };
    match board.side_to_move() {
        Color::White => side_result,
        Color::Black => -side_result,
    }
}

/// `100000 * wdl * sign` (spec 4.6 search integration); `sign` is the
/// negamax sign for `board`'s side to move.
pub fn tablebase_score(wdl: i32, sign: Score) -> Score {
    100_000 * wdl as Score * sign
}
