//! Wraps the bitboard `Board` with the push/pop history, key, and game-over
//! machinery the search core expects from an opaque `Position` (spec 3).

use crate::board::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

/// A position plus the undo stack needed to implement `push`/`pop` over an
/// immutable `Board`. Positions visited since the last irreversible move
/// (capture, pawn move, castle, loss of castling/ep rights) are tracked
/// separately so `is_repetition` only has to scan the relevant suffix.
#[derive(Clone, Debug)]
pub struct Position {
    current: Board,
    history: Vec<Board>,
}

impl Position {
    pub fn new(board: Board) -> Self {
        Position {
            current: board,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.current
    }

    pub fn side_to_move(&self) -> Color {
        self.current.side_to_move()
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.current.piece_on(sq)
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.current.color_on(sq)
    }

    pub fn attackers(&self, color: Color, sq: Square) -> crate::board::BitBoard {
        self.current.attackers(color, sq)
    }

    pub fn piece_count(&self) -> u32 {
        self.current.combined().popcnt()
    }

    pub fn fullmove_number(&self) -> u16 {
        self.current.fullmove_number()
    }

    /// Legal moves at the current position.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.current).collect()
    }

    pub fn legal(&self, mv: ChessMove) -> bool {
        self.current.legal(mv)
    }

    /// Push a move onto the history stack. Does not validate legality.
    pub fn push(&mut self, mv: ChessMove) {
        let next = self.current.make_move_new(mv);
        self.history.push(self.current);
        self.current = next;
    }

    /// Undo the last pushed move. Panics on an unbalanced pop (programmer error).
    pub fn pop(&mut self) {
        self.current = self
            .history
            .pop()
            .expect("pop() called without a matching push()");
    }

    /// Canonical position key: first four FEN fields (spec 3 / spec 6).
    pub fn key(&self) -> String {
        let fen = self.current.to_string();
        fen.split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_threefold_repetition(&self) -> bool {
        let key = self.key();
        let mut count = 1; // current position itself
        for past in self.history.iter().rev() {
            if past.to_string().split_whitespace().take(4).collect::<Vec<_>>().join(" ") == key {
                count += 1;
                if count >= 3 {
                    return true;
                }
            }
        }
        false
    }

    fn is_fifty_move_draw(&self) -> bool {
        // halfmove clock is private to Board; reconstruct via FEN field 5.
        self.current
            .to_string()
            .split_whitespace()
            .nth(4)
            .and_then(|s| s.parse::<u32>().ok())
            .is_some_and(|hm| hm >= 100)
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self.current.status(), BoardStatus::Ongoing)
            || self.is_fifty_move_draw()
            || self.is_threefold_repetition()
    }

    /// Result of a game-over position. Panics if called while the game is ongoing.
    pub fn result(&self) -> GameResult {
        match self.current.status() {
            BoardStatus::Checkmate => {
                // the side to move has been mated, so the other side won.
                match self.current.side_to_move() {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                }
            }
            BoardStatus::Stalemate => GameResult::Draw,
            BoardStatus::Ongoing => {
                debug_assert!(self.is_fifty_move_draw() || self.is_threefold_repetition());
                GameResult::Draw
            }
        }
    }
}

impl From<Board> for Position {
    fn from(board: Board) -> Self {
        Position::new(board)
    }
}
