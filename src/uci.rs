//! UCI driver (spec 4.5 / 6): the line-oriented stdin/stdout protocol that
//! wires `Position`, `TimeManager`, and the catalogue probes together. The
//! search core above this module has no notion of UCI at all.

use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::board::{Board, ChessMove, File, Piece, Rank, Square};
use crate::catalogue::{OpeningBook, Tablebases};
use crate::clock::Clock;
use crate::position::Position;
use crate::time::TimeManager;
use crate::tt::TranspositionTable;
use crate::types::{EngineConfig, PAWN_VALUE};

pub fn run() {
    let stdin = io::stdin();

    let mut position = Position::new(Board::default());
    let mut config = EngineConfig::default();
    let mut tt = TranspositionTable::new();
    let mut book = load_book(&config);
    let mut tablebases = load_tablebases(&config);

    let mut stop_flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let mut search_thread: Option<thread::JoinHandle<TranspositionTable>> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens[0] {
            "uci" => {
                println!("id name ferrite");
                println!("id author ferrite contributors");
                println!("option name Hash type spin default 64 min 1 max 4096");
                println!("option name SyzygyPath type string default <empty>");
                println!("uciok");
            }
            "isready" => {
                wait_for_search(&mut search_thread, &mut tt);
                println!("readyok");
            }
            "ucinewgame" => {
                wait_for_search(&mut search_thread, &mut tt);
                position = Position::new(Board::default());
                tt.clear();
            }
            "position" => {
                wait_for_search(&mut search_thread, &mut tt);
                parse_position(&tokens, &mut position);
            }
            "go" => {
                wait_for_search(&mut search_thread, &mut tt);

                let go_params = parse_go(&tokens);
                let clock = go_params.clock(position.side_to_move());
                // Defaulted to 1 when absent/infinite (spec 4.5): with no
                // `movestogo` from the GUI we assume this is the only move
                // left to budget for, so `allocate_time` spends up to half
                // the remaining clock rather than dividing it by an assumed
                // game length.
                let moves_to_go = go_params.moves_to_go.unwrap_or(1).max(1);

                let flag = Arc::new(AtomicBool::new(false));
                stop_flag = flag.clone();

                let search_position = position.clone();
                let search_tt = std::mem::replace(&mut tt, TranspositionTable::new());
                let max_depth = config.max_depth;
                let use_opening_book = config.use_opening_book;
                let use_tablebase = config.use_tablebase;
                let book = book.clone();
                let tablebases = tablebases.clone();

                search_thread = Some(thread::spawn(move || {
                    let mut manager = TimeManager::new(clock, moves_to_go);
                    let outcome = manager.perform_search(
                        search_position,
                        search_tt,
                        max_depth,
                        use_opening_book,
                        use_tablebase,
                        book,
                        tablebases,
                        flag,
                        |searcher| {
                            let cp = searcher.last_score / (PAWN_VALUE / 100).max(1);
                            let mv = searcher
                                .decision
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| "0000".to_string());
                            println!(
                                "info depth {} score cp {} bestmove {}",
                                searcher.depth, cp, mv
                            );
                        },
                    );

                    match outcome.decision {
                        Some(mv) => println!("bestmove {}", mv),
                        None => println!("bestmove 0000"),
                    }

                    outcome.tt
                }));
            }
            "stop" => {
                stop_flag.store(true, Ordering::SeqCst);
                wait_for_search(&mut search_thread, &mut tt);
            }
            "setoption" => {
                wait_for_search(&mut search_thread, &mut tt);
                parse_setoption(&tokens, &mut config, &mut book, &mut tablebases);
            }
            "quit" => {
                stop_flag.store(true, Ordering::SeqCst);
                wait_for_search(&mut search_thread, &mut tt);
                break;
            }
            "d" | "print" => {
                println!("{}", position.board());
            }
            _ => {
                println!("Error (unknown command): {}", line);
            }
        }
    }
}

fn load_book(config: &EngineConfig) -> Option<Arc<OpeningBook>> {
    let path = config.opening_book_path.as_ref()?;
    match OpeningBook::load(path) {
        Ok(book) => Some(Arc::new(book)),
        Err(err) => {
            eprintln!("opening book unavailable: {err}");
            None
        }
    }
}

fn load_tablebases(config: &EngineConfig) -> Option<Arc<Tablebases>> {
    let path = config
        .syzygy_path
        .clone()
        .unwrap_or_else(|| Path::new("data/syzygy").to_path_buf());
    Tablebases::new(&path).map(Arc::new)
}

/// Recovers the transposition table from a finished search thread. A
/// panicking search thread degrades to a fresh (empty) table rather than
/// propagating, matching spec 7's "the driver thread catches and logs any
/// escape; it never propagates to the terminal user".
fn wait_for_search(handle: &mut Option<thread::JoinHandle<TranspositionTable>>, tt: &mut TranspositionTable) {
    if let Some(h) = handle.take() {
        *tt = match h.join() {
            Ok(recovered) => recovered,
            Err(_) => {
                eprintln!("search thread panicked; starting with an empty transposition table");
                TranspositionTable::new()
            }
        };
    }
}

/// Parsed `go` command parameters (spec 6).
struct GoParams {
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    moves_to_go: Option<u32>,
    infinite: bool,
}

impl GoParams {
    fn new() -> Self {
        GoParams {
            movetime: None,
            wtime: None,
            btime: None,
            winc: None,
            binc: None,
            moves_to_go: None,
            infinite: false,
        }
    }

    /// Builds the clock this search should allocate against. `infinite`
    /// (explicit or implied by an odd argument count, spec 6) is modeled as
    /// an effectively unbounded base time, which `TimeManager` never turns
    /// into a scheduled stop (`allocate_time() -> 0` is handled by the
    /// caller not starting the expiry timer).
    fn clock(&self, side: crate::board::Color) -> Clock {
        if self.infinite {
            return Clock::new(0);
        }
        if let Some(mt) = self.movetime {
            return Clock::new(mt);
        }

        let (base, inc) = if side == crate::board::Color::White {
            (self.wtime.unwrap_or(0), self.winc.unwrap_or(0))
        } else {
            (self.btime.unwrap_or(0), self.binc.unwrap_or(0))
        };

        if base == 0 {
            return Clock::new(0);
        }
        Clock::with_increment(base, inc)
    }
}

/// `go` arguments form key/value pairs; if the count is odd it is treated as
/// `infinite` (spec 6).
fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::new();
    let args = &tokens[1..];

    if args.len() == 1 && args[0] == "infinite" {
        params.infinite = true;
        return params;
    }

    if args.len() % 2 != 0 {
        params.infinite = true;
        return params;
    }

    let mut i = 0;
    while i + 1 < args.len() {
        let (key, value) = (args[i], args[i + 1]);
        match key {
            "movetime" => params.movetime = value.parse().ok(),
            "wtime" => params.wtime = value.parse().ok(),
            "btime" => params.btime = value.parse().ok(),
            "winc" => params.winc = value.parse().ok(),
            "binc" => params.binc = value.parse().ok(),
            "movestogo" => params.moves_to_go = value.parse().ok(),
            _ => {}
        }
        i += 2;
    }

    params
}

fn parse_position(tokens: &[&str], position: &mut Position) {
    if tokens.len() < 2 {
        return;
    }

    let mut idx = 1;
    let board = if tokens[idx] == "startpos" {
        idx += 1;
        Board::default()
    } else if tokens[idx] == "fen" {
        idx += 1;
        let mut fen_parts: Vec<&str> = Vec::new();
        while idx < tokens.len() && tokens[idx] != "moves" && fen_parts.len() < 6 {
            fen_parts.push(tokens[idx]);
            idx += 1;
        }
        if fen_parts.len() < 4 {
            return;
        }
        match Board::from_str(&fen_parts.join(" ")) {
            Ok(b) => b,
            Err(_) => return,
        }
    } else {
        return;
    };

    *position = Position::new(board);

    if idx < tokens.len() && tokens[idx] == "moves" {
        idx += 1;
        for &move_str in &tokens[idx..] {
            if let Some(mv) = parse_uci_move(position.board(), move_str) {
                position.push(mv);
            }
        }
    }
}

/// Parses a UCI move string directly into squares + optional promotion
/// piece, validating legality against `board`.
fn parse_uci_move(board: &Board, move_str: &str) -> Option<ChessMove> {
    if move_str.len() < 4 {
        return None;
    }
    let bytes = move_str.as_bytes();

    let src_file = bytes[0].wrapping_sub(b'a');
    let src_rank = bytes[1].wrapping_sub(b'1');
    let dst_file = bytes[2].wrapping_sub(b'a');
    let dst_rank = bytes[3].wrapping_sub(b'1');

    if src_file >= 8 || src_rank >= 8 || dst_file >= 8 || dst_rank >= 8 {
        return None;
    }

    let src = Square::make_square(Rank::from_index(src_rank as usize), File::from_index(src_file as usize));
    let dst = Square::make_square(Rank::from_index(dst_rank as usize), File::from_index(dst_file as usize));

    let promo = if move_str.len() >= 5 {
        match bytes[4] {
            b'q' => Some(Piece::Queen),
            b'r' => Some(Piece::Rook),
            b'b' => Some(Piece::Bishop),
            b'n' => Some(Piece::Knight),
            _ => None,
        }
    } else {
        None
    };

    let mv = ChessMove::new(src, dst, promo);
    if board.legal(mv) {
        Some(mv)
    } else {
        None
    }
}

/// `setoption name Hash value <mb>` / `setoption name SyzygyPath value
/// <path>` (spec 6). `Hash` is accepted and validated but otherwise a
/// documented no-op: the transposition table is unbounded-insertion (spec
/// 3), so there is no buffer to size.
fn parse_setoption(
    tokens: &[&str],
    config: &mut EngineConfig,
    book: &mut Option<Arc<OpeningBook>>,
    tablebases: &mut Option<Arc<Tablebases>>,
) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    if let (Some(ni), Some(vi)) = (name_idx, value_idx) {
        let name: String = tokens[ni + 1..vi].join(" ");
        let value: String = tokens[vi + 1..].join(" ");

        match name.to_lowercase().as_str() {
            "hash" => {
                if value.parse::<usize>().is_err() {
                    eprintln!("setoption Hash: invalid value {value:?}, ignoring");
                }
            }
            "syzygypath" => {
                if value.is_empty() || value == "<empty>" {
                    config.syzygy_path = None;
                    *tablebases = None;
                } else {
                    let path = Path::new(&value).to_path_buf();
                    *tablebases = Tablebases::new(&path).map(Arc::new);
                    config.syzygy_path = Some(path);
                }
            }
            "openingbookpath" => {
                let path = Path::new(&value).to_path_buf();
                *book = OpeningBook::load(&path).ok().map(Arc::new);
                config.opening_book_path = Some(path);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        crate::board::init();
    }

    #[test]
    fn test_parse_position_startpos() {
        init();
        let mut position = Position::new(Board::default());
        let tokens = vec!["position", "startpos"];
        parse_position(&tokens, &mut position);
        assert_eq!(position.board(), &Board::default());
    }

    #[test]
    fn test_parse_position_startpos_with_moves() {
        init();
        let mut position = Position::new(Board::default());
        let tokens = vec!["position", "startpos", "moves", "e2e4", "e7e5"];
        parse_position(&tokens, &mut position);
        assert_ne!(position.board(), &Board::default());
    }

    #[test]
    fn test_parse_position_fen() {
        init();
        let mut position = Position::new(Board::default());
        let tokens = vec![
            "position", "fen",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR",
            "b", "KQkq", "e3", "0", "1",
        ];
        parse_position(&tokens, &mut position);
        assert_ne!(position.board(), &Board::default());
    }

    #[test]
    fn test_parse_go_explicit_infinite() {
        let tokens = vec!["go", "infinite"];
        let params = parse_go(&tokens);
        assert!(params.infinite);
    }

    #[test]
    fn test_parse_go_odd_arg_count_falls_back_to_infinite() {
        let tokens = vec!["go", "wtime", "60000", "winc"];
        let params = parse_go(&tokens);
        assert!(params.infinite);
    }

    #[test]
    fn test_parse_go_time() {
        let tokens = vec!["go", "wtime", "60000", "btime", "60000", "winc", "1000", "binc", "1000"];
        let params = parse_go(&tokens);
        assert_eq!(params.wtime, Some(60000));
        assert_eq!(params.btime, Some(60000));
        assert_eq!(params.winc, Some(1000));
        assert_eq!(params.binc, Some(1000));
        assert!(!params.infinite);
    }

    #[test]
    fn test_parse_uci_move_basic() {
        init();
        let board = Board::default();
        let mv = parse_uci_move(&board, "e2e4");
        assert!(mv.is_some());
    }

    #[test]
    fn test_parse_uci_move_invalid() {
        init();
        let board = Board::default();
        assert!(parse_uci_move(&board, "e2e5").is_none());
    }

    #[test]
    fn test_parse_uci_move_promotion() {
        init();
        let board = Board::from_str("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let mv = parse_uci_move(&board, "a7a8q").unwrap();
        assert_eq!(mv.get_promotion(), Some(Piece::Queen));
    }
}
