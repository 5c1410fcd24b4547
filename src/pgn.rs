//! PGN writer interface (spec 6 / SPEC_FULL.md 9a, sketch only). A full PGN
//! emitter is a driver-level concern, not a search-core one, so this module
//! names the external-collaborator boundary without implementing it — the
//! same way `environment.Writer` in the original implementation is a
//! context-managed accumulator the search layer writes into but does not
//! own.

use crate::board::ChessMove;

/// Accumulates a game's header fields and move list for later PGN emission.
/// Header keys follow the standard PGN seven-tag roster this repo cares
/// about: Site, Event, White, Black, Round, Date.
pub trait PgnWriter {
    fn header(&mut self, key: &str, value: &str);
    fn push_move(&mut self, mv: ChessMove);
}
