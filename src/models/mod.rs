//! Data structures for the bracket: rounds, match rows, ids, and errors.

mod bracket_match;
mod player;
mod round;
mod tournament;

pub use bracket_match::{Match, MatchId, MatchStatus, Slot};
pub use player::{PlayerId, Standings, UserId};
pub use round::{RoundId, Segment};
pub(crate) use tournament::find_at;
pub use tournament::{ScoreRejection, Tournament, TournamentError, TournamentId, Violation};
