//! SABO double-elimination bracket engine for 16-player billiards tournaments:
//! library with models, bracket logic, and the match-store seam.

pub mod alerts;
pub mod import;
pub mod logic;
pub mod models;
pub mod store;

pub use alerts::{FlaggedTournaments, IntegrityAlert, IntegrityReporter};
pub use logic::{
    initialize_bracket, is_complete, organize, playable, progress, resolve, validate,
    AdvancementPlan, Assignment, OrganizedMatches, Playable, Progress,
    ScoreSubmissionCoordinator, Stage, SubmissionResult, ValidationReport,
};
pub use models::{
    Match, MatchId, MatchStatus, PlayerId, RoundId, ScoreRejection, Segment, Slot, Standings,
    Tournament, TournamentError, TournamentId, UserId, Violation,
};
pub use store::{InMemoryMatchStore, MatchStore};
