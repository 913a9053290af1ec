//! Tournament snapshot, error taxonomy, and structural violations.

use crate::import::ImportError;
use crate::models::bracket_match::{Match, MatchId, MatchStatus, Slot};
use crate::models::player::PlayerId;
use crate::models::round::{RoundId, Segment};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament (one tournament = one bracket instance).
pub type TournamentId = Uuid;

/// Why a score pair was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRejection {
    /// Equal scores; this format has no tie-break.
    Tie,
    Negative,
    /// Larger than a stored score can hold.
    OutOfRange,
}

impl std::fmt::Display for ScoreRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreRejection::Tie => f.write_str("scores must not be equal"),
            ScoreRejection::Negative => f.write_str("scores must be non-negative"),
            ScoreRejection::OutOfRange => f.write_str("score is too large"),
        }
    }
}

/// A single breach of the fixed 27-match topology.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    WrongTotal { expected: usize, found: usize },
    WrongSegmentCount { segment: Segment, expected: usize, found: usize },
    WrongRoundCount { round: RoundId, expected: usize, found: usize },
    MatchIndexOutOfRange { match_id: MatchId, round: RoundId, match_index: u32 },
    DuplicateMatchIndex { round: RoundId, match_index: u32 },
    MissingRow { round: RoundId, match_index: u32 },
    ForeignTournament { match_id: MatchId, tournament_id: TournamentId },
    WinnerWithoutScores { match_id: MatchId },
    MissingPlayers { match_id: MatchId, status: MatchStatus },
    SamePlayerTwice { match_id: MatchId, player: PlayerId },
    CompletedWithoutResult { match_id: MatchId },
    ResultNotInMatch { match_id: MatchId },
    TiedScores { match_id: MatchId },
    /// Winner is not the player with the higher score.
    ResultContradictsScores { match_id: MatchId },
    /// A later round holds players while one of its feeder rounds is unfinished.
    SeatedBeforeFeeders { match_id: MatchId, round: RoundId },
    /// A slot holds someone other than the player its feeder match sends there.
    UnexpectedOccupant {
        match_id: MatchId,
        round: RoundId,
        match_index: u32,
        slot: Slot,
        expected: Option<PlayerId>,
        found: PlayerId,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::WrongTotal { expected, found } => {
                write!(f, "expected {} matches, found {}", expected, found)
            }
            Violation::WrongSegmentCount { segment, expected, found } => {
                write!(f, "{} should have {} matches, found {}", segment, expected, found)
            }
            Violation::WrongRoundCount { round, expected, found } => {
                write!(f, "{} should have {} matches, found {}", round, expected, found)
            }
            Violation::MatchIndexOutOfRange { match_id, round, match_index } => {
                write!(f, "match {} has index {} outside {}", match_id, match_index, round)
            }
            Violation::DuplicateMatchIndex { round, match_index } => {
                write!(f, "{} #{} appears more than once", round, match_index)
            }
            Violation::MissingRow { round, match_index } => {
                write!(f, "{} #{} does not exist", round, match_index)
            }
            Violation::ForeignTournament { match_id, tournament_id } => {
                write!(f, "match {} belongs to tournament {}", match_id, tournament_id)
            }
            Violation::WinnerWithoutScores { match_id } => {
                write!(f, "match {} has a winner but no scores", match_id)
            }
            Violation::MissingPlayers { match_id, status } => {
                write!(f, "match {} is {:?} without both players", match_id, status)
            }
            Violation::SamePlayerTwice { match_id, player } => {
                write!(f, "match {} has player {} in both slots", match_id, player)
            }
            Violation::CompletedWithoutResult { match_id } => {
                write!(f, "match {} is completed without winner/loser", match_id)
            }
            Violation::ResultNotInMatch { match_id } => {
                write!(f, "match {} records a winner or loser who did not play", match_id)
            }
            Violation::TiedScores { match_id } => {
                write!(f, "match {} has a result with equal scores", match_id)
            }
            Violation::ResultContradictsScores { match_id } => {
                write!(f, "match {} records the lower-scoring player as winner", match_id)
            }
            Violation::SeatedBeforeFeeders { match_id, round } => write!(
                f,
                "match {} in {} is seated before its feeder rounds finished",
                match_id, round
            ),
            Violation::UnexpectedOccupant {
                round,
                match_index,
                slot,
                expected,
                found,
                ..
            } => match expected {
                Some(p) => write!(
                    f,
                    "{} #{} {} holds {}, its feeder sends {}",
                    round, match_index, slot, found, p
                ),
                None => write!(
                    f,
                    "{} #{} {} holds {}, but no feeder sends a player there",
                    round, match_index, slot, found
                ),
            },
        }
    }
}

/// Errors raised by the bracket engine.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("invalid score: {0}")]
    InvalidScore(ScoreRejection),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    /// Both players are not yet assigned.
    #[error("match {0} is not ready to be played")]
    MatchNotReady(MatchId),
    #[error("match {0} is already completed")]
    AlreadyCompleted(MatchId),
    #[error("match {0} is not completed")]
    MatchNotCompleted(MatchId),
    /// Destination slot already holds a different player.
    #[error("{round} #{match_index} {slot} holds {found}, refusing to assign {expected}")]
    AmbiguousAdvancementTarget {
        match_id: MatchId,
        round: RoundId,
        match_index: u32,
        slot: Slot,
        expected: PlayerId,
        found: PlayerId,
    },
    #[error("bracket structure is invalid ({} violation(s))", .0.len())]
    StructuralIntegrityViolation(Vec<Violation>),
    #[error("invalid seeding: {0}")]
    InvalidSeeding(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl TournamentError {
    /// Expected input/race errors, returned directly to whoever called `submit`.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TournamentError::InvalidScore(_)
                | TournamentError::MatchNotFound(_)
                | TournamentError::MatchNotReady(_)
                | TournamentError::AlreadyCompleted(_)
                | TournamentError::InvalidSeeding(_)
        )
    }

    /// Integrity failures that must reach an operator and are never auto-repaired.
    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            TournamentError::AmbiguousAdvancementTarget { .. }
                | TournamentError::StructuralIntegrityViolation(_)
        )
    }
}

/// Read-only view over one tournament's match rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub matches: Vec<Match>,
}

impl Tournament {
    pub fn new(id: TournamentId, matches: Vec<Match>) -> Self {
        Self { id, matches }
    }

    /// The row at `(round, match_index)`, if present.
    pub fn at(&self, round: RoundId, match_index: u32) -> Option<&Match> {
        find_at(&self.matches, round, match_index)
    }

    /// Matches of one round, ordered by match index.
    pub fn round(&self, round: RoundId) -> Vec<&Match> {
        let mut v: Vec<_> = self.matches.iter().filter(|m| m.round_id == round).collect();
        v.sort_by_key(|m| m.match_index);
        v
    }
}

pub(crate) fn find_at(matches: &[Match], round: RoundId, match_index: u32) -> Option<&Match> {
    matches
        .iter()
        .find(|m| m.round_id == round && m.match_index == match_index)
}
