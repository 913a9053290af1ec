//! Match store: the persistence collaborator the engine reads from and writes to.
//!
//! The only write primitive is a single-row conditional update. Races between
//! submissions are settled by the condition, not by locks held in the engine.

mod memory;

pub use memory::InMemoryMatchStore;

use crate::models::{Match, MatchId, MatchStatus, PlayerId, Slot, TournamentId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("match store lock poisoned")]
    Poisoned,
    #[error("match {0} does not exist in the store")]
    Missing(MatchId),
    #[error("match {0} already exists in the store")]
    Duplicate(MatchId),
    #[error("tournament {0} already exists in the store")]
    TournamentExists(TournamentId),
    #[error("match store unavailable: {0}")]
    Unavailable(String),
}

/// Predicate checked against the current row before an update is applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Condition {
    StatusIs(MatchStatus),
    /// Slot is empty or already holds `player`.
    SlotAccepts { slot: Slot, player: PlayerId },
}

impl Condition {
    pub fn holds(&self, m: &Match) -> bool {
        match *self {
            Condition::StatusIs(status) => m.status == status,
            Condition::SlotAccepts { slot, player } => {
                m.player(slot).map_or(true, |p| p == player)
            }
        }
    }
}

/// Field changes written by one conditional update.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchUpdate {
    /// Record the result; `ready -> completed`.
    Complete {
        score1: u32,
        score2: u32,
        winner_id: PlayerId,
        loser_id: PlayerId,
        submitted_by: UserId,
        completed_at: DateTime<Utc>,
    },
    /// Seat an advancing player. Seating the second player promotes `pending -> ready`.
    AssignSlot { slot: Slot, player: PlayerId },
}

impl MatchUpdate {
    pub fn apply_to(&self, m: &mut Match) {
        match *self {
            MatchUpdate::Complete {
                score1,
                score2,
                winner_id,
                loser_id,
                submitted_by,
                completed_at,
            } => {
                m.score1 = Some(score1);
                m.score2 = Some(score2);
                m.winner_id = Some(winner_id);
                m.loser_id = Some(loser_id);
                m.submitted_by = Some(submitted_by);
                m.completed_at = Some(completed_at);
                m.status = MatchStatus::Completed;
            }
            MatchUpdate::AssignSlot { slot, player } => {
                *m.player_mut(slot) = Some(player);
                if m.status == MatchStatus::Pending && m.players().is_some() {
                    m.status = MatchStatus::Ready;
                }
            }
        }
    }
}

/// Result of a conditional update. Both variants carry the row as it is after the call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UpdateOutcome {
    Applied(Match),
    /// The condition did not hold; nothing was written.
    Rejected(Match),
}

pub trait MatchStore: Send + Sync {
    /// All rows of a tournament, ordered by round then match index.
    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError>;

    fn get_match(&self, id: MatchId) -> Result<Option<Match>, StoreError>;

    /// Atomically apply `update` to row `id` if `condition` holds for it.
    fn update_match(
        &self,
        id: MatchId,
        condition: &Condition,
        update: &MatchUpdate,
    ) -> Result<UpdateOutcome, StoreError>;
}

impl<S: MatchStore + ?Sized> MatchStore for Arc<S> {
    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError> {
        (**self).get_matches(tournament_id)
    }

    fn get_match(&self, id: MatchId) -> Result<Option<Match>, StoreError> {
        (**self).get_match(id)
    }

    fn update_match(
        &self,
        id: MatchId,
        condition: &Condition,
        update: &MatchUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update_match(id, condition, update)
    }
}
