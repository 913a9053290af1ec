//! Match row, MatchStatus, and Slot.

use crate::models::player::{PlayerId, UserId};
use crate::models::round::RoundId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match row (owned by the store).
pub type MatchId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for one or both players.
    #[default]
    Pending,
    /// Both players assigned; accepts one score submission.
    Ready,
    /// Scores, winner and loser recorded. Terminal.
    Completed,
    Bye,
}

/// Player position within a match.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    /// Odd match indices feed `Player1`, even ones `Player2`.
    pub fn from_parity(match_index: u32) -> Self {
        if match_index % 2 == 1 {
            Slot::Player1
        } else {
            Slot::Player2
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Player1 => f.write_str("player1"),
            Slot::Player2 => f.write_str("player2"),
        }
    }
}

/// A single bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_id: RoundId,
    /// 1-based position within the round.
    pub match_index: u32,
    pub player1_id: Option<PlayerId>,
    pub player2_id: Option<PlayerId>,
    pub winner_id: Option<PlayerId>,
    pub loser_id: Option<PlayerId>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub status: MatchStatus,
    #[serde(default)]
    pub submitted_by: Option<UserId>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// A fresh `pending` row with no players.
    pub fn new(tournament_id: TournamentId, round_id: RoundId, match_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_id,
            match_index,
            player1_id: None,
            player2_id: None,
            winner_id: None,
            loser_id: None,
            score1: None,
            score2: None,
            status: MatchStatus::Pending,
            submitted_by: None,
            completed_at: None,
        }
    }

    pub fn player(&self, slot: Slot) -> Option<PlayerId> {
        match slot {
            Slot::Player1 => self.player1_id,
            Slot::Player2 => self.player2_id,
        }
    }

    pub fn player_mut(&mut self, slot: Slot) -> &mut Option<PlayerId> {
        match slot {
            Slot::Player1 => &mut self.player1_id,
            Slot::Player2 => &mut self.player2_id,
        }
    }

    /// Both players, if both are assigned.
    pub fn players(&self) -> Option<(PlayerId, PlayerId)> {
        self.player1_id.zip(self.player2_id)
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.player1_id == Some(player) || self.player2_id == Some(player)
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Short human label, e.g. `losers_a_round2 #1`.
    pub fn label(&self) -> String {
        format!("{} #{}", self.round_id, self.match_index)
    }
}
