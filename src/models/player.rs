//! Participant identifiers and final standings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in match slots).
pub type PlayerId = Uuid;

/// Identifier of whoever submitted a score (referee, player, or admin).
pub type UserId = Uuid;

/// Final placements derived from the Semifinal and Final rows.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub champion: Option<PlayerId>,
    pub runner_up: Option<PlayerId>,
    /// Semifinal losers (shared third place), in Semifinal match order.
    pub semifinalists: Vec<PlayerId>,
}

impl Standings {
    pub fn is_decided(&self) -> bool {
        self.champion.is_some()
    }
}
