//! Shared setup for integration tests: an engine over the in-memory store.

#![allow(dead_code)]

use sabo_bracket::{
    initialize_bracket, FlaggedTournaments, InMemoryMatchStore, Match, MatchStore, PlayerId,
    RoundId, ScoreSubmissionCoordinator, Tournament, TournamentId,
};
use std::sync::Arc;
use uuid::Uuid;

pub type Engine = ScoreSubmissionCoordinator<Arc<InMemoryMatchStore>, Arc<FlaggedTournaments>>;

pub struct Setup {
    pub engine: Engine,
    pub store: Arc<InMemoryMatchStore>,
    pub flags: Arc<FlaggedTournaments>,
    pub tournament_id: TournamentId,
    pub seeds: Vec<PlayerId>,
}

pub fn seeds() -> Vec<PlayerId> {
    (0..16).map(|_| Uuid::new_v4()).collect()
}

pub fn setup() -> Setup {
    let store = Arc::new(InMemoryMatchStore::new());
    let flags = Arc::new(FlaggedTournaments::new());
    let tournament_id = Uuid::new_v4();
    let seeds = seeds();
    store
        .insert_matches(initialize_bracket(tournament_id, &seeds).unwrap())
        .unwrap();
    Setup {
        engine: ScoreSubmissionCoordinator::new(store.clone(), flags.clone()),
        store,
        flags,
        tournament_id,
        seeds,
    }
}

impl Setup {
    pub fn tournament(&self) -> Tournament {
        Tournament::new(
            self.tournament_id,
            self.store.get_matches(self.tournament_id).unwrap(),
        )
    }

    pub fn row(&self, round: RoundId, match_index: u32) -> Match {
        self.tournament().at(round, match_index).cloned().unwrap()
    }

    /// Submit every match of `round`; player1 wins when `player1_wins`.
    pub fn play_round(&self, round: RoundId, player1_wins: bool) {
        let rows: Vec<Match> = self.tournament().round(round).into_iter().cloned().collect();
        for m in rows {
            let (s1, s2) = if player1_wins { (7, 3) } else { (2, 7) };
            self.engine
                .submit(m.id, s1, s2, Uuid::new_v4())
                .unwrap_or_else(|e| panic!("{}: {e}", m.label()));
        }
    }
}
