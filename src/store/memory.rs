//! In-memory match store (one process, many tournaments).

use super::{Condition, MatchStore, MatchUpdate, StoreError, UpdateOutcome};
use crate::models::{Match, MatchId, TournamentId};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Rows keyed by match id. Every update runs under the write lock, so a
/// conditional update is atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    rows: RwLock<HashMap<MatchId, Match>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the rows of new tournaments (bracket initialization or bulk import).
    /// Fails without writing anything if any id is already present or any of the
    /// tournaments already has rows.
    pub fn insert_matches(&self, matches: Vec<Match>) -> Result<(), StoreError> {
        let mut g = self.rows.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(dup) = matches.iter().find(|m| g.contains_key(&m.id)) {
            return Err(StoreError::Duplicate(dup.id));
        }
        let incoming: HashSet<TournamentId> = matches.iter().map(|m| m.tournament_id).collect();
        if let Some(existing) = g.values().find(|m| incoming.contains(&m.tournament_id)) {
            return Err(StoreError::TournamentExists(existing.tournament_id));
        }
        g.extend(matches.into_iter().map(|m| (m.id, m)));
        Ok(())
    }

    /// Drop every row of a tournament. Returns how many rows were removed.
    pub fn remove_tournament(&self, tournament_id: TournamentId) -> Result<usize, StoreError> {
        let mut g = self.rows.write().map_err(|_| StoreError::Poisoned)?;
        let before = g.len();
        g.retain(|_, m| m.tournament_id != tournament_id);
        Ok(before - g.len())
    }
}

impl MatchStore for InMemoryMatchStore {
    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError> {
        let g = self.rows.read().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<Match> = g
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| (m.round_id, m.match_index));
        Ok(out)
    }

    fn get_match(&self, id: MatchId) -> Result<Option<Match>, StoreError> {
        let g = self.rows.read().map_err(|_| StoreError::Poisoned)?;
        Ok(g.get(&id).cloned())
    }

    fn update_match(
        &self,
        id: MatchId,
        condition: &Condition,
        update: &MatchUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut g = self.rows.write().map_err(|_| StoreError::Poisoned)?;
        let row = g.get_mut(&id).ok_or(StoreError::Missing(id))?;
        if !condition.holds(row) {
            return Ok(UpdateOutcome::Rejected(row.clone()));
        }
        update.apply_to(row);
        Ok(UpdateOutcome::Applied(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, RoundId, Slot};
    use uuid::Uuid;

    #[test]
    fn slot_write_is_conditional_and_promotes_status() {
        let store = InMemoryMatchStore::new();
        let m = Match::new(Uuid::new_v4(), RoundId::WinnersRound2, 1);
        let id = m.id;
        store.insert_matches(vec![m]).unwrap();

        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let assign = |slot, player| {
            store
                .update_match(
                    id,
                    &Condition::SlotAccepts { slot, player },
                    &MatchUpdate::AssignSlot { slot, player },
                )
                .unwrap()
        };

        assert!(matches!(assign(Slot::Player1, a), UpdateOutcome::Applied(_)));
        // Same player again is accepted and changes nothing.
        assert!(matches!(assign(Slot::Player1, a), UpdateOutcome::Applied(_)));
        match assign(Slot::Player1, b) {
            UpdateOutcome::Rejected(row) => assert_eq!(row.player1_id, Some(a)),
            other => panic!("expected rejection, got {other:?}"),
        }
        match assign(Slot::Player2, b) {
            UpdateOutcome::Applied(row) => {
                assert_eq!(row.players(), Some((a, b)));
                assert_eq!(row.status, MatchStatus::Ready);
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryMatchStore::new();
        let m = Match::new(Uuid::new_v4(), RoundId::Final, 1);
        store.insert_matches(vec![m.clone()]).unwrap();
        assert!(matches!(
            store.insert_matches(vec![m]),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn second_insert_into_a_tournament_is_rejected() {
        let store = InMemoryMatchStore::new();
        let t = Uuid::new_v4();
        store.insert_matches(vec![Match::new(t, RoundId::Final, 1)]).unwrap();
        // Fresh match ids, same tournament.
        assert!(matches!(
            store.insert_matches(vec![Match::new(t, RoundId::Semifinal, 1)]),
            Err(StoreError::TournamentExists(id)) if id == t
        ));
        assert_eq!(store.get_matches(t).unwrap().len(), 1);
    }

    #[test]
    fn missing_row_is_an_error() {
        let store = InMemoryMatchStore::new();
        let res = store.update_match(
            Uuid::new_v4(),
            &Condition::StatusIs(MatchStatus::Ready),
            &MatchUpdate::AssignSlot { slot: Slot::Player1, player: Uuid::new_v4() },
        );
        assert!(matches!(res, Err(StoreError::Missing(_))));
    }
}
