//! Bracket initialization: build the 27 rows of a new tournament from 16 seeds.

use crate::logic::structure::{expected_match_count, PLAYER_COUNT};
use crate::models::{Match, MatchStatus, PlayerId, RoundId, TournamentError, TournamentId};
use std::collections::HashSet;

/// Create every match of the bracket in `pending` state.
///
/// `seeds` must hold exactly 16 distinct players, already in seed order:
/// WinnersRound1 match k pairs seeds `2k-1` and `2k` and starts `ready`.
pub fn initialize_bracket(
    tournament_id: TournamentId,
    seeds: &[PlayerId],
) -> Result<Vec<Match>, TournamentError> {
    if seeds.len() != PLAYER_COUNT {
        return Err(TournamentError::InvalidSeeding(format!(
            "need exactly {} players, got {}",
            PLAYER_COUNT,
            seeds.len()
        )));
    }
    let mut seen = HashSet::with_capacity(seeds.len());
    if let Some(dup) = seeds.iter().find(|p| !seen.insert(**p)) {
        return Err(TournamentError::InvalidSeeding(format!(
            "player {} is seeded twice",
            dup
        )));
    }

    let mut matches = Vec::with_capacity(27);
    for round in RoundId::ALL {
        for index in 1..=expected_match_count(round) as u32 {
            matches.push(Match::new(tournament_id, round, index));
        }
    }
    for (m, pair) in matches
        .iter_mut()
        .filter(|m| m.round_id == RoundId::WinnersRound1)
        .zip(seeds.chunks_exact(2))
    {
        m.player1_id = Some(pair[0]);
        m.player2_id = Some(pair[1]);
        m.status = MatchStatus::Ready;
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn seeds_round_one_in_order() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        assert_eq!(matches.len(), 27);
        let r1: Vec<_> = matches
            .iter()
            .filter(|m| m.round_id == RoundId::WinnersRound1)
            .collect();
        assert_eq!(r1.len(), 8);
        assert_eq!(r1[2].match_index, 3);
        assert_eq!(r1[2].player1_id, Some(seeds[4]));
        assert_eq!(r1[2].player2_id, Some(seeds[5]));
        assert!(r1.iter().all(|m| m.status == MatchStatus::Ready));
        assert!(matches
            .iter()
            .filter(|m| m.round_id != RoundId::WinnersRound1)
            .all(|m| m.status == MatchStatus::Pending && m.player1_id.is_none()));
    }

    #[test]
    fn rejects_wrong_count_and_duplicates() {
        let mut seeds: Vec<_> = (0..15).map(|_| Uuid::new_v4()).collect();
        assert!(matches!(
            initialize_bracket(Uuid::new_v4(), &seeds),
            Err(TournamentError::InvalidSeeding(_))
        ));
        seeds.push(seeds[0]);
        assert!(matches!(
            initialize_bracket(Uuid::new_v4(), &seeds),
            Err(TournamentError::InvalidSeeding(_))
        ));
    }
}
