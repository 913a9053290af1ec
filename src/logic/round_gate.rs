//! Round gating: a round's outputs are usable only once every match in it is completed.

use crate::logic::structure::{expected_match_count, feeders};
use crate::models::{Match, MatchStatus, RoundId};
use serde::Serialize;
use std::collections::HashSet;

/// Open rounds and the matches in them that accept a score right now.
#[derive(Clone, Debug, Serialize)]
pub struct Playable {
    pub rounds: Vec<RoundId>,
    pub matches: Vec<Match>,
}

/// True iff every match of `round` is completed with a winner.
///
/// A round with missing rows is never complete: absent rows are a structural
/// breach, not vacuously finished. Indices must be exactly `1..=expected`.
pub fn is_complete(matches: &[Match], round: RoundId) -> bool {
    let mut indices = HashSet::new();
    for m in matches.iter().filter(|m| m.round_id == round) {
        if m.status != MatchStatus::Completed || m.winner_id.is_none() {
            return false;
        }
        if !indices.insert(m.match_index) {
            return false;
        }
    }
    let expected = expected_match_count(round) as u32;
    indices.len() == expected as usize && (1..=expected).all(|i| indices.contains(&i))
}

/// True when every round feeding `round` is complete, i.e. `round` may receive players.
pub fn feeders_complete(matches: &[Match], round: RoundId) -> bool {
    feeders(round).iter().all(|r| is_complete(matches, *r))
}

/// Rounds that are open for play: fed, not yet finished.
pub fn playable_rounds(matches: &[Match]) -> Vec<RoundId> {
    RoundId::ALL
        .into_iter()
        .filter(|r| feeders_complete(matches, *r) && !is_complete(matches, *r))
        .collect()
}

pub fn playable(matches: &[Match]) -> Playable {
    let rounds = playable_rounds(matches);
    let matches = matches
        .iter()
        .filter(|m| rounds.contains(&m.round_id) && m.status == MatchStatus::Ready)
        .cloned()
        .collect();
    Playable { rounds, matches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::setup::initialize_bracket;
    use uuid::Uuid;

    fn complete(m: &mut Match) {
        let (p1, p2) = m.players().unwrap();
        m.score1 = Some(5);
        m.score2 = Some(2);
        m.winner_id = Some(p1);
        m.loser_id = Some(p2);
        m.status = MatchStatus::Completed;
    }

    #[test]
    fn gate_opens_only_after_last_match() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let mut matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        assert!(!is_complete(&matches, RoundId::WinnersRound1));
        assert_eq!(playable_rounds(&matches), vec![RoundId::WinnersRound1]);

        let r1: Vec<usize> = (0..matches.len())
            .filter(|i| matches[*i].round_id == RoundId::WinnersRound1)
            .collect();
        for &i in &r1[..7] {
            complete(&mut matches[i]);
        }
        assert!(!is_complete(&matches, RoundId::WinnersRound1));
        assert!(!feeders_complete(&matches, RoundId::LosersARound1));

        complete(&mut matches[r1[7]]);
        assert!(is_complete(&matches, RoundId::WinnersRound1));
        assert!(feeders_complete(&matches, RoundId::WinnersRound2));
        assert!(feeders_complete(&matches, RoundId::LosersARound1));
        assert!(!feeders_complete(&matches, RoundId::Semifinal));
        assert_eq!(
            playable_rounds(&matches),
            vec![RoundId::WinnersRound2, RoundId::LosersARound1]
        );
        // Nothing is seated yet, so no match can take a score.
        let open = playable(&matches);
        assert_eq!(open.rounds, playable_rounds(&matches));
        assert!(open.matches.is_empty());
    }

    #[test]
    fn duplicate_index_does_not_stand_in_for_a_missing_one() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let mut matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        for m in matches.iter_mut().filter(|m| m.round_id == RoundId::WinnersRound1) {
            complete(m);
        }
        assert!(is_complete(&matches, RoundId::WinnersRound1));

        let m = matches
            .iter_mut()
            .find(|m| m.round_id == RoundId::WinnersRound1 && m.match_index == 8)
            .unwrap();
        m.match_index = 7;
        assert!(!is_complete(&matches, RoundId::WinnersRound1));
    }

    #[test]
    fn empty_round_is_not_complete() {
        assert!(!is_complete(&[], RoundId::Final));
    }
}
