//! Structural validation of a whole match set against the fixed topology.
//!
//! Diagnostic only: it reports every violation it finds and never repairs anything.

use crate::logic::advancement::resolve;
use crate::logic::classifier::organize;
use crate::logic::round_gate::feeders_complete;
use crate::logic::structure::{expected_match_count, expected_segment_count, feeders, TOTAL_MATCHES};
use crate::models::{Match, MatchStatus, PlayerId, RoundId, Segment, Slot, TournamentId, Violation};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Result of a validation pass.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

/// Check the match set of a single tournament. Does not stop at the first violation.
pub fn validate(matches: &[Match]) -> ValidationReport {
    let mut violations = Vec::new();

    if matches.len() != TOTAL_MATCHES {
        violations.push(Violation::WrongTotal {
            expected: TOTAL_MATCHES,
            found: matches.len(),
        });
    }

    let organized = organize(matches);
    for segment in Segment::ALL {
        let expected = expected_segment_count(segment);
        let found = organized.segment(segment).len();
        if expected != found {
            violations.push(Violation::WrongSegmentCount { segment, expected, found });
        }
    }

    check_rounds(matches, &mut violations);

    if let Some(first) = matches.first() {
        check_single_tournament(matches, first.tournament_id, &mut violations);
    }

    for m in matches {
        check_row(m, &mut violations);
    }

    check_seating(matches, &mut violations);

    ValidationReport {
        ok: violations.is_empty(),
        violations,
    }
}

fn check_rounds(matches: &[Match], violations: &mut Vec<Violation>) {
    for round in RoundId::ALL {
        let expected = expected_match_count(round);
        let rows: Vec<_> = matches.iter().filter(|m| m.round_id == round).collect();
        if rows.len() != expected {
            violations.push(Violation::WrongRoundCount {
                round,
                expected,
                found: rows.len(),
            });
        }
        let mut seen = HashSet::new();
        for m in &rows {
            if m.match_index == 0 || m.match_index as usize > expected {
                violations.push(Violation::MatchIndexOutOfRange {
                    match_id: m.id,
                    round,
                    match_index: m.match_index,
                });
            } else if !seen.insert(m.match_index) {
                violations.push(Violation::DuplicateMatchIndex {
                    round,
                    match_index: m.match_index,
                });
            }
        }
        for index in 1..=expected as u32 {
            if !seen.contains(&index) {
                violations.push(Violation::MissingRow { round, match_index: index });
            }
        }
    }
}

fn check_single_tournament(matches: &[Match], id: TournamentId, violations: &mut Vec<Violation>) {
    for m in matches.iter().filter(|m| m.tournament_id != id) {
        violations.push(Violation::ForeignTournament {
            match_id: m.id,
            tournament_id: m.tournament_id,
        });
    }
}

fn check_row(m: &Match, violations: &mut Vec<Violation>) {
    let has_scores = m.score1.is_some() && m.score2.is_some();
    if m.winner_id.is_some() && !has_scores {
        violations.push(Violation::WinnerWithoutScores { match_id: m.id });
    }
    if matches!(m.status, MatchStatus::Ready | MatchStatus::Completed) && m.players().is_none() {
        violations.push(Violation::MissingPlayers {
            match_id: m.id,
            status: m.status,
        });
    }
    if let Some((p1, p2)) = m.players() {
        if p1 == p2 {
            violations.push(Violation::SamePlayerTwice { match_id: m.id, player: p1 });
        }
    }
    if m.status == MatchStatus::Completed {
        match (m.winner_id, m.loser_id) {
            (Some(w), Some(l)) => {
                if !m.has_player(w) || !m.has_player(l) || w == l {
                    violations.push(Violation::ResultNotInMatch { match_id: m.id });
                }
            }
            _ => violations.push(Violation::CompletedWithoutResult { match_id: m.id }),
        }
        if has_scores && m.score1 == m.score2 {
            violations.push(Violation::TiedScores { match_id: m.id });
        } else if let (Some(s1), Some(s2), Some(winner)) = (m.score1, m.score2, m.winner_id) {
            let higher = if s1 > s2 { m.player1_id } else { m.player2_id };
            if higher != Some(winner) {
                violations.push(Violation::ResultContradictsScores { match_id: m.id });
            }
        }
    }
}

/// Every seated player must be the one the feeder matches send there, and only
/// once all feeder rounds are complete.
fn check_seating(matches: &[Match], violations: &mut Vec<Violation>) {
    for round in RoundId::ALL {
        if feeders(round).is_empty() {
            continue;
        }
        let rows = matches.iter().filter(|m| m.round_id == round);
        if !feeders_complete(matches, round) {
            for m in rows.filter(|m| m.player1_id.is_some() || m.player2_id.is_some()) {
                violations.push(Violation::SeatedBeforeFeeders { match_id: m.id, round });
            }
            continue;
        }

        let mut expected: HashMap<(u32, Slot), PlayerId> = HashMap::new();
        for feeder in feeders(round) {
            // Feeder rows that cannot be resolved are reported by `check_row`.
            let plans = matches
                .iter()
                .filter(|m| m.round_id == *feeder)
                .filter_map(|m| resolve(m).ok());
            for plan in plans {
                for a in plan.assignments_into(round) {
                    expected.insert((a.match_index, a.slot), a.player_id);
                }
            }
        }

        for m in rows {
            for slot in [Slot::Player1, Slot::Player2] {
                let Some(found) = m.player(slot) else { continue };
                let want = expected.get(&(m.match_index, slot)).copied();
                if want != Some(found) {
                    violations.push(Violation::UnexpectedOccupant {
                        match_id: m.id,
                        round,
                        match_index: m.match_index,
                        slot,
                        expected: want,
                        found,
                    });
                }
            }
        }
    }
}
