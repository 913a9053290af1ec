//! Advancement: where the winner and loser of a completed match go next.
//!
//! Within the Winners and Losers branches a match at index `i` feeds match
//! `ceil(i / 2)` of the next round, into `player1` when `i` is odd and `player2`
//! when even. The Semifinal is a cross-branch convergence and is seeded from an
//! explicit table instead.

use crate::logic::structure::expected_match_count;
use crate::models::{
    find_at, Match, MatchId, PlayerId, RoundId, Slot, TournamentError, Violation,
};
use serde::{Deserialize, Serialize};

/// Whether an assignment carries the winner or the loser of the source match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Winner,
    Loser,
}

/// The four qualifiers that meet in the Semifinal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemifinalSeed {
    WinnersFinalist1,
    WinnersFinalist2,
    LosersAChampion,
    LosersBChampion,
}

impl SemifinalSeed {
    pub const ALL: [SemifinalSeed; 4] = [
        SemifinalSeed::WinnersFinalist1,
        SemifinalSeed::WinnersFinalist2,
        SemifinalSeed::LosersAChampion,
        SemifinalSeed::LosersBChampion,
    ];
}

/// Seed produced by the winner of `(round, match_index)`, if that match feeds the Semifinal.
pub fn semifinal_seed_for(round: RoundId, match_index: u32) -> Option<SemifinalSeed> {
    match (round, match_index) {
        (RoundId::WinnersRound3, 1) => Some(SemifinalSeed::WinnersFinalist1),
        (RoundId::WinnersRound3, 2) => Some(SemifinalSeed::WinnersFinalist2),
        (RoundId::LosersARound3, 1) => Some(SemifinalSeed::LosersAChampion),
        (RoundId::LosersBRound2, 1) => Some(SemifinalSeed::LosersBChampion),
        _ => None,
    }
}

/// Semifinal match index and slot reserved for `seed`: finalist 1 meets the
/// Losers-A champion, finalist 2 the Losers-B champion.
pub fn semifinal_seat(seed: SemifinalSeed) -> (u32, Slot) {
    match seed {
        SemifinalSeed::WinnersFinalist1 => (1, Slot::Player1),
        SemifinalSeed::LosersAChampion => (1, Slot::Player2),
        SemifinalSeed::WinnersFinalist2 => (2, Slot::Player1),
        SemifinalSeed::LosersBChampion => (2, Slot::Player2),
    }
}

/// One destination-slot write.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub role: Role,
    pub round: RoundId,
    pub match_index: u32,
    pub slot: Slot,
    pub player_id: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SemifinalSeed>,
}

/// A player leaving the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player_id", rename_all = "snake_case")]
pub enum Exit {
    Eliminated(PlayerId),
    Champion(PlayerId),
    RunnerUp(PlayerId),
}

/// Everything one completed match causes downstream.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdvancementPlan {
    pub source: MatchId,
    pub round: RoundId,
    pub match_index: u32,
    /// Zero, one, or two slot writes, winner first.
    pub assignments: Vec<Assignment>,
    pub exits: Vec<Exit>,
}

impl AdvancementPlan {
    pub fn assignments_into(&self, round: RoundId) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.round == round)
    }
}

/// Next match in the same branch, by parity.
fn parity_target(round: RoundId, match_index: u32) -> (RoundId, u32, Slot) {
    (round, match_index.div_ceil(2), Slot::from_parity(match_index))
}

fn winner_target(round: RoundId, match_index: u32) -> Option<(RoundId, u32, Slot, Option<SemifinalSeed>)> {
    use RoundId::*;
    let next = match round {
        WinnersRound1 => WinnersRound2,
        WinnersRound2 => WinnersRound3,
        LosersARound1 => LosersARound2,
        LosersARound2 => LosersARound3,
        LosersBRound1 => LosersBRound2,
        Semifinal => Final,
        WinnersRound3 | LosersARound3 | LosersBRound2 => {
            let seed = semifinal_seed_for(round, match_index)?;
            let (index, slot) = semifinal_seat(seed);
            return Some((Semifinal, index, slot, Some(seed)));
        }
        Final => return None,
    };
    let (r, i, s) = parity_target(next, match_index);
    Some((r, i, s, None))
}

fn loser_target(round: RoundId, match_index: u32) -> Option<(RoundId, u32, Slot)> {
    match round {
        RoundId::WinnersRound1 => Some(parity_target(RoundId::LosersARound1, match_index)),
        RoundId::WinnersRound2 => Some(parity_target(RoundId::LosersBRound1, match_index)),
        _ => None,
    }
}

/// Compute the advancement plan of a completed match. Pure and deterministic.
pub fn resolve(m: &Match) -> Result<AdvancementPlan, TournamentError> {
    if !m.is_completed() {
        return Err(TournamentError::MatchNotCompleted(m.id));
    }
    let (winner, loser) = m.winner_id.zip(m.loser_id).ok_or_else(|| {
        TournamentError::StructuralIntegrityViolation(vec![Violation::CompletedWithoutResult {
            match_id: m.id,
        }])
    })?;
    if m.match_index == 0 || m.match_index as usize > expected_match_count(m.round_id) {
        return Err(TournamentError::StructuralIntegrityViolation(vec![
            Violation::MatchIndexOutOfRange {
                match_id: m.id,
                round: m.round_id,
                match_index: m.match_index,
            },
        ]));
    }

    let mut assignments = Vec::with_capacity(2);
    let mut exits = Vec::with_capacity(2);

    match winner_target(m.round_id, m.match_index) {
        Some((round, match_index, slot, seed)) => assignments.push(Assignment {
            role: Role::Winner,
            round,
            match_index,
            slot,
            player_id: winner,
            seed,
        }),
        None => exits.push(Exit::Champion(winner)),
    }

    match loser_target(m.round_id, m.match_index) {
        Some((round, match_index, slot)) => assignments.push(Assignment {
            role: Role::Loser,
            round,
            match_index,
            slot,
            player_id: loser,
            seed: None,
        }),
        None if m.round_id == RoundId::Final => exits.push(Exit::RunnerUp(loser)),
        None => exits.push(Exit::Eliminated(loser)),
    }

    Ok(AdvancementPlan {
        source: m.id,
        round: m.round_id,
        match_index: m.match_index,
        assignments,
        exits,
    })
}

/// Destination row of an assignment, checked for a conflicting occupant.
///
/// An empty slot or one already holding the same player is accepted.
pub fn check_assignment<'a>(
    matches: &'a [Match],
    a: &Assignment,
) -> Result<&'a Match, TournamentError> {
    let dest = find_at(matches, a.round, a.match_index).ok_or_else(|| {
        TournamentError::StructuralIntegrityViolation(vec![Violation::MissingRow {
            round: a.round,
            match_index: a.match_index,
        }])
    })?;
    match dest.player(a.slot) {
        Some(found) if found != a.player_id => Err(TournamentError::AmbiguousAdvancementTarget {
            match_id: dest.id,
            round: a.round,
            match_index: a.match_index,
            slot: a.slot,
            expected: a.player_id,
            found,
        }),
        _ => Ok(dest),
    }
}

/// [`resolve`], then check every destination slot against the current rows.
pub fn resolve_against(m: &Match, matches: &[Match]) -> Result<AdvancementPlan, TournamentError> {
    let plan = resolve(m)?;
    for a in &plan.assignments {
        check_assignment(matches, a)?;
    }
    Ok(plan)
}
