//! Score submission: the single writer of match state.
//!
//! A submission commits the result with one conditional write (`ready -> completed`),
//! then fills every downstream round whose feeder rounds are now all complete.
//! Slot writes are conditional too, so re-running advancement is always safe.

use crate::alerts::{IntegrityAlert, IntegrityReporter};
use crate::logic::advancement::{check_assignment, resolve, AdvancementPlan, Assignment};
use crate::logic::classifier::{organize, OrganizedMatches};
use crate::logic::progress::{progress, Progress};
use crate::logic::round_gate::{feeders_complete, is_complete, playable, Playable};
use crate::logic::structure::{downstream, feeders};
use crate::logic::validator::{validate, ValidationReport};
use crate::models::{
    Match, MatchId, MatchStatus, PlayerId, RoundId, ScoreRejection, TournamentError,
    TournamentId, UserId,
};
use crate::store::{Condition, MatchStore, MatchUpdate, UpdateOutcome};
use chrono::Utc;
use serde::Serialize;

/// One slot write performed (or confirmed) during advancement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AppliedAssignment {
    pub source: MatchId,
    pub destination: MatchId,
    pub assignment: Assignment,
    /// False when the slot already held the player.
    pub changed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubmissionResult {
    #[serde(rename = "match")]
    pub completed: Match,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub plan: AdvancementPlan,
    /// Empty while the destination rounds are still gated.
    pub applied: Vec<AppliedAssignment>,
    pub round_complete: bool,
    pub progress: Progress,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReconcileReport {
    pub tournament_id: TournamentId,
    pub applied: Vec<AppliedAssignment>,
    pub progress: Progress,
}

impl ReconcileReport {
    /// Number of slots that were actually written.
    pub fn repaired(&self) -> usize {
        self.applied.iter().filter(|a| a.changed).count()
    }
}

/// Validate a score pair and convert it to stored scores.
pub fn check_scores(score1: i64, score2: i64) -> Result<(u32, u32), TournamentError> {
    if score1 < 0 || score2 < 0 {
        return Err(TournamentError::InvalidScore(ScoreRejection::Negative));
    }
    if score1 == score2 {
        return Err(TournamentError::InvalidScore(ScoreRejection::Tie));
    }
    let s1 = u32::try_from(score1)
        .map_err(|_| TournamentError::InvalidScore(ScoreRejection::OutOfRange))?;
    let s2 = u32::try_from(score2)
        .map_err(|_| TournamentError::InvalidScore(ScoreRejection::OutOfRange))?;
    Ok((s1, s2))
}

pub struct ScoreSubmissionCoordinator<S, R> {
    store: S,
    reporter: R,
}

impl<S: MatchStore, R: IntegrityReporter> ScoreSubmissionCoordinator<S, R> {
    pub fn new(store: S, reporter: R) -> Self {
        Self { store, reporter }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Record a result and advance both players.
    ///
    /// Exactly one of several racing submissions for the same match wins; the others
    /// get `AlreadyCompleted` and perform no advancement.
    pub fn submit(
        &self,
        match_id: MatchId,
        score1: i64,
        score2: i64,
        submitted_by: UserId,
    ) -> Result<SubmissionResult, TournamentError> {
        let current = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        match current.status {
            MatchStatus::Completed => return Err(TournamentError::AlreadyCompleted(match_id)),
            MatchStatus::Pending | MatchStatus::Bye => {
                return Err(TournamentError::MatchNotReady(match_id))
            }
            MatchStatus::Ready => {}
        }
        let (p1, p2) = current
            .players()
            .ok_or(TournamentError::MatchNotReady(match_id))?;
        let (s1, s2) = check_scores(score1, score2)?;
        let (winner_id, loser_id) = if s1 > s2 { (p1, p2) } else { (p2, p1) };

        let update = MatchUpdate::Complete {
            score1: s1,
            score2: s2,
            winner_id,
            loser_id,
            submitted_by,
            completed_at: Utc::now(),
        };
        let completed = match self.store.update_match(
            match_id,
            &Condition::StatusIs(MatchStatus::Ready),
            &update,
        )? {
            UpdateOutcome::Applied(m) => m,
            UpdateOutcome::Rejected(m) if m.is_completed() => {
                log::warn!("Submission for {} lost the race to another submission", m.label());
                return Err(TournamentError::AlreadyCompleted(match_id));
            }
            UpdateOutcome::Rejected(_) => return Err(TournamentError::MatchNotReady(match_id)),
        };
        log::info!(
            "{} completed {}-{} (winner {}, submitted by {})",
            completed.label(),
            s1,
            s2,
            winner_id,
            submitted_by
        );

        let tournament_id = completed.tournament_id;
        let plan = resolve(&completed).map_err(|e| self.escalate(tournament_id, e))?;
        let applied = self.advance_from(&completed).map_err(|e| {
            if !e.requires_operator() {
                log::warn!(
                    "{} is committed but advancement failed ({}); reconcile tournament {}",
                    completed.label(),
                    e,
                    tournament_id
                );
            }
            self.escalate(tournament_id, e)
        })?;

        let matches = self.store.get_matches(tournament_id)?;
        Ok(SubmissionResult {
            round_complete: is_complete(&matches, completed.round_id),
            progress: progress(&matches),
            completed,
            winner_id,
            loser_id,
            plan,
            applied,
        })
    }

    /// Re-run advancement for one completed match (retry after a failed slot write).
    pub fn advance(&self, match_id: MatchId) -> Result<Vec<AppliedAssignment>, TournamentError> {
        let m = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if !m.is_completed() {
            return Err(TournamentError::MatchNotCompleted(match_id));
        }
        self.advance_from(&m)
            .map_err(|e| self.escalate(m.tournament_id, e))
    }

    /// Re-apply every plan whose destination round is ungated. Idempotent; repairs
    /// slot writes lost after a committed score.
    pub fn reconcile(&self, tournament_id: TournamentId) -> Result<ReconcileReport, TournamentError> {
        let matches = self.store.get_matches(tournament_id)?;
        let mut applied = Vec::new();
        for round in RoundId::ALL {
            let filled = self
                .fill_round(&matches, round)
                .map_err(|e| self.escalate(tournament_id, e))?;
            applied.extend(filled);
        }
        let repaired = applied.iter().filter(|a| a.changed).count();
        if repaired > 0 {
            log::info!("Reconciled tournament {}: {} slot(s) repaired", tournament_id, repaired);
        }
        let matches = self.store.get_matches(tournament_id)?;
        Ok(ReconcileReport {
            tournament_id,
            applied,
            progress: progress(&matches),
        })
    }

    /// Run the structural validator; a failing report flags the tournament.
    pub fn validate(&self, tournament_id: TournamentId) -> Result<ValidationReport, TournamentError> {
        let matches = self.store.get_matches(tournament_id)?;
        let report = validate(&matches);
        if !report.ok {
            let err = TournamentError::StructuralIntegrityViolation(report.violations.clone());
            self.escalate(tournament_id, err);
        }
        Ok(report)
    }

    pub fn organize(&self, tournament_id: TournamentId) -> Result<OrganizedMatches, TournamentError> {
        Ok(organize(&self.store.get_matches(tournament_id)?))
    }

    pub fn progress(&self, tournament_id: TournamentId) -> Result<Progress, TournamentError> {
        Ok(progress(&self.store.get_matches(tournament_id)?))
    }

    /// Matches that can be scored now, with the rounds they belong to.
    pub fn playable(&self, tournament_id: TournamentId) -> Result<Playable, TournamentError> {
        Ok(playable(&self.store.get_matches(tournament_id)?))
    }

    fn advance_from(&self, source: &Match) -> Result<Vec<AppliedAssignment>, TournamentError> {
        let matches = self.store.get_matches(source.tournament_id)?;
        let mut applied = Vec::new();
        for dest in downstream(source.round_id) {
            applied.extend(self.fill_round(&matches, dest)?);
        }
        Ok(applied)
    }

    /// Seat every player `dest` receives, once all of its feeder rounds are complete.
    fn fill_round(
        &self,
        matches: &[Match],
        dest: RoundId,
    ) -> Result<Vec<AppliedAssignment>, TournamentError> {
        if feeders(dest).is_empty() {
            return Ok(Vec::new());
        }
        if !feeders_complete(matches, dest) {
            log::debug!("{} still gated by {:?}", dest, feeders(dest));
            return Ok(Vec::new());
        }
        let mut applied = Vec::new();
        for feeder in feeders(dest) {
            for m in matches.iter().filter(|m| m.round_id == *feeder) {
                let plan = resolve(m)?;
                for a in plan.assignments_into(dest) {
                    applied.push(self.apply(matches, m.id, a)?);
                }
            }
        }
        Ok(applied)
    }

    fn apply(
        &self,
        matches: &[Match],
        source: MatchId,
        a: &Assignment,
    ) -> Result<AppliedAssignment, TournamentError> {
        let dest = check_assignment(matches, a)?;
        let done = |changed| AppliedAssignment {
            source,
            destination: dest.id,
            assignment: *a,
            changed,
        };
        if dest.player(a.slot) == Some(a.player_id) {
            return Ok(done(false));
        }
        let condition = Condition::SlotAccepts {
            slot: a.slot,
            player: a.player_id,
        };
        let update = MatchUpdate::AssignSlot {
            slot: a.slot,
            player: a.player_id,
        };
        match self.store.update_match(dest.id, &condition, &update)? {
            UpdateOutcome::Applied(row) => {
                log::info!(
                    "Seated {} in {} {} ({:?})",
                    a.player_id,
                    row.label(),
                    a.slot,
                    row.status
                );
                Ok(done(true))
            }
            UpdateOutcome::Rejected(row) => {
                // The snapshot was stale; re-check against the row as it is now.
                check_assignment(std::slice::from_ref(&row), a)?;
                Ok(done(false))
            }
        }
    }

    /// Forward operator-facing errors to the reporter, then hand the error back.
    fn escalate(&self, tournament_id: TournamentId, err: TournamentError) -> TournamentError {
        if let Some(alert) = IntegrityAlert::from_error(tournament_id, &err) {
            self.reporter.flag(alert);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_checks() {
        assert!(matches!(
            check_scores(5, 5),
            Err(TournamentError::InvalidScore(ScoreRejection::Tie))
        ));
        assert!(matches!(
            check_scores(-1, 3),
            Err(TournamentError::InvalidScore(ScoreRejection::Negative))
        ));
        assert!(matches!(
            check_scores(i64::from(u32::MAX) + 1, 0),
            Err(TournamentError::InvalidScore(ScoreRejection::OutOfRange))
        ));
        assert_eq!(check_scores(0, 7).unwrap(), (0, 7));
    }
}
