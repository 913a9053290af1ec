//! Operator channel for integrity failures.
//!
//! Ambiguous advancement targets and structural violations are never repaired
//! automatically; the tournament is flagged until an admin clears it.

use crate::models::{TournamentError, TournamentId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    AmbiguousAdvancementTarget,
    StructuralIntegrityViolation,
}

#[derive(Clone, Debug, Serialize)]
pub struct IntegrityAlert {
    pub tournament_id: TournamentId,
    pub kind: AlertKind,
    pub detail: String,
    pub raised_at: DateTime<Utc>,
}

impl IntegrityAlert {
    /// Build an alert for operator-facing errors; `None` for everything else.
    pub fn from_error(tournament_id: TournamentId, err: &TournamentError) -> Option<Self> {
        let (kind, detail) = match err {
            TournamentError::AmbiguousAdvancementTarget { .. } => {
                (AlertKind::AmbiguousAdvancementTarget, err.to_string())
            }
            TournamentError::StructuralIntegrityViolation(violations) => (
                AlertKind::StructuralIntegrityViolation,
                violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => return None,
        };
        Some(Self {
            tournament_id,
            kind,
            detail,
            raised_at: Utc::now(),
        })
    }
}

pub trait IntegrityReporter: Send + Sync {
    fn flag(&self, alert: IntegrityAlert);
}

/// Keeps flagged tournaments and their alerts in memory, logging each alert.
#[derive(Debug, Default)]
pub struct FlaggedTournaments {
    flags: RwLock<HashMap<TournamentId, Vec<IntegrityAlert>>>,
}

impl FlaggedTournaments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flagged(&self, tournament_id: TournamentId) -> bool {
        self.flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&tournament_id)
    }

    pub fn alerts(&self, tournament_id: TournamentId) -> Vec<IntegrityAlert> {
        self.flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every flagged tournament with its alerts, oldest flag first.
    pub fn all(&self) -> Vec<(TournamentId, Vec<IntegrityAlert>)> {
        let mut out: Vec<_> = self
            .flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, a)| (*id, a.clone()))
            .collect();
        out.sort_by_key(|(_, a)| a.first().map(|x| x.raised_at));
        out
    }

    /// Acknowledge after manual reconciliation. Returns whether the tournament was flagged.
    pub fn clear(&self, tournament_id: TournamentId) -> bool {
        self.flags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tournament_id)
            .is_some()
    }
}

impl IntegrityReporter for FlaggedTournaments {
    fn flag(&self, alert: IntegrityAlert) {
        log::error!(
            "Tournament {} flagged for manual reconciliation ({:?}): {}",
            alert.tournament_id,
            alert.kind,
            alert.detail
        );
        // A panic elsewhere must not lose the flag.
        let mut g = self.flags.write().unwrap_or_else(PoisonError::into_inner);
        g.entry(alert.tournament_id).or_default().push(alert);
    }
}

impl<R: IntegrityReporter + ?Sized> IntegrityReporter for std::sync::Arc<R> {
    fn flag(&self, alert: IntegrityAlert) {
        (**self).flag(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, Violation};
    use uuid::Uuid;

    #[test]
    fn only_operator_errors_become_alerts() {
        let t = Uuid::new_v4();
        assert!(IntegrityAlert::from_error(t, &TournamentError::MatchNotReady(Uuid::nil())).is_none());
        let err = TournamentError::StructuralIntegrityViolation(vec![Violation::MissingPlayers {
            match_id: Uuid::nil(),
            status: MatchStatus::Ready,
        }]);
        let alert = IntegrityAlert::from_error(t, &err).unwrap();
        assert_eq!(alert.kind, AlertKind::StructuralIntegrityViolation);
        assert!(alert.detail.contains("without both players"));
    }

    #[test]
    fn flag_and_clear() {
        let flags = FlaggedTournaments::new();
        let t = Uuid::new_v4();
        assert!(!flags.is_flagged(t));
        let err = TournamentError::StructuralIntegrityViolation(vec![]);
        flags.flag(IntegrityAlert::from_error(t, &err).unwrap());
        assert!(flags.is_flagged(t));
        assert_eq!(flags.alerts(t).len(), 1);
        assert_eq!(flags.all().len(), 1);
        assert!(flags.clear(t));
        assert!(!flags.is_flagged(t));
    }

    #[test]
    fn flag_survives_a_poisoned_lock() {
        let flags = std::sync::Arc::new(FlaggedTournaments::new());
        let poisoner = flags.clone();
        let res = std::thread::spawn(move || {
            let _g = poisoner.flags.write().unwrap();
            panic!("writer died");
        })
        .join();
        assert!(res.is_err());
        assert!(flags.flags.is_poisoned());

        let t = Uuid::new_v4();
        let err = TournamentError::StructuralIntegrityViolation(vec![]);
        flags.flag(IntegrityAlert::from_error(t, &err).unwrap());
        assert!(flags.is_flagged(t));
        assert_eq!(flags.alerts(t).len(), 1);
    }
}
