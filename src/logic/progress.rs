//! Read-only progress view: stage label, completion percentage, per-segment breakdown.

use crate::logic::classifier::organize;
use crate::logic::structure::{expected_segment_count, TOTAL_MATCHES};
use crate::models::{Match, RoundId, Segment, Standings};
use serde::Serialize;

/// Where the tournament currently stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    WinnersBracket,
    LosersBrackets,
    SemifinalsReady,
    Semifinals,
    Final,
    Complete,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::WinnersBracket => "Winners Bracket Active",
            Stage::LosersBrackets => "Losers Brackets Active",
            Stage::SemifinalsReady => "Semifinals Ready",
            Stage::Semifinals => "Semifinals",
            Stage::Final => "Grand Final",
            Stage::Complete => "Tournament Complete",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SegmentProgress {
    pub segment: Segment,
    pub completed: usize,
    pub total: usize,
}

impl SegmentProgress {
    pub fn is_done(&self) -> bool {
        self.total == expected_segment_count(self.segment) && self.completed == self.total
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Progress {
    pub total_matches: usize,
    pub completed_matches: usize,
    pub percentage: u8,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub next_actions: Vec<String>,
    pub breakdown: Vec<SegmentProgress>,
    pub standings: Standings,
}

pub fn progress(matches: &[Match]) -> Progress {
    let organized = organize(matches);
    let breakdown: Vec<SegmentProgress> = Segment::ALL
        .into_iter()
        .map(|segment| {
            let rows = organized.segment(segment);
            SegmentProgress {
                segment,
                completed: rows.iter().filter(|m| m.is_completed()).count(),
                total: rows.len(),
            }
        })
        .collect();
    let done = |s: Segment| breakdown.iter().any(|b| b.segment == s && b.is_done());
    let started = |s: Segment| breakdown.iter().any(|b| b.segment == s && b.completed > 0);

    let mut next_actions = Vec::new();
    let stage = if done(Segment::Final) {
        Stage::Complete
    } else if done(Segment::Semifinal) {
        next_actions.push("Complete the Grand Final".to_string());
        Stage::Final
    } else if done(Segment::Winners) && done(Segment::LosersA) && done(Segment::LosersB) {
        next_actions.push("Complete both Semifinals".to_string());
        if started(Segment::Semifinal) {
            Stage::Semifinals
        } else {
            Stage::SemifinalsReady
        }
    } else if done(Segment::Winners) {
        for s in [Segment::LosersA, Segment::LosersB] {
            if !done(s) {
                next_actions.push(format!("Complete {}", s.label()));
            }
        }
        Stage::LosersBrackets
    } else {
        next_actions.push("Complete Winners Bracket matches".to_string());
        if started(Segment::LosersA) || started(Segment::LosersB) {
            next_actions.push("Continue Losers Branch matches".to_string());
        }
        Stage::WinnersBracket
    };

    let completed_matches = matches.iter().filter(|m| m.is_completed()).count();
    let percentage = ((completed_matches as f64 / TOTAL_MATCHES as f64) * 100.0)
        .round()
        .min(100.0) as u8;

    Progress {
        total_matches: TOTAL_MATCHES,
        completed_matches,
        percentage,
        stage,
        stage_label: stage.label(),
        next_actions,
        breakdown,
        standings: standings(matches),
    }
}

/// Champion and runner-up from the Final; Semifinal losers share third.
pub fn standings(matches: &[Match]) -> Standings {
    let mut out = Standings::default();
    let mut semis: Vec<&Match> = matches
        .iter()
        .filter(|m| m.round_id == RoundId::Semifinal && m.is_completed())
        .collect();
    semis.sort_by_key(|m| m.match_index);
    out.semifinalists = semis.iter().filter_map(|m| m.loser_id).collect();
    if let Some(f) = matches
        .iter()
        .find(|m| m.round_id == RoundId::Final && m.is_completed())
    {
        out.champion = f.winner_id;
        out.runner_up = f.loser_id;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::setup::initialize_bracket;
    use crate::models::MatchStatus;
    use uuid::Uuid;

    #[test]
    fn fresh_bracket_is_at_start() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        let p = progress(&matches);
        assert_eq!(p.stage, Stage::WinnersBracket);
        assert_eq!(p.percentage, 0);
        assert_eq!(p.completed_matches, 0);
        assert_eq!(p.breakdown.len(), 5);
        assert!(!p.standings.is_decided());
    }

    #[test]
    fn all_completed_is_complete() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let mut matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        for m in &mut matches {
            m.status = MatchStatus::Completed;
        }
        let p = progress(&matches);
        assert_eq!(p.stage, Stage::Complete);
        assert_eq!(p.stage_label, "Tournament Complete");
        assert_eq!(p.percentage, 100);
        assert!(p.next_actions.is_empty());
    }
}
