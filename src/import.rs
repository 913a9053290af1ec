//! CSV bulk import/export of match rows.
//!
//! The `round` column takes either the tag (`losers_a_round1`) or the legacy
//! numeric code (`101`); export always writes the tag.

use crate::models::{Match, MatchStatus, RoundId, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unknown round {value:?}")]
    UnknownRound { line: u64, value: String },
    #[error("line {line}: row belongs to tournament {found}, expected {expected}")]
    WrongTournament {
        line: u64,
        expected: TournamentId,
        found: TournamentId,
    },
    #[error("no rows to import")]
    Empty,
}

#[derive(Debug, Serialize, Deserialize)]
struct MatchRecord {
    id: Uuid,
    tournament_id: Uuid,
    round: String,
    match_index: u32,
    player1_id: Option<Uuid>,
    player2_id: Option<Uuid>,
    winner_id: Option<Uuid>,
    loser_id: Option<Uuid>,
    score1: Option<u32>,
    score2: Option<u32>,
    status: MatchStatus,
    #[serde(default)]
    submitted_by: Option<Uuid>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    fn into_match(self, line: u64) -> Result<Match, ImportError> {
        let round_id = RoundId::parse(&self.round).ok_or(ImportError::UnknownRound {
            line,
            value: self.round.clone(),
        })?;
        Ok(Match {
            id: self.id,
            tournament_id: self.tournament_id,
            round_id,
            match_index: self.match_index,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            winner_id: self.winner_id,
            loser_id: self.loser_id,
            score1: self.score1,
            score2: self.score2,
            status: self.status,
            submitted_by: self.submitted_by,
            completed_at: self.completed_at,
        })
    }

    fn from_match(m: &Match) -> Self {
        Self {
            id: m.id,
            tournament_id: m.tournament_id,
            round: m.round_id.tag().to_string(),
            match_index: m.match_index,
            player1_id: m.player1_id,
            player2_id: m.player2_id,
            winner_id: m.winner_id,
            loser_id: m.loser_id,
            score1: m.score1,
            score2: m.score2,
            status: m.status,
            submitted_by: m.submitted_by,
            completed_at: m.completed_at,
        }
    }
}

/// Parse match rows from CSV with a header line. When `tournament_id` is given,
/// every row must belong to it.
pub fn read_matches<R: io::Read>(
    reader: R,
    tournament_id: Option<TournamentId>,
) -> Result<Vec<Match>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row: MatchRecord = record.deserialize(Some(&headers))?;
        let m = row.into_match(line)?;
        if let Some(expected) = tournament_id {
            if m.tournament_id != expected {
                return Err(ImportError::WrongTournament {
                    line,
                    expected,
                    found: m.tournament_id,
                });
            }
        }
        out.push(m);
    }
    if out.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(out)
}

pub fn write_matches<W: io::Write>(writer: W, matches: &[Match]) -> Result<(), ImportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for m in matches {
        wtr.serialize(MatchRecord::from_match(m))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::setup::initialize_bracket;

    #[test]
    fn legacy_round_codes_are_accepted() {
        let t = Uuid::new_v4();
        let csv = format!(
            "id,tournament_id,round,match_index,player1_id,player2_id,winner_id,loser_id,score1,score2,status\n\
             {},{t},101,2,,,,,,,pending\n\
             {},{t},semifinal,1,,,,,,,pending\n",
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let rows = read_matches(csv.as_bytes(), Some(t)).unwrap();
        assert_eq!(rows[0].round_id, RoundId::LosersARound1);
        assert_eq!(rows[0].match_index, 2);
        assert_eq!(rows[1].round_id, RoundId::Semifinal);
        assert_eq!(rows[1].player1_id, None);
    }

    #[test]
    fn unknown_round_reports_line() {
        let t = Uuid::new_v4();
        let csv = format!(
            "id,tournament_id,round,match_index,player1_id,player2_id,winner_id,loser_id,score1,score2,status\n\
             {},{t},4,1,,,,,,,pending\n",
            Uuid::new_v4()
        );
        match read_matches(csv.as_bytes(), None) {
            Err(ImportError::UnknownRound { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "4");
            }
            other => panic!("expected unknown round, got {other:?}"),
        }
    }

    #[test]
    fn export_then_import_keeps_bracket() {
        let t = Uuid::new_v4();
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let matches = initialize_bracket(t, &seeds).unwrap();
        let mut buf = Vec::new();
        write_matches(&mut buf, &matches).unwrap();
        let back = read_matches(buf.as_slice(), Some(t)).unwrap();
        assert_eq!(back, matches);
    }

    #[test]
    fn rows_from_another_tournament_are_rejected() {
        let seeds: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        let matches = initialize_bracket(Uuid::new_v4(), &seeds).unwrap();
        let mut buf = Vec::new();
        write_matches(&mut buf, &matches).unwrap();
        assert!(matches!(
            read_matches(buf.as_slice(), Some(Uuid::new_v4())),
            Err(ImportError::WrongTournament { .. })
        ));
    }
}
