//! Static description of the bracket: segments, rounds, and match counts.
//!
//! Winners 8+4+2, Losers-A 4+2+1, Losers-B 2+1, Semifinal 2, Final 1 = 27 matches.

use crate::models::{RoundId, Segment};

/// Total number of match rows in one tournament.
pub const TOTAL_MATCHES: usize = 27;

/// Number of seeded players entering WinnersRound1.
pub const PLAYER_COUNT: usize = 16;

pub fn segment_of(round: RoundId) -> Segment {
    use RoundId::*;
    match round {
        WinnersRound1 | WinnersRound2 | WinnersRound3 => Segment::Winners,
        LosersARound1 | LosersARound2 | LosersARound3 => Segment::LosersA,
        LosersBRound1 | LosersBRound2 => Segment::LosersB,
        Semifinal => Segment::Semifinal,
        Final => Segment::Final,
    }
}

pub fn expected_match_count(round: RoundId) -> usize {
    use RoundId::*;
    match round {
        WinnersRound1 => 8,
        WinnersRound2 => 4,
        WinnersRound3 => 2,
        LosersARound1 => 4,
        LosersARound2 => 2,
        LosersARound3 => 1,
        LosersBRound1 => 2,
        LosersBRound2 => 1,
        Semifinal => 2,
        Final => 1,
    }
}

pub fn total_matches() -> usize {
    TOTAL_MATCHES
}

/// Rounds of a segment, in play order.
pub fn rounds_of(segment: Segment) -> impl Iterator<Item = RoundId> {
    RoundId::ALL
        .into_iter()
        .filter(move |r| segment_of(*r) == segment)
}

pub fn expected_segment_count(segment: Segment) -> usize {
    rounds_of(segment).map(expected_match_count).sum()
}

/// Rounds whose outputs populate `round`. A round may only receive players
/// once every feeder round is fully completed.
pub fn feeders(round: RoundId) -> &'static [RoundId] {
    use RoundId::*;
    match round {
        WinnersRound1 => &[],
        WinnersRound2 => &[WinnersRound1],
        WinnersRound3 => &[WinnersRound2],
        LosersARound1 => &[WinnersRound1],
        LosersARound2 => &[LosersARound1],
        LosersARound3 => &[LosersARound2],
        LosersBRound1 => &[WinnersRound2],
        LosersBRound2 => &[LosersBRound1],
        Semifinal => &[WinnersRound3, LosersARound3, LosersBRound2],
        Final => &[Semifinal],
    }
}

/// Rounds fed by `round` (inverse of [`feeders`]).
pub fn downstream(round: RoundId) -> impl Iterator<Item = RoundId> {
    RoundId::ALL
        .into_iter()
        .filter(move |r| feeders(*r).contains(&round))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_add_up_to_27() {
        let by_round: usize = RoundId::ALL.into_iter().map(expected_match_count).sum();
        let by_segment: usize = Segment::ALL.into_iter().map(expected_segment_count).sum();
        assert_eq!(by_round, TOTAL_MATCHES);
        assert_eq!(by_segment, TOTAL_MATCHES);
        assert_eq!(expected_segment_count(Segment::Winners), 14);
        assert_eq!(expected_segment_count(Segment::LosersA), 7);
        assert_eq!(expected_segment_count(Segment::LosersB), 3);
        assert_eq!(expected_segment_count(Segment::Semifinal), 2);
        assert_eq!(expected_segment_count(Segment::Final), 1);
    }

    #[test]
    fn feeders_and_downstream_agree() {
        for round in RoundId::ALL {
            for d in downstream(round) {
                assert!(feeders(d).contains(&round));
            }
        }
        let from_r1: Vec<_> = downstream(RoundId::WinnersRound1).collect();
        assert_eq!(from_r1, vec![RoundId::WinnersRound2, RoundId::LosersARound1]);
        assert_eq!(downstream(RoundId::Final).count(), 0);
    }

    #[test]
    fn legacy_codes_round_trip_through_parse() {
        assert_eq!(RoundId::parse("102"), Some(RoundId::LosersARound2));
        assert_eq!(RoundId::parse("losers_b_round1"), Some(RoundId::LosersBRound1));
        assert_eq!(RoundId::parse("250"), Some(RoundId::Semifinal));
        assert_eq!(RoundId::parse("4"), None);
        assert_eq!(RoundId::parse("winners"), None);
    }
}
