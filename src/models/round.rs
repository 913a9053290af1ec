//! RoundId and Segment: the closed enumeration of rounds in the 16-player bracket.

use serde::{Deserialize, Serialize};

/// One of the five bracket segments.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Winners,
    LosersA,
    LosersB,
    Semifinal,
    Final,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Winners,
        Segment::LosersA,
        Segment::LosersB,
        Segment::Semifinal,
        Segment::Final,
    ];

    /// Human-readable name (for diagnostics and the progress view).
    pub fn label(self) -> &'static str {
        match self {
            Segment::Winners => "Winners Bracket",
            Segment::LosersA => "Losers Branch A",
            Segment::LosersB => "Losers Branch B",
            Segment::Semifinal => "Semifinals",
            Segment::Final => "Final",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Round a match belongs to. Ordered in play order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundId {
    #[serde(rename = "winners_round1")]
    WinnersRound1,
    #[serde(rename = "winners_round2")]
    WinnersRound2,
    #[serde(rename = "winners_round3")]
    WinnersRound3,
    #[serde(rename = "losers_a_round1")]
    LosersARound1,
    #[serde(rename = "losers_a_round2")]
    LosersARound2,
    #[serde(rename = "losers_a_round3")]
    LosersARound3,
    #[serde(rename = "losers_b_round1")]
    LosersBRound1,
    #[serde(rename = "losers_b_round2")]
    LosersBRound2,
    Semifinal,
    Final,
}

impl RoundId {
    pub const ALL: [RoundId; 10] = [
        RoundId::WinnersRound1,
        RoundId::WinnersRound2,
        RoundId::WinnersRound3,
        RoundId::LosersARound1,
        RoundId::LosersARound2,
        RoundId::LosersARound3,
        RoundId::LosersBRound1,
        RoundId::LosersBRound2,
        RoundId::Semifinal,
        RoundId::Final,
    ];

    /// Numeric code used by older exports (1-3, 101-103, 201-202, 250, 300).
    /// Only meant for import/export boundaries.
    pub fn legacy_code(self) -> u16 {
        match self {
            RoundId::WinnersRound1 => 1,
            RoundId::WinnersRound2 => 2,
            RoundId::WinnersRound3 => 3,
            RoundId::LosersARound1 => 101,
            RoundId::LosersARound2 => 102,
            RoundId::LosersARound3 => 103,
            RoundId::LosersBRound1 => 201,
            RoundId::LosersBRound2 => 202,
            RoundId::Semifinal => 250,
            RoundId::Final => 300,
        }
    }

    pub fn from_legacy_code(code: u16) -> Option<Self> {
        RoundId::ALL.into_iter().find(|r| r.legacy_code() == code)
    }

    /// Parse either the snake_case tag (`losers_a_round2`) or a legacy numeric code (`102`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u16>() {
            return Self::from_legacy_code(code);
        }
        RoundId::ALL.into_iter().find(|r| r.tag() == s)
    }

    /// The snake_case tag, identical to the serde representation.
    pub fn tag(self) -> &'static str {
        match self {
            RoundId::WinnersRound1 => "winners_round1",
            RoundId::WinnersRound2 => "winners_round2",
            RoundId::WinnersRound3 => "winners_round3",
            RoundId::LosersARound1 => "losers_a_round1",
            RoundId::LosersARound2 => "losers_a_round2",
            RoundId::LosersARound3 => "losers_a_round3",
            RoundId::LosersBRound1 => "losers_b_round1",
            RoundId::LosersBRound2 => "losers_b_round2",
            RoundId::Semifinal => "semifinal",
            RoundId::Final => "final",
        }
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
