//! Partition a flat match list into bracket segments.

use crate::logic::structure::segment_of;
use crate::models::{Match, Segment};
use serde::Serialize;

/// Matches grouped by segment, each group ordered by round then match index.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OrganizedMatches {
    pub winners: Vec<Match>,
    pub losers_a: Vec<Match>,
    pub losers_b: Vec<Match>,
    pub semifinals: Vec<Match>,
    #[serde(rename = "final")]
    pub final_match: Vec<Match>,
}

impl OrganizedMatches {
    pub fn segment(&self, segment: Segment) -> &[Match] {
        match segment {
            Segment::Winners => &self.winners,
            Segment::LosersA => &self.losers_a,
            Segment::LosersB => &self.losers_b,
            Segment::Semifinal => &self.semifinals,
            Segment::Final => &self.final_match,
        }
    }

    fn segment_mut(&mut self, segment: Segment) -> &mut Vec<Match> {
        match segment {
            Segment::Winners => &mut self.winners,
            Segment::LosersA => &mut self.losers_a,
            Segment::LosersB => &mut self.losers_b,
            Segment::Semifinal => &mut self.semifinals,
            Segment::Final => &mut self.final_match,
        }
    }

    pub fn len(&self) -> usize {
        Segment::ALL.into_iter().map(|s| self.segment(s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn organize(matches: &[Match]) -> OrganizedMatches {
    let mut out = OrganizedMatches::default();
    for m in matches {
        out.segment_mut(segment_of(m.round_id)).push(m.clone());
    }
    for segment in Segment::ALL {
        out.segment_mut(segment)
            .sort_by_key(|m| (m.round_id, m.match_index));
    }
    out
}
