//! Randomized full tournaments: invariants hold after every submission.

mod common;

use common::setup;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sabo_bracket::logic::{feeders_complete, Exit};
use sabo_bracket::{resolve, validate, MatchStatus, RoundId, Stage};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn random_play_order_keeps_bracket_consistent() {
    for seed in 0..12u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let s = setup();
        let mut completed = 0;

        loop {
            let t = s.tournament();
            let ready: Vec<_> = t
                .matches
                .iter()
                .filter(|m| m.status == MatchStatus::Ready)
                .collect();
            let Some(m) = ready.choose(&mut rng) else { break };

            let a: i64 = rng.gen_range(0..=9);
            let mut b: i64 = rng.gen_range(0..=9);
            if a == b {
                b = a + 1;
            }
            s.engine.submit(m.id, a, b, Uuid::new_v4()).unwrap();
            completed += 1;

            let t = s.tournament();
            let report = validate(&t.matches);
            assert!(report.ok, "seed {seed}: {:?}", report.violations);

            // No round receives players before its feeders are finished.
            for round in RoundId::ALL.into_iter().filter(|r| *r != RoundId::WinnersRound1) {
                let seated = t
                    .round(round)
                    .iter()
                    .any(|m| m.player1_id.is_some() || m.player2_id.is_some());
                if seated {
                    assert!(feeders_complete(&t.matches, round), "seed {seed}: {round} seated early");
                }
            }

            // Nobody is in two unfinished matches at once.
            let mut live = HashSet::new();
            for m in t.matches.iter().filter(|m| !m.is_completed()) {
                for p in [m.player1_id, m.player2_id].into_iter().flatten() {
                    assert!(live.insert(p), "seed {seed}: {p} booked twice");
                }
            }
        }

        assert_eq!(completed, 27, "seed {seed}");
        let t = s.tournament();
        let exits: Vec<Exit> = t
            .matches
            .iter()
            .flat_map(|m| resolve(m).unwrap().exits)
            .collect();
        let champions = exits.iter().filter(|e| matches!(e, Exit::Champion(_))).count();
        let out: HashSet<_> = exits
            .iter()
            .filter_map(|e| match e {
                Exit::Eliminated(p) | Exit::RunnerUp(p) => Some(*p),
                Exit::Champion(_) => None,
            })
            .collect();
        assert_eq!(champions, 1);
        assert_eq!(out.len(), 15, "seed {seed}: every other player leaves exactly once");
        assert_eq!(s.engine.progress(s.tournament_id).unwrap().stage, Stage::Complete);
    }
}
