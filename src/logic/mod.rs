//! Bracket engine: structure, classification, validation, advancement, gating,
//! submission, and progress.

pub mod advancement;
pub mod classifier;
pub mod progress;
pub mod round_gate;
pub mod setup;
pub mod structure;
pub mod submission;
pub mod validator;

pub use advancement::{
    resolve, resolve_against, semifinal_seat, semifinal_seed_for, AdvancementPlan, Assignment,
    Exit, Role, SemifinalSeed,
};
pub use classifier::{organize, OrganizedMatches};
pub use progress::{progress, standings, Progress, SegmentProgress, Stage};
pub use round_gate::{feeders_complete, is_complete, playable, playable_rounds, Playable};
pub use setup::initialize_bracket;
pub use structure::{expected_match_count, segment_of, total_matches, TOTAL_MATCHES};
pub use submission::{
    AppliedAssignment, ReconcileReport, ScoreSubmissionCoordinator, SubmissionResult,
};
pub use validator::{validate, ValidationReport};
