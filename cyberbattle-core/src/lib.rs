#![warn(missing_docs)]
//! Epsilon-greedy training and evaluation of learners on CyberBattle-style
//! network exploration environments.
//!
//! The environment and the learner are abstracted by the [`Env`] and [`Learner`]
//! traits. This crate implements what sits around them:
//!
//! * [`Trainer`] runs the epsilon-greedy search of a learner.
//! * [`DefaultEvaluator`] runs exploit-only episodes during training.
//! * [`transfer_learning_evaluation`] compares a trained learner with a benchmark
//!   learner on another environment.
//! * [`run_trace`] replays an episode step by step, with actions exploited by a
//!   learner or given by a [`CommandScript`], and records an [`EpisodeTrace`].
//! * [`RunConfig`] reads the configuration of a run from environment variables.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{
    Act, ActionKind, ActionStyle, CommandEnv, Decision, Env, Info, Learner, Obs, Step, Verbosity,
};

mod bounds;
pub use bounds::{EnvironmentBounds, Identifiers};

mod checkpoint;
pub use checkpoint::{save_tagged, tagged_filename, CheckpointSpec};

mod command;
pub use command::{Command, CommandScript};

mod config;
pub use config::{date_string, RunConfig, DATE_FORMAT, ENV_VARS};

mod detection;
pub use detection::{DetectionPointSeries, DetectionPointsResults};

mod episode;

mod evaluator;
pub use evaluator::{DefaultEvaluator, DefaultEvaluatorConfig, Evaluator, TrainingProgress};

mod hparams;
pub use hparams::{parse_parameters, HParamValue, HParams};

mod random_policy;
pub use random_policy::RandomPolicy;

mod result;
pub use result::TrainedLearner;

mod stats;
pub use stats::{Breakdown, Outcomes, Stats};

mod summary;
pub use summary::{
    parse_loss, summary_record, write_to_summary, EpisodeSummary, SummaryTag, STEP_KEY,
};

mod trace;
pub use trace::{
    run_trace, EpisodeTrace, Exploiter, NextAction, Scripted, TraceNaming, TraceRow, TraceRun,
};

mod trainer;
pub use trainer::{epsilon_greedy_search, EpsilonSchedule, Trainer, TrainerConfig};

mod transfer;
pub use transfer::{transfer_learning_evaluation, TransferConfig, TransferLearningResults};

mod wrapper;
pub use wrapper::{ActionTrackingStateAugmentation, AgentWrapper};

pub mod dummy;
