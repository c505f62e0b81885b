//! Evaluate a [`Learner`].
use crate::{
    base::{Env, Learner},
    bounds::EnvironmentBounds,
    record::Recorder,
    result::TrainedLearner,
};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::{DefaultEvaluator, DefaultEvaluatorConfig};

/// State of the training run an evaluation is called from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingProgress {
    /// Exploration rate of the training run.
    pub epsilon: f64,

    /// Best evaluation running mean so far.
    pub best_eval_running_mean: f32,

    /// Training steps done so far.
    pub training_steps_done: usize,

    /// Training episodes done so far.
    pub training_episode_done: usize,
}

impl Default for TrainingProgress {
    fn default() -> Self {
        Self {
            epsilon: 0.0,
            best_eval_running_mean: f32::MIN,
            training_steps_done: 0,
            training_episode_done: 0,
        }
    }
}

/// Evaluate a [`Learner`].
pub trait Evaluator<E: Env> {
    /// Evaluates the learner on `env`.
    ///
    /// The returned [`TrainedLearner::best_running_mean`] is carried over to
    /// the next evaluation of the training run.
    fn evaluate<L: Learner<E>>(
        &mut self,
        env: &mut E,
        bounds: &EnvironmentBounds,
        learner: &mut L,
        recorder: &mut dyn Recorder,
        progress: &TrainingProgress,
    ) -> Result<TrainedLearner>;
}
