//! Evaluation of a trained learner on another environment.
use crate::{
    base::{Env, Learner, Verbosity},
    bounds::EnvironmentBounds,
    record::Recorder,
    result::TrainedLearner,
    trainer::{epsilon_greedy_search, TrainerConfig},
};
use anyhow::Result;
use log::info;

/// Settings of [`transfer_learning_evaluation`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    /// Exploration rate of the trained learner.
    pub eval_epsilon: f64,

    /// Number of episodes of each learner.
    pub eval_episode_count: usize,

    /// Maximum number of steps in an episode.
    pub iteration_count: usize,

    /// Title of the benchmark run.
    pub benchmark_title: String,

    /// Exploration rate of the benchmark learner.
    pub benchmark_epsilon: f64,

    /// Seed of the action selection.
    pub seed: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            eval_epsilon: 0.0,
            eval_episode_count: 0,
            iteration_count: 0,
            benchmark_title: "Benchmark".to_string(),
            benchmark_epsilon: 1.0,
            seed: 0,
        }
    }
}

/// Results of the trained and the benchmark learner.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferLearningResults {
    /// Results of the trained learner.
    pub trained: TrainedLearner,

    /// Results of the benchmark learner.
    pub benchmark: TrainedLearner,

    /// Title comparing both runs.
    pub title: String,
}

/// Runs a trained learner and a benchmark learner, e.g. a
/// [`RandomPolicy`](crate::RandomPolicy), on `eval_env`.
///
/// `trained_learner` is the result of the training of `learner`.
/// Both runs are quiet and do not evaluate.
#[allow(clippy::too_many_arguments)]
pub fn transfer_learning_evaluation<E, L, B>(
    bounds: &EnvironmentBounds,
    trained_learner: &TrainedLearner,
    learner: &mut L,
    eval_env: &mut E,
    benchmark: &mut B,
    config: &TransferConfig,
    recorder: &mut dyn Recorder,
) -> Result<TransferLearningResults>
where
    E: Env,
    L: Learner<E>,
    B: Learner<E>,
{
    let env_name = eval_env.name().to_string();
    let base = TrainerConfig::default()
        .episode_count(config.eval_episode_count)
        .iteration_count(config.iteration_count)
        .eval_freq(0)
        .seed(config.seed)
        .verbosity(Verbosity::Quiet);

    let trained_config = base
        .clone()
        .title(format!(
            "One shot on {} - Trained on {}",
            env_name, trained_learner.trained_on
        ))
        .epsilon(config.eval_epsilon);
    let trained = epsilon_greedy_search(eval_env, bounds, learner, trained_config, recorder)?;

    let benchmark_config = base
        .title(config.benchmark_title.clone())
        .epsilon(config.benchmark_epsilon);
    let benchmark = epsilon_greedy_search(eval_env, bounds, benchmark, benchmark_config, recorder)?;

    let title = format!(
        "Transfer learning {}->{} -- max_nodes={}, episodes={},\n{}",
        trained_learner.trained_on,
        env_name,
        bounds.maximum_node_count,
        config.eval_episode_count,
        learner.all_parameters_as_string()
    );
    info!(
        "{}: trained {} vs benchmark {}",
        title.replace('\n', " "),
        trained.best_running_mean,
        benchmark.best_running_mean
    );

    Ok(TransferLearningResults {
        trained,
        benchmark,
        title,
    })
}
