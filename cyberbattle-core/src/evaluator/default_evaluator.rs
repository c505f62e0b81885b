//! Default implementation of the [`Evaluator`] trait.
use super::{Evaluator, TrainingProgress};
use crate::{
    base::{Env, Learner, Obs, Verbosity},
    bounds::EnvironmentBounds,
    checkpoint::save_tagged,
    detection::DetectionPointsResults,
    episode::{run_episode, EpisodeSpec, Selection},
    record::Recorder,
    result::TrainedLearner,
    summary::{write_to_summary, EpisodeSummary, SummaryTag},
    trainer::TrainerConfig,
    wrapper::AgentWrapper,
};
use anyhow::Result;
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Configuration of [`DefaultEvaluator`].
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEvaluatorConfig {
    /// Title of the training run.
    pub title: String,

    /// Maximum number of steps in an episode.
    pub iteration_count: usize,

    /// Number of evaluation episodes.
    pub eval_episode_count: usize,

    /// Interval of evaluation in training episodes.
    pub eval_freq: usize,

    /// Number of episodes of the running mean of rewards.
    pub mean_reward_window: usize,

    /// Per-step logging.
    pub verbosity: Verbosity,

    /// Checkpoint file name.
    pub save_model_filename: Option<String>,

    /// Directory detection points are saved in.
    pub log_dir: Option<PathBuf>,
}

impl From<&TrainerConfig> for DefaultEvaluatorConfig {
    fn from(config: &TrainerConfig) -> Self {
        Self {
            title: config.title.clone(),
            iteration_count: config.iteration_count,
            eval_episode_count: config.eval_episode_count,
            eval_freq: config.eval_freq,
            mean_reward_window: config.mean_reward_window,
            verbosity: Verbosity::Quiet,
            save_model_filename: config.save_model_filename.clone(),
            log_dir: config.log_dir.clone(),
        }
    }
}

/// Runs exploit-only episodes with the learner in evaluation mode.
///
/// Every episode, the running mean over the last `mean_reward_window` episodes
/// is compared with the best one of the training run. On improvement the learner
/// is saved as `<name>_eval_steps{n}.tar` and `<name>_eval_best.tar`.
pub struct DefaultEvaluator {
    config: DefaultEvaluatorConfig,
}

impl DefaultEvaluator {
    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(config: DefaultEvaluatorConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub fn config(&self) -> &DefaultEvaluatorConfig {
        &self.config
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator {
    fn evaluate<L: Learner<E>>(
        &mut self,
        env: &mut E,
        bounds: &EnvironmentBounds,
        learner: &mut L,
        recorder: &mut dyn Recorder,
        progress: &TrainingProgress,
    ) -> Result<TrainedLearner> {
        let config = &self.config;
        info!(
            "###### {}\nEvaluating with: eval_episode_count={},training_episode_done={} iteration_count={},ϵ={},{}",
            config.title,
            config.eval_episode_count,
            progress.training_episode_done,
            config.iteration_count,
            progress.epsilon,
            learner.parameters_as_string()
        );

        let title = format!(
            "{} (epochs={}, ϵ={}{}",
            config.title,
            config.eval_episode_count,
            progress.epsilon,
            learner.parameters_as_string()
        );
        let result = TrainedLearner::new(env.name(), title, progress.best_eval_running_mean);

        // Detection points are only kept every 5 * eval_freq training episodes
        let detection_dir = match &config.log_dir {
            Some(dir)
                if config.eval_freq > 0
                    && progress.training_episode_done % config.eval_freq.saturating_mul(5) == 0 =>
            {
                let dir = dir.join("training");
                fs::create_dir_all(&dir)?;
                Some(dir)
            }
            _ => None,
        };

        learner.eval();
        let result = self.run_episodes(
            env,
            bounds,
            learner,
            recorder,
            progress,
            result,
            detection_dir.as_deref(),
        );
        learner.train();
        info!("evaluation ended");
        result
    }
}

impl DefaultEvaluator {
    #[allow(clippy::too_many_arguments)]
    fn run_episodes<E: Env, L: Learner<E>>(
        &self,
        env: &mut E,
        bounds: &EnvironmentBounds,
        learner: &mut L,
        recorder: &mut dyn Recorder,
        progress: &TrainingProgress,
        mut result: TrainedLearner,
        detection_dir: Option<&Path>,
    ) -> Result<TrainedLearner> {
        let config = &self.config;
        let mut detection_points = DetectionPointsResults::new();
        let mut wrapped = AgentWrapper::new(env, bounds);
        let mut steps_done = 0;

        for i_episode in 1..=config.eval_episode_count {
            info!(
                "  ## Episode: {}/{} '{}' ϵ={:.4}, {}",
                i_episode,
                config.eval_episode_count,
                config.title,
                progress.epsilon,
                learner.parameters_as_string()
            );

            let spec = EpisodeSpec {
                i_episode,
                iteration_count: config.iteration_count,
                verbosity: config.verbosity,
                render_dir: None,
                call_on_step: false,
            };
            let outcome = run_episode(
                &mut wrapped,
                learner,
                &mut Selection::Exploit,
                &spec,
                &mut steps_done,
            )?;
            let length = outcome.length();
            let detection = outcome.last_obs.detection_points();

            if detection_dir.is_some() {
                detection_points.push_episode(&detection, length);
            }

            result.push_episode(outcome.rewards.clone(), outcome.availability.clone(), length);
            let mean = result.mean_over_window(config.mean_reward_window);
            if result.best_running_mean < mean {
                info!("New best running mean (eval): {}", mean);
                result.best_running_mean = mean;
                if let Some(filename) = &config.save_model_filename {
                    let n = progress.training_steps_done + steps_done;
                    save_tagged::<E, _>(learner, filename, &format!("_eval_steps{}", n));
                    save_tagged::<E, _>(learner, filename, "_eval_best");
                }
            }

            if let Some(dir) = &detection_dir {
                detection_points.save(dir.join(format!(
                    "detection_points_results_eval_trainsteps{}.json",
                    progress.training_steps_done
                )))?;
            }

            write_to_summary(
                recorder,
                &EpisodeSummary {
                    tag: SummaryTag::Evaluation,
                    rewards: &outcome.rewards,
                    epsilon: progress.epsilon,
                    loss_string: &outcome.loss_string,
                    detection_points: &detection,
                    run_mean: result.best_running_mean,
                    steps_done: progress.training_steps_done + steps_done,
                },
            );
            learner.end_of_episode(i_episode, length);
        }

        Ok(result)
    }
}
