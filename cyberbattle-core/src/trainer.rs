//! Train a [`Learner`] with epsilon-greedy search.
mod config;
mod epsilon;
use crate::{
    base::{Env, Learner, Obs},
    bounds::EnvironmentBounds,
    checkpoint::save_tagged,
    detection::DetectionPointsResults,
    episode::{run_episode, EpisodeSpec, Selection},
    evaluator::{DefaultEvaluator, DefaultEvaluatorConfig, Evaluator, TrainingProgress},
    hparams::HParams,
    record::Recorder,
    result::TrainedLearner,
    summary::{write_to_summary, EpisodeSummary, SummaryTag},
    wrapper::AgentWrapper,
};
use anyhow::Result;
pub use config::TrainerConfig;
pub use epsilon::EpsilonSchedule;
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::Path};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the epsilon-greedy training loop.
///
/// # Training loop
///
/// 0. Given a learner implementing [`Learner`], an environment implementing [`Env`],
///    a recorder implementing [`Recorder`] and an evaluator implementing [`Evaluator`].
/// 1. Seed the action selection with `seed`, write the hyper-parameters to
///    `(log_dir)/training/hparams.yaml`.
/// 2. While `steps_done < episode_count * iteration_count`:
///     1. Reset the environment, update the exploration rate `ϵ` if it decays exponentially.
///     2. For each step of the episode, explore with probability `ϵ`, exploit otherwise.
///        An exploit without action is deflected to explore. The episode ends when the
///        environment is done, after `iteration_count` steps, or when there is nothing
///        left to explore.
///     3. Every `eval_freq` episodes, evaluate the learner.
///     4. If the running mean of the episode rewards improves, save the learner as
///        `<name>_steps{steps_done}.tar` and `<name>_best.tar`.
///     5. Write the training summary, decay `ϵ` multiplicatively.
///     6. Every `5 * eval_freq` episodes, save the detection points.
/// 3. Save the detection points and return the [`TrainedLearner`].
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Learner]-->|Env::Act|B[AgentWrapper]
///     B -->|Env::Act|C[Env]
///     C -->|"Step&lt;E: Env&gt;"|B
///     B -->|"Step&lt;E: Env&gt;"|A
///     B -->|Record|D[Recorder]
/// ```
///
/// * [`AgentWrapper`] keeps track of the explored nodes and the outcome of the actions
///   on each node. Learners read it when choosing actions.
/// * [`Learner::on_step`] receives every training step. Evaluation steps are not reported.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn write_hparams<E: Env, L: Learner<E>>(
        &self,
        gymid: &str,
        learner: &L,
        dir: &Path,
    ) -> Result<()> {
        let config = &self.config;
        let date = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut hparams = HParams::new();
        hparams.insert("gymid", gymid);
        hparams.insert("date", date);
        hparams.insert("agent", learner.name());
        hparams.insert("episode_count", config.episode_count);
        hparams.insert("iteration_count", config.iteration_count);
        hparams.insert("epsilon_minimum", config.epsilon_minimum);
        hparams.insert("mean_reward_window", config.mean_reward_window);
        hparams.insert("eval_freq", config.eval_freq);
        hparams.insert("eval_episode_count", config.eval_episode_count);
        hparams.insert("epsilon_exponential_decay", config.epsilon_exponential_decay);
        hparams.insert("train_while_exploit", config.train_while_exploit);
        hparams.extend_from_parameters(&learner.parameters_as_string());

        let training_dir = dir.join("training");
        fs::create_dir_all(&training_dir)?;
        hparams.save(training_dir.join("hparams.yaml"))
    }

    /// Train the learner.
    pub fn train<E, L, D>(
        &mut self,
        env: &mut E,
        bounds: &EnvironmentBounds,
        learner: &mut L,
        recorder: &mut dyn Recorder,
        evaluator: &mut D,
    ) -> Result<TrainedLearner>
    where
        E: Env,
        L: Learner<E>,
        D: Evaluator<E>,
    {
        let config = self.config.clone();
        let parameters = learner.parameters_as_string();
        let mut header = format!(
            "###### {}\nLearning with: episode_count={},iteration_count={},ϵ={},ϵ_min={}, ",
            config.title,
            config.episode_count,
            config.iteration_count,
            config.epsilon,
            config.epsilon_minimum
        );
        if let Some(v) = config.epsilon_multdecay {
            header.push_str(&format!("ϵ_multdecay={},", v));
        }
        if let Some(v) = config.epsilon_exponential_decay {
            header.push_str(&format!("ϵ_expdecay={},", v));
        }
        info!("{}{}", header, parameters);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let gymid = env.name().to_string();
        if let Some(dir) = &config.log_dir {
            self.write_hparams::<E, L>(&gymid, learner, dir)?;
        }

        let mut result = TrainedLearner::new(&gymid, config.plot_title(&parameters), f32::MIN);
        let mut best_eval_running_mean = f32::MIN;
        let mut detection_points = DetectionPointsResults::new();
        let mut epsilon = EpsilonSchedule::new(&config);
        let mut wrapped = AgentWrapper::new(env, bounds);
        let mut steps_done = 0;
        let mut i_episode = 0;
        let max_steps = config.max_steps();

        info!("episode_counts {}", config.episode_count);

        while steps_done < max_steps {
            i_episode += 1;
            let eps = epsilon.start_episode(steps_done);
            info!(
                "  ## Episode: {}/{} '{}' ϵ={:.4}, {}",
                i_episode, config.episode_count, config.title, eps, parameters
            );

            let render_dir = if i_episode == config.episode_count {
                config.render_last_episode_rewards_to.as_deref()
            } else {
                None
            };
            let spec = EpisodeSpec {
                i_episode,
                iteration_count: config.iteration_count,
                verbosity: config.verbosity,
                render_dir,
                call_on_step: true,
            };
            let outcome = run_episode(
                &mut wrapped,
                learner,
                &mut Selection::EpsilonGreedy {
                    epsilon: eps,
                    rng: &mut rng,
                },
                &spec,
                &mut steps_done,
            )?;
            let length = outcome.length();
            let detection = outcome.last_obs.detection_points();

            info!(
                "Episode {:4}|Iteration {}|steps_done {}|reward {}|last_reward_at {:?}|done_at {:?}|epsilon {:.3}|best_eval_mean {}",
                i_episode,
                outcome.steps,
                steps_done,
                outcome.total_reward,
                outcome.last_reward_at,
                outcome.ended_at,
                eps,
                best_eval_running_mean
            );

            if config.log_dir.is_some() {
                detection_points.push_episode(&detection, length);
            }

            if config.eval_freq > 0
                && i_episode % config.eval_freq == 0
                && config.eval_episode_count > 0
            {
                info!("Evaluate network on episode {} step {}", i_episode, steps_done);
                let progress = TrainingProgress {
                    epsilon: eps,
                    best_eval_running_mean,
                    training_steps_done: steps_done,
                    training_episode_done: i_episode,
                };
                let eval_result =
                    evaluator.evaluate(wrapped.env_mut(), bounds, learner, recorder, &progress)?;
                best_eval_running_mean = eval_result.best_running_mean;
            }

            result.push_episode(outcome.rewards.clone(), outcome.availability.clone(), length);
            let mean = result.mean_over_window(config.mean_reward_window);
            if result.best_running_mean < mean {
                info!("New best running mean: {}", mean);
                result.best_running_mean = mean;
                if let Some(filename) = &config.save_model_filename {
                    save_tagged::<E, _>(learner, filename, &format!("_steps{}", steps_done));
                    save_tagged::<E, _>(learner, filename, "_best");
                }
            }

            if !config.only_eval_summary {
                write_to_summary(
                    recorder,
                    &EpisodeSummary {
                        tag: SummaryTag::Training,
                        rewards: &outcome.rewards,
                        epsilon: eps,
                        loss_string: &outcome.loss_string,
                        detection_points: &detection,
                        run_mean: result.best_running_mean,
                        steps_done,
                    },
                );
            }

            learner.end_of_episode(i_episode, length);
            epsilon.end_episode();

            if let Some(dir) = &config.log_dir {
                if config.eval_freq > 0 && i_episode % config.detection_points_freq() == 0 {
                    detection_points.save(
                        dir.join("training")
                            .join(format!("detection_points_results_e{}.json", i_episode)),
                    )?;
                }
            }

            if outcome.steps == 0 {
                warn!("Episode {} took no step, training stopped", i_episode);
                break;
            }
        }

        if let Some(dir) = &config.log_dir {
            let dir = dir.join("training");
            fs::create_dir_all(&dir)?;
            let snapshot = format!("detection_points_results_e{}.json", i_episode);
            detection_points.save(dir.join(snapshot))?;
            detection_points.save(dir.join("detection_points_results.json"))?;
        }

        recorder.flush();
        info!("simulation ended");
        Ok(result)
    }
}

/// Trains the learner with a [`DefaultEvaluator`] built from `config`.
pub fn epsilon_greedy_search<E, L>(
    env: &mut E,
    bounds: &EnvironmentBounds,
    learner: &mut L,
    config: TrainerConfig,
    recorder: &mut dyn Recorder,
) -> Result<TrainedLearner>
where
    E: Env,
    L: Learner<E>,
{
    let mut evaluator = DefaultEvaluator::new(DefaultEvaluatorConfig::from(&config));
    Trainer::build(config).train(env, bounds, learner, recorder, &mut evaluator)
}
