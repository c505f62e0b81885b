//! Configuration of [`Trainer`](super::Trainer).
use crate::base::Verbosity;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Title of the run.
    pub title: String,

    /// Number of episodes. Training stops after `episode_count * iteration_count` steps.
    pub episode_count: usize,

    /// Maximum number of steps in an episode.
    pub iteration_count: usize,

    /// Initial exploration rate. 0 only exploits, 1 only explores.
    pub epsilon: f64,

    /// Lower bound of the exploration rate.
    pub epsilon_minimum: f64,

    /// Exploration rate is multiplied by this value after each episode.
    pub epsilon_multdecay: Option<f64>,

    /// If set, the exploration rate decays exponentially with the number of steps.
    /// The larger the value, the slower the decay.
    pub epsilon_exponential_decay: Option<usize>,

    /// Number of evaluation episodes.
    pub eval_episode_count: usize,

    /// Interval of evaluation in training episodes.
    pub eval_freq: usize,

    /// Number of episodes of the running mean of rewards.
    pub mean_reward_window: usize,

    /// Seed of the action selection.
    pub seed: u64,

    /// Per-step logging.
    pub verbosity: Verbosity,

    /// Directory the positive-reward steps of the last episode are rendered to.
    pub render_last_episode_rewards_to: Option<PathBuf>,

    /// Checkpoint file name, e.g. `logs/model.tar`. No checkpoint is saved if `None`.
    pub save_model_filename: Option<String>,

    /// Skips training summaries.
    pub only_eval_summary: bool,

    /// Directory of hyper-parameters and detection points. Nothing is written if `None`.
    pub log_dir: Option<PathBuf>,

    /// Reported in the hyper-parameters.
    pub train_while_exploit: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            episode_count: 0,
            iteration_count: 0,
            epsilon: 1.0,
            epsilon_minimum: 0.0,
            epsilon_multdecay: None,
            epsilon_exponential_decay: None,
            eval_episode_count: 0,
            eval_freq: 5,
            mean_reward_window: 10,
            seed: 0,
            verbosity: Verbosity::Normal,
            render_last_episode_rewards_to: None,
            save_model_filename: None,
            only_eval_summary: false,
            log_dir: None,
            train_while_exploit: false,
        }
    }
}

impl TrainerConfig {
    /// Sets the title.
    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.title = v.into();
        self
    }

    /// Sets the number of episodes.
    pub fn episode_count(mut self, v: usize) -> Self {
        self.episode_count = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn iteration_count(mut self, v: usize) -> Self {
        self.iteration_count = v;
        self
    }

    /// Sets the initial exploration rate.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the lower bound of the exploration rate.
    pub fn epsilon_minimum(mut self, v: f64) -> Self {
        self.epsilon_minimum = v;
        self
    }

    /// Sets the multiplicative decay of the exploration rate.
    pub fn epsilon_multdecay(mut self, v: f64) -> Self {
        self.epsilon_multdecay = Some(v);
        self
    }

    /// Sets the exponential decay of the exploration rate.
    pub fn epsilon_exponential_decay(mut self, v: Option<usize>) -> Self {
        self.epsilon_exponential_decay = v;
        self
    }

    /// Sets the number of evaluation episodes.
    pub fn eval_episode_count(mut self, v: usize) -> Self {
        self.eval_episode_count = v;
        self
    }

    /// Sets the interval of evaluation in training episodes.
    pub fn eval_freq(mut self, v: usize) -> Self {
        self.eval_freq = v;
        self
    }

    /// Sets the window of the running mean.
    pub fn mean_reward_window(mut self, v: usize) -> Self {
        self.mean_reward_window = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the verbosity.
    pub fn verbosity(mut self, v: Verbosity) -> Self {
        self.verbosity = v;
        self
    }

    /// Sets the directory the last episode is rendered to.
    pub fn render_last_episode_rewards_to(mut self, v: impl Into<PathBuf>) -> Self {
        self.render_last_episode_rewards_to = Some(v.into());
        self
    }

    /// Sets the checkpoint file name.
    pub fn save_model_filename(mut self, v: impl Into<String>) -> Self {
        self.save_model_filename = Some(v.into());
        self
    }

    /// Skips training summaries.
    pub fn only_eval_summary(mut self, v: bool) -> Self {
        self.only_eval_summary = v;
        self
    }

    /// Sets the log directory.
    pub fn log_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(v.into());
        self
    }

    /// Sets the flag reported in the hyper-parameters.
    pub fn train_while_exploit(mut self, v: bool) -> Self {
        self.train_while_exploit = v;
        self
    }

    /// Step budget of the run, saturating at `usize::MAX`.
    pub fn max_steps(&self) -> usize {
        self.episode_count.saturating_mul(self.iteration_count)
    }

    /// Interval of detection point snapshots in training episodes, `5 * eval_freq`.
    pub fn detection_points_freq(&self) -> usize {
        self.eval_freq.saturating_mul(5)
    }

    /// Title decorated with the exploration settings and learner parameters.
    pub fn plot_title(&self, parameters: &str) -> String {
        let mut s = format!(
            "{} (epochs={}, ϵ={}, ϵ_min={},",
            self.title, self.episode_count, self.epsilon, self.epsilon_minimum
        );
        if let Some(v) = self.epsilon_multdecay {
            s.push_str(&format!("ϵ_multdecay={},", v));
        }
        if let Some(v) = self.epsilon_exponential_decay {
            s.push_str(&format!("ϵ_expdecay={},", v));
        }
        s.push_str(parameters);
        s
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .title("DQL")
            .episode_count(20)
            .iteration_count(50)
            .epsilon(0.9)
            .epsilon_minimum(0.1)
            .epsilon_exponential_decay(Some(5000))
            .verbosity(Verbosity::Quiet)
            .save_model_filename("logs/model.tar");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config.max_steps(), 1000);
        Ok(())
    }

    #[test]
    fn test_budgets_saturate() {
        let config = TrainerConfig::default()
            .episode_count(usize::MAX)
            .iteration_count(50)
            .eval_freq(usize::MAX / 2);
        assert_eq!(config.max_steps(), usize::MAX);
        assert_eq!(config.detection_points_freq(), usize::MAX);
        assert_eq!(TrainerConfig::default().eval_freq(3).detection_points_freq(), 15);
    }

    #[test]
    fn test_plot_title() {
        let config = TrainerConfig::default()
            .title("Random")
            .episode_count(3)
            .epsilon_multdecay(0.75);
        assert_eq!(
            config.plot_title("γ=0.5"),
            "Random (epochs=3, ϵ=1, ϵ_min=0,ϵ_multdecay=0.75,γ=0.5"
        );
    }
}
