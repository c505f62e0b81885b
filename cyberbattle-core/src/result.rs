//! Results of a training or evaluation run.
use crate::util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Rewards and availability of every episode of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLearner {
    /// Rewards of each step, per episode.
    pub all_episodes_rewards: Vec<Vec<f32>>,

    /// Network availability after each step, per episode.
    pub all_episodes_availability: Vec<Vec<f32>>,

    /// Length of each episode.
    pub episode_lengths: Vec<usize>,

    /// Name of the environment the learner ran on.
    pub trained_on: String,

    /// Title of the run.
    pub title: String,

    /// Best running mean of the episode rewards.
    pub best_running_mean: f32,
}

impl TrainedLearner {
    /// Constructs an empty result.
    pub fn new(
        trained_on: impl Into<String>,
        title: impl Into<String>,
        best_running_mean: f32,
    ) -> Self {
        Self {
            all_episodes_rewards: vec![],
            all_episodes_availability: vec![],
            episode_lengths: vec![],
            trained_on: trained_on.into(),
            title: title.into(),
            best_running_mean,
        }
    }

    /// Appends an episode.
    pub fn push_episode(&mut self, rewards: Vec<f32>, availability: Vec<f32>, length: usize) {
        self.all_episodes_rewards.push(rewards);
        self.all_episodes_availability.push(availability);
        self.episode_lengths.push(length);
    }

    /// Number of episodes.
    pub fn episode_count(&self) -> usize {
        self.episode_lengths.len()
    }

    /// Sum of rewards of each episode.
    pub fn episode_sums(&self) -> Vec<f32> {
        self.all_episodes_rewards
            .iter()
            .map(|r| r.iter().sum())
            .collect()
    }

    /// Mean of the episode sums over the last `window` episodes.
    pub fn mean_over_window(&self, window: usize) -> f32 {
        util::mean_over_window(&self.episode_sums(), window)
    }

    /// Cumulative rewards of each episode.
    pub fn cumulative_rewards(&self) -> Vec<Vec<f32>> {
        self.all_episodes_rewards
            .iter()
            .map(|r| {
                r.iter()
                    .scan(0f32, |acc, &x| {
                        *acc += x;
                        Some(*acc)
                    })
                    .collect()
            })
            .collect()
    }

    /// Constructs [`TrainedLearner`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainedLearner`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        let mut r = TrainedLearner::new("env", "title", f32::MIN);
        r.push_episode(vec![1.0, 2.0], vec![1.0, 1.0], 2);
        r.push_episode(vec![-1.0], vec![0.5], 1);
        r.push_episode(vec![4.0, 0.0, 1.0], vec![1.0; 3], 3);
        assert_eq!(r.episode_sums(), vec![3.0, -1.0, 5.0]);
        assert_eq!(r.mean_over_window(2), 2.0);
        assert_eq!(r.cumulative_rewards()[2], vec![4.0, 4.0, 5.0]);
        assert_eq!(r.episode_count(), 3);
    }
}
