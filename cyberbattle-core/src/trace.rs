//! Step-by-step traces of an episode.
mod runner;
use crate::{checkpoint::CheckpointSpec, error::CyberBattleError};
use anyhow::Result;
pub use runner::{run_trace, Exploiter, NextAction, Scripted, TraceRun};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};

/// A row of an [`EpisodeTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Step index, starting at 0.
    #[serde(rename = "Step")]
    pub step: usize,

    /// Reward of the step.
    #[serde(rename = "Reward")]
    pub reward: f32,

    /// Sum of the rewards up to this step.
    #[serde(rename = "Cumulative Reward")]
    pub cumulative_reward: f32,

    /// Human readable description of the action.
    #[serde(rename = "Next action")]
    pub next_action: String,

    /// How the action was chosen.
    #[serde(rename = "Processed by")]
    pub processed_by: String,

    /// Precondition evaluated by the environment.
    #[serde(rename = "Precondition")]
    pub precondition: String,

    /// Profile used by the action.
    #[serde(rename = "Profile")]
    pub profile: String,

    /// Description of the reward.
    #[serde(rename = "Reward string")]
    pub reward_string: String,
}

/// Ordered rows of an episode.
///
/// Step indices are strictly increasing and the cumulative reward of each
/// row is the sum of the rewards up to that row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeTrace {
    rows: Vec<TraceRow>,
}

impl EpisodeTrace {
    /// Constructs an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &mut self,
        step: usize,
        reward: f32,
        next_action: impl Into<String>,
        processed_by: impl Into<String>,
        precondition: impl Into<String>,
        profile: impl Into<String>,
        reward_string: impl Into<String>,
    ) -> Result<&TraceRow, CyberBattleError> {
        if let Some(last) = self.rows.last() {
            if step <= last.step {
                return Err(CyberBattleError::TraceStepOrder {
                    previous: last.step,
                    step,
                });
            }
        }
        let row = TraceRow {
            step,
            reward,
            cumulative_reward: self.total_reward() + reward,
            next_action: next_action.into(),
            processed_by: processed_by.into(),
            precondition: precondition.into(),
            profile: profile.into(),
            reward_string: reward_string.into(),
        };
        self.rows.push(row);
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Rows of the trace.
    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the trace has no row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cumulative reward of the last row.
    pub fn total_reward(&self) -> f32 {
        self.rows.last().map_or(0.0, |r| r.cumulative_reward)
    }

    /// Writes the trace as CSV with a header row.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for row in self.rows.iter() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Reads a trace written with [`EpisodeTrace::write_csv`].
    ///
    /// Rows must have strictly increasing steps and cumulative rewards matching
    /// the running sum of the rewards.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut trace = Self::new();
        for row in rdr.deserialize() {
            let row: TraceRow = row?;
            let cumulative_reward = trace
                .push(
                    row.step,
                    row.reward,
                    row.next_action,
                    row.processed_by,
                    row.precondition,
                    row.profile,
                    row.reward_string,
                )?
                .cumulative_reward;
            let tolerance = 1e-4 * cumulative_reward.abs().max(1.0);
            if (cumulative_reward - row.cumulative_reward).abs() > tolerance {
                return Err(CyberBattleError::TraceCumulativeReward {
                    step: row.step,
                    expected: cumulative_reward,
                    found: row.cumulative_reward,
                }
                .into());
            }
        }
        Ok(trace)
    }
}

/// Names of the files written by a trace run.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceNaming {
    /// Prefix of the run, e.g. `exploit_train` or `exploit_manual`.
    pub exploit_train: String,

    /// Whether the learner kept training while exploiting.
    pub train_while_exploit: bool,

    /// Checkpoint the learner was loaded from.
    pub checkpoint: Option<CheckpointSpec>,
}

impl TraceNaming {
    fn prefix(&self) -> String {
        let twe = if self.train_while_exploit {
            "train_while_exploit"
        } else {
            ""
        };
        format!("{}_{}", self.exploit_train, twe)
    }

    fn checkpoint_name(&self) -> String {
        self.checkpoint
            .map_or_else(|| "None".to_string(), |c| c.name())
    }

    /// CSV of the trace, `i` being the index of the last step.
    pub fn actions_csv(&self, i: usize) -> String {
        format!(
            "{}_step{}_checkpoint{}_episodes_actions.csv",
            self.prefix(),
            i,
            self.checkpoint_name()
        )
    }

    /// Rendering of the network before step `i`.
    pub fn output_result_png(&self, i: usize) -> String {
        format!(
            "{}_step{}_checkpoint{}_episodes_output_result.png",
            self.prefix(),
            i,
            self.checkpoint_name()
        )
    }

    /// Rendering of the network discovered at the end of the run.
    pub fn discovered_network_png(&self) -> String {
        format!(
            "{}_checkpoint{}_episodes_discovered_network.png",
            self.prefix(),
            self.checkpoint_name()
        )
    }
}
