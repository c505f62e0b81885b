//! Per-episode summaries written to a [`Recorder`].
use crate::record::{Record, RecordValue, Recorder};
use std::{collections::BTreeMap, fmt};

/// Key of the global step in summary records.
pub const STEP_KEY: &str = "steps_done";

/// Which loop a summary comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTag {
    /// Training loop.
    Training,

    /// Evaluation loop.
    Evaluation,
}

impl fmt::Display for SummaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryTag::Training => write!(f, "training"),
            SummaryTag::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// Values summarizing an episode.
#[derive(Debug, Clone)]
pub struct EpisodeSummary<'a> {
    /// Loop the episode ran in.
    pub tag: SummaryTag,

    /// Rewards of every step of the episode.
    pub rewards: &'a [f32],

    /// Exploration rate used during the episode.
    pub epsilon: f64,

    /// Loss reported by the learner, e.g. `loss=0.25`.
    pub loss_string: &'a str,

    /// Trigger steps of each detection point.
    pub detection_points: &'a BTreeMap<String, Vec<usize>>,

    /// Best running mean so far.
    pub run_mean: f32,

    /// Global step.
    pub steps_done: usize,
}

/// Parses the number following the last `=` of a loss string.
pub fn parse_loss(s: &str) -> Option<f32> {
    let value = s.rsplit('=').next()?.trim();
    value.parse::<f32>().ok()
}

/// Builds the record of an episode summary.
///
/// Epsilon and loss are only reported for training episodes. Total reward and
/// run mean use distinct keys in training and evaluation.
pub fn summary_record(summary: &EpisodeSummary<'_>) -> Record {
    let tag = summary.tag;
    let mut record = Record::from_scalar(STEP_KEY, summary.steps_done as f32);
    let total_reward: f32 = summary.rewards.iter().sum();
    let n_positive_actions = summary.rewards.iter().filter(|&&r| r > 0.0).count();

    if tag == SummaryTag::Training {
        record.insert(
            format!("{}/epsilon", tag),
            RecordValue::Scalar(summary.epsilon as f32),
        );
        if let Some(loss) = parse_loss(summary.loss_string) {
            record.insert("loss", RecordValue::Scalar(loss));
        }
    }
    record.insert(
        format!("{}/n_positive_actions", tag),
        RecordValue::Scalar(n_positive_actions as f32),
    );
    match tag {
        SummaryTag::Training => {
            record.insert("total_reward", RecordValue::Scalar(total_reward));
            record.insert("run_mean", RecordValue::Scalar(summary.run_mean));
        }
        SummaryTag::Evaluation => {
            record.insert("evaluation/total_reward", RecordValue::Scalar(total_reward));
            record.insert("eval_run_mean", RecordValue::Scalar(summary.run_mean));
        }
    }
    for (name, triggers) in summary.detection_points.iter() {
        record.insert(
            format!("{}/detection_points_trigger_counter/{}", tag, name),
            RecordValue::Scalar(triggers.len() as f32),
        );
    }
    record
}

/// Writes the summary of an episode and flushes the recorder.
pub fn write_to_summary(recorder: &mut dyn Recorder, summary: &EpisodeSummary<'_>) {
    recorder.write(summary_record(summary));
    recorder.flush();
}
