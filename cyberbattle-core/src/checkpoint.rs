//! Naming and loading of learner checkpoints.
use crate::{
    base::{Env, Learner},
    error::CyberBattleError,
};
use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Inserts `tag` before the `.tar` extension of `filename`, or appends it.
///
/// `tagged_filename("model.tar", "_best")` returns `model_best.tar`.
pub fn tagged_filename(filename: &str, tag: &str) -> String {
    match filename.strip_suffix(".tar") {
        Some(stem) => format!("{}{}.tar", stem, tag),
        None => format!("{}{}", filename, tag),
    }
}

/// Saves the learner to `filename` tagged with `tag`.
///
/// Failures are logged and do not stop the run.
pub fn save_tagged<E: Env, L: Learner<E>>(learner: &L, filename: &str, tag: &str) {
    let path = tagged_filename(filename, tag);
    match learner.save(Path::new(&path)) {
        Ok(()) => info!("Saved the learner in {:?}.", path),
        Err(e) => warn!("Failed to save the learner in {:?}: {}", path, e),
    }
}

/// Checkpoint to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSpec {
    /// The best checkpoint of the training directory.
    Best,

    /// The checkpoint saved after the given number of steps.
    Steps(usize),
}

impl CheckpointSpec {
    /// Parses a checkpoint name. `none` (any case), an empty or a missing name gives `None`.
    pub fn parse(name: Option<&str>) -> Result<Option<Self>, CyberBattleError> {
        let name = match name {
            None => return Ok(None),
            Some(name) => name.trim().to_lowercase(),
        };
        match name.as_str() {
            "" | "none" => Ok(None),
            "best" => Ok(Some(CheckpointSpec::Best)),
            s if s.chars().all(|c| c.is_ascii_digit()) => s
                .parse()
                .map(|n| Some(CheckpointSpec::Steps(n)))
                .map_err(|_| CyberBattleError::InvalidCheckpoint(name.clone())),
            _ => Err(CyberBattleError::InvalidCheckpoint(name.clone())),
        }
    }

    /// Name used in output file names.
    pub fn name(&self) -> String {
        match self {
            CheckpointSpec::Best => "best".to_string(),
            CheckpointSpec::Steps(n) => n.to_string(),
        }
    }

    /// Path of the checkpoint file for a run trained on `training_episode_count` episodes.
    ///
    /// [`CheckpointSpec::Best`] refers to the `training` directory.
    pub fn path(&self, checkpoint_dir: &Path, training_episode_count: usize) -> PathBuf {
        let dir = checkpoint_dir.join("training");
        match self {
            CheckpointSpec::Best => dir,
            CheckpointSpec::Steps(n) => dir.join(format!(
                "exploit_train__trainepisodes{}_best_modelevaluation_stepsdone_{}.tar",
                training_episode_count, n
            )),
        }
    }

    /// Loads the checkpoint into the learner.
    pub fn load_into<E: Env, L: Learner<E>>(
        &self,
        learner: &mut L,
        checkpoint_dir: &Path,
        training_episode_count: usize,
    ) -> Result<()> {
        let path = self.path(checkpoint_dir, training_episode_count);
        info!("Load checkpoint {} from {:?}", self.name(), path);
        match self {
            CheckpointSpec::Best => learner.load_best(&path),
            CheckpointSpec::Steps(_) => learner.load(&path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_filename() {
        assert_eq!(tagged_filename("logs/model.tar", "_steps120"), "logs/model_steps120.tar");
        assert_eq!(tagged_filename("model", "_best"), "model_best");
    }

    #[test]
    fn test_parse() {
        assert_eq!(CheckpointSpec::parse(None), Ok(None));
        assert_eq!(CheckpointSpec::parse(Some("None")), Ok(None));
        assert_eq!(CheckpointSpec::parse(Some("")), Ok(None));
        assert_eq!(CheckpointSpec::parse(Some("BEST")), Ok(Some(CheckpointSpec::Best)));
        assert_eq!(
            CheckpointSpec::parse(Some("2500")),
            Ok(Some(CheckpointSpec::Steps(2500)))
        );
        assert_eq!(
            CheckpointSpec::parse(Some("latest")),
            Err(CyberBattleError::InvalidCheckpoint("latest".to_string()))
        );
    }

    #[test]
    fn test_path() {
        let dir = Path::new("logs/exper/run/CyberBattleTinyMicro-v0/20230124_085534");
        assert_eq!(CheckpointSpec::Best.path(dir, 3000), dir.join("training"));
        assert_eq!(
            CheckpointSpec::Steps(42).path(dir, 3000),
            dir.join("training")
                .join("exploit_train__trainepisodes3000_best_modelevaluation_stepsdone_42.tar")
        );
    }
}
