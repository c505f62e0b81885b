//! Run configuration read from environment variables.
use crate::{checkpoint::CheckpointSpec, error::CyberBattleError, trainer::TrainerConfig};
use anyhow::Result;
use chrono::{DateTime, Local};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Environment variables read by [`RunConfig::from_env`].
pub const ENV_VARS: [&str; 12] = [
    "LOG_RESULTS",
    "GYMID",
    "LOG_LEVEL",
    "TRAIN_WHILE_EXPLOIT",
    "EVAL_EPISODE_COUNT",
    "EVAL_FREQ",
    "EPS_EXP_DECAY",
    "MEAN_REWARD_WINDOW",
    "TRAINING_EPISODE_COUNT",
    "CHECKPOINT",
    "CHECKPOINT_DATE",
    "LOG_DIR",
];

/// Format of the date component of log directories.
pub const DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Configuration of a run.
///
/// Read once at process start with [`RunConfig::from_env`] and passed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Write logs, summaries and artifacts to [`RunConfig::log_dir`].
    pub log_results: bool,

    /// Gym id of the environment.
    pub gymid: String,

    /// Log level, one of `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,

    /// Keep training the learner while it exploits.
    pub train_while_exploit: bool,

    /// Number of evaluation episodes.
    pub eval_episode_count: usize,

    /// Interval of evaluation in training episodes.
    pub eval_freq: usize,

    /// Exponential decay of the exploration rate.
    pub eps_exp_decay: Option<usize>,

    /// Number of episodes of the running mean of rewards.
    pub mean_reward_window: usize,

    /// Number of training episodes.
    pub training_episode_count: usize,

    /// Checkpoint to start from.
    pub checkpoint: Option<String>,

    /// Date component of the directory the checkpoint is read from.
    pub checkpoint_date: Option<String>,

    /// Log directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_results: false,
            gymid: "CyberBattleTinyMicro-v0".to_string(),
            log_level: "info".to_string(),
            train_while_exploit: false,
            eval_episode_count: 0,
            eval_freq: 5,
            eps_exp_decay: None,
            mean_reward_window: 10,
            training_episode_count: 3000,
            checkpoint: None,
            checkpoint_date: None,
            log_dir: None,
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "t")
}

fn parse_num<T: FromStr>(name: &str, v: &str) -> Result<T, CyberBattleError> {
    v.trim().parse().map_err(|_| CyberBattleError::InvalidEnvVar {
        name: name.to_string(),
        value: v.to_string(),
    })
}

impl RunConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Reads the configuration with the given lookup function.
    ///
    /// Unset variables take their default values. Malformed numbers are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("LOG_RESULTS") {
            config.log_results = parse_bool(&v);
        }
        if let Some(v) = lookup("GYMID") {
            config.gymid = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("TRAIN_WHILE_EXPLOIT") {
            config.train_while_exploit = parse_bool(&v);
        }
        if let Some(v) = lookup("EVAL_EPISODE_COUNT") {
            config.eval_episode_count = parse_num("EVAL_EPISODE_COUNT", &v)?;
        }
        if let Some(v) = lookup("EVAL_FREQ") {
            config.eval_freq = parse_num("EVAL_FREQ", &v)?;
        }
        if let Some(v) = lookup("EPS_EXP_DECAY") {
            config.eps_exp_decay = match v.trim().to_lowercase().as_str() {
                "" | "none" => None,
                _ => Some(parse_num::<usize>("EPS_EXP_DECAY", &v)?).filter(|&d| d > 0),
            };
        }
        if let Some(v) = lookup("MEAN_REWARD_WINDOW") {
            config.mean_reward_window = parse_num("MEAN_REWARD_WINDOW", &v)?;
        }
        if let Some(v) = lookup("TRAINING_EPISODE_COUNT") {
            config.training_episode_count = parse_num("TRAINING_EPISODE_COUNT", &v)?;
        }
        if let Some(v) = lookup("CHECKPOINT") {
            config.checkpoint = CheckpointSpec::parse(Some(v.as_str()))?.map(|c| c.name());
        }
        config.checkpoint_date = lookup("CHECKPOINT_DATE").filter(|v| !v.is_empty());
        config.log_dir = lookup("LOG_DIR").filter(|v| !v.is_empty()).map(PathBuf::from);

        config.level_filter()?;
        Ok(config)
    }

    /// Parsed checkpoint.
    pub fn checkpoint_spec(&self) -> Result<Option<CheckpointSpec>, CyberBattleError> {
        CheckpointSpec::parse(self.checkpoint.as_deref())
    }

    /// Log level filter.
    pub fn level_filter(&self) -> Result<LevelFilter, CyberBattleError> {
        match self.log_level.trim().to_lowercase().as_str() {
            "error" => Ok(LevelFilter::Error),
            "warn" | "warning" => Ok(LevelFilter::Warn),
            "info" => Ok(LevelFilter::Info),
            "debug" => Ok(LevelFilter::Debug),
            "trace" => Ok(LevelFilter::Trace),
            "off" => Ok(LevelFilter::Off),
            _ => Err(CyberBattleError::InvalidEnvVar {
                name: "LOG_LEVEL".to_string(),
                value: self.log_level.clone(),
            }),
        }
    }

    /// Initializes the logger of the process.
    ///
    /// Records are formatted as `[HH:MM:SS] LEVEL: message`.
    pub fn init_logger(&self) -> Result<()> {
        env_logger::Builder::new()
            .filter_level(self.level_filter()?)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] {}: {}",
                    Local::now().format("%H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .try_init()?;
        Ok(())
    }

    /// Log directory of a run: `LOG_DIR` if set, otherwise `base/notebook/gymid/date`.
    pub fn log_dir_for(&self, base: impl AsRef<Path>, notebook: &str, date: &str) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => base.as_ref().join(notebook).join(&self.gymid).join(date),
        }
    }

    /// Directory checkpoints are read from: `base/notebook/gymid/checkpoint_date`.
    pub fn checkpoint_dir(
        &self,
        base: impl AsRef<Path>,
        notebook: &str,
        default_date: &str,
    ) -> PathBuf {
        let date = self.checkpoint_date.as_deref().unwrap_or(default_date);
        base.as_ref().join(notebook).join(&self.gymid).join(date)
    }

    /// Trainer configuration with the values of this run.
    pub fn trainer_config(
        &self,
        title: impl Into<String>,
        iteration_count: usize,
    ) -> TrainerConfig {
        let mut config = TrainerConfig::default()
            .title(title)
            .episode_count(self.training_episode_count)
            .iteration_count(iteration_count)
            .eval_episode_count(self.eval_episode_count)
            .eval_freq(self.eval_freq)
            .mean_reward_window(self.mean_reward_window)
            .epsilon_exponential_decay(self.eps_exp_decay)
            .train_while_exploit(self.train_while_exploit);
        if self.log_results {
            if let Some(dir) = &self.log_dir {
                config = config.log_dir(dir);
            }
        }
        config
    }

    /// Environment variables as read by [`RunConfig::from_env`].
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
        let mut m = BTreeMap::new();
        m.insert("LOG_RESULTS".to_string(), self.log_results.to_string());
        m.insert("GYMID".to_string(), self.gymid.clone());
        m.insert("LOG_LEVEL".to_string(), self.log_level.clone());
        m.insert("TRAIN_WHILE_EXPLOIT".to_string(), self.train_while_exploit.to_string());
        m.insert("EVAL_EPISODE_COUNT".to_string(), self.eval_episode_count.to_string());
        m.insert("EVAL_FREQ".to_string(), self.eval_freq.to_string());
        m.insert(
            "EPS_EXP_DECAY".to_string(),
            opt(&self.eps_exp_decay.map(|v| v.to_string())),
        );
        m.insert("MEAN_REWARD_WINDOW".to_string(), self.mean_reward_window.to_string());
        m.insert(
            "TRAINING_EPISODE_COUNT".to_string(),
            self.training_episode_count.to_string(),
        );
        m.insert("CHECKPOINT".to_string(), opt(&self.checkpoint));
        m.insert("CHECKPOINT_DATE".to_string(), opt(&self.checkpoint_date));
        m.insert(
            "LOG_DIR".to_string(),
            opt(&self.log_dir.as_ref().map(|p| p.display().to_string())),
        );
        m
    }

    /// Writes `run_config.yaml` and `environ.txt` into `dir`.
    pub fn save_snapshot(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.save(dir.join("run_config.yaml"))?;
        let mut file = File::create(dir.join("environ.txt"))?;
        for (k, v) in self.snapshot() {
            writeln!(file, "{}={}", k, v)?;
        }
        Ok(())
    }

    /// Constructs [`RunConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Formats a date as used in log directories.
pub fn date_string(now: &DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempdir::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = RunConfig::from_lookup(|_| None)?;
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.checkpoint_spec()?, None);
        Ok(())
    }

    #[test]
    fn test_from_lookup() -> Result<()> {
        let config = RunConfig::from_lookup(lookup(&[
            ("LOG_RESULTS", "T"),
            ("GYMID", "CyberBattleTiny-v0"),
            ("LOG_LEVEL", "debug"),
            ("TRAIN_WHILE_EXPLOIT", "0"),
            ("EVAL_EPISODE_COUNT", "4"),
            ("EPS_EXP_DECAY", "2000"),
            ("TRAINING_EPISODE_COUNT", "20"),
            ("CHECKPOINT", "Best"),
            ("CHECKPOINT_DATE", "20230124_085534"),
        ]))?;
        assert!(config.log_results);
        assert!(!config.train_while_exploit);
        assert_eq!(config.gymid, "CyberBattleTiny-v0");
        assert_eq!(config.level_filter()?, LevelFilter::Debug);
        assert_eq!(config.eval_episode_count, 4);
        assert_eq!(config.eps_exp_decay, Some(2000));
        assert_eq!(config.checkpoint_spec()?, Some(CheckpointSpec::Best));
        assert_eq!(
            config.checkpoint_dir("logs/exper", "notebook", "19700101_000000"),
            PathBuf::from("logs/exper/notebook/CyberBattleTiny-v0/20230124_085534")
        );

        let trainer_config = config.trainer_config("DQL", 50);
        assert_eq!(trainer_config.episode_count, 20);
        assert_eq!(trainer_config.epsilon_exponential_decay, Some(2000));
        Ok(())
    }

    #[test]
    fn test_eps_exp_decay_none() -> Result<()> {
        for v in ["", "None", "0"] {
            let config = RunConfig::from_lookup(lookup(&[("EPS_EXP_DECAY", v)]))?;
            assert_eq!(config.eps_exp_decay, None);
        }
        Ok(())
    }

    #[test]
    fn test_empty_checkpoint() -> Result<()> {
        let config = RunConfig::from_lookup(lookup(&[("CHECKPOINT", "")]))?;
        assert_eq!(config.checkpoint, None);
        assert_eq!(config.checkpoint_spec()?, None);
        Ok(())
    }

    #[test]
    fn test_large_episode_count() -> Result<()> {
        let count = usize::MAX.to_string();
        let config = RunConfig::from_lookup(lookup(&[("TRAINING_EPISODE_COUNT", &count)]))?;
        assert_eq!(config.trainer_config("DQL", 50).max_steps(), usize::MAX);
        Ok(())
    }

    #[test]
    fn test_malformed_values() {
        let err = RunConfig::from_lookup(lookup(&[("EVAL_FREQ", "often")])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CyberBattleError>(),
            Some(&CyberBattleError::InvalidEnvVar {
                name: "EVAL_FREQ".to_string(),
                value: "often".to_string()
            })
        );
        assert!(RunConfig::from_lookup(lookup(&[("CHECKPOINT", "latest")])).is_err());
        assert!(RunConfig::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).is_err());
    }

    #[test]
    fn test_log_dir() {
        let config = RunConfig::default();
        assert_eq!(
            config.log_dir_for("logs/exper", "notebook_debug_tinymicro", "20240101_120000"),
            PathBuf::from("logs/exper/notebook_debug_tinymicro/CyberBattleTinyMicro-v0/20240101_120000")
        );
        let config = RunConfig {
            log_dir: Some(PathBuf::from("/tmp/run")),
            ..RunConfig::default()
        };
        assert_eq!(config.log_dir_for("logs", "nb", "d"), PathBuf::from("/tmp/run"));
    }

    #[test]
    fn test_save_snapshot() -> Result<()> {
        let config = RunConfig::from_lookup(lookup(&[("EVAL_EPISODE_COUNT", "2")]))?;
        let dir = TempDir::new("run_config")?;
        config.save_snapshot(dir.path())?;
        assert_eq!(RunConfig::load(dir.path().join("run_config.yaml"))?, config);
        let environ = fs::read_to_string(dir.path().join("environ.txt"))?;
        assert!(environ.contains("EVAL_EPISODE_COUNT=2\n"));
        assert!(environ.contains("CHECKPOINT=None\n"));
        Ok(())
    }

    #[test]
    fn test_date_string() {
        use chrono::TimeZone;
        let date = Local.with_ymd_and_hms(2023, 1, 24, 8, 55, 34).unwrap();
        assert_eq!(date_string(&date), "20230124_085534");
    }
}
