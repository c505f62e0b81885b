//! This module is used for tests.
use crate::{
    base::{
        Act, ActionKind, ActionStyle, CommandEnv, Decision, Env, Info, Learner, Obs, Step,
    },
    command::Command,
    error::CyberBattleError,
    wrapper::AgentWrapper,
};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

/// Configuration of [`DummyEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct DummyEnvConfig {
    /// Name of the environment.
    pub name: String,

    /// Reward of the `k`-th step of an episode is `rewards[(k - 1) % rewards.len()]`, 0 if empty.
    pub rewards: Vec<f32>,

    /// The episode is done after this number of steps.
    pub done_at: Option<usize>,

    /// Number of nodes.
    pub node_count: usize,

    /// Detection points. Each of them is triggered by steps with a negative reward.
    pub detection_points: Vec<String>,

    /// The given step of every episode fails.
    pub fail_at: Option<usize>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            name: "DummyEnv-v0".to_string(),
            rewards: vec![],
            done_at: None,
            node_count: 4,
            detection_points: vec![],
            fail_at: None,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the name.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the rewards.
    pub fn rewards(mut self, v: Vec<f32>) -> Self {
        self.rewards = v;
        self
    }

    /// Sets the step the episodes are done at.
    pub fn done_at(mut self, v: usize) -> Self {
        self.done_at = Some(v);
        self
    }

    /// Sets the number of nodes.
    pub fn node_count(mut self, v: usize) -> Self {
        self.node_count = v;
        self
    }

    /// Sets the step that fails.
    pub fn fail_at(mut self, v: usize) -> Self {
        self.fail_at = Some(v);
        self
    }

    /// Sets the detection points.
    pub fn detection_points(mut self, v: &[&str]) -> Self {
        self.detection_points = v.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Dummy observation.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyObs {
    /// Steps taken in the episode.
    pub step: usize,

    /// Nodes discovered so far.
    pub discovered: usize,

    /// Trigger steps of the detection points.
    pub triggers: BTreeMap<String, Vec<usize>>,
}

impl Obs for DummyObs {
    fn discovered_node_count(&self) -> usize {
        self.discovered
    }

    fn detection_points(&self) -> BTreeMap<String, Vec<usize>> {
        self.triggers.clone()
    }
}

/// Dummy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyAct {
    kind: ActionKind,
    node: usize,
}

impl DummyAct {
    /// Constructs an action.
    pub fn new(kind: ActionKind, node: usize) -> Self {
        Self { kind, node }
    }
}

impl fmt::Display for DummyAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:n{}", self.kind, self.node)
    }
}

impl Act for DummyAct {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn node(&self) -> usize {
        self.node
    }
}

/// Dummy step information.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyInfo {
    step: usize,
    reward: f32,
}

impl Info for DummyInfo {
    fn network_availability(&self) -> f32 {
        if self.reward < 0.0 {
            0.5
        } else {
            1.0
        }
    }

    fn precondition_str(&self) -> String {
        format!("step{}", self.step)
    }

    fn reward_string(&self) -> String {
        format!("reward {}", self.reward)
    }
}

/// Deterministic environment replaying a reward script.
pub struct DummyEnv {
    config: DummyEnvConfig,
    rng: StdRng,
    step: usize,
    triggers: BTreeMap<String, Vec<usize>>,
    /// Number of resets.
    pub reset_count: usize,
}

impl DummyEnv {
    fn obs(&self) -> DummyObs {
        DummyObs {
            step: self.step,
            discovered: (self.step + 1).min(self.config.node_count),
            triggers: self.triggers.clone(),
        }
    }

    fn node_index(&self, name: &str) -> Result<usize> {
        name.strip_prefix('n')
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&i| i < self.config.node_count)
            .ok_or_else(|| {
                CyberBattleError::UnsupportedCommand(format!("unknown node {}", name)).into()
            })
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = DummyInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            step: 0,
            triggers: BTreeMap::new(),
            reset_count: 0,
        })
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn reset(&mut self) -> Result<DummyObs> {
        self.step = 0;
        self.reset_count += 1;
        self.triggers = self
            .config
            .detection_points
            .iter()
            .map(|name| (name.clone(), vec![]))
            .collect();
        Ok(self.obs())
    }

    fn step(&mut self, a: &DummyAct) -> Result<Step<Self>> {
        self.step += 1;
        if self.config.fail_at == Some(self.step) {
            anyhow::bail!("step {} failed", self.step);
        }
        let rewards = &self.config.rewards;
        let reward = match rewards.len() {
            0 => 0.0,
            n => rewards[(self.step - 1) % n],
        };
        if reward < 0.0 {
            for triggers in self.triggers.values_mut() {
                triggers.push(self.step);
            }
        }
        let is_terminated = self.config.done_at == Some(self.step);
        let info = DummyInfo {
            step: self.step,
            reward,
        };
        Ok(Step::new(self.obs(), *a, reward, is_terminated, false, info))
    }

    fn sample_valid_action(&mut self) -> DummyAct {
        let kind = ActionKind::ALL[self.rng.gen_range(0..3)];
        let node = self.rng.gen_range(0..self.config.node_count.max(1));
        DummyAct::new(kind, node)
    }

    fn render_to(&self, path: &Path) -> Result<()> {
        fs::write(path, b"")?;
        Ok(())
    }
}

impl CommandEnv for DummyEnv {
    fn command_to_action(&self, command: &Command) -> Result<DummyAct> {
        let node = match command {
            Command::Local { node, .. } => node,
            Command::Remote { source, .. } => source,
            Command::Connect { target, .. } => target,
        };
        Ok(DummyAct::new(command.kind(), self.node_index(node)?))
    }
}

/// Learner exploiting node 0 with local actions.
///
/// Counts the calls of its hooks so that tests can check the training loop.
#[derive(Debug, Clone, Default)]
pub struct DummyLearner {
    /// Every `n`-th exploit returns no action.
    pub exploit_none_every: Option<usize>,

    /// Explore returns no action after this number of calls.
    pub explore_budget: Option<usize>,

    /// Calls of [`Learner::exploit`].
    pub exploit_count: usize,

    /// Calls of [`Learner::explore`].
    pub explore_count: usize,

    /// Calls of [`Learner::on_step`].
    pub on_step_count: usize,

    /// Calls of [`Learner::new_episode`].
    pub new_episode_count: usize,

    /// Arguments of [`Learner::end_of_episode`].
    pub episode_ends: Vec<(usize, usize)>,

    /// Whether the learner is in training mode.
    pub training: bool,

    /// Calls of [`Learner::eval`].
    pub eval_count: usize,

    /// Paths given to [`Learner::load`].
    pub loaded: Vec<PathBuf>,

    /// Directories given to [`Learner::load_best`].
    pub loaded_best: Vec<PathBuf>,
}

impl DummyLearner {
    /// Sets the period of exploits without action.
    pub fn exploit_none_every(mut self, n: usize) -> Self {
        self.exploit_none_every = Some(n);
        self
    }

    /// Sets the number of explore calls with an action.
    pub fn explore_budget(mut self, n: usize) -> Self {
        self.explore_budget = Some(n);
        self
    }
}

impl<E: Env<Act = DummyAct>> Learner<E> for DummyLearner {
    type Metadata = usize;

    fn explore(
        &mut self,
        wrapped_env: &mut AgentWrapper<'_, E>,
    ) -> Result<Decision<DummyAct, usize>> {
        self.explore_count += 1;
        if self.explore_budget.map_or(false, |b| self.explore_count > b) {
            return Ok(Decision::none(ActionStyle::Explore, self.explore_count));
        }
        let act = wrapped_env.sample_valid_action();
        Ok(Decision::new(ActionStyle::Explore, Some(act), self.explore_count))
    }

    fn exploit(
        &mut self,
        _wrapped_env: &mut AgentWrapper<'_, E>,
        _obs: &E::Obs,
    ) -> Result<Decision<DummyAct, usize>> {
        self.exploit_count += 1;
        if self
            .exploit_none_every
            .map_or(false, |n| self.exploit_count % n == 0)
        {
            return Ok(Decision::none(ActionStyle::Exploit, self.exploit_count));
        }
        let act = DummyAct::new(ActionKind::Local, 0);
        Ok(Decision::new(ActionStyle::Exploit, Some(act), self.exploit_count))
    }

    fn on_step(&mut self, _: &AgentWrapper<'_, E>, _: &Step<E>, _: &usize) -> Result<()> {
        self.on_step_count += 1;
        Ok(())
    }

    fn new_episode(&mut self) {
        self.new_episode_count += 1;
    }

    fn end_of_episode(&mut self, i_episode: usize, t: usize) {
        self.episode_ends.push((i_episode, t));
    }

    fn train(&mut self) {
        self.training = true;
    }

    fn eval(&mut self) {
        self.training = false;
        self.eval_count += 1;
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, b"dummy")?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    fn load_best(&mut self, dir: &Path) -> Result<()> {
        self.loaded_best.push(dir.to_path_buf());
        Ok(())
    }

    fn parameters_as_string(&self) -> String {
        "γ=0.015, replaymemory=10000, lr=0.01".to_string()
    }

    fn loss_as_string(&self) -> String {
        "0.5".to_string()
    }
}
