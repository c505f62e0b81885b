//! Core functionalities.
mod env;
mod learner;
mod step;
pub use env::{CommandEnv, Env};
pub use learner::{Decision, Learner};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Display},
};
pub use step::{Info, Step};

/// Observation of an environment.
///
/// Only the parts of the observation read by the training loop are exposed here.
/// Learners are free to rely on the concrete type.
pub trait Obs: Clone + Debug {
    /// Returns the number of nodes discovered so far.
    fn discovered_node_count(&self) -> usize;

    /// Returns the number of credentials gathered so far.
    fn credential_cache_len(&self) -> usize {
        0
    }

    /// Returns the steps at which each detection point was triggered in the current episode.
    fn detection_points(&self) -> BTreeMap<String, Vec<usize>> {
        BTreeMap::new()
    }
}

/// Action of an environment.
///
/// [`Display`] is used as the human readable description of the action
/// in logs and episode traces.
pub trait Act: Clone + Debug + Display {
    /// Returns the kind of the action.
    fn kind(&self) -> ActionKind;

    /// Returns the index of the node the action is applied to.
    fn node(&self) -> usize;
}

/// Kind of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Exploits a local vulnerability on an owned node.
    Local,

    /// Exploits a remote vulnerability of a discovered node.
    Remote,

    /// Connects to a remote node with a credential.
    Connect,
}

impl ActionKind {
    /// All kinds, in the order used by breakdowns and trackers.
    pub const ALL: [ActionKind; 3] = [ActionKind::Local, ActionKind::Remote, ActionKind::Connect];

    /// Position of the kind in [`ActionKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ActionKind::Local => 0,
            ActionKind::Remote => 1,
            ActionKind::Connect => 2,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Local => "local",
            ActionKind::Remote => "remote",
            ActionKind::Connect => "connect",
        };
        write!(f, "{}", s)
    }
}

/// How an action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    /// Sampled by the exploration strategy.
    Explore,

    /// Chosen by the learnt policy.
    Exploit,

    /// Given by a command script.
    Manual,
}

impl ActionStyle {
    /// All styles, in the order used by trackers.
    pub const ALL: [ActionStyle; 3] =
        [ActionStyle::Explore, ActionStyle::Exploit, ActionStyle::Manual];

    /// Position of the style in [`ActionStyle::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ActionStyle::Explore => 0,
            ActionStyle::Exploit => 1,
            ActionStyle::Manual => 2,
        }
    }
}

impl Display for ActionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionStyle::Explore => "explore",
            ActionStyle::Exploit => "exploit",
            ActionStyle::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

/// Verbosity of the per-step logging in training and evaluation loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// Nothing is logged per step.
    Quiet,

    /// Steps with positive reward are logged.
    Normal,

    /// Every step is logged.
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Normal
    }
}

impl Verbosity {
    /// Returns `true` if a step with the given reward is logged.
    pub fn logs_step(&self, reward: f32) -> bool {
        match self {
            Verbosity::Quiet => false,
            Verbosity::Normal => reward > 0.0,
            Verbosity::Verbose => true,
        }
    }
}
