//! Per-episode action statistics.
use crate::base::{ActionKind, ActionStyle};
use std::fmt;

/// Counts by action kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breakdown {
    /// Local actions.
    pub local: usize,

    /// Remote actions.
    pub remote: usize,

    /// Connect actions.
    pub connect: usize,
}

impl Breakdown {
    /// Count for the given kind.
    pub fn get(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::Local => self.local,
            ActionKind::Remote => self.remote,
            ActionKind::Connect => self.connect,
        }
    }

    /// Increments the count of the given kind.
    pub fn increment(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Local => self.local += 1,
            ActionKind::Remote => self.remote += 1,
            ActionKind::Connect => self.connect += 1,
        }
    }

    /// Sum over all kinds.
    pub fn total(&self) -> usize {
        self.local + self.remote + self.connect
    }
}

/// Actions with and without a positive reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcomes {
    /// Actions with a positive reward.
    pub reward: Breakdown,

    /// Other actions.
    pub noreward: Breakdown,
}

impl Outcomes {
    /// Success rate of the given kind, `None` if no such action was taken.
    pub fn ratio(&self, kind: ActionKind) -> Option<f32> {
        let r = self.reward.get(kind);
        let n = self.noreward.get(kind);
        match r + n {
            0 => None,
            total => Some(r as f32 / total as f32),
        }
    }
}

/// Statistics of an episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Outcomes of exploit actions.
    ///
    /// A step deflected to explore is counted with the style its exploit
    /// decision reported, so learners report `Explore` there to count it as
    /// an exploration.
    pub exploit: Outcomes,

    /// Outcomes of explore and manual actions.
    pub explore: Outcomes,

    /// Number of exploit requests that yielded no action.
    pub exploit_deflected_to_explore: usize,
}

impl Stats {
    /// Records the outcome of an action.
    ///
    /// Manual actions are counted with explore actions.
    pub fn record(&mut self, style: ActionStyle, kind: ActionKind, reward: f32) {
        let outcomes = match style {
            ActionStyle::Exploit => &mut self.exploit,
            ActionStyle::Explore | ActionStyle::Manual => &mut self.explore,
        };
        if reward > 0.0 {
            outcomes.reward.increment(kind);
        } else {
            outcomes.noreward.increment(kind);
        }
    }

    /// Number of actions with a positive reward.
    pub fn positive_action_count(&self) -> usize {
        self.exploit.reward.total() + self.explore.reward.total()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Breakdown [Reward/NoReward (Success rate)]")?;
        for (name, outcomes) in [("explore", &self.explore), ("exploit", &self.exploit)] {
            for kind in ActionKind::ALL {
                let ratio = match outcomes.ratio(kind) {
                    Some(r) => format!("{:.2}", r),
                    None => "NaN".to_string(),
                };
                writeln!(
                    f,
                    "    {}-{}: {}/{} ({})",
                    name,
                    kind,
                    outcomes.reward.get(kind),
                    outcomes.noreward.get(kind),
                    ratio
                )?;
            }
        }
        write!(
            f,
            "  exploit deflected to exploration: {}",
            self.exploit_deflected_to_explore
        )
    }
}
