//! Episode loop shared by training and evaluation.
use crate::{
    base::{Act, Decision, Env, Info, Learner, Obs, Verbosity},
    stats::Stats,
    wrapper::AgentWrapper,
};
use anyhow::Result;
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};
use std::path::Path;

/// How actions are selected.
pub(crate) enum Selection<'r> {
    /// Explore with probability `epsilon`, exploit otherwise.
    EpsilonGreedy { epsilon: f64, rng: &'r mut StdRng },

    /// Always exploit.
    Exploit,
}

pub(crate) struct EpisodeSpec<'p> {
    pub i_episode: usize,
    pub iteration_count: usize,
    pub verbosity: Verbosity,
    /// Positive-reward steps are rendered into this directory.
    pub render_dir: Option<&'p Path>,
    pub call_on_step: bool,
}

pub(crate) struct EpisodeOutcome<O> {
    pub rewards: Vec<f32>,
    pub availability: Vec<f32>,
    pub total_reward: f32,
    /// Step at which the environment reported `done`.
    pub ended_at: Option<usize>,
    /// Number of steps taken.
    pub steps: usize,
    pub last_reward_at: Option<usize>,
    pub stats: Stats,
    pub loss_string: String,
    pub last_obs: O,
}

impl<O> EpisodeOutcome<O> {
    /// Length of the episode.
    pub fn length(&self) -> usize {
        self.ended_at.unwrap_or(self.steps)
    }
}

/// Runs an episode on the wrapped environment.
///
/// Stops when the environment is done, after `iteration_count` steps, or when the
/// learner has no action to explore. `steps_done` is incremented for each step taken.
pub(crate) fn run_episode<E, L>(
    wrapped: &mut AgentWrapper<'_, E>,
    learner: &mut L,
    selection: &mut Selection<'_>,
    spec: &EpisodeSpec<'_>,
    steps_done: &mut usize,
) -> Result<EpisodeOutcome<E::Obs>>
where
    E: Env,
    L: Learner<E>,
{
    let mut obs = wrapped.reset()?;
    learner.new_episode();

    let mut stats = Stats::default();
    let mut rewards = vec![];
    let mut availability = vec![];
    let mut total_reward = 0f32;
    let mut ended_at = None;
    let mut last_reward_at = None;
    let mut steps = 0;
    let mut render_index = 1;

    for t in 1..=spec.iteration_count {
        let explore = match selection {
            Selection::EpsilonGreedy { epsilon, rng } => rng.gen::<f64>() <= *epsilon,
            Selection::Exploit => false,
        };

        let decision = if explore {
            debug!("Choose exploration phase");
            learner.explore(wrapped)?
        } else {
            let decision = learner.exploit(wrapped, &obs)?;
            if decision.action.is_some() {
                decision
            } else {
                // A deflected step keeps the style reported by exploit
                debug!("Enter exploration phase instead of exploitation");
                stats.exploit_deflected_to_explore += 1;
                let explored = learner.explore(wrapped)?;
                Decision::new(decision.style, explored.action, explored.metadata)
            }
        };

        let (style, act, metadata) = match decision.into_parts() {
            Some(parts) => parts,
            None => {
                warn!(
                    "Episode {} stopped at t={}: no action to explore",
                    spec.i_episode, t
                );
                break;
            }
        };
        debug!("action={}, metadata={:?}", act, metadata);

        let step = wrapped.step(style, &act)?;
        *steps_done += 1;
        steps += 1;

        let reward = step.reward;
        stats.record(style, act.kind(), reward);

        if spec.call_on_step {
            learner.on_step(wrapped, &step, &metadata)?;
        }

        rewards.push(reward);
        availability.push(step.info.network_availability());
        total_reward += reward;
        if reward > 0.0 {
            last_reward_at = Some(t);
        }

        if spec.verbosity.logs_step(reward) {
            let sign = if reward > 0.0 { '+' } else { '-' };
            info!(
                "    {} t={} {} r={} total_reward:{} a={:?}-{} creds={}  {}",
                sign,
                t,
                style,
                reward,
                total_reward,
                metadata,
                wrapped.internal_action_to_pretty_print(&act),
                step.obs.credential_cache_len(),
                learner.stateaction_as_string(&metadata)
            );
        }

        if let Some(dir) = spec.render_dir {
            if reward > 0.0 {
                let path = dir.join(format!("e{}-s{}.png", spec.i_episode, render_index));
                if let Err(e) = wrapped.render_to(&path) {
                    warn!("Failed to render {:?}: {}", path, e);
                }
                render_index += 1;
            }
        }

        let done = step.is_done();
        learner.end_of_iteration(t, done);
        obs = step.obs;

        if done {
            ended_at = Some(t);
            break;
        }
    }

    let loss_string = match learner.loss_as_string() {
        s if s.is_empty() => s,
        s => format!("loss={}", s),
    };

    match ended_at {
        Some(t) => info!(
            "Episode {} ended at t={} total_reward {} with {}",
            spec.i_episode, t, total_reward, loss_string
        ),
        None => info!(
            "Episode {} stopped at t={} total_reward {} with {}",
            spec.i_episode, steps, total_reward, loss_string
        ),
    }
    info!("{}", stats);

    Ok(EpisodeOutcome {
        rewards,
        availability,
        total_reward,
        ended_at,
        steps,
        last_reward_at,
        stats,
        loss_string,
        last_obs: obs,
    })
}
