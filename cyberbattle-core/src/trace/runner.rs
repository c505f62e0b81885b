use super::{EpisodeTrace, TraceNaming};
use crate::{
    base::{ActionStyle, CommandEnv, Env, Info, Learner},
    command::CommandScript,
    wrapper::AgentWrapper,
};
use anyhow::Result;
use log::{info, warn};
use std::{fs, path::Path};

/// Source of the actions of a trace run.
pub trait NextAction<E: Env> {
    /// Action at step `i`, or `None` to stop the run.
    fn next_action(
        &mut self,
        wrapped: &mut AgentWrapper<'_, E>,
        obs: &E::Obs,
        i: usize,
    ) -> Result<(ActionStyle, Option<E::Act>)>;

    /// Minimum number of steps of the run.
    fn len_hint(&self) -> usize {
        0
    }
}

/// Actions exploited by a learner.
pub struct Exploiter<'l, L> {
    learner: &'l mut L,
}

impl<'l, L> Exploiter<'l, L> {
    /// Wraps the learner.
    pub fn new(learner: &'l mut L) -> Self {
        Self { learner }
    }
}

impl<'l, E: Env, L: Learner<E>> NextAction<E> for Exploiter<'l, L> {
    fn next_action(
        &mut self,
        wrapped: &mut AgentWrapper<'_, E>,
        obs: &E::Obs,
        _i: usize,
    ) -> Result<(ActionStyle, Option<E::Act>)> {
        let decision = self.learner.exploit(wrapped, obs)?;
        Ok((decision.style, decision.action))
    }
}

/// Actions given by a command script.
pub struct Scripted<'s> {
    script: &'s CommandScript,
}

impl<'s> Scripted<'s> {
    /// Wraps the script.
    pub fn new(script: &'s CommandScript) -> Self {
        Self { script }
    }
}

impl<'s, E: CommandEnv> NextAction<E> for Scripted<'s> {
    fn next_action(
        &mut self,
        wrapped: &mut AgentWrapper<'_, E>,
        _obs: &E::Obs,
        i: usize,
    ) -> Result<(ActionStyle, Option<E::Act>)> {
        match self.script.get(i) {
            Some(command) => {
                let act = wrapped.pretty_print_to_internal_action(command)?;
                Ok((ActionStyle::Manual, Some(act)))
            }
            None => Ok((ActionStyle::Manual, None)),
        }
    }

    fn len_hint(&self) -> usize {
        self.script.len()
    }
}

/// Result of [`run_trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRun {
    /// Rows of the run.
    pub trace: EpisodeTrace,

    /// Index of the last iteration.
    pub last_index: usize,

    /// Whether the environment reported `done`.
    pub done: bool,
}

impl TraceRun {
    /// Writes the trace CSV into `log_dir`.
    pub fn save(&self, log_dir: &Path, naming: &TraceNaming) -> Result<()> {
        fs::create_dir_all(log_dir)?;
        self.trace
            .write_csv(log_dir.join(naming.actions_csv(self.last_index)))
    }
}

/// Runs an episode step by step, recording every step.
///
/// The run lasts `max(max_steps, source.len_hint())` iterations at most. It stops
/// early when the environment is done or the source has no action. If `render` is
/// given, the network is rendered into the directory before each iteration.
pub fn run_trace<E, S>(
    wrapped: &mut AgentWrapper<'_, E>,
    source: &mut S,
    max_steps: usize,
    render: Option<(&Path, &TraceNaming)>,
) -> Result<TraceRun>
where
    E: Env,
    S: NextAction<E>,
{
    let mut obs = wrapped.reset()?;
    let mut trace = EpisodeTrace::new();
    let mut done = false;
    let mut last_index = 0;

    for i in 0..max_steps.max(source.len_hint()) {
        last_index = i;
        if let Some((dir, naming)) = render {
            wrapped.render_to(&dir.join(naming.output_result_png(i)))?;
        }
        if done {
            break;
        }

        let (style, act) = source.next_action(wrapped, &obs, i)?;
        let act = match act {
            Some(act) => act,
            None => {
                warn!(
                    "Inference ended with error: next action == None, returned with action_style {}",
                    style
                );
                break;
            }
        };

        let step = wrapped.step(style, &act)?;
        done = step.is_done();
        trace.push(
            i,
            step.reward,
            wrapped.internal_action_to_pretty_print(&act),
            style.to_string(),
            step.info.precondition_str(),
            step.info.profile_str(),
            step.info.reward_string(),
        )?;
        obs = step.obs;
    }

    info!("len: {}, cumulative reward: {}", trace.len(), trace.total_reward());
    Ok(TraceRun {
        trace,
        last_index,
        done,
    })
}
