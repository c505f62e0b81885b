//! Environment wrapper augmenting observations with run-scoped bookkeeping.
mod state;
use crate::{
    base::{Act, ActionStyle, CommandEnv, Env, Obs, Step},
    bounds::EnvironmentBounds,
    command::Command,
};
use anyhow::Result;
pub use state::ActionTrackingStateAugmentation;
use std::path::Path;

/// Wraps an environment for the duration of a run.
///
/// Every observation and step goes through the wrapper so that the
/// [`ActionTrackingStateAugmentation`] stays in sync with the environment.
pub struct AgentWrapper<'a, E: Env> {
    env: &'a mut E,
    state: ActionTrackingStateAugmentation,
}

impl<'a, E: Env> AgentWrapper<'a, E> {
    /// Wraps the given environment.
    pub fn new(env: &'a mut E, bounds: &EnvironmentBounds) -> Self {
        Self {
            env,
            state: ActionTrackingStateAugmentation::new(bounds),
        }
    }

    /// The wrapped environment.
    pub fn env(&self) -> &E {
        self.env
    }

    /// The wrapped environment.
    pub fn env_mut(&mut self) -> &mut E {
        self.env
    }

    /// Bookkeeping of the current episode.
    pub fn state(&self) -> &ActionTrackingStateAugmentation {
        &self.state
    }

    /// Resets the environment and the bookkeeping.
    pub fn reset(&mut self) -> Result<E::Obs> {
        let obs = self.env.reset()?;
        self.state.on_reset(obs.discovered_node_count());
        Ok(obs)
    }

    /// Applies an action chosen with the given style.
    pub fn step(&mut self, style: ActionStyle, act: &E::Act) -> Result<Step<E>> {
        let step = self.env.step(act)?;
        self.state.on_step(
            style,
            act.kind(),
            act.node(),
            step.reward,
            step.obs.discovered_node_count(),
        );
        Ok(step)
    }

    /// Samples a valid action from the environment.
    pub fn sample_valid_action(&mut self) -> E::Act {
        self.env.sample_valid_action()
    }

    /// Renders the environment to an image file.
    pub fn render_to(&self, path: &Path) -> Result<()> {
        self.env.render_to(path)
    }

    /// Human readable description of an action.
    pub fn internal_action_to_pretty_print(&self, act: &E::Act) -> String {
        act.to_string()
    }
}

impl<'a, E: CommandEnv> AgentWrapper<'a, E> {
    /// Translates a human readable command into an action of the environment.
    pub fn pretty_print_to_internal_action(&self, command: &Command) -> Result<E::Act> {
        self.env.command_to_action(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::ActionKind,
        dummy::{DummyAct, DummyEnv, DummyEnvConfig},
    };

    #[test]
    fn test_step_updates_bookkeeping() -> Result<()> {
        let config = DummyEnvConfig::default().rewards(vec![5.0, -1.0]).node_count(4);
        let mut env = DummyEnv::build(&config, 0)?;
        let bounds = EnvironmentBounds::with_node_count(4);
        let mut wrapped = AgentWrapper::new(&mut env, &bounds);

        wrapped.reset()?;
        let act = DummyAct::new(ActionKind::Remote, 2);
        wrapped.step(ActionStyle::Exploit, &act)?;
        let act = DummyAct::new(ActionKind::Local, 0);
        wrapped.step(ActionStyle::Explore, &act)?;

        let state = wrapped.state();
        assert_eq!(state.explored_nodes(), &[true, false, true, false]);
        assert_eq!(state.success_count(2, ActionKind::Remote), 1);
        assert_eq!(state.failure_count(0, ActionKind::Local), 1);
        assert_eq!(state.style_count(ActionStyle::Exploit), 1);
        assert_eq!(state.style_count(ActionStyle::Explore), 1);
        assert_eq!(state.last_style(), Some(ActionStyle::Explore));

        wrapped.reset()?;
        assert_eq!(wrapped.state().explored_nodes(), &[false; 4]);
        assert_eq!(wrapped.state().last_style(), None);
        Ok(())
    }

    #[test]
    fn test_pretty_print_round_trip() -> Result<()> {
        let config = DummyEnvConfig::default().node_count(3);
        let mut env = DummyEnv::build(&config, 0)?;
        let bounds = EnvironmentBounds::with_node_count(3);
        let wrapped = AgentWrapper::new(&mut env, &bounds);

        let command = Command::Local {
            node: "n1".to_string(),
            vulnerability: "ScanPageSource".to_string(),
        };
        let act = wrapped.pretty_print_to_internal_action(&command)?;
        assert_eq!(act, DummyAct::new(ActionKind::Local, 1));
        assert_eq!(wrapped.internal_action_to_pretty_print(&act), "local:n1");
        Ok(())
    }
}
