//! Environment.
use super::{Act, Info, Obs, Step};
use crate::command::Command;
use anyhow::Result;
use std::path::Path;

/// Represents a step-based simulated environment.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Name of the environment, e.g. the gym id it was created from.
    fn name(&self) -> &str;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Samples an action that is valid in the current state.
    fn sample_valid_action(&mut self) -> Self::Act;

    /// Renders the explored network as an image file.
    ///
    /// Environments without a renderer ignore the request.
    fn render_to(&self, path: &Path) -> Result<()> {
        let _ = path;
        Ok(())
    }
}

/// An environment accepting human readable [`Command`]s.
pub trait CommandEnv: Env {
    /// Translates a command into an action of the environment.
    fn command_to_action(&self, command: &Command) -> Result<Self::Act>;
}
