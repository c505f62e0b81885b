//! Learner.
use super::{ActionStyle, Env, Step};
use crate::wrapper::AgentWrapper;
use anyhow::Result;
use std::{fmt::Debug, path::Path};

/// An action proposed by a [`Learner`].
///
/// `metadata` is an arbitrary value handed back to [`Learner::on_step`]
/// once the action has been applied to the environment.
#[derive(Debug, Clone)]
pub struct Decision<A, M> {
    /// How the action was chosen.
    pub style: ActionStyle,

    /// The action, `None` if the learner has no candidate.
    pub action: Option<A>,

    /// Learner specific data attached to the action.
    pub metadata: M,
}

impl<A, M> Decision<A, M> {
    /// Constructs a decision.
    pub fn new(style: ActionStyle, action: Option<A>, metadata: M) -> Self {
        Self {
            style,
            action,
            metadata,
        }
    }

    /// A decision without any action.
    pub fn none(style: ActionStyle, metadata: M) -> Self {
        Self::new(style, None, metadata)
    }

    /// Splits the decision, returning `None` if there is no action.
    pub fn into_parts(self) -> Option<(ActionStyle, A, M)> {
        let Decision {
            style,
            action,
            metadata,
        } = self;
        action.map(|a| (style, a, metadata))
    }
}

/// Interface of an epsilon-greedy learner.
///
/// The training loop asks the learner either to explore or to exploit at each step,
/// applies the action, then reports the outcome with [`Learner::on_step`].
/// Hooks with a default implementation are optional.
pub trait Learner<E: Env> {
    /// Data attached to each decision.
    type Metadata: Debug;

    /// Exploration function.
    fn explore(&mut self, wrapped_env: &mut AgentWrapper<'_, E>)
        -> Result<Decision<E::Act, Self::Metadata>>;

    /// Exploitation function.
    ///
    /// Returning a decision without action deflects the step to [`Learner::explore`].
    /// The deflected step keeps the style of this decision.
    fn exploit(
        &mut self,
        wrapped_env: &mut AgentWrapper<'_, E>,
        obs: &E::Obs,
    ) -> Result<Decision<E::Act, Self::Metadata>>;

    /// Called after each training step with the outcome of the action.
    fn on_step(
        &mut self,
        wrapped_env: &AgentWrapper<'_, E>,
        step: &Step<E>,
        metadata: &Self::Metadata,
    ) -> Result<()>;

    /// Called when a new episode starts.
    fn new_episode(&mut self) {}

    /// Called when an episode ends after `t` steps.
    fn end_of_episode(&mut self, _i_episode: usize, _t: usize) {}

    /// Called after each step.
    fn end_of_iteration(&mut self, _t: usize, _done: bool) {}

    /// Set the learner to training mode.
    fn train(&mut self) {}

    /// Set the learner to evaluation mode.
    fn eval(&mut self) {}

    /// Saves the learner to the given file.
    fn save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Loads the learner from the given file.
    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Loads the best checkpoint found in the given directory.
    fn load_best(&mut self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    /// Hyper-parameters as a comma separated list of `key=value`.
    fn parameters_as_string(&self) -> String {
        String::new()
    }

    /// All parameters, including those not relevant for hyper-parameter search.
    fn all_parameters_as_string(&self) -> String {
        String::new()
    }

    /// Last training loss.
    fn loss_as_string(&self) -> String {
        String::new()
    }

    /// Description of the state and action behind a decision.
    fn stateaction_as_string(&self, _metadata: &Self::Metadata) -> String {
        String::new()
    }

    /// Name of the learner.
    fn name(&self) -> String {
        crate::util::short_type_name::<Self>()
    }
}
