//! A learner picking valid actions uniformly.
use crate::{
    base::{ActionStyle, Decision, Env, Learner, Step},
    wrapper::AgentWrapper,
};
use anyhow::Result;

/// A policy that only explores.
///
/// Both [`Learner::explore`] and [`Learner::exploit`] return an action sampled
/// by the environment. Used as the benchmark of transfer-learning evaluations.
#[derive(Debug, Clone, Default)]
pub struct RandomPolicy {}

impl RandomPolicy {
    /// Constructs the policy.
    pub fn new() -> Self {
        Self {}
    }
}

impl<E: Env> Learner<E> for RandomPolicy {
    type Metadata = ();

    fn explore(&mut self, wrapped_env: &mut AgentWrapper<'_, E>) -> Result<Decision<E::Act, ()>> {
        let act = wrapped_env.sample_valid_action();
        Ok(Decision::new(ActionStyle::Explore, Some(act), ()))
    }

    fn exploit(
        &mut self,
        wrapped_env: &mut AgentWrapper<'_, E>,
        _obs: &E::Obs,
    ) -> Result<Decision<E::Act, ()>> {
        let act = wrapped_env.sample_valid_action();
        Ok(Decision::new(ActionStyle::Explore, Some(act), ()))
    }

    fn on_step(&mut self, _: &AgentWrapper<'_, E>, _: &Step<E>, _: &()) -> Result<()> {
        Ok(())
    }
}
