//! Environment step.
use super::Env;

/// Additional information returned by an environment step.
pub trait Info {
    /// Availability of the network after the step, in `[0, 1]`.
    fn network_availability(&self) -> f32 {
        1.0
    }

    /// Precondition evaluated by the step.
    fn precondition_str(&self) -> String {
        String::new()
    }

    /// Profile used by the step.
    fn profile_str(&self) -> String {
        String::new()
    }

    /// Description of the reward given by the environment.
    fn reward_string(&self) -> String {
        String::new()
    }
}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
