use super::TrainerConfig;

/// Exploration rate over the course of a training run.
///
/// With exponential decay `d`, the rate at the start of an episode is
/// `min + exp(-5 * steps_done / (d * iteration_count)) * (initial - min)`.
/// With multiplicative decay `m`, the rate becomes `max(min, rate * m)` after each episode.
#[derive(Debug, Clone)]
pub struct EpsilonSchedule {
    initial: f64,
    minimum: f64,
    multdecay: Option<f64>,
    exponential_decay: Option<usize>,
    iteration_count: usize,
    current: f64,
}

impl EpsilonSchedule {
    /// Constructs the schedule of a training run.
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            initial: config.epsilon,
            minimum: config.epsilon_minimum,
            multdecay: config.epsilon_multdecay,
            exponential_decay: config.epsilon_exponential_decay.filter(|&d| d > 0),
            iteration_count: config.iteration_count,
            current: config.epsilon,
        }
    }

    /// Current rate.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Updates the rate at the start of an episode.
    pub fn start_episode(&mut self, steps_done: usize) -> f64 {
        if let Some(d) = self.exponential_decay {
            let denom = d as f64 * self.iteration_count.max(1) as f64;
            self.current = self.minimum
                + (-5.0 * steps_done as f64 / denom).exp() * (self.initial - self.minimum);
        }
        self.current
    }

    /// Updates the rate at the end of an episode.
    pub fn end_episode(&mut self) -> f64 {
        if let Some(m) = self.multdecay {
            self.current = self.minimum.max(self.current * m);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay() {
        let config = TrainerConfig::default()
            .iteration_count(10)
            .epsilon(0.9)
            .epsilon_minimum(0.1)
            .epsilon_exponential_decay(Some(2));
        let mut eps = EpsilonSchedule::new(&config);
        assert_eq!(eps.start_episode(0), 0.9);
        let e = eps.start_episode(20);
        assert!((e - (0.1 + (-5.0f64).exp() * 0.8)).abs() < 1e-12);
        assert_eq!(eps.end_episode(), e);
    }

    #[test]
    fn test_exponential_decay_large_values() {
        let config = TrainerConfig::default()
            .iteration_count(usize::MAX)
            .epsilon(0.9)
            .epsilon_exponential_decay(Some(usize::MAX));
        let mut eps = EpsilonSchedule::new(&config);
        assert!((eps.start_episode(usize::MAX) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_multiplicative_decay() {
        let config = TrainerConfig::default()
            .epsilon(1.0)
            .epsilon_minimum(0.3)
            .epsilon_multdecay(0.5);
        let mut eps = EpsilonSchedule::new(&config);
        assert_eq!(eps.start_episode(100), 1.0);
        assert_eq!(eps.end_episode(), 0.5);
        assert_eq!(eps.end_episode(), 0.3);
    }
}
