//! Execution context for forward passes

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Forward-pass context: training vs inference mode and the random state
/// used by stochastic layers (dropout) and noise sampling.
pub struct Context {
    training: bool,
    rng: StdRng,
}

impl Context {
    /// Create a new context in training mode with an OS-seeded generator
    pub fn new() -> Self {
        Self { training: true, rng: StdRng::from_os_rng() }
    }

    /// Create a new context with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self { training: true, rng: StdRng::seed_from_u64(seed) }
    }

    /// Set training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Random generator shared by everything running under this context
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
