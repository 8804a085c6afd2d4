//! Replay source for forcing specific draws in tests.

use crate::RandomSource;

/// A source that cycles through fixed lists of uniform and gaussian values.
///
/// Useful when a test needs a particular branch to fire, e.g. a "block
/// found" draw or a price shock.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    uniforms: Vec<f64>,
    gaussians: Vec<f64>,
    next_u: usize,
    next_g: usize,
}

impl ReplaySource {
    /// Creates a replay source. Empty lists replay as `0.0`.
    pub fn new(uniforms: Vec<f64>, gaussians: Vec<f64>) -> Self {
        Self {
            uniforms,
            gaussians,
            next_u: 0,
            next_g: 0,
        }
    }

    /// Replays a single uniform value forever, with zero gaussian noise.
    pub fn constant(uniform: f64) -> Self {
        Self::new(vec![uniform], vec![0.0])
    }

    /// Number of uniform draws consumed so far.
    pub fn uniform_draws(&self) -> usize {
        self.next_u
    }

    /// Number of gaussian draws consumed so far.
    pub fn gaussian_draws(&self) -> usize {
        self.next_g
    }
}

fn cycle(values: &[f64], index: usize) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values[index % values.len()]
    }
}

impl RandomSource for ReplaySource {
    fn next_uniform(&mut self) -> f64 {
        let v = cycle(&self.uniforms, self.next_u);
        self.next_u += 1;
        v
    }

    fn next_gaussian(&mut self) -> f64 {
        let v = cycle(&self.gaussians, self.next_g);
        self.next_g += 1;
        v
    }

    fn seed(&self) -> Option<u64> {
        None
    }
}
