//! Core randomness trait for hashsim components.

/// The single stream of draws shared by all stochastic decisions in a run.
///
/// Components never own a generator; the model passes `&mut dyn RandomSource`
/// (or a generic `R: RandomSource`) into each call that needs randomness, so
/// the order of draws is fixed by the order of calls within a step.
///
/// # Implementations
///
/// - **Runs**: `SeededSource` - ChaCha8 seeded from a `u64`
/// - **Tests**: `ReplaySource` - cycles through a fixed list of values
pub trait RandomSource: Send {
    /// Returns a uniform draw on `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Returns a standard normal draw (mean 0, standard deviation 1).
    fn next_gaussian(&mut self) -> f64;

    /// Returns the seed this stream was created from, if it has one.
    ///
    /// Used for logging so that any run can be replayed.
    fn seed(&self) -> Option<u64>;

    /// Returns a uniform draw on `[low, high)`.
    ///
    /// When `low == high` this returns `low` but still consumes a draw, so the
    /// stream position does not depend on parameter values.
    fn uniform_in(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_uniform()
    }

    /// Returns a normal draw with the given mean and standard deviation.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.next_gaussian()
    }
}
