//! Thread-shareable model handle for observers running beside the driver.

use hashsim_core::{ConfigError, Model, ModelConfig, ModelSnapshot, StepOutcome};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A model behind a single mutex.
///
/// `step()` and `snapshot()` both take the lock, so an observer on another
/// thread always sees the state between two steps, never during one.
/// Clones share the same model.
#[derive(Clone)]
pub struct SharedModel {
    inner: Arc<Mutex<Model>>,
}

impl SharedModel {
    /// Builds a model from `config` and wraps it.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_model(Model::new(config)?))
    }

    /// Wraps an existing model.
    pub fn from_model(model: Model) -> Self {
        Self {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Model> {
        // A step never leaves the model half-updated in a way a panic could expose,
        // so a poisoned lock still guards consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advances the model by one step.
    pub fn step(&self) -> StepOutcome {
        self.lock().step()
    }

    /// Runs `steps` steps under one lock.
    pub fn run(&self, steps: u64) {
        self.lock().run(steps);
    }

    /// Returns a consistent view of the current state.
    pub fn snapshot(&self) -> ModelSnapshot {
        self.lock().snapshot()
    }

    /// Restarts the run with the same config and seed.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Runs a closure with read access to the model.
    pub fn with<T>(&self, f: impl FnOnce(&Model) -> T) -> T {
        f(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn shared(seed: u64) -> SharedModel {
        SharedModel::new(ModelConfig::default().with_seed(seed).with_miners(8)).unwrap()
    }

    #[test]
    fn test_clone_shares_model() {
        let a = shared(42);
        let b = a.clone();

        a.run(10);
        assert_eq!(b.snapshot().step, 10);
        b.step();
        assert_eq!(a.with(|m| m.step_count()), 11);
    }

    #[test]
    fn test_matches_plain_model() {
        let handle = shared(17);
        let mut plain = Model::new(ModelConfig::default().with_seed(17).with_miners(8)).unwrap();

        for _ in 0..200 {
            handle.step();
            plain.step();
        }
        assert_eq!(handle.snapshot(), plain.snapshot());
    }

    #[test]
    fn test_observer_thread_sees_consistent_snapshots() {
        let model = shared(5);
        let observer = model.clone();

        let driver = thread::spawn(move || {
            for _ in 0..2_000 {
                model.step();
            }
        });

        let mut last_step = 0;
        for _ in 0..200 {
            let view = observer.snapshot();
            assert!(view.step >= last_step);
            assert!(view.price > 0.0 && view.difficulty > 0.0);
            let sum: f64 = view.miners.iter().map(|m| m.hashrate).sum();
            assert_eq!(sum.to_bits(), view.network_hashrate.to_bits());
            last_step = view.step;
        }

        driver.join().unwrap();
        assert_eq!(observer.snapshot().step, 2_000);
    }

    #[test]
    fn test_reset_through_handle() {
        let handle = shared(3);
        handle.run(100);
        let first = handle.snapshot();

        handle.reset();
        assert_eq!(handle.snapshot().step, 0);
        handle.run(100);
        assert_eq!(handle.snapshot(), first);
    }

    #[test]
    fn test_invalid_config() {
        assert!(SharedModel::new(ModelConfig::default().with_miners(0)).is_err());
    }
}
