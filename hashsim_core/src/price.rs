//! Stochastic price process: drift, gaussian noise, occasional shocks.

use crate::config::ModelConfig;
use hashsim_env::RandomSource;

/// Result of one price advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceMove {
    /// New price, always at or above the floor
    pub price: f64,

    /// Size of the shock term if one fired this step
    pub shock: Option<f64>,

    /// Whether the floor clamp was applied
    pub floored: bool,
}

impl PriceMove {
    /// Fractional change relative to the previous price.
    pub fn delta_from(&self, previous_price: f64) -> f64 {
        (self.price - previous_price) / previous_price
    }
}

/// Bounded random walk with shocks.
///
/// `new = prev * (1 + drift + noise + shock)` where `noise ~ N(0, sigma)` and
/// `shock ~ U(low, high)` fires with a fixed probability per step. The
/// result never drops below `floor`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceProcess {
    drift: f64,
    noise_std_dev: f64,
    shock_probability: f64,
    shock_range: (f64, f64),
    floor: f64,
}

impl PriceProcess {
    /// Builds the process from a validated config.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            drift: config.drift,
            noise_std_dev: config.noise_std_dev,
            shock_probability: config.shock_probability,
            shock_range: config.shock_range,
            floor: config.price_floor,
        }
    }

    /// Returns the price floor.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Advances the price by one step.
    ///
    /// Draw order is fixed: one gaussian, one uniform for the shock test, and
    /// one more uniform for the shock size only if the shock fires.
    pub fn advance<R: RandomSource + ?Sized>(&self, previous_price: f64, rng: &mut R) -> PriceMove {
        let noise = rng.gaussian(0.0, self.noise_std_dev);

        let shock = if rng.next_uniform() < self.shock_probability {
            let (low, high) = self.shock_range;
            Some(rng.uniform_in(low, high))
        } else {
            None
        };

        let raw = previous_price * (1.0 + self.drift + noise + shock.unwrap_or(0.0));
        let floored = !raw.is_finite() || raw < self.floor;
        let price = if floored { self.floor } else { raw };

        PriceMove {
            price,
            shock,
            floored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hashsim_env::{ReplaySource, SeededSource};

    fn process(drift: f64, sigma: f64, p_shock: f64, range: (f64, f64)) -> PriceProcess {
        let config = ModelConfig::default()
            .with_price_process(drift, sigma)
            .with_shocks(p_shock, range.0, range.1);
        PriceProcess::from_config(&config)
    }

    #[test]
    fn test_pure_drift() {
        let p = process(0.01, 0.0, 0.0, (0.0, 0.0));
        let mut rng = ReplaySource::constant(0.5);

        let m = p.advance(100.0, &mut rng);
        assert_relative_eq!(m.price, 101.0, epsilon = 1e-9);
        assert_eq!(m.shock, None);
        assert_relative_eq!(m.delta_from(100.0), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_is_scaled_by_sigma() {
        let p = process(0.0, 0.05, 0.0, (0.0, 0.0));
        let mut rng = ReplaySource::new(vec![0.5], vec![2.0]);

        let m = p.advance(10.0, &mut rng);
        assert_relative_eq!(m.price, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shock_applied_in_addition_to_noise() {
        let p = process(0.0, 0.1, 0.5, (-0.4, 0.4));
        // noise +0.1, shock test passes (0.0 < 0.5), magnitude 0.75 -> +0.2
        let mut rng = ReplaySource::new(vec![0.0, 0.75], vec![1.0]);

        let m = p.advance(10.0, &mut rng);
        assert_relative_eq!(m.shock.unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(m.price, 13.0, epsilon = 1e-9);
        assert_eq!(rng.uniform_draws(), 2);
    }

    #[test]
    fn test_no_shock_consumes_one_uniform() {
        let p = process(0.0, 0.0, 0.1, (-0.2, 0.2));
        let mut rng = ReplaySource::constant(0.9);

        let m = p.advance(5.0, &mut rng);
        assert_eq!(m.shock, None);
        assert_eq!(rng.uniform_draws(), 1);
        assert_eq!(rng.gaussian_draws(), 1);
    }

    #[test]
    fn test_crash_clamps_to_floor() {
        let p = process(0.0, 0.0, 1.0, (-3.0, -3.0));
        let mut rng = ReplaySource::constant(0.0);

        let m = p.advance(1.0, &mut rng);
        assert!(m.floored);
        assert_eq!(m.price, p.floor());
        assert!(m.price > 0.0);
    }

    #[test]
    fn test_price_stays_positive_over_long_run() {
        let p = process(-0.05, 0.3, 0.3, (-0.9, 0.2));
        let mut rng = SeededSource::new(3);
        let mut price = 1.0;

        for _ in 0..10_000 {
            price = p.advance(price, &mut rng).price;
            assert!(price > 0.0);
            assert!(price >= p.floor());
        }
    }
}
