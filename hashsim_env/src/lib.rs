//! hashsim Environment Abstraction Layer
//!
//! Every stochastic decision in a hashsim run (price noise, shock timing,
//! shock magnitude, block discovery, winner selection) draws from one
//! [`RandomSource`]. Swapping the source is the only way randomness enters
//! the engine.
//!
//! # Determinism
//!
//! By deriving all entropy from a single 64-bit seed, any run can be
//! replayed from its seed number. Even unseeded runs pick a seed from OS
//! entropy and record it, so the seed can be logged and reused.
//!
//! # Example
//!
//! ```
//! use hashsim_env::{RandomSource, SeededSource};
//!
//! let mut a = SeededSource::new(42);
//! let mut b = SeededSource::new(42);
//! assert_eq!(a.next_uniform().to_bits(), b.next_uniform().to_bits());
//! ```

mod random;
mod seeded;
mod replay;
mod types;

pub use random::RandomSource;
pub use seeded::SeededSource;
pub use replay::ReplaySource;
pub use types::MinerId;
