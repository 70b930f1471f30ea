//! Leak Triage math utilities.

pub mod error;
pub mod math;

pub use error::{MathError, Result};
pub use math::entropy::*;
pub use math::harmonic::*;
