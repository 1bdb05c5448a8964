//! Utility functions for level math and test-signal generation.
//!
//! # Modules
//!
//! - [`audio_math`] - dB/amplitude conversions, rounding and time conversions
//! - [`generation`] - Deterministic signal generators

pub mod audio_math;
pub mod generation;

pub use audio_math::*;
pub use generation::*;
