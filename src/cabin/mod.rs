//! In-car mixture synthesis.
//!
//! A [`MixtureSynthesizer`] combines three inputs:
//!
//! - an [`AssetCatalog`] serving impulse responses, noise and ventilation recordings
//!   and reference levels for one vehicle;
//! - a [`CarProfile`] with the vehicle's reference microphones, correction gains,
//!   playback offsets and speaker angles;
//! - a [`LevelCalibrator`] measuring convolved sources (plain or voiced A-weighted RMS).
//!
//! ```rust
//! use cabin_mix::{
//!     AssetType, AudioSamples, CarProfile, InMemoryCatalog, MixtureRequest, MixtureSynthesizer,
//! };
//!
//! # fn main() -> cabin_mix::CabinMixResult<()> {
//! let mut catalog = InMemoryCatalog::new(16000);
//! catalog.insert("array", AssetType::Noise, "50kmh_w0", AudioSamples::zeros(8, 16000, 16000))?;
//! let profile = CarProfile::new("Volkswagen", "Golf", 2017).with_reference_mic("array", Some(4));
//!
//! let synth = MixtureSynthesizer::new(catalog, profile);
//! let request = MixtureRequest::new("array", "50kmh_w0".parse()?).without_correction_gains();
//! let components = synth.components(&request)?;
//! assert_eq!(components.into_vec().len(), 1);
//! # Ok(())
//! # }
//! ```

mod calibration;
mod catalog;
mod condition;
mod geometry;
mod profile;
mod synthesis;

pub use calibration::{Calibration, LevelCalibrator};
pub use catalog::{AssetCatalog, InMemoryCatalog};
pub use condition::{
    AssetType, ChannelSelection, ConditionKey, DrivingCondition, WindowState, split_condition_name,
};
pub use geometry::{ARRAY_MIC_ANGLES, SPEED_OF_SOUND, steering_vector};
pub use profile::{CarProfile, CorrectionGains, DEFAULT_PLAYBACK_OFFSETS, PlaybackOffsets};
pub use synthesis::{
    MixtureComponents, MixtureRequest, MixtureSynthesizer, REFERENCE_EFFORT_DB, VENTILATION_LEVELS,
};
