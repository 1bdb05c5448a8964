//! Asset catalog seam.
//!
//! The synthesizer never touches files. Impulse responses, recordings and reference
//! levels reach it through [`AssetCatalog`]; disk layouts, codecs and natural-order
//! sorting belong to implementations of that trait. [`InMemoryCatalog`] is the
//! implementation used by tests and by callers that load assets themselves.

use std::collections::{BTreeMap, HashMap};

use super::condition::{AssetType, ConditionKey};
use crate::{AudioSamples, CabinMixResult, CatalogError, ConfigError};

/// Read-only source of recorded assets for one vehicle.
pub trait AssetCatalog {
    /// Processing sample rate; every loaded signal is at this rate.
    fn sample_rate(&self) -> u32;

    /// Names of the available microphone setups.
    fn mic_setups(&self) -> Vec<String>;

    /// Whether `mic_setup` is available.
    fn has_mic_setup(&self, mic_setup: &str) -> bool {
        self.mic_setups().iter().any(|s| s == mic_setup)
    }

    /// Condition names stored for an asset type, in catalog order.
    ///
    /// # Errors
    /// [`CatalogError::UnknownMicSetup`] or [`CatalogError::AssetUnavailable`] when the
    /// vehicle has no such assets at all.
    fn list_conditions(&self, mic_setup: &str, asset: AssetType) -> CabinMixResult<Vec<String>>;

    /// Loads one asset at [`sample_rate`](Self::sample_rate).
    fn load(&self, mic_setup: &str, asset: AssetType, condition: &str) -> CabinMixResult<AudioSamples>;

    /// Level in dB at the reference channel for the 72.5 dB reference effort.
    fn reference_level(&self, mic_setup: &str, key: &ConditionKey) -> CabinMixResult<f64>;
}

#[derive(Debug, Clone, Default)]
struct SetupAssets {
    assets: HashMap<AssetType, BTreeMap<String, AudioSamples>>,
    references: BTreeMap<String, f64>,
}

/// Catalog holding every asset in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    sample_rate: u32,
    setups: BTreeMap<String, SetupAssets>,
}

impl InMemoryCatalog {
    /// Empty catalog processing at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            setups: BTreeMap::new(),
        }
    }

    /// Registers a microphone setup without assets.
    pub fn add_mic_setup(&mut self, mic_setup: impl Into<String>) -> &mut Self {
        self.setups.entry(mic_setup.into()).or_default();
        self
    }

    /// Stores an asset, converting it to the processing rate.
    ///
    /// # Errors
    /// [`CatalogError::SampleRate`] when the signal is at another rate and the
    /// `resampling` feature is disabled, or any resampling failure.
    pub fn insert(
        &mut self,
        mic_setup: impl Into<String>,
        asset: AssetType,
        condition: impl Into<String>,
        signal: AudioSamples,
    ) -> CabinMixResult<&mut Self> {
        let signal = self.conform(signal)?;
        self.setups
            .entry(mic_setup.into())
            .or_default()
            .assets
            .entry(asset)
            .or_default()
            .insert(condition.into(), signal);
        Ok(self)
    }

    /// Sets the reference level of one condition.
    pub fn set_reference_level(
        &mut self,
        mic_setup: impl Into<String>,
        condition: impl Into<String>,
        level_db: f64,
    ) -> &mut Self {
        self.setups
            .entry(mic_setup.into())
            .or_default()
            .references
            .insert(condition.into(), level_db);
        self
    }

    /// Loads a reference-level table (`{"prm_w1": 63.2, ...}`) for a setup.
    pub fn load_reference_levels_json(&mut self, mic_setup: impl Into<String>, json: &str) -> CabinMixResult<&mut Self> {
        let table: BTreeMap<String, f64> = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        self.setups
            .entry(mic_setup.into())
            .or_default()
            .references
            .extend(table);
        Ok(self)
    }

    #[cfg(feature = "resampling")]
    fn conform(&self, signal: AudioSamples) -> CabinMixResult<AudioSamples> {
        if signal.sample_rate() == self.sample_rate {
            return Ok(signal);
        }
        crate::resampling::resample(&signal, self.sample_rate)
    }

    #[cfg(not(feature = "resampling"))]
    fn conform(&self, signal: AudioSamples) -> CabinMixResult<AudioSamples> {
        if signal.sample_rate() == self.sample_rate {
            return Ok(signal);
        }
        Err(CatalogError::SampleRate {
            expected: self.sample_rate,
            actual: signal.sample_rate(),
        }
        .into())
    }

    fn setup(&self, mic_setup: &str) -> CabinMixResult<&SetupAssets> {
        self.setups
            .get(mic_setup)
            .ok_or_else(|| CatalogError::UnknownMicSetup(mic_setup.to_string()).into())
    }

    fn assets(&self, mic_setup: &str, asset: AssetType) -> CabinMixResult<&BTreeMap<String, AudioSamples>> {
        self.setup(mic_setup)?.assets.get(&asset).ok_or_else(|| {
            CatalogError::AssetUnavailable {
                mic_setup: mic_setup.to_string(),
                asset: asset.to_string(),
            }
            .into()
        })
    }
}

impl AssetCatalog for InMemoryCatalog {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn mic_setups(&self) -> Vec<String> {
        self.setups.keys().cloned().collect()
    }

    fn has_mic_setup(&self, mic_setup: &str) -> bool {
        self.setups.contains_key(mic_setup)
    }

    fn list_conditions(&self, mic_setup: &str, asset: AssetType) -> CabinMixResult<Vec<String>> {
        Ok(self.assets(mic_setup, asset)?.keys().cloned().collect())
    }

    fn load(&self, mic_setup: &str, asset: AssetType, condition: &str) -> CabinMixResult<AudioSamples> {
        self.assets(mic_setup, asset)?
            .get(condition)
            .cloned()
            .ok_or_else(|| {
                CatalogError::UnknownCondition {
                    mic_setup: mic_setup.to_string(),
                    asset: asset.to_string(),
                    condition: condition.to_string(),
                }
                .into()
            })
    }

    fn reference_level(&self, mic_setup: &str, key: &ConditionKey) -> CabinMixResult<f64> {
        let name = key.name();
        self.setup(mic_setup)?
            .references
            .get(&name)
            .copied()
            .ok_or_else(|| {
                CatalogError::MissingReferenceLevel {
                    mic_setup: mic_setup.to_string(),
                    condition: name,
                }
                .into()
            })
    }
}
