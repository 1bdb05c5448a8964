//! Condition keys, window states, asset types and microphone selections.
//!
//! Stored assets are named after the condition they were recorded in:
//!
//! | asset        | key                           | name          |
//! |--------------|-------------------------------|---------------|
//! | IR           | speaker position + window     | `prm_w1`      |
//! | radio IR     | window                        | `w1`          |
//! | ventilation  | fan level + window            | `v2_w1`       |
//! | noise        | driving speed + window        | `100kmh_w1`   |

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CabinMixError, CabinMixResult, ParameterError};

/// Open/closed configuration of the car windows during a recording, coded 0 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WindowState(u8);

impl WindowState {
    /// Highest valid code.
    pub const MAX: u8 = 3;

    /// Validates a window-state code.
    pub fn new(code: u8) -> CabinMixResult<Self> {
        if code > Self::MAX {
            return Err(ParameterError::InvalidWindowState(code).into());
        }
        Ok(Self(code))
    }

    /// Numeric code.
    pub const fn code(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for WindowState {
    type Error = CabinMixError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<WindowState> for u8 {
    fn from(state: WindowState) -> Self {
        state.0
    }
}

impl Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Kinds of asset a catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Speaker-to-microphone impulse responses.
    Ir,
    /// In-motion cabin noise recordings.
    Noise,
    /// Radio loudspeaker impulse responses.
    RadioIr,
    /// Ventilation fan recordings.
    Ventilation,
}

impl Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ir => "IR",
            Self::Noise => "noise",
            Self::RadioIr => "radio IR",
            Self::Ventilation => "ventilation",
        })
    }
}

/// Identifier of a stored asset: a semantic axis plus the window state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKey {
    /// Talker at a seat position.
    Speaker {
        /// Position name, e.g. `prm` or `d50`.
        position: String,
        /// Window state.
        window: WindowState,
    },
    /// Radio playback through the car loudspeakers.
    Playback {
        /// Window state.
        window: WindowState,
    },
    /// Ventilation fan at a level from 1 to 3.
    Ventilation {
        /// Fan level.
        level: u8,
        /// Window state.
        window: WindowState,
    },
    /// Driving at a named speed.
    Speed {
        /// Speed name, e.g. `100kmh`.
        speed: String,
        /// Window state.
        window: WindowState,
    },
}

impl ConditionKey {
    /// Asset type the key resolves in.
    pub const fn asset_type(&self) -> AssetType {
        match self {
            Self::Speaker { .. } => AssetType::Ir,
            Self::Playback { .. } => AssetType::RadioIr,
            Self::Ventilation { .. } => AssetType::Ventilation,
            Self::Speed { .. } => AssetType::Noise,
        }
    }

    /// Window state of the condition.
    pub const fn window(&self) -> WindowState {
        match self {
            Self::Speaker { window, .. }
            | Self::Playback { window }
            | Self::Ventilation { window, .. }
            | Self::Speed { window, .. } => *window,
        }
    }

    /// Name under which the asset is stored.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speaker { position, window } => write!(f, "{position}_{window}"),
            Self::Playback { window } => write!(f, "{window}"),
            Self::Ventilation { level, window } => write!(f, "v{level}_{window}"),
            Self::Speed { speed, window } => write!(f, "{speed}_{window}"),
        }
    }
}

/// Splits a stored condition name into its base and window state.
///
/// `"prm10l_w2"` gives `("prm10l", w2)`. Names without a `_w<digit>` suffix give
/// `None`.
pub fn split_condition_name(name: &str) -> Option<(&str, WindowState)> {
    let (base, code) = name.rsplit_once("_w")?;
    let state = WindowState::new(code.parse().ok()?).ok()?;
    Some((base, state))
}

/// The driving condition shared by every component of one mixture: a speed and a
/// window state, written `"{speed}_w{n}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrivingCondition {
    speed: String,
    window: WindowState,
}

impl DrivingCondition {
    /// Creates a condition from its parts.
    pub fn new(speed: impl Into<String>, window: WindowState) -> Self {
        Self {
            speed: speed.into(),
            window,
        }
    }

    /// Speed name.
    pub fn speed(&self) -> &str {
        &self.speed
    }

    /// Window state.
    pub const fn window(&self) -> WindowState {
        self.window
    }

    /// Key of the noise recording for this condition.
    pub fn noise_key(&self) -> ConditionKey {
        ConditionKey::Speed {
            speed: self.speed.clone(),
            window: self.window,
        }
    }
}

impl FromStr for DrivingCondition {
    type Err = CabinMixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParameterError::MalformedCondition(s.to_string());
        let (speed, code) = s.rsplit_once("_w").ok_or_else(malformed)?;
        if speed.is_empty() {
            return Err(malformed().into());
        }
        let code: u8 = code.parse().map_err(|_| malformed())?;
        Ok(Self::new(speed, WindowState::new(code)?))
    }
}

impl Display for DrivingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.speed, self.window)
    }
}

/// Which microphone channels a component is rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    /// Every channel of the asset.
    #[default]
    All,
    /// One channel.
    Single(usize),
    /// Listed channels, in order.
    List(Vec<usize>),
}

impl ChannelSelection {
    /// Channel indices for an asset with `available` channels.
    ///
    /// # Errors
    /// [`ParameterError::InvalidChannelSelection`] for an empty list or an index that
    /// does not exist.
    pub fn resolve(&self, available: usize) -> CabinMixResult<Vec<usize>> {
        let channels = match self {
            Self::All => (0..available).collect(),
            Self::Single(ch) => vec![*ch],
            Self::List(list) => list.clone(),
        };
        if channels.is_empty() {
            return Err(ParameterError::InvalidChannelSelection("empty channel list".to_string()).into());
        }
        if let Some(bad) = channels.iter().find(|&&ch| ch >= available) {
            return Err(ParameterError::InvalidChannelSelection(format!(
                "channel {bad} requested, asset has {available} channels"
            ))
            .into());
        }
        Ok(channels)
    }
}

impl From<usize> for ChannelSelection {
    fn from(channel: usize) -> Self {
        Self::Single(channel)
    }
}

impl From<Vec<usize>> for ChannelSelection {
    fn from(channels: Vec<usize>) -> Self {
        Self::List(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(code: u8) -> WindowState {
        WindowState::new(code).unwrap()
    }

    #[test]
    fn window_states_are_bounded() {
        assert!(WindowState::new(3).is_ok());
        assert!(matches!(
            WindowState::new(4),
            Err(CabinMixError::Parameter(ParameterError::InvalidWindowState(4)))
        ));
    }

    #[test]
    fn keys_render_stored_names() {
        let speaker = ConditionKey::Speaker {
            position: "prm".into(),
            window: w(1),
        };
        assert_eq!(speaker.name(), "prm_w1");
        assert_eq!(speaker.asset_type(), AssetType::Ir);
        assert_eq!(ConditionKey::Playback { window: w(0) }.name(), "w0");
        assert_eq!(ConditionKey::Ventilation { level: 2, window: w(3) }.name(), "v2_w3");
        assert_eq!(
            ConditionKey::Speed {
                speed: "100kmh".into(),
                window: w(2)
            }
            .name(),
            "100kmh_w2"
        );
    }

    #[test]
    fn driving_conditions_parse() {
        let cond: DrivingCondition = "100kmh_w2".parse().unwrap();
        assert_eq!(cond.speed(), "100kmh");
        assert_eq!(cond.window().code(), 2);
        assert_eq!(cond.to_string(), "100kmh_w2");
        assert_eq!(cond.noise_key().name(), "100kmh_w2");

        assert!(matches!(
            "100kmh_w7".parse::<DrivingCondition>(),
            Err(CabinMixError::Parameter(ParameterError::InvalidWindowState(7)))
        ));
        for bad in ["100kmh", "_w1", "100kmh_wx"] {
            assert!(matches!(
                bad.parse::<DrivingCondition>(),
                Err(CabinMixError::Parameter(ParameterError::MalformedCondition(_)))
            ));
        }
    }

    #[test]
    fn condition_names_split() {
        assert_eq!(split_condition_name("prm10l_w2"), Some(("prm10l", w(2))));
        assert_eq!(split_condition_name("v1_w0"), Some(("v1", w(0))));
        assert_eq!(split_condition_name("w1"), None);
        assert_eq!(split_condition_name("prm_w9"), None);
    }

    #[test]
    fn selections_resolve_against_channel_count() {
        assert_eq!(ChannelSelection::All.resolve(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(ChannelSelection::from(2).resolve(3).unwrap(), vec![2]);
        assert_eq!(ChannelSelection::from(vec![2, 0]).resolve(3).unwrap(), vec![2, 0]);
        assert!(ChannelSelection::from(3).resolve(3).is_err());
        assert!(ChannelSelection::List(Vec::new()).resolve(3).is_err());
    }

    #[test]
    fn window_state_deserializes_with_validation() {
        let ok: Result<WindowState, _> = serde_json::from_str("2");
        assert_eq!(ok.ok(), Some(w(2)));
        let bad: Result<WindowState, _> = serde_json::from_str("5");
        assert!(bad.is_err());
    }
}
