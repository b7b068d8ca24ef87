//! Loop configuration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Configuration shared by every game session.
///
/// Deserializes from JSON; missing fields fall back to the defaults.
///
/// ```
/// use framekit::LoopConfig;
///
/// let config = LoopConfig::from_json(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.tick_rate_hz, 60.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Nominal ticks per second
    pub tick_rate_hz: f32,
    /// Maximum ticks run for a single rendered frame
    pub max_substeps: u32,
    /// Master seed for every random decision in the session
    pub seed: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_substeps: 8,
            seed: 0,
        }
    }
}

impl LoopConfig {
    /// Default config with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Config`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fixed timestep in seconds. Non-positive rates fall back to 60 Hz.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.rate()
    }

    fn rate(&self) -> f32 {
        if self.tick_rate_hz > 0.0 {
            self.tick_rate_hz
        } else {
            60.0
        }
    }

    /// Converts seconds to a whole number of ticks, rounding up.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ticks_for(&self, seconds: f32) -> u32 {
        (seconds.max(0.0) * self.rate()).ceil() as u32
    }

    /// Deterministic RNG seeded from `seed`.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults() {
        let config = LoopConfig::default();
        assert_eq!(config.tick_rate_hz, 60.0);
        assert_eq!(config.max_substeps, 8);
        assert!((config.dt() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = LoopConfig::from_json("{ seed: }").unwrap_err();
        assert!(matches!(err, FrameError::Config(_)));
    }

    #[test]
    fn zero_rate_falls_back() {
        let config = LoopConfig {
            tick_rate_hz: 0.0,
            ..LoopConfig::default()
        };
        assert!((config.dt() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ticks_for_seconds() {
        let config = LoopConfig::default();
        assert_eq!(config.ticks_for(3.0), 180);
        assert_eq!(config.ticks_for(0.0), 0);
        assert_eq!(config.ticks_for(-2.0), 0);
    }

    #[test]
    fn rng_is_deterministic() {
        let a: u64 = LoopConfig::with_seed(9).rng().gen();
        let b: u64 = LoopConfig::with_seed(9).rng().gen();
        let c: u64 = LoopConfig::with_seed(10).rng().gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
