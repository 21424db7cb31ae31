//! Per-frame effect configuration.

use serde::{Deserialize, Serialize};

/// Bloom extraction and blur.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Whether bloom runs at all. Disabling releases the bloom chain.
    pub enabled: bool,
    /// Multiplier applied when compositing bloom in the tonemap pass.
    pub strength: f32,
    /// Luminance threshold below which pixels contribute no bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 1.0,
            threshold: 1.0,
        }
    }
}

/// Histogram-driven eye adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveExposureSettings {
    /// Whether the adapted exposure feeds the tonemapper.
    pub enabled: bool,
    /// Scene luminance the adaptation converges toward.
    pub target_luminance: f32,
    /// Fraction of the remaining distance covered each frame.
    pub adaptation_rate: f32,
    /// Lower exposure clamp.
    pub min_exposure: f32,
    /// Upper exposure clamp.
    pub max_exposure: f32,
}

impl Default for AdaptiveExposureSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            target_luminance: 0.58,
            adaptation_rate: 0.05,
            min_exposure: 1.0 / 64.0,
            max_exposure: 64.0,
        }
    }
}

/// Screen-edge darkening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteSettings {
    /// Whether the vignette tonemap variants are selected.
    pub enabled: bool,
    /// Radius where darkening starts, in half-diagonal units.
    pub inner_radius: f32,
    /// Radius where darkening reaches full opacity.
    pub outer_radius: f32,
    /// Maximum darkening.
    pub opacity: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            inner_radius: 0.2,
            outer_radius: 0.8,
            opacity: 1.0,
        }
    }
}

/// Color-fringing along the screen edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaticAberrationSettings {
    /// Whether the chromatic tonemap variants are selected.
    pub enabled: bool,
    /// Channel separation in texels at the screen corner.
    pub strength: f32,
}

impl Default for ChromaticAberrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 4.0,
        }
    }
}

/// Everything the pipeline reads each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessSettings {
    /// Bloom extraction and blur.
    pub bloom: BloomSettings,
    /// Histogram-driven eye adaptation.
    pub adaptive_exposure: AdaptiveExposureSettings,
    /// Screen-edge darkening.
    pub vignette: VignetteSettings,
    /// Color fringing.
    pub chromatic_aberration: ChromaticAberrationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_values() {
        let settings = PostprocessSettings::default();
        assert!(!settings.bloom.enabled);
        assert!((settings.bloom.strength - 1.0).abs() < f32::EPSILON);
        assert!((settings.adaptive_exposure.target_luminance - 0.58).abs() < f32::EPSILON);
        assert!((settings.adaptive_exposure.min_exposure - 1.0 / 64.0).abs() < f32::EPSILON);
        assert!((settings.vignette.outer_radius - 0.8).abs() < f32::EPSILON);
        assert!((settings.chromatic_aberration.strength - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_settings_deserialize_from_partial_input() {
        let settings: PostprocessSettings =
            serde_json::from_str(r#"{"bloom":{"enabled":true}}"#)
                .unwrap_or_else(|_| PostprocessSettings::default());
        assert!(settings.bloom.enabled);
        assert!(
            (settings.bloom.threshold - 1.0).abs() < f32::EPSILON,
            "unspecified fields fall back to defaults"
        );
    }
}
