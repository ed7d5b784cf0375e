//! Render configuration (TOML file + defaults)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::render::RenderError;
use crate::synth::Waveform;

/// Supported PCM bit depths
pub const SUPPORTED_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub waveform: Waveform,
    /// Linear fade at each note boundary, in milliseconds
    pub fade_ms: f64,
    /// Scale the mix down when its peak exceeds full scale
    pub normalize: bool,
    /// Worker threads for per-entry synthesis (1 = inline)
    pub render_threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_depth: 16,
            waveform: Waveform::Sine,
            fade_ms: 5.0,
            normalize: true,
            render_threads: 1,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.sample_rate == 0 {
            return Err(RenderError::InvalidSampleRate(self.sample_rate));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(RenderError::UnsupportedBitDepth(self.bit_depth));
        }
        Ok(())
    }

    /// Load from an explicit TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded render config");
        Ok(config)
    }

    /// Load from the user config directory, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Self::default()
        })
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("muco")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.bit_depth, 16);
        assert_eq!(config.waveform, Waveform::Sine);
        assert_eq!(config.fade_ms, 5.0);
        assert!(config.normalize);
        assert_eq!(config.render_threads, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RenderConfig = toml::from_str("waveform = \"square\"\nbit_depth = 24\n").unwrap();
        assert_eq!(config.waveform, Waveform::Square);
        assert_eq!(config.bit_depth, 24);
        assert_eq!(config.sample_rate, 44100);
    }

    #[test]
    fn test_unknown_waveform_rejected() {
        assert!(toml::from_str::<RenderConfig>("waveform = \"organ\"").is_err());
    }

    #[test]
    fn test_validate() {
        let config = RenderConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidSampleRate(0))));
        let config = RenderConfig {
            bit_depth: 20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::UnsupportedBitDepth(20))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sample_rate = 22050\nnormalize = false\n").unwrap();
        let config = RenderConfig::load(&path).unwrap();
        assert_eq!(config.sample_rate, 22050);
        assert!(!config.normalize);

        std::fs::write(&path, "sample_rate = \"fast\"").unwrap();
        assert!(matches!(RenderConfig::load(&path), Err(RenderError::Config(_))));
        assert!(matches!(
            RenderConfig::load(&dir.path().join("missing.toml")),
            Err(RenderError::Io(_))
        ));
    }

    #[test]
    fn test_config_path() {
        assert!(config_path().ends_with("muco/config.toml"));
    }
}
