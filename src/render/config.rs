//! Render configuration and the optional `~/.config/srtdub/config.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::fade::DEFAULT_FADE;
use crate::audio::timeline::DEFAULT_HEADROOM;
use crate::audio::SampleEncoding;
use crate::tts::Emotion;

/// How clips are laid out on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    /// Back-to-back with a fixed silence gap; cue times are regenerated
    #[default]
    Compact,
    /// Anchored to cue start times, shifted forward to avoid overlap
    Timed,
}

impl FromStr for CompositionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" | "gap" => Ok(Self::Compact),
            "timed" | "sync" => Ok(Self::Timed),
            other => Err(format!("unknown mode: {other} (expected compact or timed)")),
        }
    }
}

impl std::fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Timed => "timed",
        })
    }
}

/// Rendering parameters
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub mode: CompositionMode,
    /// Silence appended after every clip in compact mode
    pub gap: Duration,
    /// Edge fade window
    pub fade: Duration,
    /// Extra room past the last cue when pre-sizing a timed buffer
    pub timed_margin: Duration,
    /// Extra room allocated whenever the buffer grows
    pub growth_headroom: Duration,
    /// Upper bound for a single synthesis call
    pub synthesis_timeout: Duration,
    /// Synthesis calls kept in flight; placement stays in cue order
    pub max_in_flight: usize,
    pub encoding: SampleEncoding,
    pub emotion: Option<Emotion>,
    /// Rescale the result when its peak exceeds full scale
    pub normalize: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: CompositionMode::default(),
            gap: Duration::from_millis(200),
            fade: DEFAULT_FADE,
            timed_margin: Duration::from_secs(1),
            growth_headroom: DEFAULT_HEADROOM,
            synthesis_timeout: Duration::from_secs(300),
            max_in_flight: 1,
            encoding: SampleEncoding::default(),
            emotion: None,
            normalize: true,
        }
    }
}

impl RenderConfig {
    /// Compact mode with default settings
    #[must_use]
    pub fn compact() -> Self {
        Self::default()
    }

    /// Timed mode with default settings
    #[must_use]
    pub fn timed() -> Self {
        Self {
            mode: CompositionMode::Timed,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    #[must_use]
    pub fn with_synthesis_timeout(mut self, timeout: Duration) -> Self {
        self.synthesis_timeout = timeout;
        self
    }

    /// Keep up to `n` synthesis calls in flight (minimum 1)
    #[must_use]
    pub fn with_max_in_flight(mut self, n: usize) -> Self {
        self.max_in_flight = n.max(1);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: SampleEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_emotion(mut self, emotion: Option<Emotion>) -> Self {
        self.emotion = emotion;
        self
    }

    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// `[service]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSection {
    /// Synthesis timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// `[render]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderSection {
    pub mode: Option<CompositionMode>,
    pub gap_ms: Option<u64>,
    pub fade_ms: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub encoding: Option<SampleEncoding>,
    pub emotion_text: Option<String>,
    pub emotion_vector: Option<Vec<f32>>,
}

/// User configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub render: RenderSection,
}

impl ConfigFile {
    /// Load `~/.config/srtdub/config.toml`.
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load a config file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Overlay the file's values onto `config`
    #[must_use]
    pub fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(secs) = self.service.timeout_secs {
            config.synthesis_timeout = Duration::from_secs(secs);
        }

        let render = &self.render;
        if let Some(mode) = render.mode {
            config.mode = mode;
        }
        if let Some(ms) = render.gap_ms {
            config.gap = Duration::from_millis(ms);
        }
        if let Some(ms) = render.fade_ms {
            config.fade = Duration::from_millis(ms);
        }
        if let Some(n) = render.max_in_flight {
            config.max_in_flight = n.max(1);
        }
        if let Some(encoding) = render.encoding {
            config.encoding = encoding;
        }
        // Vector wins over text, matching the service's own precedence
        if let Some(ref vector) = render.emotion_vector {
            config.emotion = Some(Emotion::Vector(vector.clone()));
        } else if let Some(ref text) = render.emotion_text {
            config.emotion = Some(Emotion::Text(text.clone()));
        }

        config
    }
}

/// Path to the user config file
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("srtdub")
        .join("config.toml")
}
