//! Subtitle-to-speech rendering
//!
//! Turns a parsed subtitle track into one audio buffer:
//!
//! 1. each cue is stripped of markup and synthesized by a [`SpeechSynthesizer`]
//! 2. the returned clip is decoded and edge-faded
//! 3. the clip is placed on the timeline, either back-to-back with a fixed gap
//!    ([`CompositionMode::Compact`]) or at its cue time, shifted forward past
//!    any still-sounding predecessor ([`CompositionMode::Timed`])
//! 4. the finished buffer is peak-normalized and encoded
//!
//! Per-segment failures are logged and skipped; a run only fails when the
//! reference audio is missing, the subtitle file yields no cues, or no
//! segment could be placed at all.
//!
//! # Example
//!
//! ```rust,no_run
//! use srtdub::render::{RenderConfig, RenderJob, RenderPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = RenderPipeline::connect("http://localhost:8000", RenderConfig::timed())?;
//!     let outcome = pipeline
//!         .run(&RenderJob::new("episode.srt", "voice.wav", "episode.wav"))
//!         .await?;
//!     println!("placed {} segments", outcome.report.placed.len());
//!     Ok(())
//! }
//! ```
//!
//! [`SpeechSynthesizer`]: crate::tts::SpeechSynthesizer

pub mod compositor;
pub mod config;
pub mod pipeline;
pub mod placement;

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::AudioError;
use crate::tts::TtsError;

pub use compositor::{
    Compositor, FailureKind, PlacedSegment, RenderReport, RenderedAudio, SegmentFailure,
    SegmentState,
};
pub use config::{CompositionMode, ConfigFile, RenderConfig};
pub use pipeline::{RenderJob, RenderOutcome, RenderPipeline};
pub use placement::{resolve_placement, Placement};

/// Rendering errors
///
/// The `Segment*` and `SampleRateMismatch` variants describe a single cue and
/// are recovered by skipping it; `ReferenceUploadFailed` is only ever logged.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Reference audio not found: {}", .0.display())]
    ReferenceAudioMissing(PathBuf),

    #[error("No subtitle segments found in {}", .0.display())]
    SubtitleParseEmpty(PathBuf),

    #[error("Failed to read subtitles {}: {source}", path.display())]
    SubtitleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Synthesis failed: {0}")]
    SegmentSynthesisFailed(#[source] TtsError),

    #[error("Audio read error: {0}")]
    SegmentDecodeFailed(#[source] AudioError),

    #[error("SR mismatch ({got} vs {expected})")]
    SampleRateMismatch { got: u32, expected: u32 },

    #[error("Upload issue: {0}")]
    ReferenceUploadFailed(#[source] TtsError),

    #[error("No audio was generated ({failed} of {total} segments failed)")]
    NothingPlaced { total: usize, failed: usize },

    #[error("TTS client error: {0}")]
    Client(#[source] TtsError),

    #[error("Failed to write audio: {0}")]
    Encode(#[source] AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderError {
    /// Whether this error only concerns one segment
    #[must_use]
    pub fn is_segment_error(&self) -> bool {
        matches!(
            self,
            Self::SegmentSynthesisFailed(_)
                | Self::SegmentDecodeFailed(_)
                | Self::SampleRateMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
