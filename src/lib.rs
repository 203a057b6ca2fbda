//! `srtdub` - Subtitle-driven voice dubbing
//!
//! Reads an SRT file, synthesizes each cue through a voice-cloning TTS
//! service and assembles the clips into one WAV file.
//!
//! # Features
//!
//! - **Two layouts**: compact (back-to-back with a fixed gap, regenerated SRT)
//!   or timed (anchored to cue times, shifted forward to avoid overlap)
//! - **Clean splices**: linear edge fades on every clip, peak normalization
//! - **Resilient**: failed, undecodable or mismatched segments are skipped
//! - **Ordered prefetch**: several synthesis calls in flight, placement in cue order
//!
//! # Example
//!
//! ```rust,no_run
//! use srtdub::{Compositor, RenderConfig, TtsClient};
//! use srtdub::subtitle::parse_srt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TtsClient::new("http://localhost:8000")?;
//!     let segments = parse_srt(&std::fs::read_to_string("episode.srt")?);
//!     let rendered = Compositor::new(&client, "/refs/voice.wav", RenderConfig::timed())
//!         .compose(&segments)
//!         .await?;
//!     println!("{:.1}s of audio", rendered.report.duration_secs);
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod render;
pub mod subtitle;
pub mod tts;

pub use audio::{Clip, Fader, SampleEncoding, TimelineBuffer};
pub use render::{
    CompositionMode, Compositor, ConfigFile, RenderConfig, RenderError, RenderJob, RenderOutcome,
    RenderPipeline, RenderReport,
};
pub use subtitle::{parse_srt, SrtGenerator, SubtitleSegment};
pub use tts::{Emotion, SpeechSynthesizer, SynthesisRequest, TtsClient, TtsError};

/// Version of srtdub
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
