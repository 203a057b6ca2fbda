//! Remote text-to-speech service access
//!
//! [`SpeechSynthesizer`] is the seam between the compositor and the service:
//! [`TtsClient`] talks HTTP, tests substitute in-memory implementations.

pub mod client;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{TtsClient, TtsClientConfig};

/// TTS service errors
#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Server returned no audio data")]
    EmptyAudio,

    #[error("Synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TtsError>;

/// Emotion guidance forwarded to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Free-form description, e.g. "calm and warm"
    Text(String),
    /// Model-specific emotion weights
    Vector(Vec<f32>),
}

/// One synthesis call
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Markup-free text to speak
    pub text: String,
    /// Identifier of the voice reference the service should clone
    pub voice_reference: String,
    pub emotion: Option<Emotion>,
}

impl SynthesisRequest {
    #[must_use]
    pub fn new(text: impl Into<String>, voice_reference: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_reference: voice_reference.into(),
            emotion: None,
        }
    }

    #[must_use]
    pub fn with_emotion(mut self, emotion: Option<Emotion>) -> Self {
        self.emotion = emotion;
        self
    }
}

/// Text + voice reference → encoded audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one request, returning the encoded audio body
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes>;

    /// Whether the service already stores the voice reference `identifier`
    async fn reference_exists(&self, _identifier: &str) -> Result<bool> {
        Ok(true)
    }

    /// Upload the local reference audio at `path`, stored under `identifier`
    async fn upload_reference(&self, _path: &Path, _identifier: &str) -> Result<()> {
        Ok(())
    }
}
