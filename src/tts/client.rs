//! HTTP client for the voice-cloning TTS service
//!
//! Endpoints:
//! - `POST /v2/synthesize` - JSON `{text, audio_path, emo_vector | emo_text}` → audio bytes
//! - `GET  /v1/check/audio?file_name=` - `{ "exists": bool }`
//! - `POST /v1/upload_audio` - multipart `audio` file + `full_path` field

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Emotion, Result, SpeechSynthesizer, SynthesisRequest, TtsError};

/// Timeouts for the three service calls
#[derive(Debug, Clone)]
pub struct TtsClientConfig {
    /// Synthesis is slow; allow minutes
    pub synthesis_timeout: Duration,
    pub check_timeout: Duration,
    pub upload_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TtsClientConfig {
    fn default() -> Self {
        Self {
            synthesis_timeout: Duration::from_secs(300),
            check_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TtsClientConfig {
    #[must_use]
    pub fn with_synthesis_timeout(mut self, timeout: Duration) -> Self {
        self.synthesis_timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct SynthesizePayload<'a> {
    text: &'a str,
    audio_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    emo_vector: Option<&'a [f32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emo_text: Option<&'a str>,
}

impl<'a> SynthesizePayload<'a> {
    fn from_request(request: &'a SynthesisRequest) -> Self {
        let (emo_vector, emo_text) = match &request.emotion {
            Some(Emotion::Vector(v)) => (Some(v.as_slice()), None),
            Some(Emotion::Text(t)) if !t.is_empty() => (None, Some(t.as_str())),
            _ => (None, None),
        };
        Self {
            text: &request.text,
            audio_path: &request.voice_reference,
            emo_vector,
            emo_text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    exists: bool,
}

/// TTS service client
pub struct TtsClient {
    client: Client,
    base_url: String,
    config: TtsClientConfig,
}

impl TtsClient {
    /// Create a client for the service at `base_url` with default timeouts
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, TtsClientConfig::default())
    }

    /// Create a client with custom timeouts
    pub fn with_config(base_url: &str, config: TtsClientConfig) -> Result<Self> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| TtsError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TtsError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    #[instrument(skip(self, request), fields(chars = request.text.chars().count()))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes> {
        let response = self
            .client
            .post(self.endpoint("v2/synthesize"))
            .timeout(self.config.synthesis_timeout)
            .json(&SynthesizePayload::from_request(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        debug!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }

    async fn reference_exists(&self, identifier: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("v1/check/audio"))
            .timeout(self.config.check_timeout)
            .query(&[("file_name", identifier)])
            .send()
            .await?
            .error_for_status()?;

        let check: CheckResponse = response.json().await?;
        Ok(check.exists)
    }

    async fn upload_reference(&self, path: &Path, identifier: &str) -> Result<()> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "reference.wav".to_string(), |n| n.to_string_lossy().to_string());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("audio", part)
            .text("full_path", identifier.to_string());

        let response = self
            .client
            .post(self.endpoint("v1/upload_audio"))
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let ack = response.text().await.unwrap_or_default();
        debug!("Reference upload acknowledged: {ack}");
        Ok(())
    }
}
