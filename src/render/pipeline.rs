//! End-to-end render: reference preparation, parse, compose, write

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::compositor::{Compositor, RenderReport};
use super::config::{CompositionMode, RenderConfig};
use super::{RenderError, Result};
use crate::audio::write_wav;
use crate::subtitle::{read_srt, SrtGenerator};
use crate::tts::{SpeechSynthesizer, TtsClient, TtsClientConfig};

/// Input and output paths for one render
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub subtitle_path: PathBuf,
    pub reference_audio: PathBuf,
    pub output_path: PathBuf,
}

impl RenderJob {
    pub fn new(
        subtitle_path: impl Into<PathBuf>,
        reference_audio: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            subtitle_path: subtitle_path.into(),
            reference_audio: reference_audio.into(),
            output_path: output_path.into(),
        }
    }

    /// Regenerated subtitle path: the output path with an `.srt` extension
    #[must_use]
    pub fn subtitle_output_path(&self) -> PathBuf {
        self.output_path.with_extension("srt")
    }
}

/// Files written by a successful render
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub audio_path: PathBuf,
    /// Only written in compact mode
    pub subtitle_path: Option<PathBuf>,
    pub report: RenderReport,
}

/// Renders subtitle files through a speech synthesizer
pub struct RenderPipeline<S> {
    synthesizer: S,
    config: RenderConfig,
}

impl RenderPipeline<TtsClient> {
    /// Pipeline backed by the HTTP service at `base_url`
    pub fn connect(base_url: &str, config: RenderConfig) -> Result<Self> {
        let client_config =
            TtsClientConfig::default().with_synthesis_timeout(config.synthesis_timeout);
        let client = TtsClient::with_config(base_url, client_config).map_err(RenderError::Client)?;
        Ok(Self::new(client, config))
    }
}

impl<S: SpeechSynthesizer> RenderPipeline<S> {
    pub fn new(synthesizer: S, config: RenderConfig) -> Self {
        Self {
            synthesizer,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Run one job.
    ///
    /// Nothing is written unless at least one segment was placed.
    pub async fn run(&self, job: &RenderJob) -> Result<RenderOutcome> {
        let reference = absolute(&job.reference_audio)?;
        if !reference.is_file() {
            return Err(RenderError::ReferenceAudioMissing(reference));
        }
        let identifier = reference.to_string_lossy().to_string();

        self.prepare_reference(&reference, &identifier).await;

        let segments = read_srt(&job.subtitle_path)
            .await
            .map_err(|source| RenderError::SubtitleRead {
                path: job.subtitle_path.clone(),
                source,
            })?;
        if segments.is_empty() {
            return Err(RenderError::SubtitleParseEmpty(job.subtitle_path.clone()));
        }
        info!(
            "Parsed {} segments from {}",
            segments.len(),
            job.subtitle_path.display()
        );

        let compositor = Compositor::new(&self.synthesizer, identifier, self.config.clone());
        let rendered = compositor.compose(&segments).await?;

        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        write_wav(&job.output_path, &rendered.audio, self.config.encoding)
            .map_err(RenderError::Encode)?;
        info!("Saved: {}", job.output_path.display());

        let subtitle_path = if self.config.mode == CompositionMode::Compact {
            let path = job.subtitle_output_path();
            SrtGenerator::new()
                .write_to_file(&rendered.report.regenerated_subtitles(), &path)
                .await?;
            info!("Saved: {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(RenderOutcome {
            audio_path: job.output_path.clone(),
            subtitle_path,
            report: rendered.report,
        })
    }

    /// Make sure the service knows the reference voice.
    ///
    /// A failed check counts as "not present"; a failed upload is only a
    /// warning since synthesis may still succeed.
    async fn prepare_reference(&self, path: &Path, identifier: &str) {
        let exists = match self.synthesizer.reference_exists(identifier).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Reference check failed: {e}");
                false
            }
        };

        if exists {
            debug!("Reference already on server: {identifier}");
            return;
        }

        info!("Uploading reference audio {}", path.display());
        if let Err(e) = self.synthesizer.upload_reference(path, identifier).await {
            warn!("{}", RenderError::ReferenceUploadFailed(e));
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
