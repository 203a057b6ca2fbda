//! Timeline compositor: synthesize, fade, place, normalize
//!
//! Each subtitle segment moves through
//! `Pending → Synthesizing → (Synthesized | Failed) → Placed`, or straight to
//! `Skipped` when it has no speakable text. Synthesis may run ahead of
//! placement (`max_in_flight`), but clips are always placed in cue order so
//! the cursor only ever moves forward.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::{CompositionMode, RenderConfig};
use super::placement::resolve_placement;
use super::{RenderError, Result};
use crate::audio::timeline::frames_for;
use crate::audio::{decode_wav, normalize_peak, Clip, Fader, TimelineBuffer};
use crate::subtitle::{track_end, SubtitleSegment};
use crate::tts::{SpeechSynthesizer, SynthesisRequest, TtsError};

/// Characters of cue text shown in progress and failure logs
const PREVIEW_CHARS: usize = 30;

/// Lifecycle of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentState {
    Pending,
    Synthesizing,
    Synthesized,
    Failed,
    Placed,
    /// No text left after markup stripping
    Skipped,
}

/// Why a segment was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Synthesis,
    Decode,
    SampleRate,
}

/// A segment that reached the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSegment {
    /// Zero-based index in the source track
    pub index: usize,
    /// Original cue text (markup preserved)
    pub text: String,
    /// Cue start from the subtitle file, in seconds
    pub nominal_start: f64,
    /// Actual playback start, in seconds
    pub start: f64,
    /// Actual playback end, in seconds
    pub end: f64,
    pub offset_frames: usize,
    pub frames: usize,
}

impl PlacedSegment {
    /// Seconds the clip was pushed past its cue (timed mode)
    #[must_use]
    pub fn drift(&self) -> f64 {
        (self.start - self.nominal_start).max(0.0)
    }
}

/// A segment that was dropped after a failed synthesis step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFailure {
    pub index: usize,
    pub text: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary of a composition run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub total_segments: usize,
    /// Final state of each segment, in source order
    pub states: Vec<SegmentState>,
    pub placed: Vec<PlacedSegment>,
    pub failed: Vec<SegmentFailure>,
    /// Indices of segments with no speakable text
    pub skipped: Vec<usize>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
    /// Gain applied by peak normalization (1.0 when untouched)
    pub normalization_gain: f32,
}

impl RenderReport {
    /// Segments that had to be shifted later than their cue
    #[must_use]
    pub fn shifted_count(&self) -> usize {
        self.placed.iter().filter(|p| p.drift() > 0.0).count()
    }

    /// Largest forward shift of any segment, in seconds
    #[must_use]
    pub fn max_shift_secs(&self) -> f64 {
        self.placed.iter().map(PlacedSegment::drift).fold(0.0, f64::max)
    }

    /// Shift of the last placed segment: how far the track has drifted by its end
    #[must_use]
    pub fn final_drift_secs(&self) -> f64 {
        self.placed.last().map_or(0.0, PlacedSegment::drift)
    }

    /// Cue list reflecting actual playback times, with unstripped cue texts
    #[must_use]
    pub fn regenerated_subtitles(&self) -> Vec<SubtitleSegment> {
        self.placed
            .iter()
            .map(|p| SubtitleSegment::new(p.start, p.end, p.text.clone()))
            .collect()
    }
}

/// Finished, trimmed and normalized audio plus its report
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    pub audio: Clip,
    pub report: RenderReport,
}

/// Drives synthesis and timeline placement for one subtitle track
pub struct Compositor<'a, S: ?Sized> {
    synthesizer: &'a S,
    voice_reference: String,
    config: RenderConfig,
}

impl<'a, S: SpeechSynthesizer + ?Sized> Compositor<'a, S> {
    /// Create a compositor using `voice_reference` for every synthesis call
    pub fn new(synthesizer: &'a S, voice_reference: impl Into<String>, config: RenderConfig) -> Self {
        Self {
            synthesizer,
            voice_reference: voice_reference.into(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render all segments into one buffer.
    ///
    /// Fails only with [`RenderError::NothingPlaced`] when no segment made it
    /// onto the timeline.
    pub async fn compose(&self, segments: &[SubtitleSegment]) -> Result<RenderedAudio> {
        let total = segments.len();
        let mut states = vec![SegmentState::Pending; total];
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        info!(
            "Composing {} segments ({} mode, {} in flight)",
            total, self.config.mode, self.config.max_in_flight
        );

        let mut jobs = Vec::with_capacity(total);
        for (index, segment) in segments.iter().enumerate() {
            let text = segment.spoken_text();
            if text.is_empty() {
                debug!(segment = index + 1, "Empty after markup stripping, skipping");
                states[index] = SegmentState::Skipped;
                skipped.push(index);
            } else {
                jobs.push((index, text));
            }
        }

        let mut timeline = TimelineState::new(&self.config, track_end(segments));

        // `buffered` yields results in submission order, so placement below
        // is a strictly ordered reduction even with several calls in flight.
        let mut results = stream::iter(jobs)
            .map(|(index, text)| async move {
                info!("[{}/{}] Synthesizing: {}...", index + 1, total, preview(&text));
                let result = self.synthesize_clip(&text).await;
                (index, text, result)
            })
            .buffered(self.config.max_in_flight.max(1));

        while let Some((index, text, result)) = results.next().await {
            let segment = &segments[index];

            let outcome = match result {
                Ok(clip) => {
                    states[index] = SegmentState::Synthesized;
                    timeline.place(index, segment, clip)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(placed) => {
                    debug!(
                        segment = index + 1,
                        start = placed.start,
                        end = placed.end,
                        "Placed"
                    );
                    states[index] = SegmentState::Placed;
                    timeline.placed.push(placed);
                }
                Err(e) => {
                    warn!(segment = index + 1, text = %preview(&text), "  -> {e}, skipping");
                    states[index] = SegmentState::Failed;
                    failed.push(SegmentFailure {
                        index,
                        text: segment.text.clone(),
                        kind: failure_kind(&e),
                        message: e.to_string(),
                    });
                }
            }
        }

        let Some((mut audio, placed)) = timeline.finish() else {
            return Err(RenderError::NothingPlaced {
                total,
                failed: failed.len(),
            });
        };

        let normalization_gain = if self.config.normalize {
            normalize_peak(&mut audio.samples)
        } else {
            1.0
        };
        if normalization_gain < 1.0 {
            info!("Normalized peak (gain {normalization_gain:.3})");
        }

        let report = RenderReport {
            total_segments: total,
            states,
            placed,
            failed,
            skipped,
            sample_rate: audio.sample_rate,
            channels: audio.channels,
            duration_secs: audio.duration().as_secs_f64(),
            normalization_gain,
        };

        info!(
            "Composed {} of {} segments into {:.2}s of audio",
            report.placed.len(),
            total,
            report.duration_secs
        );

        Ok(RenderedAudio { audio, report })
    }

    /// One bounded synthesis call, decoded
    async fn synthesize_clip(&self, text: &str) -> Result<Clip> {
        let request = SynthesisRequest::new(text, self.voice_reference.as_str())
            .with_emotion(self.config.emotion.clone());
        let timeout = self.config.synthesis_timeout;

        let bytes = match tokio::time::timeout(timeout, self.synthesizer.synthesize(&request)).await
        {
            Ok(result) => result.map_err(RenderError::SegmentSynthesisFailed)?,
            Err(_) => {
                return Err(RenderError::SegmentSynthesisFailed(TtsError::Timeout(
                    timeout,
                )))
            }
        };

        decode_wav(&bytes).map_err(RenderError::SegmentDecodeFailed)
    }
}

/// Mutable placement state owned by one `compose` call
struct TimelineState {
    mode: CompositionMode,
    fader: Fader,
    gap: std::time::Duration,
    timed_extent: std::time::Duration,
    headroom: std::time::Duration,
    buffer: Option<TimelineBuffer>,
    /// Earliest frame the next clip may start at
    cursor: usize,
    placed: Vec<PlacedSegment>,
}

impl TimelineState {
    fn new(config: &RenderConfig, track_end_secs: f64) -> Self {
        Self {
            mode: config.mode,
            fader: Fader::new(config.fade),
            gap: config.gap,
            timed_extent: std::time::Duration::from_secs_f64(track_end_secs.max(0.0))
                + config.timed_margin,
            headroom: config.growth_headroom,
            buffer: None,
            cursor: 0,
            placed: Vec::new(),
        }
    }

    fn place(
        &mut self,
        index: usize,
        segment: &SubtitleSegment,
        mut clip: Clip,
    ) -> Result<PlacedSegment> {
        if let Some(buffer) = &self.buffer {
            if clip.sample_rate != buffer.sample_rate() {
                return Err(RenderError::SampleRateMismatch {
                    got: clip.sample_rate,
                    expected: buffer.sample_rate(),
                });
            }
        }

        let sample_rate = clip.sample_rate;
        let initial_frames = match self.mode {
            CompositionMode::Timed => frames_for(self.timed_extent, sample_rate),
            CompositionMode::Compact => 0,
        };
        let headroom = self.headroom;
        let buffer = self.buffer.get_or_insert_with(|| {
            debug!(
                "Timeline established at {} Hz, {} ch",
                sample_rate, clip.channels
            );
            TimelineBuffer::new(sample_rate, clip.channels, initial_frames).with_headroom(headroom)
        });

        self.fader.apply(&mut clip);

        let (nominal, offset) = match self.mode {
            CompositionMode::Compact => (self.cursor, self.cursor),
            CompositionMode::Timed => {
                let placement = resolve_placement(segment.start, sample_rate, self.cursor);
                if placement.is_shifted() {
                    debug!(
                        segment = index + 1,
                        shift_frames = placement.shift(),
                        "Auto-shifted past previous clip"
                    );
                }
                (placement.nominal, placement.offset)
            }
        };

        let frames = clip.frames();
        buffer.write(offset, &clip);

        let end = offset + frames;
        self.cursor = match self.mode {
            CompositionMode::Compact => end + frames_for(self.gap, sample_rate),
            CompositionMode::Timed => end,
        };

        let rate = f64::from(sample_rate);
        Ok(PlacedSegment {
            index,
            text: segment.text.clone(),
            nominal_start: match self.mode {
                CompositionMode::Compact => offset as f64 / rate,
                CompositionMode::Timed => nominal as f64 / rate,
            },
            start: offset as f64 / rate,
            end: end as f64 / rate,
            offset_frames: offset,
            frames,
        })
    }

    /// Trim to the cursor; `None` if nothing was placed
    fn finish(self) -> Option<(Clip, Vec<PlacedSegment>)> {
        if self.placed.is_empty() {
            return None;
        }
        let mut buffer = self.buffer?;
        // Compact mode keeps the trailing gap
        buffer.ensure_capacity(self.cursor);
        Some((buffer.trim(self.cursor), self.placed))
    }
}

fn failure_kind(error: &RenderError) -> FailureKind {
    match error {
        RenderError::SegmentDecodeFailed(_) => FailureKind::Decode,
        RenderError::SampleRateMismatch { .. } => FailureKind::SampleRate,
        _ => FailureKind::Synthesis,
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
