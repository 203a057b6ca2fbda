use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use srtdub::render::RenderReport;
use srtdub::{
    CompositionMode, ConfigFile, Emotion, RenderConfig, RenderJob, RenderPipeline, SampleEncoding,
};

/// Command-line values that override the config file
#[derive(Debug, Default)]
pub struct RenderOverrides {
    pub mode: Option<CompositionMode>,
    pub gap_ms: Option<u64>,
    pub fade_ms: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub encoding: Option<SampleEncoding>,
    pub emo_text: Option<String>,
    pub emo_vector: Option<Vec<f32>>,
    pub no_normalize: bool,
}

impl RenderOverrides {
    fn apply(self, mut config: RenderConfig) -> RenderConfig {
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(ms) = self.gap_ms {
            config = config.with_gap(Duration::from_millis(ms));
        }
        if let Some(ms) = self.fade_ms {
            config = config.with_fade(Duration::from_millis(ms));
        }
        if let Some(n) = self.max_in_flight {
            config = config.with_max_in_flight(n);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_synthesis_timeout(Duration::from_secs(secs));
        }
        if let Some(encoding) = self.encoding {
            config = config.with_encoding(encoding);
        }
        if let Some(vector) = self.emo_vector {
            config = config.with_emotion(Some(Emotion::Vector(vector)));
        } else if let Some(text) = self.emo_text {
            config = config.with_emotion(Some(Emotion::Text(text)));
        }
        if self.no_normalize {
            config = config.with_normalize(false);
        }
        config
    }
}

pub async fn cmd_render(
    url: &str,
    srt: PathBuf,
    reference: PathBuf,
    output: PathBuf,
    overrides: RenderOverrides,
    json: bool,
) -> Result<()> {
    let file = ConfigFile::load().context("failed to load config file")?;
    let config = overrides.apply(file.apply(RenderConfig::default()));
    let mode = config.mode;

    let pipeline = RenderPipeline::connect(url, config)?;
    let outcome = pipeline.run(&RenderJob::new(srt, reference, output)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    println!("💾 Saved: {}", outcome.audio_path.display());
    if let Some(path) = &outcome.subtitle_path {
        println!("📝 Subtitles: {}", path.display());
    }
    print_summary(&outcome.report, mode);

    Ok(())
}

fn print_summary(report: &RenderReport, mode: CompositionMode) {
    println!(
        "🔊 {:.2}s @ {} Hz, {} ch",
        report.duration_secs, report.sample_rate, report.channels
    );
    println!(
        "   Placed: {}/{}  Failed: {}  Skipped: {}",
        report.placed.len(),
        report.total_segments,
        report.failed.len(),
        report.skipped.len()
    );

    if mode == CompositionMode::Timed {
        println!(
            "   Drift: {} shifted, max {:.3}s, final {:.3}s",
            report.shifted_count(),
            report.max_shift_secs(),
            report.final_drift_secs()
        );
    }

    for failure in &report.failed {
        println!(
            "   ⚠️  #{} {}: {}",
            failure.index + 1,
            truncate_text(&failure.text, 30),
            failure.message
        );
    }
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}
