//! `srtdub` CLI - Dub subtitle files with a voice-cloning TTS service

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use srtdub::{CompositionMode, SampleEncoding};

#[derive(Parser)]
#[command(name = "srtdub")]
#[command(about = "Turn SRT subtitles into a single synthesized speech track")]
#[command(version)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize every cue and write one WAV file
    Render {
        /// TTS service base URL (e.g. <http://localhost:8000>)
        url: String,

        /// Subtitle file (.srt)
        srt: PathBuf,

        /// Reference audio of the voice to clone
        reference: PathBuf,

        /// Output WAV path
        #[arg(short, long, default_value = "output.wav")]
        output: PathBuf,

        /// Layout: compact (back-to-back) or timed (anchored to cue times)
        #[arg(short, long)]
        mode: Option<CompositionMode>,

        /// Silence between clips in compact mode, in milliseconds
        #[arg(long)]
        gap_ms: Option<u64>,

        /// Edge fade length, in milliseconds
        #[arg(long)]
        fade_ms: Option<u64>,

        /// Synthesis calls kept in flight
        #[arg(short = 'j', long)]
        max_in_flight: Option<usize>,

        /// Per-segment synthesis timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Output sample encoding (pcm16, float32)
        #[arg(short, long)]
        encoding: Option<SampleEncoding>,

        /// Emotion description forwarded to the service
        #[arg(long)]
        emo_text: Option<String>,

        /// Emotion weights, comma-separated (takes precedence over --emo-text)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        emo_vector: Option<Vec<f32>>,

        /// Keep the raw mix even if it clips
        #[arg(long)]
        no_normalize: bool,

        /// Print the render report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a subtitle file and list its cues without synthesizing
    Inspect {
        /// Subtitle file (.srt)
        srt: PathBuf,

        /// Print cues as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only results
    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Render {
            url,
            srt,
            reference,
            output,
            mode,
            gap_ms,
            fade_ms,
            max_in_flight,
            timeout_secs,
            encoding,
            emo_text,
            emo_vector,
            no_normalize,
            json,
        } => {
            let overrides = cmd::render::RenderOverrides {
                mode,
                gap_ms,
                fade_ms,
                max_in_flight,
                timeout_secs,
                encoding,
                emo_text,
                emo_vector,
                no_normalize,
            };
            cmd::cmd_render(&url, srt, reference, output, overrides, json).await?;
        }
        Commands::Inspect { srt, json } => {
            cmd::cmd_inspect(&srt, json).await?;
        }
    }

    Ok(())
}
