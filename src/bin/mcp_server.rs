//! `srtdub` MCP Server
//!
//! Exposes subtitle dubbing as a single MCP tool over stdio.
//!
//! # Usage
//!
//! ```bash
//! srtdub-mcp
//! ```
//!
//! stdout carries only the protocol; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_mcp_sdk::macros::{mcp_tool, JsonSchema};
use rust_mcp_sdk::mcp_server::{server_runtime, ServerHandler};
use rust_mcp_sdk::schema::{
    schema_utils::CallToolError, CallToolRequest, CallToolResult, Implementation, InitializeResult,
    ListToolsRequest, ListToolsResult, RpcError, ServerCapabilities, ServerCapabilitiesTools,
    TextContent, LATEST_PROTOCOL_VERSION,
};
use rust_mcp_sdk::{tool_box, McpServer, StdioTransport, TransportOptions};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use srtdub::{CompositionMode, ConfigFile, RenderConfig, RenderJob, RenderOutcome, RenderPipeline};

fn default_output_path() -> String {
    "output.wav".to_string()
}

// ============================================================================
// TOOLS
// ============================================================================

#[mcp_tool(
    name = "convert_srt_to_audio",
    description = "Convert an SRT subtitle file into one speech audio file using a voice-cloning TTS service.

Each cue is synthesized with the voice of the reference audio, edge-faded and
placed on a timeline. Modes:
- compact (default): clips back-to-back with a short gap; also writes a matching .srt
- timed: clips anchored to cue start times, shifted later only to avoid overlap

Returns: Path of the written audio file, or an error message.",
    open_world_hint = true
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ConvertSrtToAudio {
    /// Base URL of the TTS service, e.g. http://localhost:8000
    tts_url: String,
    /// Path to the input .srt file
    srt_file_path: String,
    /// Path to the reference audio whose voice is cloned
    reference_audio_path: String,
    /// Output WAV path (default: output.wav)
    #[serde(default = "default_output_path")]
    output_path: String,
    /// Layout: "compact" or "timed"
    #[serde(default)]
    mode: Option<String>,
    /// Silence between clips in compact mode, in milliseconds
    #[serde(default)]
    gap_ms: Option<u64>,
}

impl ConvertSrtToAudio {
    pub async fn run(&self) -> Result<CallToolResult, CallToolError> {
        let start = Instant::now();
        let text = match self.render().await {
            Ok(outcome) => {
                info!(
                    "Rendered {} in {:.1}s",
                    outcome.audio_path.display(),
                    start.elapsed().as_secs_f64()
                );
                describe(&outcome)
            }
            Err(e) => {
                warn!("convert_srt_to_audio failed: {e:#}");
                format!("Error: {e:#}")
            }
        };

        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    }

    async fn render(&self) -> anyhow::Result<RenderOutcome> {
        let mut config = ConfigFile::load()?.apply(RenderConfig::default());
        if let Some(mode) = &self.mode {
            config = config.with_mode(mode.parse::<CompositionMode>().map_err(anyhow::Error::msg)?);
        }
        if let Some(ms) = self.gap_ms {
            config = config.with_gap(Duration::from_millis(ms));
        }

        let job = RenderJob::new(
            absolute(&self.srt_file_path)?,
            absolute(&self.reference_audio_path)?,
            absolute(&self.output_path)?,
        );

        let pipeline = RenderPipeline::connect(&self.tts_url, config)?;
        Ok(pipeline.run(&job).await?)
    }
}

fn absolute(path: &str) -> anyhow::Result<PathBuf> {
    Ok(std::path::absolute(Path::new(path))?)
}

fn describe(outcome: &RenderOutcome) -> String {
    let report = &outcome.report;
    let mut text = outcome.audio_path.display().to_string();
    text.push_str(&format!(
        "\n\n{} of {} segments placed, {:.2}s of audio",
        report.placed.len(),
        report.total_segments,
        report.duration_secs
    ));
    if !report.failed.is_empty() {
        text.push_str(&format!("\n{} segments failed and were skipped", report.failed.len()));
    }
    if let Some(srt) = &outcome.subtitle_path {
        text.push_str(&format!("\nSubtitles: {}", srt.display()));
    }
    text
}

tool_box!(SrtDubTools, [ConvertSrtToAudio]);

// ============================================================================
// SERVER HANDLER
// ============================================================================

pub struct SrtDubHandler;

#[async_trait]
impl ServerHandler for SrtDubHandler {
    async fn handle_list_tools_request(
        &self,
        _request: ListToolsRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: SrtDubTools::tools(),
        })
    }

    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<CallToolResult, CallToolError> {
        let tool = SrtDubTools::try_from(request.params)
            .map_err(|e| CallToolError::from_message(e.to_string()))?;

        match tool {
            SrtDubTools::ConvertSrtToAudio(t) => t.run().await,
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stderr only, stdout is the protocol channel
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let server_details = InitializeResult {
        server_info: Implementation {
            name: "srtdub".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            title: Some("SRT to Audio Converter".into()),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "srtdub converts SRT subtitles into a single synthesized speech track using a voice-cloning TTS service.".into(),
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let transport = StdioTransport::new(TransportOptions::default())?;
    let handler = SrtDubHandler;
    let server = server_runtime::create_server(server_details, transport, handler);

    Ok(server.start().await?)
}
