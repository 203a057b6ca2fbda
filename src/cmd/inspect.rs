use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use srtdub::subtitle::{format_srt_time, read_srt, track_end};

#[derive(Serialize)]
struct CueRow<'a> {
    index: usize,
    start: f64,
    end: f64,
    text: &'a str,
    spoken: String,
}

pub async fn cmd_inspect(srt: &Path, json: bool) -> Result<()> {
    let segments = read_srt(srt)
        .await
        .with_context(|| format!("failed to read {}", srt.display()))?;

    if segments.is_empty() {
        bail!("No subtitle segments found in {}", srt.display());
    }

    if json {
        let rows: Vec<CueRow<'_>> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| CueRow {
                index: i + 1,
                start: s.start,
                end: s.end,
                text: &s.text,
                spoken: s.spoken_text(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let silent = segments.iter().filter(|s| s.spoken_text().is_empty()).count();
    println!("📄 {}", srt.display());
    println!(
        "   {} segments, span {} → {}",
        segments.len(),
        format_srt_time(segments.iter().map(|s| s.start).fold(f64::INFINITY, f64::min)),
        format_srt_time(track_end(&segments))
    );
    if silent > 0 {
        println!("   {silent} without speakable text (will be skipped)");
    }
    println!();

    for (i, seg) in segments.iter().enumerate() {
        println!(
            "{:>4}  {} --> {}  {}",
            i + 1,
            format_srt_time(seg.start),
            format_srt_time(seg.end),
            seg.text
        );
    }

    Ok(())
}
