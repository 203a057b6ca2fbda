//! WAV decode/encode via `hound`

use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AudioError, Clip, Result};

/// Sample encoding for the rendered WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 16-bit signed PCM, clamped to full scale
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

impl FromStr for SampleEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pcm16" | "s16" | "int16" => Ok(Self::Pcm16),
            "float32" | "f32" | "float" => Ok(Self::Float32),
            other => Err(format!("unknown sample encoding: {other} (expected pcm16 or float32)")),
        }
    }
}

/// Decode WAV bytes into an interleaved f32 clip
pub fn decode_wav(bytes: &[u8]) -> Result<Clip> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{}-bit float",
                    spec.bits_per_sample
                )));
            }
            reader.samples::<f32>().collect::<std::result::Result<_, _>>()?
        }
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{}-bit integer",
                    spec.bits_per_sample
                )));
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if samples.is_empty() {
        return Err(AudioError::Empty);
    }

    debug!(
        "Decoded {} samples ({} Hz, {} ch, {}-bit)",
        samples.len(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    Ok(Clip::new(samples, spec.sample_rate, spec.channels))
}

/// Encode a clip as an in-memory WAV file
pub fn encode_wav(clip: &Clip, encoding: SampleEncoding) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec_for(clip, encoding))?;
        write_samples(&mut writer, clip, encoding)?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write a clip to a WAV file on disk
pub fn write_wav(path: &Path, clip: &Clip, encoding: SampleEncoding) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, spec_for(clip, encoding))?;
    write_samples(&mut writer, clip, encoding)?;
    writer.finalize()?;
    Ok(())
}

fn spec_for(clip: &Clip, encoding: SampleEncoding) -> hound::WavSpec {
    match encoding {
        SampleEncoding::Pcm16 => hound::WavSpec {
            channels: clip.channels,
            sample_rate: clip.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        },
        SampleEncoding::Float32 => hound::WavSpec {
            channels: clip.channels,
            sample_rate: clip.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        },
    }
}

fn write_samples<W: std::io::Write + std::io::Seek>(
    writer: &mut hound::WavWriter<W>,
    clip: &Clip,
    encoding: SampleEncoding,
) -> Result<()> {
    match encoding {
        SampleEncoding::Pcm16 => {
            for sample in &clip.samples {
                let clamped = sample.clamp(-1.0, 1.0);
                writer.write_sample((clamped * f32::from(i16::MAX)) as i16)?;
            }
        }
        SampleEncoding::Float32 => {
            for sample in &clip.samples {
                writer.write_sample(*sample)?;
            }
        }
    }
    Ok(())
}
