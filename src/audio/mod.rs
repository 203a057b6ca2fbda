//! Audio primitives for timeline composition
//!
//! - [`Clip`]: one decoded, interleaved f32 buffer
//! - [`Fader`]: linear edge fades at splice boundaries
//! - [`TimelineBuffer`]: growable mix buffer with a fixed format
//! - [`normalize_peak`]: clipping-prevention rescale
//! - [`wav`]: WAV decode of service responses and encode of the final render

pub mod clip;
pub mod fade;
pub mod normalize;
pub mod timeline;
pub mod wav;

use thiserror::Error;

pub use clip::Clip;
pub use fade::Fader;
pub use normalize::{normalize_peak, peak};
pub use timeline::TimelineBuffer;
pub use wav::{decode_wav, write_wav, SampleEncoding};

/// Audio decode/encode errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("WAV decode error: {0}")]
    Decode(#[from] hound::Error),

    #[error("Empty audio: no frames decoded")]
    Empty,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AudioError>;
