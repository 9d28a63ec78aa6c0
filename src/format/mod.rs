//! Negotiated audio format descriptors.

mod format;
pub use format::{FormatTag,SubFormat,WaveFormat};
