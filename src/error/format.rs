//! Format descriptor rejection.

//---------------------------------------------------------------------------------------------------- use
use crate::format::SubFormat;

//---------------------------------------------------------------------------------------------------- FormatError
/// Error that occurs when validating a [`crate::format::WaveFormat`].
///
/// All of these are detected at open time and none are retryable
/// with the same descriptor - the caller needs a different format.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
	#[error("unsupported encoding tag: {0:#06x}")]
	/// The encoding tag is not pcm, float, or an extensible pcm wrapper.
	UnsupportedTag(u16),

	#[error("extensible wrapper around unsupported sub-format: {0}")]
	/// The extensible wrapper carries something other than pcm.
	UnsupportedSubFormat(SubFormat),

	#[error("sample rate is zero")]
	/// The descriptor's sample rate is zero.
	InvalidSampleRate,

	#[error("channel count is zero")]
	/// The descriptor's channel count is zero.
	InvalidChannels,

	#[error("bits per sample is zero or not byte-aligned")]
	/// The descriptor's sample width is zero or not a whole number of bytes.
	InvalidBitsPerSample,
}
