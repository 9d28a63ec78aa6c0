//! The format descriptor a [`crate::Session`] is opened with.
//!
//! A [`WaveFormat`] describes the raw sample stream the caller
//! will be pushing: rate, channel count, sample width, encoding.
//!
//! The descriptor is validated once, at open time. It is
//! immutable for the lifetime of the open session - changing
//! format means closing and re-opening.

//---------------------------------------------------------------------------------------------------- use
use crate::error::FormatError;

//---------------------------------------------------------------------------------------------------- FormatTag
/// The encoding of a [`WaveFormat`].
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatTag {
	/// Integer pulse-code-modulation.
	Pcm,
	/// IEEE floating point samples.
	IeeeFloat,
	/// An extensible wrapper around a [`SubFormat`].
	///
	/// Only [`SubFormat::Pcm`] is accepted by [`WaveFormat::validate`].
	Extensible(SubFormat),
	/// Any other registered encoding tag, carried raw.
	///
	/// Always rejected at open time.
	Other(u16),
}

//---------------------------------------------------------------------------------------------------- SubFormat
/// The inner encoding of an [`FormatTag::Extensible`] wrapper.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash,strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubFormat {
	/// Integer pulse-code-modulation.
	#[strum(serialize = "pcm")]
	Pcm,
	/// IEEE floating point samples.
	#[strum(serialize = "ieee-float")]
	IeeeFloat,
	/// Anything else.
	#[strum(serialize = "unknown")]
	Unknown,
}

//---------------------------------------------------------------------------------------------------- WaveFormat
/// A negotiated audio format.
///
/// ```rust
/// # use wavesink::format::*;
/// let format = WaveFormat {
///     sample_rate:     44_100,
///     channels:        2,
///     bits_per_sample: 16,
///     tag:             FormatTag::Pcm,
/// };
/// assert_eq!(format.block_align(), 4);
/// assert_eq!(format.byte_rate(), 176_400);
/// assert!(format.validate().is_ok());
/// ```
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaveFormat {
	/// Sample frames per second, per channel.
	pub sample_rate: u32,
	/// Interleaved channel count.
	pub channels: u16,
	/// Width of a single sample, in bits.
	pub bits_per_sample: u16,
	/// The sample encoding.
	pub tag: FormatTag,
}

impl WaveFormat {
	#[inline]
	#[must_use]
	/// Size of one interleaved frame, in bytes.
	pub const fn block_align(&self) -> u16 {
		self.channels * (self.bits_per_sample / 8)
	}

	#[inline]
	#[must_use]
	/// Payload bytes consumed per second of playback.
	pub const fn byte_rate(&self) -> u32 {
		self.sample_rate * self.block_align() as u32
	}

	/// Check this descriptor is well-formed and the encoding supported.
	///
	/// Accepted encodings are [`FormatTag::Pcm`], [`FormatTag::IeeeFloat`],
	/// and an [`FormatTag::Extensible`] wrapper around [`SubFormat::Pcm`].
	///
	/// # Errors
	/// Any zero field, a sample width that is not a whole number
	/// of bytes, or an unsupported encoding is a [`FormatError`].
	/// None of these are retryable with the same descriptor.
	pub const fn validate(&self) -> Result<(), FormatError> {
		if self.sample_rate == 0 {
			return Err(FormatError::InvalidSampleRate);
		}
		if self.channels == 0 {
			return Err(FormatError::InvalidChannels);
		}
		if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
			return Err(FormatError::InvalidBitsPerSample);
		}

		match self.tag {
			FormatTag::Pcm | FormatTag::IeeeFloat => Ok(()),
			FormatTag::Extensible(SubFormat::Pcm) => Ok(()),
			FormatTag::Extensible(sub) => Err(FormatError::UnsupportedSubFormat(sub)),
			FormatTag::Other(tag) => Err(FormatError::UnsupportedTag(tag)),
		}
	}

	#[inline]
	#[must_use]
	/// Does this format carry floating point samples?
	pub(crate) const fn is_float(&self) -> bool {
		matches!(self.tag, FormatTag::IeeeFloat | FormatTag::Extensible(SubFormat::IeeeFloat))
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	/// A descriptor the validator must accept.
	fn pcm16() -> WaveFormat {
		WaveFormat {
			sample_rate:     44_100,
			channels:        2,
			bits_per_sample: 16,
			tag:             FormatTag::Pcm,
		}
	}

	#[test]
	fn accepts_supported_encodings() {
		assert_eq!(pcm16().validate(), Ok(()));

		let float = WaveFormat { tag: FormatTag::IeeeFloat, bits_per_sample: 32, ..pcm16() };
		assert_eq!(float.validate(), Ok(()));

		let wrapped = WaveFormat { tag: FormatTag::Extensible(SubFormat::Pcm), ..pcm16() };
		assert_eq!(wrapped.validate(), Ok(()));
	}

	#[test]
	fn rejects_unsupported_encodings() {
		// 0x0002 is ADPCM in the registration namespace
		// the raw tags are carried from.
		let adpcm = WaveFormat { tag: FormatTag::Other(0x0002), ..pcm16() };
		assert_eq!(adpcm.validate(), Err(FormatError::UnsupportedTag(0x0002)));

		let wrapped = WaveFormat { tag: FormatTag::Extensible(SubFormat::Unknown), ..pcm16() };
		assert_eq!(wrapped.validate(), Err(FormatError::UnsupportedSubFormat(SubFormat::Unknown)));

		// An extensible wrapper around float is not the pcm wrapper we accept.
		let wrapped = WaveFormat { tag: FormatTag::Extensible(SubFormat::IeeeFloat), ..pcm16() };
		assert_eq!(wrapped.validate(), Err(FormatError::UnsupportedSubFormat(SubFormat::IeeeFloat)));
	}

	#[test]
	fn rejects_malformed_descriptors() {
		let zero_rate = WaveFormat { sample_rate: 0, ..pcm16() };
		assert_eq!(zero_rate.validate(), Err(FormatError::InvalidSampleRate));

		let zero_channels = WaveFormat { channels: 0, ..pcm16() };
		assert_eq!(zero_channels.validate(), Err(FormatError::InvalidChannels));

		let zero_bits = WaveFormat { bits_per_sample: 0, ..pcm16() };
		assert_eq!(zero_bits.validate(), Err(FormatError::InvalidBitsPerSample));

		let ragged_bits = WaveFormat { bits_per_sample: 12, ..pcm16() };
		assert_eq!(ragged_bits.validate(), Err(FormatError::InvalidBitsPerSample));
	}

	#[test]
	fn float_detection() {
		assert!(!pcm16().is_float());
		let float = WaveFormat { tag: FormatTag::IeeeFloat, bits_per_sample: 32, ..pcm16() };
		assert!(float.is_float());
		let wrapped = WaveFormat { tag: FormatTag::Extensible(SubFormat::IeeeFloat), ..pcm16() };
		assert!(wrapped.is_float());
	}

	#[test]
	fn frame_arithmetic() {
		assert_eq!(pcm16().block_align(), 4);
		assert_eq!(pcm16().byte_rate(), 176_400);

		let mono8 = WaveFormat {
			sample_rate:     8_000,
			channels:        1,
			bits_per_sample: 8,
			tag:             FormatTag::Pcm,
		};
		assert_eq!(mono8.block_align(), 1);
		assert_eq!(mono8.byte_rate(), 8_000);
	}
}
