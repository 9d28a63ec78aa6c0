//! Timestamped audio payloads.

//---------------------------------------------------------------------------------------------------- use
use std::time::Duration;

//---------------------------------------------------------------------------------------------------- Span
/// Presentation start/stop of a payload.
///
/// Retained with the in-flight buffer in diagnostic builds,
/// otherwise dropped after the pre-submit tap has seen the
/// payload.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
	/// Presentation start time.
	pub start: Duration,
	/// Presentation stop time.
	pub stop: Duration,
}

//---------------------------------------------------------------------------------------------------- Sample
/// One unit of decoded audio on its way to the device.
///
/// The payload is borrowed - [`crate::Session::play`] copies it
/// into a pooled transfer buffer, so the caller keeps ownership
/// of whatever the decoder handed out.
#[derive(Copy,Clone,Debug)]
pub struct Sample<'a> {
	/// Raw payload bytes, in the session's negotiated format.
	pub bytes: &'a [u8],
	/// Presentation span, if the pipeline knows it.
	pub span: Option<Span>,
}

impl<'a> Sample<'a> {
	#[inline]
	#[must_use]
	/// A sample carrying payload and no timing metadata.
	pub const fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, span: None }
	}
}

impl<'a> From<&'a [u8]> for Sample<'a> {
	#[inline]
	fn from(bytes: &'a [u8]) -> Self {
		Self::new(bytes)
	}
}
