//! The pre-submit tap.

//---------------------------------------------------------------------------------------------------- use
use crate::format::WaveFormat;

//---------------------------------------------------------------------------------------------------- Tap
/// Observe outgoing audio before it reaches the device.
///
/// A tap is called on the producer thread for every payload,
/// after the transfer buffer is acquired and filled but before
/// it is handed to the hardware - analysis, level metering,
/// echo-cancellation reference feeds, that sort of thing.
///
/// Not part of the playback contract: a session with no tap
/// configured pays nothing for the hook, and a tap cannot
/// modify or reject the payload.
pub trait Tap: Send {
	/// Called with each outgoing payload, in submission order.
	///
	/// This runs on the producer thread between acquire and
	/// submit - long work here delays playback.
	fn tap(&mut self, payload: &[u8], format: &WaveFormat);
}
