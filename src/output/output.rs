//! Audio hardware output.
//!
//! This file defines the structures and functions required to
//! take pooled transfer buffers and actually hand them to the
//! audio hardware/server for asynchronous playback.
//!
//! The trait `DeviceOutput` is the ideal abstract
//! simplification of what this part of the system should do.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::DeviceSelect,
	error::OutputError,
	format::WaveFormat,
	pool::TransferBuffer,
	signal::ChannelGains,
};
use std::sync::Arc;

//---------------------------------------------------------------------------------------------------- Completion
/// The asynchronous completion callback.
///
/// Invoked by the device backend, on a thread this crate does
/// not otherwise control, whenever a submitted buffer finishes
/// playing (or is discarded). The session builds this as a
/// closure capturing the pool handle - the buffer finds its way
/// home through the capture, never through a raw context pointer.
///
/// Implementors must treat this as real-time code: it does pool
/// bookkeeping under a fast lock and nothing else.
pub(crate) type Completion = Arc<dyn Fn(TransferBuffer) + Send + Sync + 'static>;

//---------------------------------------------------------------------------------------------------- DeviceOutput
/// # Safety Notes
/// Implementors are expected to implement these functions
/// correctly according to the documentation invariants.
pub(crate) trait DeviceOutput: Sized {
	/// Claim the hardware endpoint described by `device` and open
	/// it for playback in `format`.
	///
	/// `format` has already passed [`WaveFormat::validate`]; what
	/// remains here is whether the device itself can take it.
	///
	/// Invariants:
	/// 1. A fresh stream is not paused.
	/// 2. `gains` is the initial left/right gain pair.
	/// 3. `completion` may start firing as soon as this returns.
	///
	/// # Errors
	/// [`OutputError::DeviceUnavailable`] if the endpoint cannot
	/// be claimed (in use elsewhere, unplugged, bad index). This
	/// is retryable. [`OutputError::InvalidFormat`] if the device
	/// rejects the format.
	fn try_open(
		format: &WaveFormat,
		device: &DeviceSelect,
		gains: ChannelGains,
		completion: Completion,
	) -> Result<Self, OutputError>;

	/// Queue one in-flight buffer for asynchronous playback.
	///
	/// Takes ownership - the device holds the buffer until the
	/// completion callback carries it back.
	///
	/// Invariants:
	/// 1. Must not block on the device.
	/// 2. On error, the buffer has already been routed back
	///    through the completion callback: accounting never leaks
	///    a buffer, even on a dead stream.
	fn submit(&mut self, buffer: TransferBuffer) -> Result<(), OutputError>;

	/// Stop consuming queued buffers.
	///
	/// Queued data stays queued; nothing completes while paused.
	fn pause(&mut self) -> Result<(), OutputError>;

	/// Continue exactly where [`Self::pause`] left off.
	fn resume(&mut self) -> Result<(), OutputError>;

	/// Drop all queued payload immediately.
	///
	/// Every queued buffer - including a partially played current
	/// one - is routed back through the completion callback. An
	/// audible gap is expected and acceptable.
	///
	/// This function is expected to and is allowed to block until
	/// the device has drained.
	fn discard(&mut self);

	/// Cumulative bytes of payload the device has consumed.
	///
	/// Monotonically non-decreasing while playing; granularity is
	/// whatever the device reports and is accepted as-is.
	fn position(&self) -> u64;

	/// Replace the left/right gain pair applied to outgoing frames.
	fn set_gains(&self, gains: ChannelGains);
}
