//! The device session.
//!
//! One [`Session`] is one claim on one hardware output endpoint
//! for one negotiated format. It owns the transfer-buffer pool
//! for its open lifetime and wires the device backend's
//! completion callback into it - no buffer ever crosses between
//! sessions.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::Config,
	error::SessionError,
	format::WaveFormat,
	macros::debug2,
	output::{Completion,DeviceOutput,DeviceOutputStruct,DEVICE_OUTPUT_BACKEND},
	pool::BufferPool,
	session::Sample,
	signal::{Balance,ChannelGains,Volume},
};
use std::sync::Arc;

//---------------------------------------------------------------------------------------------------- Open
/// Everything that only exists while the endpoint is claimed.
struct Open {
	/// The negotiated format; immutable until close.
	format: WaveFormat,
	/// The transfer-buffer pool. The completion closure holds
	/// the other reference, from the device-driven thread.
	pool: Arc<BufferPool>,
	/// The claimed endpoint.
	output: DeviceOutputStruct,
	/// Pause state, kept here so pause/resume are idempotent.
	paused: bool,
}

//---------------------------------------------------------------------------------------------------- Session
/// A hardware audio output session.
///
/// ```rust
/// # use wavesink::*;
/// # use wavesink::config::*;
/// let session = Session::new(Config::DEFAULT);
/// assert!(!session.is_open());
/// assert_eq!(session.position(), 0);
/// ```
///
/// The flow:
/// 1. [`Session::open`] with a validated [`WaveFormat`]
/// 2. [`Session::play`] each payload (blocks under backpressure)
/// 3. [`Session::close`] (or drop) - flushes, then releases
pub struct Session {
	/// Construction-time configuration.
	config: Config,
	/// Last stored volume; survives close.
	volume: Volume,
	/// Last stored balance; survives close.
	balance: Balance,
	/// `Some` while the endpoint is claimed.
	open: Option<Open>,
}

impl Session {
	#[cold]
	#[inline(never)]
	#[must_use]
	/// A closed session; nothing is claimed until [`Self::open`].
	pub fn new(config: Config) -> Self {
		Self {
			config,
			volume:  Volume::DEFAULT,
			balance: Balance::DEFAULT,
			open:    None,
		}
	}

	/// Claim the configured endpoint for playback in `format`.
	///
	/// An already-open session is closed first - the format is
	/// immutable per claim, so changing it means starting over.
	///
	/// The stored volume/balance are pushed to the fresh device,
	/// so gain settings survive a re-open.
	///
	/// # Errors
	/// - [`SessionError::FormatRejected`]: the descriptor failed
	///   validation; not retryable with the same format.
	/// - [`SessionError::Output`]: the endpoint could not be
	///   claimed. [`SessionError::retryable`] distinguishes the
	///   device-unavailable case, which may be retried as-is;
	///   the session is left closed either way.
	pub fn open(&mut self, format: WaveFormat) -> Result<(), SessionError> {
		self.close();

		format.validate()?;

		let pool = Arc::new(BufferPool::new(self.config.threshold));

		// The completion handler: the device-driven thread finds
		// its way back to the pool through this capture.
		let completion: Completion = {
			let pool = Arc::clone(&pool);
			Arc::new(move |buffer| pool.complete(buffer))
		};

		let gains = ChannelGains::new(self.volume, self.balance);
		let output = DeviceOutputStruct::try_open(&format, &self.config.device, gains, completion)?;

		debug2!("Session - open, backend: {DEVICE_OUTPUT_BACKEND}, format: {format:?}");
		self.open = Some(Open { format, pool, output, paused: false });
		Ok(())
	}

	/// Queue one sample for asynchronous playback.
	///
	/// Copies the payload into a pooled transfer buffer and hands
	/// it to the device. Blocks if more than the configured
	/// threshold of buffers is already in-flight, until the
	/// device completes one.
	///
	/// # Errors
	/// [`SessionError::NotOpen`] without a successful
	/// [`Self::open`]; [`SessionError::Output`] if the device
	/// rejected the buffer (the pool accounting stays intact).
	pub fn play(&mut self, sample: Sample<'_>) -> Result<(), SessionError> {
		let Some(open) = self.open.as_mut() else {
			return Err(SessionError::NotOpen);
		};

		// The backpressure gate lives in here.
		let Some(mut buffer) = open.pool.acquire() else {
			return Err(SessionError::NotOpen);
		};

		buffer.write(sample.bytes);
		buffer.set_span(sample.span);

		if let Some(tap) = self.config.tap.as_mut() {
			tap.tap(sample.bytes, &open.format);
		}

		Ok(open.output.submit(buffer)?)
	}

	/// Toggle pause.
	///
	/// Resuming continues exactly where playback left off -
	/// queued buffers are neither dropped nor re-submitted.
	/// Requesting the state the session is already in is a
	/// successful no-op.
	///
	/// # Errors
	/// [`SessionError::NotOpen`] without a successful open.
	pub fn pause(&mut self, pause: bool) -> Result<(), SessionError> {
		let Some(open) = self.open.as_mut() else {
			return Err(SessionError::NotOpen);
		};

		if open.paused == pause {
			return Ok(());
		}

		if pause {
			open.output.pause()?;
		} else {
			open.output.resume()?;
		}

		open.paused = pause;
		debug2!("Session - paused: {pause}");
		Ok(())
	}

	/// Discard all queued audio immediately.
	///
	/// The device drops its queue (audible gap expected), every
	/// discarded buffer comes home through the completion path,
	/// and the pool is reconciled - zero in-flight afterwards.
	///
	/// # Errors
	/// [`SessionError::NotOpen`] without a successful open.
	pub fn flush(&mut self) -> Result<(), SessionError> {
		let Some(open) = self.open.as_mut() else {
			return Err(SessionError::NotOpen);
		};

		debug2!("Session - flush");
		open.output.discard();
		open.pool.reset();
		Ok(())
	}

	/// Flush, then release the endpoint and the pool.
	///
	/// Idempotent - closing a closed (or never-opened) session
	/// is a no-op. The stored volume/balance survive.
	pub fn close(&mut self) {
		let Some(mut open) = self.open.take() else {
			return;
		};

		debug2!("Session - close");

		// Force outstanding buffers home before the storage goes
		// away - the device must not end up writing into freed
		// memory, and ownership means it cannot.
		open.output.discard();
		open.pool.reset();
		open.pool.close();
	}

	#[inline]
	#[must_use]
	/// Device-reported playback position, as a byte offset.
	///
	/// Monotonically non-decreasing while playing, `0` when the
	/// session is not open. Granularity is whatever the device
	/// reports and is accepted as-is.
	pub fn position(&self) -> u64 {
		self.open.as_ref().map_or(0, |open| open.output.position())
	}

	/// Store `volume` and push the derived gains to the device.
	///
	/// The balance is re-applied relative to the new volume.
	///
	/// # Errors
	/// [`SessionError::NotOpen`] if the session is closed - the
	/// value is stored regardless and pushed on the next open.
	pub fn set_volume(&mut self, volume: Volume) -> Result<(), SessionError> {
		self.volume = volume;
		debug2!("Session - set_volume: {volume}");
		self.push_gains()
	}

	/// Store `balance` and push the derived gains to the device.
	///
	/// # Errors
	/// [`SessionError::NotOpen`] if the session is closed - the
	/// value is stored regardless and pushed on the next open.
	pub fn set_balance(&mut self, balance: Balance) -> Result<(), SessionError> {
		self.balance = balance;
		debug2!("Session - set_balance: {balance}");
		self.push_gains()
	}

	/// Derive and push the current gain pair.
	fn push_gains(&self) -> Result<(), SessionError> {
		let Some(open) = self.open.as_ref() else {
			return Err(SessionError::NotOpen);
		};

		open.output.set_gains(ChannelGains::new(self.volume, self.balance));
		Ok(())
	}

	#[inline]
	#[must_use]
	/// The last stored volume, open or not.
	pub const fn volume(&self) -> Volume {
		self.volume
	}

	#[inline]
	#[must_use]
	/// The last stored balance, open or not.
	pub const fn balance(&self) -> Balance {
		self.balance
	}

	#[inline]
	#[must_use]
	/// The gain pair derived from the stored volume/balance.
	pub const fn gains(&self) -> ChannelGains {
		ChannelGains::new(self.volume, self.balance)
	}

	#[inline]
	#[must_use]
	/// Is the endpoint currently claimed?
	pub const fn is_open(&self) -> bool {
		self.open.is_some()
	}

	#[inline]
	#[must_use]
	/// Is the session open and paused?
	pub fn is_paused(&self) -> bool {
		self.open.as_ref().is_some_and(|open| open.paused)
	}

	#[inline]
	#[must_use]
	/// The format the session is currently open with.
	pub fn format(&self) -> Option<&WaveFormat> {
		self.open.as_ref().map(|open| &open.format)
	}
}

impl Drop for Session {
	fn drop(&mut self) {
		self.close();
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("backend", &DEVICE_OUTPUT_BACKEND)
			.field("config", &self.config)
			.field("volume", &self.volume)
			.field("balance", &self.balance)
			.field("open", &self.open.is_some())
			.field("paused", &self.is_paused())
			.field("in_flight", &self.open.as_ref().map(|open| open.pool.in_flight()))
			.finish()
	}
}

//---------------------------------------------------------------------------------------------------- Test access
#[cfg(test)]
impl Session {
	/// The open pool, tests only.
	pub(crate) fn pool(&self) -> &Arc<BufferPool> {
		&self.open.as_ref().unwrap().pool
	}
}
