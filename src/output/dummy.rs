//! Dummy audio hardware output.
//!
//! This file implements the abstract `DeviceOutput` trait
//! using a fake dummy backend.
//!
//! All transfer buffers are sent to a thread that doesn't
//! actually connect to anything; it paces itself at the
//! format's byte rate and fires completions like real
//! hardware would.
//!
//! Functionally, it should behave the exact same as other
//! backends, except it doesn't actually play any audio.
//!
//! This is used for testing purposes.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::DeviceSelect,
	error::OutputError,
	format::WaveFormat,
	macros::{debug2,recv,send,trace2,try_send},
	output::{Completion,DeviceOutput},
	pool::TransferBuffer,
	signal::{AtomicGains,ChannelGains},
};
use crossbeam::channel::{Receiver,RecvTimeoutError,Sender};
use std::{
	borrow::Cow,
	sync::{
		Arc,
		atomic::{AtomicBool,AtomicU64,Ordering},
	},
	time::Duration,
};

//---------------------------------------------------------------------------------------------------- Constants
/// How often the playback thread re-checks its
/// signals when idle or paused.
const SIGNAL_POLL: Duration = Duration::from_millis(5);

//---------------------------------------------------------------------------------------------------- Shared
/// State shared between the handle and the playback thread.
struct Shared {
	/// Pause flag; the thread idles while set.
	paused: AtomicBool,
	/// Cumulative payload bytes "played".
	played: AtomicU64,
	/// Left/right gains; stored for parity with real backends.
	gains: AtomicGains,
}

//---------------------------------------------------------------------------------------------------- DummyOutput
/// The fake device.
pub(crate) struct DummyOutput {
	/// Buffers travel to the playback thread through this.
	queue: Sender<TransferBuffer>,

	/// A signal to the playback thread that it should
	/// discard all queued buffers and ack ASAP.
	discard: Sender<()>,

	/// The discard ack.
	drained: Receiver<()>,

	/// Completion callback, kept for the submit error path.
	completion: Completion,

	/// See [`Shared`].
	shared: Arc<Shared>,
}

//---------------------------------------------------------------------------------------------------- `DeviceOutput` Impl
impl DeviceOutput for DummyOutput {
	#[cold]
	#[inline(never)]
	fn try_open(
		format: &WaveFormat,
		device: &DeviceSelect,
		gains: ChannelGains,
		completion: Completion,
	) -> Result<Self, OutputError> {
		debug2!("DummyOutput - try_open(), format: {format:?}, device: {device:?}");

		// The dummy pretends to own exactly one device.
		if let DeviceSelect::Nth(index) = device {
			if *index > 0 {
				return Err(OutputError::DeviceUnavailable);
			}
		}

		let byte_rate = u64::from(format.byte_rate());

		let (queue, queue_recv)          = crossbeam::channel::unbounded();
		let (discard, discard_recv)      = crossbeam::channel::bounded(1);
		let (drained_send, drained_recv) = crossbeam::channel::bounded(1);

		let shared = Arc::new(Shared {
			paused: AtomicBool::new(false),
			played: AtomicU64::new(0),
			gains:  AtomicGains::new(gains),
		});

		// The fake playback thread. Exits when the handle (and
		// with it the queue sender) is dropped.
		let thread_shared = Arc::clone(&shared);
		let thread_completion = Arc::clone(&completion);
		let sample_rate = format.sample_rate;
		std::thread::Builder::new()
			.name("DummyOutput".into())
			.spawn(move || {
				// Real device callbacks run at real-time priority;
				// mirror that, best-effort.
				drop(audio_thread_priority::promote_current_thread_to_real_time(0, sample_rate));

				// A buffer pulled off the queue right as a pause
				// landed; held back, not yet played.
				let mut pending: Option<TransferBuffer> = None;

				loop {
					// A discard beats everything, including pause.
					if discard_recv.try_recv().is_ok() {
						if let Some(buffer) = pending.take() {
							thread_completion(buffer);
						}
						while let Ok(buffer) = queue_recv.try_recv() {
							thread_completion(buffer);
						}
						// INVARIANT: acks are strictly paired with
						// signals, so the slot is always empty here.
						try_send!(drained_send, ());
						continue;
					}

					if thread_shared.paused.load(Ordering::Acquire) {
						std::thread::sleep(SIGNAL_POLL);
						continue;
					}

					let buffer = match pending.take() {
						Some(buffer) => buffer,
						None => match queue_recv.recv_timeout(SIGNAL_POLL) {
							Ok(buffer) => buffer,
							Err(RecvTimeoutError::Timeout) => continue,
							Err(RecvTimeoutError::Disconnected) => return,
						},
					};

					// A pause may have landed while we were already
					// waiting on the queue; hold the buffer rather
					// than playing through it.
					if thread_shared.paused.load(Ordering::Acquire) {
						pending = Some(buffer);
						continue;
					}

					// Pace "playback" at the format's byte rate.
					let millis = (buffer.len() as u64 * 1000 / byte_rate).max(1);
					std::thread::sleep(Duration::from_millis(millis));

					thread_shared.played.fetch_add(buffer.len() as u64, Ordering::Release);
					thread_completion(buffer);
				}
			})
			.map_err(|error| OutputError::Unknown(Cow::Owned(format!("dummy thread spawn error: {error}"))))?;

		Ok(Self {
			queue,
			discard,
			drained: drained_recv,
			completion,
			shared,
		})
	}

	fn submit(&mut self, buffer: TransferBuffer) -> Result<(), OutputError> {
		trace2!("DummyOutput - submit(), len: {}", buffer.len());

		// Only fails if the playback thread is gone, which would
		// mean this handle is already torn down.
		if let Err(send_error) = self.queue.send(buffer) {
			(self.completion)(send_error.into_inner());
			return Err(OutputError::StreamClosed);
		}

		Ok(())
	}

	fn pause(&mut self) -> Result<(), OutputError> {
		debug2!("DummyOutput - pause()");
		self.shared.paused.store(true, Ordering::Release);
		Ok(())
	}

	fn resume(&mut self) -> Result<(), OutputError> {
		debug2!("DummyOutput - resume()");
		self.shared.paused.store(false, Ordering::Release);
		Ok(())
	}

	fn discard(&mut self) {
		debug2!("DummyOutput - discard()");

		// INVARIANT:
		// Bounded channels, [try_*] methods not applicable.
		if self.discard.is_empty() {
			send!(self.discard, ());
		}

		// Hang until the thread has drained.
		recv!(self.drained);
	}

	fn position(&self) -> u64 {
		self.shared.played.load(Ordering::Acquire)
	}

	fn set_gains(&self, gains: ChannelGains) {
		debug2!("DummyOutput - set_gains(), gains: {gains:?}");
		self.shared.gains.set(gains);
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use crate::pool::BufferPool;
	use pretty_assertions::assert_eq;

	fn format() -> WaveFormat {
		WaveFormat {
			sample_rate:     44_100,
			channels:        2,
			bits_per_sample: 16,
			tag:             crate::format::FormatTag::Pcm,
		}
	}

	#[test]
	fn only_device_zero_exists() {
		let completion: Completion = Arc::new(|_| {});

		assert!(DummyOutput::try_open(
			&format(), &DeviceSelect::Default, ChannelGains::DEFAULT, Arc::clone(&completion),
		).is_ok());
		assert!(DummyOutput::try_open(
			&format(), &DeviceSelect::Nth(0), ChannelGains::DEFAULT, Arc::clone(&completion),
		).is_ok());

		let err = DummyOutput::try_open(
			&format(), &DeviceSelect::Nth(3), ChannelGains::DEFAULT, completion,
		);
		assert!(matches!(err, Err(OutputError::DeviceUnavailable)));
	}

	#[test]
	fn buffers_complete_and_position_advances() {
		let pool = Arc::new(BufferPool::new(50));
		let completion: Completion = {
			let pool = Arc::clone(&pool);
			Arc::new(move |buffer| pool.complete(buffer))
		};

		let mut output = DummyOutput::try_open(
			&format(), &DeviceSelect::Default, ChannelGains::DEFAULT, completion,
		).unwrap();

		let mut total = 0;
		for _ in 0..4 {
			let mut buffer = pool.acquire().unwrap();
			buffer.write(&[0; 1764]); // 10ms of payload
			total += buffer.len() as u64;
			output.submit(buffer).unwrap();
		}

		assert!(crate::tests::wait_until(|| pool.in_flight() == 0));
		assert_eq!(output.position(), total);
		assert_eq!(pool.free_len(), 4);
	}

	#[test]
	fn discard_returns_queued_buffers_without_playing() {
		let pool = Arc::new(BufferPool::new(50));
		let completion: Completion = {
			let pool = Arc::clone(&pool);
			Arc::new(move |buffer| pool.complete(buffer))
		};

		let mut output = DummyOutput::try_open(
			&format(), &DeviceSelect::Default, ChannelGains::DEFAULT, completion,
		).unwrap();

		// Pause so everything stays queued, then discard.
		output.pause().unwrap();
		for _ in 0..8 {
			let mut buffer = pool.acquire().unwrap();
			buffer.write(&[0; 4]);
			output.submit(buffer).unwrap();
		}
		assert_eq!(pool.in_flight(), 8);

		output.discard();
		assert!(crate::tests::wait_until(|| pool.in_flight() == 0));

		// Nothing was played, only discarded.
		assert_eq!(output.position(), 0);
	}
}
