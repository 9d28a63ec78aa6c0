//! Audio hardware output.
//!
//! This file implements the abstract `DeviceOutput`
//! trait using `cpal` as a backend.
//!
//! For documentation on `DeviceOutput`, see `output.rs`.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	config::DeviceSelect,
	error::OutputError,
	format::WaveFormat,
	macros::{debug2,error2,lock,send,trace2},
	output::{Completion,DeviceOutput},
	pool::TransferBuffer,
	signal::{AtomicGains,ChannelGains},
};
use cpal::traits::{DeviceTrait,HostTrait,StreamTrait};
use crossbeam::channel::{Receiver,Sender};
use std::{
	borrow::Cow,
	sync::{
		Arc,
		Mutex,
		atomic::{AtomicU64,Ordering},
	},
	time::Duration,
};

//---------------------------------------------------------------------------------------------------- Constants
/// How long a live discard waits for the stream callback
/// to ack before draining from the caller's side instead.
///
/// The ack only fails to arrive if the stream died mid-flush.
const DISCARD_ACK_TIMEOUT: Duration = Duration::from_secs(1);

//---------------------------------------------------------------------------------------------------- Playing
/// The buffer the data callback is currently copying out of.
struct Playing {
	buffer: TransferBuffer,
	/// Bytes already copied to the device.
	offset: usize,
}

//---------------------------------------------------------------------------------------------------- Shared
/// State shared between the handle and the data callback.
struct Shared {
	/// Cumulative payload bytes consumed by the device.
	played: AtomicU64,

	/// Left/right gain multipliers applied to outgoing frames.
	gains: AtomicGains,

	/// The partially-consumed current buffer.
	///
	/// A mutex in an audio callback is deliberate: it is only
	/// ever contended by `discard()`, and bookkeeping is the one
	/// kind of work the callback is allowed to block on.
	current: Mutex<Option<Playing>>,
}

//---------------------------------------------------------------------------------------------------- Cpal
/// The real device, via `cpal`.
pub(crate) struct Cpal {
	/// The actual audio stream.
	///
	/// Held so the device keeps pulling; dropped on teardown.
	stream: cpal::Stream,

	/// Buffers travel to the data callback through this.
	queue: Sender<TransferBuffer>,

	/// Our own handle on the callback's queue, for
	/// draining while the stream is paused.
	queue_recv: Receiver<TransferBuffer>,

	/// A signal to the data callback that it should discard
	/// all queued buffers and ack ASAP.
	discard: Sender<()>,

	/// The discard ack.
	drained: Receiver<()>,

	/// Stream errors surface here on the next submit.
	errors: Receiver<cpal::StreamError>,

	/// Completion callback, kept for the error paths.
	completion: Completion,

	/// See [`Shared`].
	shared: Arc<Shared>,

	/// Are we currently paused?
	paused: bool,
}

//---------------------------------------------------------------------------------------------------- `DeviceOutput` Impl
impl DeviceOutput for Cpal {
	#[cold]
	#[inline(never)]
	#[allow(clippy::too_many_lines)]
	fn try_open(
		format: &WaveFormat,
		device: &DeviceSelect,
		gains: ChannelGains,
		completion: Completion,
	) -> Result<Self, OutputError> {
		debug2!("Cpal - try_open(), format: {format:?}, device: {device:?}");

		let sample_format = match (format.is_float(), format.bits_per_sample) {
			(true,  32) => cpal::SampleFormat::F32,
			(false, 8)  => cpal::SampleFormat::U8,
			(false, 16) => cpal::SampleFormat::I16,
			(false, 32) => cpal::SampleFormat::I32,
			_ => return Err(OutputError::InvalidFormat),
		};

		// Claim the endpoint.
		let host = cpal::default_host();
		let device = match device {
			DeviceSelect::Default => {
				let Some(device) = host.default_output_device() else {
					return Err(OutputError::DeviceUnavailable);
				};
				device
			},
			DeviceSelect::Nth(index) => {
				let Ok(mut devices) = host.output_devices() else {
					return Err(OutputError::DeviceUnavailable);
				};
				let Some(device) = devices.nth(*index) else {
					return Err(OutputError::DeviceUnavailable);
				};
				device
			},
		};
		debug2!("Cpal - claimed device: {:?}", device.name());

		let config = cpal::StreamConfig {
			channels:    format.channels,
			sample_rate: cpal::SampleRate(format.sample_rate),
			buffer_size: cpal::BufferSize::Default,
		};

		let (queue, queue_recv)          = crossbeam::channel::unbounded();
		let (discard, discard_recv)      = crossbeam::channel::bounded(1);
		let (drained_send, drained_recv) = crossbeam::channel::bounded(1);
		let (error_send, error_recv)     = crossbeam::channel::unbounded();

		let shared = Arc::new(Shared {
			played:  AtomicU64::new(0),
			gains:   AtomicGains::new(gains),
			current: Mutex::new(None),
		});

		let channels = usize::from(format.channels);
		// 8-bit pcm is unsigned; its silence sits at the midpoint.
		let silence: u8 = if sample_format == cpal::SampleFormat::U8 { 0x80 } else { 0 };

		// The actual callback `cpal` will call when polling for audio data.
		let callback_shared = Arc::clone(&shared);
		let callback_completion = Arc::clone(&completion);
		let callback_queue = queue_recv.clone();
		let data_callback = move |data: &mut cpal::Data, _: &cpal::OutputCallbackInfo| {
			// We received a "discard" signal.
			// Complete everything unplayed and return ASAP.
			if discard_recv.try_recv().is_ok() {
				let mut current = lock!(callback_shared.current);
				if let Some(playing) = current.take() {
					callback_completion(playing.buffer);
				}
				drop(current);
				while let Ok(buffer) = callback_queue.try_recv() {
					callback_completion(buffer);
				}
				drop(drained_send.try_send(()));
				data.bytes_mut().fill(silence);
				return;
			}

			// Copy queued payload into the device's buffer.
			let filled = {
				let bytes = data.bytes_mut();
				let mut filled = 0;
				let mut current = lock!(callback_shared.current);

				while filled < bytes.len() {
					let playing = match current.as_mut() {
						Some(playing) => playing,
						None => match callback_queue.try_recv() {
							Ok(buffer) => current.insert(Playing { buffer, offset: 0 }),
							// Underrun - pad with silence below.
							Err(_) => break,
						},
					};

					let payload = &playing.buffer.bytes()[playing.offset..];
					let n = payload.len().min(bytes.len() - filled);
					bytes[filled..filled + n].copy_from_slice(&payload[..n]);
					filled += n;
					playing.offset += n;

					if playing.offset >= playing.buffer.len() {
						if let Some(done) = current.take() {
							callback_completion(done.buffer);
						}
					}
				}

				bytes[filled..].fill(silence);
				filled
			};

			callback_shared.played.fetch_add(filled as u64, Ordering::Release);

			// Apply the gain pair, skipping the common no-op case.
			let (left, right) = callback_shared.gains.get();
			if left != 1.0 || right != 1.0 {
				apply_gains(data, left, right, channels);
			}
		};

		// The callback `cpal` will call when errors occur.
		let error_callback = move |error: cpal::StreamError| {
			drop(error_send.try_send(error));
		};

		// Build the audio stream.
		let stream = match device.build_output_stream_raw(
			&config,
			sample_format,
			data_callback,
			error_callback,
			None,
		) {
			Ok(stream) => stream,
			Err(err) => return Err(err.into()),
		};

		// Start the output stream; it plays silence until fed.
		stream.play()?;

		Ok(Self {
			stream,
			queue,
			queue_recv,
			discard,
			drained: drained_recv,
			errors: error_recv,
			completion,
			shared,
			paused: false,
		})
	}

	fn submit(&mut self, buffer: TransferBuffer) -> Result<(), OutputError> {
		trace2!("Cpal - submit(), len: {}", buffer.len());

		// Surface any asynchronous stream error from the callback.
		if let Ok(error) = self.errors.try_recv() {
			error2!("Cpal - stream error: {error}");
			(self.completion)(buffer);
			return Err(error.into());
		}

		if let Err(send_error) = self.queue.send(buffer) {
			(self.completion)(send_error.into_inner());
			return Err(OutputError::StreamClosed);
		}

		Ok(())
	}

	fn pause(&mut self) -> Result<(), OutputError> {
		debug2!("Cpal - pause()");
		self.stream.pause()?;
		self.paused = true;
		Ok(())
	}

	fn resume(&mut self) -> Result<(), OutputError> {
		debug2!("Cpal - resume()");
		self.stream.play()?;
		self.paused = false;
		Ok(())
	}

	fn discard(&mut self) {
		debug2!("Cpal - discard()");

		if self.paused {
			// The callback is dormant while paused;
			// drain from this side instead.
			self.drain_from_caller();
			return;
		}

		// INVARIANT:
		// Bounded channels, [try_*] methods not applicable.
		if self.discard.is_empty() {
			send!(self.discard, ());
		}

		// Hang until the callback has drained. If the stream died
		// underneath us the ack never comes - fall back.
		if self.drained.recv_timeout(DISCARD_ACK_TIMEOUT).is_err() {
			error2!("Cpal - discard ack timed out, draining caller-side");
			self.drain_from_caller();
		}
	}

	fn position(&self) -> u64 {
		self.shared.played.load(Ordering::Acquire)
	}

	fn set_gains(&self, gains: ChannelGains) {
		debug2!("Cpal - set_gains(), gains: {gains:?}");
		self.shared.gains.set(gains);
	}
}

impl Cpal {
	/// Route everything queued back through the completion
	/// callback without the data callback's help.
	fn drain_from_caller(&self) {
		let mut current = lock!(self.shared.current);
		if let Some(playing) = current.take() {
			(self.completion)(playing.buffer);
		}
		drop(current);

		while let Ok(buffer) = self.queue_recv.try_recv() {
			(self.completion)(buffer);
		}
	}
}

//---------------------------------------------------------------------------------------------------- Gain application
/// Multiply the first two channels of every frame by the
/// left/right gains. Any further channels pass through - the
/// gain pair is a stereo concept.
///
/// 8-bit streams pass through entirely; the legacy format is
/// not worth the bias-adjusted math here.
fn apply_gains(data: &mut cpal::Data, left: f32, right: f32, channels: usize) {
	if let Some(samples) = data.as_slice_mut::<f32>() {
		for frame in samples.chunks_mut(channels) {
			frame[0] *= left;
			if frame.len() > 1 {
				frame[1] *= right;
			}
		}
	} else if let Some(samples) = data.as_slice_mut::<i16>() {
		for frame in samples.chunks_mut(channels) {
			frame[0] = (f32::from(frame[0]) * left) as i16;
			if frame.len() > 1 {
				frame[1] = (f32::from(frame[1]) * right) as i16;
			}
		}
	} else if let Some(samples) = data.as_slice_mut::<i32>() {
		for frame in samples.chunks_mut(channels) {
			frame[0] = (frame[0] as f32 * left) as i32;
			if frame.len() > 1 {
				frame[1] = (frame[1] as f32 * right) as i32;
			}
		}
	}
}

//---------------------------------------------------------------------------------------------------- Error re-map
impl From<cpal::StreamError> for OutputError {
	fn from(error: cpal::StreamError) -> Self {
		use cpal::StreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::BuildStreamError> for OutputError {
	fn from(error: cpal::BuildStreamError) -> Self {
		use cpal::BuildStreamError as E;
		match error {
			E::DeviceNotAvailable | E::InvalidArgument | E::StreamIdOverflow => Self::DeviceUnavailable,
			E::StreamConfigNotSupported => Self::InvalidFormat,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PlayStreamError> for OutputError {
	fn from(error: cpal::PlayStreamError) -> Self {
		use cpal::PlayStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}

impl From<cpal::PauseStreamError> for OutputError {
	fn from(error: cpal::PauseStreamError) -> Self {
		use cpal::PauseStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			E::BackendSpecific { err } => Self::Unknown(Cow::Owned(err.description)),
		}
	}
}
