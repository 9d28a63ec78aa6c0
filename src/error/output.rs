//! Device output errors.

//---------------------------------------------------------------------------------------------------- OutputError
/// Error that occurs when talking to the audio hardware/server.
///
/// This can be due to many reasons, e.g:
/// - Audio device was unplugged
/// - Audio server disconnected/killed
/// - The endpoint is claimed by another process
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
	#[error("audio stream was closed")]
	/// The audio stream was closed.
	StreamClosed,

	#[error("audio hardware/server is unavailable")]
	/// The audio hardware/server is unavailable.
	///
	/// This is the one retryable open failure: the endpoint may
	/// be claimed by another process right now, or the device
	/// index may point at hardware that is not plugged in yet.
	DeviceUnavailable,

	#[error("audio format is invalid or unsupported by the device")]
	/// The device cannot open a stream in the requested format.
	InvalidFormat,

	#[error("failed to write bytes to the audio stream")]
	/// Failed to write bytes to the audio stream.
	Write,

	#[error("unknown error: {0}")]
	/// An unknown or very specific error occurred.
	///
	/// The `str` will contain more information.
	Unknown(std::borrow::Cow<'static, str>),
}
