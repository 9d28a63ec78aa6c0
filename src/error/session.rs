//! Session-level errors.

//---------------------------------------------------------------------------------------------------- use
use crate::error::{FormatError,OutputError};

//---------------------------------------------------------------------------------------------------- SessionError
/// Error returned by [`crate::Session`] operations.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
	#[error("audio format was rejected: {0}")]
	/// The format descriptor failed validation at open time.
	///
	/// Not retryable without a different format.
	FormatRejected(#[from] FormatError),

	#[error("session is not open")]
	/// The operation needs a successfully opened session.
	NotOpen,

	#[error("audio output error: {0}")]
	/// The device backend failed.
	Output(#[from] OutputError),
}

impl SessionError {
	#[inline]
	#[must_use]
	/// Is retrying the failed operation (possibly with a
	/// different device index) worthwhile?
	///
	/// `true` only for [`OutputError::DeviceUnavailable`] -
	/// the endpoint may free up. The session never retries on
	/// its own; that decision belongs to the caller.
	pub const fn retryable(&self) -> bool {
		matches!(self, Self::Output(OutputError::DeviceUnavailable))
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_device_unavailable_is_retryable() {
		assert!(SessionError::Output(OutputError::DeviceUnavailable).retryable());
		assert!(!SessionError::Output(OutputError::Write).retryable());
		assert!(!SessionError::NotOpen.retryable());
		assert!(!SessionError::FormatRejected(FormatError::InvalidSampleRate).retryable());
	}
}
