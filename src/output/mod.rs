//! Audio output backends.

mod output;
pub(crate) use output::{Completion,DeviceOutput};

// Use the dummy backend for tests, cpal otherwise.
cfg_if::cfg_if! {
	if #[cfg(any(test, feature = "dummy"))] {
		mod dummy;
		pub(crate) use dummy::DummyOutput as DeviceOutputStruct;
		/// The audio output backend used.
		pub(crate) const DEVICE_OUTPUT_BACKEND: &str = "dummy";
	} else if #[cfg(feature = "cpal")] {
		mod cpal;
		pub(crate) use self::cpal::Cpal as DeviceOutputStruct;
		/// The audio output backend used.
		pub(crate) const DEVICE_OUTPUT_BACKEND: &str = "cpal";
	} else {
		compile_error!("either the `cpal` or the `dummy` feature must be enabled");
	}
}
