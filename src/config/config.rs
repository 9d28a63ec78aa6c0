//! Session configuration.

//---------------------------------------------------------------------------------------------------- use
use crate::config::{Tap,DEFAULT_IN_FLIGHT_THRESHOLD};
#[allow(unused_imports)] // docs
use crate::Session;

//---------------------------------------------------------------------------------------------------- DeviceSelect
/// Which hardware output endpoint to claim.
///
/// Selection is by enumeration order, which is whatever the
/// platform audio layer reports. Host control surfaces that
/// reserve index `0` to mean "default device" should map that
/// to [`DeviceSelect::Default`] before it gets here.
#[derive(Copy,Clone,Debug,Default,PartialEq,Eq,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceSelect {
	/// The system default output device.
	#[default]
	Default,
	/// The nth enumerated output device, counting from zero.
	Nth(usize),
}

//---------------------------------------------------------------------------------------------------- Config
/// Construction-time configuration for a [`Session`].
pub struct Config {
	/// Which output endpoint [`Session::open`] claims.
	pub device: DeviceSelect,

	/// In-flight buffer count above which the backpressure
	/// gate closes and [`Session::play`] blocks.
	pub threshold: usize,

	/// Optional pre-submit hook observing every outgoing payload.
	pub tap: Option<Box<dyn Tap>>,
}

impl Config {
	/// Default device, reference threshold, no tap.
	pub const DEFAULT: Self = Self {
		device:    DeviceSelect::Default,
		threshold: DEFAULT_IN_FLIGHT_THRESHOLD,
		tap:       None,
	};
}

impl Default for Config {
	#[inline]
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl std::fmt::Debug for Config {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Config")
			.field("device", &self.device)
			.field("threshold", &self.threshold)
			.field("tap", &self.tap.as_ref().map(|_| "dyn Tap"))
			.finish()
	}
}
