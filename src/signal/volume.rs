//! Session playback volume.

//---------------------------------------------------------------------------------------------------- use
#[allow(unused_imports)] // docs
use crate::Session;

//---------------------------------------------------------------------------------------------------- Volume
/// Playback volume level.
///
/// This is a wrapper around [`u8`] that is between `0..=100`,
/// where `0` represents silence and `100` represents using the
/// decoded audio samples as-is, aka, max volume.
///
/// This unit is linear - mapping it onto a logarithmic control
/// scale is the embedding adapter's job, not [`Session`]'s.
#[derive(Copy,Clone,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Volume(u8);

/// Generate a `Volume` constant for a literal percent.
macro_rules! impl_const {
	($num:tt) => {
		paste::paste! {
			#[doc = "Returns [`Volume`] with a value of `" $num "`"]
			pub const [<NEW_ $num>]: Self = Self($num);
		}
	}
}

impl Volume {
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Volume::MAX.inner(), 100);
	/// ```
	pub const MAX: Self = Self(100);
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Volume::MIN.inner(), 0);
	/// ```
	pub const MIN: Self = Self(0);
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Volume::DEFAULT.inner(), 100);
	/// ```
	pub const DEFAULT: Self = Self(100);

	#[inline]
	#[must_use]
	/// Create a new [`Volume`] from a [`u8`].
	///
	/// # Saturating
	/// Inputs greater than `100` saturate and return [`Volume::MAX`]:
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Volume::new(100), Volume::MAX);
	/// assert_eq!(Volume::new(101), Volume::MAX);
	/// assert_eq!(Volume::new(255), Volume::MAX);
	/// ```
	pub const fn new(volume: u8) -> Self {
		if volume > 100 {
			Self::MAX
		} else {
			Self(volume)
		}
	}

	#[inline]
	#[must_use]
	/// Returns the inner [`u8`]
	pub const fn inner(&self) -> u8 {
		self.0
	}

	seq_macro::seq!(N in 0..=100 {
		impl_const!(N);
	});
}

impl Default for Volume {
	#[inline]
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl std::fmt::Display for Volume {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u8> for Volume {
	#[inline]
	fn from(volume: u8) -> Self {
		Self::new(volume)
	}
}
