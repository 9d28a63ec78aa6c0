//! Session left/right balance.

//---------------------------------------------------------------------------------------------------- use
#[allow(unused_imports)] // docs
use crate::signal::{ChannelGains,Volume};

//---------------------------------------------------------------------------------------------------- Balance
/// Relative left/right channel attenuation.
///
/// This is a wrapper around [`u8`] that is between `0..=100`:
/// - `0` is hard left (right channel fully attenuated)
/// - `50` is centered (neither channel attenuated)
/// - `100` is hard right (left channel fully attenuated)
///
/// Balance never boosts a channel above the current [`Volume`],
/// it only attenuates the opposite side - see [`ChannelGains`].
#[derive(Copy,Clone,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Balance(u8);

impl Balance {
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Balance::LEFT.inner(), 0);
	/// ```
	pub const LEFT: Self = Self(0);
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Balance::CENTER.inner(), 50);
	/// ```
	pub const CENTER: Self = Self(50);
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Balance::RIGHT.inner(), 100);
	/// ```
	pub const RIGHT: Self = Self(100);
	/// Same as [`Balance::CENTER`].
	pub const DEFAULT: Self = Self(50);

	#[inline]
	#[must_use]
	/// Create a new [`Balance`] from a [`u8`].
	///
	/// # Saturating
	/// Inputs greater than `100` saturate and return [`Balance::RIGHT`]:
	/// ```rust
	/// # use wavesink::signal::*;
	/// assert_eq!(Balance::new(101), Balance::RIGHT);
	/// ```
	pub const fn new(balance: u8) -> Self {
		if balance > 100 {
			Self::RIGHT
		} else {
			Self(balance)
		}
	}

	#[inline]
	#[must_use]
	/// Returns the inner [`u8`]
	pub const fn inner(&self) -> u8 {
		self.0
	}
}

impl Default for Balance {
	#[inline]
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl std::fmt::Display for Balance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u8> for Balance {
	#[inline]
	fn from(balance: u8) -> Self {
		Self::new(balance)
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn new_saturates() {
		assert_eq!(Balance::new(0),   Balance::LEFT);
		assert_eq!(Balance::new(50),  Balance::CENTER);
		assert_eq!(Balance::new(100), Balance::RIGHT);
		assert_eq!(Balance::new(200), Balance::RIGHT);
	}
}
