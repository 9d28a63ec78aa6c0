// An AtomicF32 implementation.
//
// This internally uses [AtomicU32], where the
// u32 is the bit pattern of the internal float.
//
// This uses [.to_bits()] and [from_bits()] to
// convert between actual floats, and the bit
// representations for storage.

//---------------------------------------------------------------------------------------------------- Atomic Float
use std::sync::atomic::{AtomicU32,Ordering};

pub(crate) struct AtomicF32(AtomicU32);

impl AtomicF32 {
	#[inline]
	pub(crate) fn new(f: f32) -> Self {
		Self(AtomicU32::new(f.to_bits()))
	}

	#[inline]
	pub(crate) fn store(&self, f: f32, ordering: Ordering) {
		self.0.store(f.to_bits(), ordering);
	}

	#[inline]
	pub(crate) fn load(&self, ordering: Ordering) -> f32 {
		f32::from_bits(self.0.load(ordering))
	}

	#[inline]
	pub(crate) fn set(&self, f: f32) {
		self.store(f, Ordering::Release);
	}

	#[inline]
	pub(crate) fn get(&self) -> f32 {
		self.load(Ordering::Acquire)
	}
}

impl std::fmt::Debug for AtomicF32 {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("AtomicF32")
			.field(&self.load(Ordering::Relaxed))
			.finish()
	}
}
