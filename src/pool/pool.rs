//! The transfer-buffer pool and its backpressure gate.
//!
//! Two actors touch this structure: the producer thread
//! acquiring buffers in [`crate::Session::play`], and the
//! device-driven completion thread handing them back. Both
//! funnel through one mutex guarding the slot arena, the free
//! list, and the gate predicate - the gate itself is a condvar
//! behaving like a manually-reset signal.
//!
//! No lock is ever held while calling into the device; buffer
//! submission and completion acknowledgment happen outside,
//! with only bookkeeping inside the critical section.

//---------------------------------------------------------------------------------------------------- use
use crate::{
	macros::{error2,lock,trace2,warn2},
	pool::{BufferId,TransferBuffer},
};
use std::sync::{Condvar,Mutex};

//---------------------------------------------------------------------------------------------------- SlotState
/// Which side of the pool a slot's buffer currently sits on.
#[derive(Copy,Clone,Debug,PartialEq,Eq)]
enum SlotState {
	/// Recyclable, present in the free list.
	Free,
	/// Owned by the device backend until completion.
	InFlight,
}

//---------------------------------------------------------------------------------------------------- Inner
/// Everything guarded by the pool mutex.
struct Inner {
	/// Slot tags, indexed by [`BufferId`].
	///
	/// INVARIANT: a slot is in exactly one of {in-flight, free}
	/// at any time, and `in_flight + free.len() == slots.len()`
	/// after every operation.
	slots: Vec<SlotState>,

	/// The free buffers themselves, storage preserved for re-use.
	free: Vec<TransferBuffer>,

	/// How many slots are tagged [`SlotState::InFlight`].
	in_flight: usize,

	/// The backpressure gate predicate.
	///
	/// INVARIANT: `false` exactly while `in_flight > threshold`.
	/// Every transition that could flip this re-evaluates it
	/// under the same lock, else a waiter is lost forever.
	gate_open: bool,

	/// Set once by [`BufferPool::close`]; acquires fail afterwards.
	closed: bool,
}

//---------------------------------------------------------------------------------------------------- BufferPool
/// A rotating pool of device-owned transfer buffers.
///
/// Buffers are created lazily: an acquire with an empty free
/// list allocates a new slot instead of waiting on one. Growth
/// is bounded by the gate - once more than `threshold` buffers
/// are in-flight, acquires block until completions catch up.
pub(crate) struct BufferPool {
	/// Slot arena + free list + gate predicate.
	inner: Mutex<Inner>,
	/// Waited on by [`Self::acquire`] while the gate is closed.
	gate: Condvar,
	/// In-flight count above which the gate closes.
	threshold: usize,
}

impl BufferPool {
	/// Cheap consistency re-check, debug builds only.
	fn debug_assert_invariant(&self, inner: &Inner) {
		debug_assert_eq!(inner.in_flight + inner.free.len(), inner.slots.len());
		debug_assert_eq!(inner.gate_open, inner.in_flight <= self.threshold);
	}

	#[cold]
	#[inline(never)]
	pub(crate) fn new(threshold: usize) -> Self {
		Self {
			inner: Mutex::new(Inner {
				slots:     Vec::new(),
				free:      Vec::new(),
				in_flight: 0,
				gate_open: true,
				closed:    false,
			}),
			gate: Condvar::new(),
			threshold,
		}
	}

	/// Take a buffer out of the pool, blocking under backpressure.
	///
	/// Blocks the calling thread if and only if the in-flight
	/// count has exceeded the threshold; wakes when a completion
	/// drops it back to/below the threshold. The wait has no
	/// timeout - the device always eventually completes submitted
	/// buffers, or [`Self::close`] wakes us.
	///
	/// Returns `None` only if the pool was closed.
	pub(crate) fn acquire(&self) -> Option<TransferBuffer> {
		let mut inner = lock!(self.inner);

		while !inner.gate_open && !inner.closed {
			// Condvar wait gives the lock back; the re-check of
			// the predicate on wake is what makes the gate a
			// manually-reset signal rather than a counter.
			inner = match self.gate.wait(inner) {
				Ok(guard) => guard,
				Err(poison) => poison.into_inner(),
			};
		}

		if inner.closed {
			return None;
		}

		let buffer = match inner.free.pop() {
			Some(buffer) => {
				inner.slots[buffer.id().inner()] = SlotState::InFlight;
				buffer
			},
			// Free list empty - grow the arena.
			None => {
				let id = BufferId::new(inner.slots.len());
				inner.slots.push(SlotState::InFlight);
				TransferBuffer::new(id)
			},
		};

		inner.in_flight += 1;
		if inner.in_flight > self.threshold {
			inner.gate_open = false;
		}

		self.debug_assert_invariant(&inner);
		drop(inner);

		trace2!("BufferPool - acquire, id: {:?}", buffer.id());
		Some(buffer)
	}

	/// Completion path: hand an in-flight buffer back.
	///
	/// Called on the device-driven thread. Nothing here may
	/// block beyond the bookkeeping lock, and nothing here may
	/// panic across the callback boundary.
	///
	/// A buffer whose identity is not tagged in-flight in the
	/// arena means pool bookkeeping and device bookkeeping have
	/// diverged - payload corruption is already possible. Debug
	/// builds assert; release builds drop the buffer and carry on.
	pub(crate) fn complete(&self, buffer: TransferBuffer) {
		let id = buffer.id();
		let mut inner = lock!(self.inner);

		if inner.closed {
			// Torn down while the device still held this one.
			drop(inner);
			warn2!("BufferPool - completion after close, id: {id:?}, dropping");
			return;
		}

		if !matches!(inner.slots.get(id.inner()), Some(SlotState::InFlight)) {
			drop(inner);
			debug_assert!(
				false,
				"completion for unknown buffer identity: {id:?}, span: {:?}",
				buffer.span(),
			);
			error2!("BufferPool - completion for unknown buffer identity: {id:?}, ignoring");
			return;
		}

		inner.slots[id.inner()] = SlotState::Free;
		inner.free.push(buffer);
		inner.in_flight -= 1;

		if inner.in_flight <= self.threshold && !inner.gate_open {
			inner.gate_open = true;
			// notify_all, not notify_one: every waiter re-checks
			// the predicate, and whoever acquires first may close
			// the gate again on the others.
			self.gate.notify_all();
		}

		self.debug_assert_invariant(&inner);
	}

	/// Force every in-flight buffer back to free.
	///
	/// Used when flushing. The reclaimed slots get fresh (empty)
	/// storage - the real storage is wherever the device left it
	/// and comes home through [`Self::complete`] or not at all.
	///
	/// Callers must have already told the device to discard its
	/// queued buffers; this only reconciles the bookkeeping.
	pub(crate) fn reset(&self) {
		let mut inner = lock!(self.inner);

		for index in 0..inner.slots.len() {
			if inner.slots[index] == SlotState::InFlight {
				inner.slots[index] = SlotState::Free;
				inner.free.push(TransferBuffer::new(BufferId::new(index)));
			}
		}

		inner.in_flight = 0;
		inner.gate_open = true;
		self.gate.notify_all();

		self.debug_assert_invariant(&inner);
	}

	/// Release everything; the pool is unusable afterwards.
	///
	/// Waiters blocked in [`Self::acquire`] wake up and get `None`.
	pub(crate) fn close(&self) {
		let mut inner = lock!(self.inner);

		inner.slots.clear();
		inner.free.clear();
		inner.in_flight = 0;
		inner.closed = true;
		self.gate.notify_all();
	}

	#[inline]
	pub(crate) fn in_flight(&self) -> usize {
		lock!(self.inner).in_flight
	}

	#[cfg(test)]
	#[inline]
	pub(crate) fn free_len(&self) -> usize {
		lock!(self.inner).free.len()
	}

	#[cfg(test)]
	#[inline]
	pub(crate) fn allocated(&self) -> usize {
		lock!(self.inner).slots.len()
	}
}

impl std::fmt::Debug for BufferPool {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = lock!(self.inner);
		f.debug_struct("BufferPool")
			.field("allocated", &inner.slots.len())
			.field("in_flight", &inner.in_flight)
			.field("free", &inner.free.len())
			.field("gate_open", &inner.gate_open)
			.field("closed", &inner.closed)
			.field("threshold", &self.threshold)
			.finish()
	}
}

//---------------------------------------------------------------------------------------------------- TESTS
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::sync::Arc;
	use std::thread;
	use std::time::Duration;

	/// The reference threshold the session defaults to.
	const THRESHOLD: usize = 50;

	fn assert_accounting(pool: &BufferPool) {
		assert_eq!(pool.in_flight() + pool.free_len(), pool.allocated());
	}

	#[test]
	fn accounting_holds_across_sequences() {
		let pool = BufferPool::new(THRESHOLD);
		assert_accounting(&pool);

		let mut held = Vec::new();
		for _ in 0..10 {
			held.push(pool.acquire().unwrap());
			assert_accounting(&pool);
		}
		assert_eq!(pool.in_flight(), 10);
		assert_eq!(pool.allocated(), 10);

		for buffer in held.drain(5..) {
			pool.complete(buffer);
			assert_accounting(&pool);
		}
		assert_eq!(pool.in_flight(), 5);
		assert_eq!(pool.free_len(), 5);
		assert_eq!(pool.allocated(), 10);

		// Re-acquire recycles before allocating.
		for _ in 0..5 {
			held.push(pool.acquire().unwrap());
			assert_accounting(&pool);
		}
		assert_eq!(pool.allocated(), 10);

		for buffer in held {
			pool.complete(buffer);
			assert_accounting(&pool);
		}
		assert_eq!(pool.in_flight(), 0);
		assert_eq!(pool.free_len(), 10);
	}

	#[test]
	fn below_threshold_never_blocks() {
		// Runs on one thread: a block here hangs the test.
		let pool = BufferPool::new(THRESHOLD);
		let mut held = Vec::new();
		for _ in 0..=THRESHOLD {
			held.push(pool.acquire().unwrap());
		}
		assert_eq!(pool.in_flight(), THRESHOLD + 1);
	}

	#[test]
	fn crossing_threshold_blocks_next_acquire() {
		let pool = Arc::new(BufferPool::new(THRESHOLD));

		// The acquire crossing the threshold still succeeds;
		// it is the next one that finds the gate closed.
		let mut held = Vec::new();
		for _ in 0..=THRESHOLD {
			held.push(pool.acquire().unwrap());
		}

		let (tx, rx) = crossbeam::channel::bounded(1);
		let waiter = {
			let pool = Arc::clone(&pool);
			thread::spawn(move || {
				let buffer = pool.acquire();
				tx.send(buffer.is_some()).unwrap();
			})
		};

		// Blocked: nothing has completed.
		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

		// One completion reopens the gate.
		pool.complete(held.pop().unwrap());
		assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
		waiter.join().unwrap();
	}

	#[test]
	fn one_completion_unblocks_exactly_one_waiter() {
		let pool = Arc::new(BufferPool::new(2));

		let mut held = Vec::new();
		for _ in 0..3 {
			held.push(pool.acquire().unwrap());
		}

		let (tx, rx) = crossbeam::channel::unbounded();
		let waiters: Vec<_> = (0..2).map(|_| {
			let pool = Arc::clone(&pool);
			let tx = tx.clone();
			thread::spawn(move || {
				if let Some(buffer) = pool.acquire() {
					tx.send(buffer.id()).unwrap();
				}
			})
		}).collect();

		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

		// One completion lets exactly one waiter through; its own
		// acquire re-crosses the threshold and re-closes the gate.
		pool.complete(held.pop().unwrap());
		assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

		// Wake the straggler so the test can end.
		pool.close();
		for waiter in waiters {
			waiter.join().unwrap();
		}
	}

	#[test]
	fn completed_buffer_is_not_double_used() {
		let pool = BufferPool::new(THRESHOLD);

		let first = pool.acquire().unwrap();
		let second = pool.acquire().unwrap();
		assert_ne!(first.id(), second.id());

		// While `second` is in-flight a fresh acquire may not
		// hand out its identity.
		let third = pool.acquire().unwrap();
		assert_ne!(third.id(), second.id());

		// Once completed, the identity is recyclable.
		let second_id = second.id();
		pool.complete(second);
		let recycled = pool.acquire().unwrap();
		assert_eq!(recycled.id(), second_id);
	}

	#[test]
	fn storage_survives_round_trip() {
		let pool = BufferPool::new(THRESHOLD);

		let mut buffer = pool.acquire().unwrap();
		buffer.write(&[7; 4096]);
		let id = buffer.id();
		let capacity = buffer.capacity();
		pool.complete(buffer);

		let recycled = pool.acquire().unwrap();
		assert_eq!(recycled.id(), id);
		assert_eq!(recycled.capacity(), capacity);
	}

	#[test]
	fn reset_forces_everything_free() {
		let pool = BufferPool::new(THRESHOLD);
		let mut held = Vec::new();
		for _ in 0..20 {
			held.push(pool.acquire().unwrap());
		}
		assert_eq!(pool.in_flight(), 20);

		pool.reset();
		assert_eq!(pool.in_flight(), 0);
		assert_eq!(pool.free_len(), 20);
		assert_accounting(&pool);

		// The buffers still out there must not corrupt accounting
		// when (wrongly) completed afterwards - release behavior
		// is ignore, debug asserts. Dropping them here instead.
		drop(held);
	}

	#[test]
	fn reset_reopens_gate() {
		let pool = Arc::new(BufferPool::new(1));
		let _a = pool.acquire().unwrap();
		let _b = pool.acquire().unwrap();

		let (tx, rx) = crossbeam::channel::bounded(1);
		let waiter = {
			let pool = Arc::clone(&pool);
			thread::spawn(move || {
				tx.send(pool.acquire().is_some()).unwrap();
			})
		};
		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

		pool.reset();
		assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
		waiter.join().unwrap();
	}

	#[test]
	fn close_wakes_waiters_with_none() {
		let pool = Arc::new(BufferPool::new(0));
		let _held = pool.acquire().unwrap();

		let waiter = {
			let pool = Arc::clone(&pool);
			thread::spawn(move || pool.acquire().is_none())
		};

		thread::sleep(Duration::from_millis(50));
		pool.close();
		assert!(waiter.join().unwrap());

		// And acquire on a closed pool fails immediately.
		assert!(pool.acquire().is_none());
	}
}
