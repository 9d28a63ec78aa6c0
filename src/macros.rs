// Global macros for internal wavesink usage.

//---------------------------------------------------------------------------------------------------- Channels
// SAFETY:
// These macros are used in situations where
// a [send/recv] erroring is a logical error.

// Receive a channel message, unwrap.
macro_rules! recv {
    ($channel:expr) => {
		if cfg!(debug_assertions) {
        	$channel.recv().unwrap()
		} else {
	        unsafe { $channel.recv().unwrap_unchecked() }
		}
    }
}
pub(crate) use recv;

// Send a channel message, unwrap.
macro_rules! send {
    ($channel:expr, $($msg:tt)+) => {
		if cfg!(debug_assertions) {
        	$channel.send($($msg)+).unwrap()
		} else {
	        unsafe { $channel.send($($msg)+).unwrap_unchecked() }
		}
    }
}
pub(crate) use send;

// `try_send` a channel message, unwrap.
macro_rules! try_send {
    ($channel:expr, $($msg:tt)+) => {
		if cfg!(debug_assertions) {
        	$channel.try_send($($msg)+).unwrap()
		} else {
	        unsafe { $channel.try_send($($msg)+).unwrap_unchecked() }
		}
    }
}
pub(crate) use try_send;

//---------------------------------------------------------------------------------------------------- Locks
// Lock a [std::sync::Mutex], recovering the guard from poison.
//
// A poisoned pool lock means a thread panicked mid-bookkeeping;
// debug builds want the loud failure, release builds carry on
// best-effort (the completion path must never take the device
// thread down with it).
macro_rules! lock {
	($mutex:expr) => {
		match $mutex.lock() {
			Ok(guard) => guard,
			Err(poison) => {
				debug_assert!(false, "poisoned lock");
				poison.into_inner()
			},
		}
	}
}
pub(crate) use lock;

//---------------------------------------------------------------------------------------------------- Logging
// Logs with `log` but only if in debug
// mode or if the log feature is enabled.

macro_rules! error2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::error!($($arg)+);
    }};
}
pub(crate) use error2;

macro_rules! warn2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::warn!($($arg)+);
    }};
}
pub(crate) use warn2;

macro_rules! debug2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::debug!($($arg)+);
    }};
}
pub(crate) use debug2;

macro_rules! trace2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::trace!($($arg)+);
    }};
}
pub(crate) use trace2;
