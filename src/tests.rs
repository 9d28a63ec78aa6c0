//! These are helper functions used for testing throughout the codebase.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	config::Config,
	format::{FormatTag,WaveFormat},
	session::Session,
};
use std::time::{Duration,Instant};

//---------------------------------------------------------------------------------------------------- Test Init Helpers
/// The stereo pcm16 descriptor most tests open with.
pub(crate) fn pcm16() -> WaveFormat {
	WaveFormat {
		sample_rate:     44_100,
		channels:        2,
		bits_per_sample: 16,
		tag:             FormatTag::Pcm,
	}
}

/// A `Session` opened on the dummy backend with default config.
pub(crate) fn open_session() -> Session {
	let mut session = Session::new(Config::DEFAULT);
	session.open(pcm16()).unwrap();
	session
}

/// Poll `condition` until it holds or a generous deadline passes.
///
/// The dummy backend completes buffers on its own schedule;
/// tests that assert on completion effects wait through this
/// instead of sleeping a magic number.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
	let deadline = Instant::now() + Duration::from_secs(5);
	while Instant::now() < deadline {
		if condition() {
			return true;
		}
		std::thread::sleep(Duration::from_millis(1));
	}
	false
}
