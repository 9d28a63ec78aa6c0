//! Session configuration.

mod config;
pub use config::{Config,DeviceSelect};

mod tap;
pub use tap::Tap;

mod constants;
pub(crate) use constants::DEFAULT_IN_FLIGHT_THRESHOLD;
