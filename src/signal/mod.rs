//! Volume, balance, and the channel gains derived from them.

mod volume;
pub use volume::Volume;

mod balance;
pub use balance::Balance;

mod gains;
pub use gains::ChannelGains;
pub(crate) use gains::AtomicGains;
