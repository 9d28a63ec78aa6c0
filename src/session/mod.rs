//! The device session.

mod sample;
pub use sample::{Sample,Span};

mod session;
pub use session::Session;
