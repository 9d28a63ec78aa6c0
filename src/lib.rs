//! Pooled hardware audio output.
//!
//! `wavesink` streams decoded audio samples to a hardware
//! output device through a rotating pool of transfer buffers:
//! bounded buffering, asynchronous completion notification,
//! and safe reclamation of device-owned storage.
//!
//! The entry point is [`Session`] - open it with a
//! [`format::WaveFormat`], push [`Sample`]'s at it, and the
//! backpressure gate takes care of bounding memory growth
//! against however fast (or slow) the device drains.

//---------------------------------------------------------------------------------------------------- Lints
#![allow(
    clippy::len_zero,
    clippy::type_complexity,
    clippy::module_inception,
)]

#![deny(
    nonstandard_style,
    deprecated,
    missing_docs,
)]

#![forbid(
    unused_mut,
    unused_unsafe,
    future_incompatible,
    break_with_label_and_loop,
    coherence_leak_check,
    duplicate_macro_attributes,
    exported_private_dependencies,
    for_loops_over_fallibles,
    large_assignments,
    overlapping_range_endpoints,
    semicolon_in_expressions_from_macros,
    redundant_semicolons,
    unconditional_recursion,
    unreachable_patterns,
    unused_allocation,
    unused_braces,
    unused_comparisons,
    unused_doc_comments,
    unused_parens,
    unused_labels,
    while_true,
    keyword_idents,
    non_ascii_idents,
    noop_method_call,
	unreachable_pub,
)]

//---------------------------------------------------------------------------------------------------- Public API
pub mod config;
pub mod error;
pub mod format;
pub mod signal;

mod session;
pub use session::{Sample,Session,Span};

//---------------------------------------------------------------------------------------------------- Private Usage
mod atomic;
mod macros;
mod output;
mod pool;

#[cfg(test)]
pub(crate) mod tests;

//----------------------------------------------------------------------------------------------------
