#![no_std]
//! # Sharelite: a small, empty-aware shared-ownership pointer
//!
//! Sharelite provides [`Shared<T>`], a reference-counting pointer for
//! single-threaded use that, unlike `std::rc::Rc`, has an explicit *empty*
//! state: a `Shared` either owns a heap-allocated value together with every
//! other `Shared` cloned from it, or it owns nothing at all. Cloning a
//! `Shared` bumps a counter stored next to the value; dropping the last owner
//! releases the value and the counter in one deallocation. Access goes through
//! [`Shared::get`], which returns `None` for an empty instance instead of
//! handing out a dangling view.
//!
//! Every ownership transition (pair allocated, sharer attached, sharer
//! detached, pair freed) is reported to a statically-dispatched [`Probe`].
//! The default probe, [`Silent`], has an empty body and compiles away; a
//! custom probe can log or record transitions without changing any functional
//! behavior.
//!
//! ## Why use Sharelite?
//!
//! - A single nullable pointer models the empty/owning states, so the
//!   "payload set but counter missing" class of bug cannot be expressed
//! - The counter lives in the same allocation as the value, one word or less
//!   of overhead
//! - Transition probes give observability without baking in a logger
//! - It supports `no_std` with extern alloc
//!
//! ## Why not use Sharelite?
//!
//! - It is not thread-safe: the counter is a plain [`Cell`](core::cell::Cell),
//!   so a `Shared` must never be handed to another thread. A concurrent
//!   variant would substitute an atomic counter and is deliberately not
//!   provided here.
//! - It does not provide weak references
//! - It does not support data as DSTs
//!
//! ## Features
//!
//! By default, Sharelite uses a counter size of half the word size for 64-bit
//! systems, with the `usize-for-small-platforms` feature enabled. This is
//! because overflowing a 32-bit counter is harder compared to overflowing
//! 16-bit counters. If you wish to use the half register size on other
//! platforms, you can disable the default features by setting
//! `default-features = false`. This will result in the use of 16-bit counters
//! on 32-bit platforms and 8-bit counters on 16-bit platforms.

#![warn(missing_docs, missing_debug_implementations)]
extern crate alloc;

// Counter definition

#[cfg(target_pointer_width = "64")]
pub(crate) use u32 as ucount;

#[cfg(all(
    not(target_pointer_width = "64"),
    feature = "usize-for-small-platforms"
))]
pub(crate) use usize as ucount;

#[cfg(all(
    target_pointer_width = "32",
    not(feature = "usize-for-small-platforms")
))]
pub(crate) use u16 as ucount;

#[cfg(all(
    target_pointer_width = "16",
    not(feature = "usize-for-small-platforms")
))]
pub(crate) use u8 as ucount;

#[cfg(all(target_pointer_width = "8", not(feature = "usize-for-small-platforms")))]
pub(crate) use usize as ucount;

mod probe;
mod shared;
pub use probe::*;
pub use shared::*;
