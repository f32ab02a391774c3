// src/forward/mod.rs

//! Forwarding handles ("implicit futures").
//!
//! - [`handle`] holds [`ForwardingHandle`]: resolve-and-cache access to a
//!   pending result.
//! - [`ops`] forwards a fixed set of operations (comparison, arithmetic,
//!   indexing, calls, string conversion, iteration) to the resolved value.

pub mod handle;
pub mod ops;

pub use handle::ForwardingHandle;
