//! Loom model of the registration protocol.
//!
//! `classmeta` itself cannot run under loom: `arc-swap` and `dashmap`
//! use real `std` atomics internally and are not loom-aware. This crate
//! re-expresses the protocol that carries the correctness argument with
//! loom primitives and lets loom enumerate its interleavings:
//!
//! - the index snapshot published by a single atomic pointer store
//! - registration serialized by one mutex
//! - the published snapshot re-checked under that mutex
//!
//! The model checks that at most one table is created per context no
//! matter how threads interleave, that readers only ever observe fully
//! formed snapshots, and that every thread converges on the winner.
//!
//! Run with:
//!
//! ```text
//! RUSTFLAGS="--cfg loom" cargo test -p classmeta-loom-probe --release
//! ```

// Raw snapshot pointers stand in for ArcSwap's managed refcounts; every
// retired pointer is freed in Drop, after the model's threads have joined.
#![allow(unsafe_code)]

#[cfg(loom)]
mod model;

#[cfg(loom)]
pub use model::{Key, Probe};
