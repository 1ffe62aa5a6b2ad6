//! Purpose: Keyed codec facade over serde encoders and decoders.
//! Exports: `core` (facade internals) and `api` (stable public surface).
//! Role: Library backing the `keycodec` CLI and embedding applications.
//! Invariants: All real encoding work is delegated to serde format crates.
//! Invariants: No operation keeps state across calls.
pub mod api;
pub mod core;
