// Core modules implementing keys, containers, transformers, engines, and errors.
pub mod date;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod error;
mod finite;
pub mod key;
pub mod keyed;
pub mod transform;
