//! URL handling module for Sumi-Reach
//!
//! Link resolution is a pure function of its inputs: no shared state, no I/O.
//! Every URL that reaches the frontier has passed through this module, which
//! keeps the dedup set keyed on one canonical spelling per target.

mod normalize;

pub use normalize::{normalize_seed, resolve};
