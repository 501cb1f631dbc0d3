//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: all randomness in the simulation (initial account shuffle,
//! §4.6) MUST go through this module so runs are reproducible (R1/R2).

mod xorshift;

pub use xorshift::CasterlyRng;
