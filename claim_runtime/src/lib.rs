#![forbid(unsafe_code)]

//! Claim review runtime.
//!
//! Wraps the kernel with script replay, a per-claim session object,
//! TOML configuration and a JSON snapshot codec.
//!
//! No lifecycle rules live here; transitions, guidance selection and
//! invariants are delegated to the kernel.

pub mod config;
pub mod replay;
pub mod script;
pub mod session;
pub mod snapshot_codec;
