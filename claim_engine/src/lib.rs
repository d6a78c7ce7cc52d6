#![forbid(unsafe_code)]

//! Claim lifecycle kernel.
//!
//! Pure functions over immutable claim snapshots: role-gated transitions,
//! estimate recomputation, guidance selection and the history log.
//! No I/O and no global state; hosts pass a clock and roster in.

pub mod clock;
pub mod config;
pub mod domain;
pub mod estimate;
pub mod events;
pub mod guidance;
pub mod hashing;
pub mod history;
pub mod invariants;
pub mod state;
pub mod transitions;
