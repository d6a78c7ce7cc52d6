//! Snapshot Codec — JSON encoder/decoder for claim snapshots.
//!
//! Pure codec layer, no files.
//!
//! - `encode_snapshot`:        ClaimSnapshot → compact JSON
//! - `encode_snapshot_pretty`: ClaimSnapshot → indented JSON for display
//! - `decode_snapshot`:        JSON → ClaimSnapshot (strict, unknown fields rejected)
//! - `restore_snapshot`:       decode + invariant validation
//! - `snapshot_hash`:          SHA-256 of the compact encoding (lowercase hex)

use thiserror::Error;

use claim_engine::domain::ClaimSnapshot;
use claim_engine::hashing::hex_digest;
use claim_engine::invariants::{validate_invariants, InvariantViolation};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("snapshot deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("decoded snapshot is invalid: {0}")]
    Invariant(#[from] InvariantViolation),
}

pub fn encode_snapshot(snapshot: &ClaimSnapshot) -> Result<String, CodecError> {
    serde_json::to_string(snapshot).map_err(CodecError::Serialize)
}

pub fn encode_snapshot_pretty(snapshot: &ClaimSnapshot) -> Result<String, CodecError> {
    serde_json::to_string_pretty(snapshot).map_err(CodecError::Serialize)
}

/// Decode without validation; use `restore_snapshot` for untrusted input.
pub fn decode_snapshot(json: &str) -> Result<ClaimSnapshot, CodecError> {
    serde_json::from_str(json).map_err(CodecError::Deserialize)
}

pub fn restore_snapshot(json: &str) -> Result<ClaimSnapshot, CodecError> {
    let snapshot = decode_snapshot(json)?;
    validate_invariants(&snapshot)?;
    Ok(snapshot)
}

pub fn snapshot_hash(snapshot: &ClaimSnapshot) -> Result<String, CodecError> {
    let json = encode_snapshot(snapshot)?;
    Ok(hex_digest(json.as_bytes()))
}
