/// Claim Engine — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing of a snapshot.
///
/// Rules:
///   - Fields in declaration order (camelCase names)
///   - History in stored order; ordering is part of the identity
///   - Absent optional fields are omitted
///   - UTF-8 JSON, no whitespace

use sha2::{Digest, Sha256};

use crate::domain::ClaimSnapshot;

/// Canonical serialization of a snapshot to UTF-8 JSON bytes.
pub fn canonical_serialize(snapshot: &ClaimSnapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(snapshot: &ClaimSnapshot) -> Result<String, serde_json::Error> {
    let bytes = canonical_serialize(snapshot)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
