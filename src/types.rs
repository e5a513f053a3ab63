//! Core types for the agent translation bridge.

/// VersionId: per-URI sequence number of a stored canonical agent, starting at 1
pub type VersionId = u64;

/// Hash: Generic 256-bit hash value
pub type Hash = [u8; 32];

/// Compute the blake3 content hash of arbitrary bytes
pub fn content_hash(bytes: &[u8]) -> Hash {
    *blake3::hash(bytes).as_bytes()
}

/// Hex form of a content hash, as stored in provenance metadata
pub fn content_hash_hex(bytes: &[u8]) -> String {
    hex::encode(content_hash(bytes))
}
