//! Canonical serialization and the content-addressed snapshot hash.
//!
//! `Snapshot` is built entirely of `BTreeMap`s (never `HashMap`), so
//! `serde_json`'s default map serialization already emits keys in sorted
//! order — canonicalization is just "serialize with `serde_json`, don't
//! enable the `preserve_order` feature anywhere in the workspace."

use crate::snapshot::Snapshot;
use sha2::{Digest, Sha256};

/// Serialize a snapshot to its canonical JSON string: sorted keys (by
/// construction, since every map in the model is a `BTreeMap`), no
/// insignificant whitespace, stable number formatting from `serde_json`.
///
/// Two snapshots built from the same event sequence, on any host, produce
/// byte-identical output from this function (invariant 1/2/8, spec §8).
pub fn canonical_json(snapshot: &Snapshot) -> String {
    serde_json::to_string(snapshot).expect("Snapshot serialization is infallible")
}

/// Deterministic SHA-256 over the canonical JSON of the snapshot, truncated
/// to 16 hex characters. Used by clients to decide whether to re-hydrate
/// after a stream (spec §4.4); not a security primitive.
pub fn snapshot_hash(snapshot: &Snapshot) -> String {
    let json = canonical_json(snapshot);
    let digest = Sha256::digest(json.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}
