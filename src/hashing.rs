//! Hashing System - SHA-256 for Manifests
//!
//! Stable fingerprints of books and compiled documents. Both are taken over
//! canonical JSON, so key order in the source file never changes a hash.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::book::GeneratedBook;
use crate::pipeline::CompiledDocument;

/// Manifest field excluded from its own hash.
const MANIFEST_HASH_FIELD: &str = "manifest_hash";

/// JSON with object keys sorted at every depth and no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Canonical(&serde_json::to_value(value)?))
}

struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let sorted: BTreeMap<&str, Canonical> =
                    map.iter().map(|(k, v)| (k.as_str(), Canonical(v))).collect();
                sorted.serialize(serializer)
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Canonical)),
            scalar => scalar.serialize(serializer),
        }
    }
}

fn digest(value: &Value) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(&Canonical(value))?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

/// Fingerprint of the input book.
pub fn compute_book_hash(book: &GeneratedBook) -> Result<String, serde_json::Error> {
    digest(&serde_json::to_value(book)?)
}

/// Fingerprint of a compiled document: every field except the manifest
/// hash itself, so a stored manifest can be re-checked as is.
pub fn compute_manifest_hash(compiled: &CompiledDocument) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(compiled)?;
    if let Value::Object(map) = &mut value {
        map.remove(MANIFEST_HASH_FIELD);
    }
    digest(&value)
}
