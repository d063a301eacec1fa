//! Request signing

use crate::multipart::FormFields;
use sha2::{Digest, Sha256};

/// Field holding the signature
pub const SIGNATURE_FIELD: &str = "sig";

/// Hex digest over the fields sorted by name, as `k=v` pairs, then the secret
///
/// An existing `sig` field is not part of the digest.
pub fn compute_signature(fields: &FormFields, secret: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = fields
        .iter()
        .filter(|(name, _)| *name != SIGNATURE_FIELD)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha256::new();
    for (name, value) in pairs {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
