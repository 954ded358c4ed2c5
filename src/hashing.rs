//! SHA-256 digests that correlate renders and accepted configurations in logs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Short digest of rendered markup (first 16 hex chars).
pub fn content_digest(html: &str) -> String {
    let mut digest = format!("{:x}", Sha256::digest(html.as_bytes()));
    digest.truncate(16);
    digest
}

/// Digest of a typed configuration. Resource maps are `BTreeMap`s, so the
/// serialized form does not depend on the key order of the source JSON.
pub fn config_digest<T: Serialize>(config: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(config)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
