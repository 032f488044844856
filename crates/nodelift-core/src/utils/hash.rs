//! SHA-1 hashing utilities for registry checksums.
//!
//! npm publishes a hex SHA-1 `shasum` for every tarball; these helpers
//! compute and verify it.

use crate::error::{LiftError, LiftResult};
use sha1::{Digest, Sha1};

/// Compute the hex SHA-1 digest of data
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify data against an expected hex SHA-1 checksum
pub fn verify_shasum(package: &str, data: &[u8], expected: &str) -> LiftResult<()> {
    let actual = sha1_hex(data);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(LiftError::IntegrityFailure {
            package: package.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}
