//! The digest used by the login handshake

use md5::{Digest, Md5};

/// Returns the lowercase hex MD5 of `input` (always 32 characters)
pub fn fingerprint<S: AsRef<str>>(input: S) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_ref().as_bytes());
    hex::encode(hasher.finalize())
}
