use sha2::{Digest, Sha256};

/// Hex SHA-256 of an upload, used as its dataset id
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for chunk in bytes.chunks(1024 * 64) {
        hasher.update(chunk);
    }
    hex::encode(hasher.finalize())
}
