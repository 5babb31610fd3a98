use sha1::{Digest, Sha1};

/// Keyspace position of a key.
///
/// The first eight bytes of the SHA-1 digest of the key's UTF-8 bytes, read
/// as a big-endian `u64`. No normalization is applied to the key.
pub fn position(key: &str) -> u64 {
    let digest = Sha1::digest(key.as_bytes());
    digest[..8]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// Key hashed to place the `index`-th virtual position of a node.
pub fn virtual_key(node_id: &str, index: usize) -> String {
    format!("{node_id}#{index}")
}

pub fn virtual_position(node_id: &str, index: usize) -> u64 {
    position(&virtual_key(node_id, index))
}
