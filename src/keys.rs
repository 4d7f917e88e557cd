//! Key encoding utilities
//!
//! All keys use a single-byte prefix followed by binary data.
//! This ensures deterministic, lexicographically ordered keys in RocksDB.

use alloy_primitives::Address;

/// Encode a wallet snapshot key.
///
/// Format: byte 'W' (0x57) + address (20 bytes)
/// Total length: 21 bytes
pub fn encode_snapshot_key(addr: Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(21);
    key.push(b'W');
    key.extend_from_slice(addr.as_slice());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use hex;

    #[test]
    fn test_snapshot_key_encoding() {
        let addr = Address::from_slice(&hex::decode("0742d35Cc6634C0532925a3b844Bc9e7595f0bEb").unwrap());
        let key = encode_snapshot_key(addr);
        assert_eq!(key.len(), 21);
        assert_eq!(key[0], b'W');
        assert_eq!(&key[1..], addr.as_slice());
    }

    #[test]
    fn test_snapshot_keys_differ_per_address() {
        let a = Address::from_slice(&hex::decode("0742d35Cc6634C0532925a3b844Bc9e7595f0bEb").unwrap());
        let b = Address::from_slice(&hex::decode("1234567890123456789012345678901234567890").unwrap());
        assert_ne!(encode_snapshot_key(a), encode_snapshot_key(b));
    }
}
