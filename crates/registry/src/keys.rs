//! Store key layout.
//!
//! ```text
//! name key:  [0x03] :: H(root) :: H(root, child) :: ...
//! index key: [0x05] :: [len(addr)] :: [addr-bytes] :: [name-key-bytes]
//! ```
//!
//! Segments are hashed right to left, so the right-most segment is the root
//! and each level appends a running SHA-256 of every segment seen so far. A
//! name's key is a prefix of the keys of all names beneath it.

use crate::errors::{NameError, Result};
use dotname_types::{verify_address_format, Address};
use sha2::{Digest, Sha256};

/// Namespace for records keyed by name.
pub const NAME_KEY_PREFIX: u8 = 0x03;
/// Namespace for the owner index.
pub const ADDRESS_KEY_PREFIX: u8 = 0x05;
/// Bytes contributed by each name level.
pub const LEVEL_KEY_LEN: usize = 32;

/// Derive the primary key for `name`.
///
/// Segments are trimmed but not lowercased; pass the normalized name.
pub fn name_key(name: &str) -> Result<Vec<u8>> {
    let segments: Vec<&str> = name.split('.').collect();
    let mut key = Vec::with_capacity(1 + segments.len() * LEVEL_KEY_LEN);
    key.push(NAME_KEY_PREFIX);

    let mut hasher = Sha256::new();
    for segment in segments.iter().rev() {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(NameError::SegmentTooShort {
                segment: segment.to_string(),
                min: 1,
            });
        }
        hasher.update(segment.as_bytes());
        key.extend_from_slice(&hasher.clone().finalize());
    }
    Ok(key)
}

/// Prefix shared by every index entry owned by `address`.
pub fn address_key_prefix(address: &Address) -> Result<Vec<u8>> {
    verify_address_format(address.as_bytes())?;
    let bytes = address.as_bytes();
    let mut key = Vec::with_capacity(2 + bytes.len());
    key.push(ADDRESS_KEY_PREFIX);
    // verify_address_format caps the length at u8::MAX.
    key.push(bytes.len() as u8);
    key.extend_from_slice(bytes);
    Ok(key)
}

/// Owner index key pointing at the record stored under `name_key`.
pub fn address_index_key(address: &Address, name_key: &[u8]) -> Result<Vec<u8>> {
    let mut key = address_key_prefix(address)?;
    key.extend_from_slice(name_key);
    Ok(key)
}
