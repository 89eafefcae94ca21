use crate::address::Address;
use serde::{Deserialize, Serialize};

/// A normalized name bound to an owner.
///
/// The same payload is stored under the name key and under the owner index
/// key, so it must round-trip byte-for-byte through the record codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub name: String,
    pub address: Address,
    /// Stored and returned as-is. Callers decide what it gates.
    #[serde(default)]
    pub restricted: bool,
}

impl NameRecord {
    pub fn new(name: impl Into<String>, address: Address, restricted: bool) -> Self {
        Self {
            name: name.into(),
            address,
            restricted,
        }
    }
}

pub type NameRecords = Vec<NameRecord>;
