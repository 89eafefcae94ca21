use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when parsing or verifying an owner address.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AddressError {
    #[error("address must start with 'i'")]
    InvalidPrefix,
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("addresses cannot be empty")]
    Empty,
    #[error("address max length is {max}, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Maximum number of raw bytes an address may carry.
///
/// The owner index stores the address length in a single byte.
pub const MAX_ADDRESS_LEN: usize = 255;

/// Check that raw address bytes are well formed.
pub fn verify_address_format(bytes: &[u8]) -> Result<(), AddressError> {
    if bytes.is_empty() {
        return Err(AddressError::Empty);
    }
    if bytes.len() > MAX_ADDRESS_LEN {
        return Err(AddressError::TooLong {
            max: MAX_ADDRESS_LEN,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Encode raw address bytes into the human readable format.
///
/// The encoded address always begins with the character `i` followed by the
/// hexadecimal representation of the raw bytes.
pub fn encode_address(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(1 + bytes.len() * 2);
    encoded.push('i');
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Attempt to decode a human readable address string into the raw bytes.
pub fn decode_address(address: &str) -> Result<Vec<u8>, AddressError> {
    let payload = address
        .strip_prefix('i')
        .ok_or(AddressError::InvalidPrefix)?;
    let decoded = hex::decode(payload)?;
    verify_address_format(&decoded)?;
    Ok(decoded)
}

/// Opaque owner identity.
///
/// Held as raw bytes; serialised as its `i<hex>` string form so records stay
/// readable in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(Vec<u8>);

impl Address {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_address(&self.0))
    }
}

impl From<Vec<u8>> for Address {
    fn from(value: Vec<u8>) -> Self {
        Address(value)
    }
}

impl From<&[u8]> for Address {
    fn from(value: &[u8]) -> Self {
        Address(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Address {
    fn from(value: [u8; N]) -> Self {
        Address(value.to_vec())
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        encode_address(&value.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode_address(&value).map(Address)
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_address(s).map(Address)
    }
}
