//! Error types for the name registry

use crate::codec::CodecError;
use dotname_storage::StorageError;
use dotname_types::AddressError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameError {
    #[error("no account exists for address {address}")]
    InvalidAddress { address: String },

    #[error("name is already bound: {name}")]
    AlreadyBound { name: String },

    #[error("name is not bound: {name}")]
    NotBound { name: String },

    #[error("invalid name: {name}")]
    NameInvalid { name: String },

    #[error("name segment {segment:?} is shorter than {min} bytes")]
    SegmentTooShort { segment: String, min: u32 },

    #[error("name segment {segment:?} is longer than {max} bytes")]
    SegmentTooLong { segment: String, max: u32 },

    #[error("name has {levels} segments, at most {max} allowed")]
    TooManySegments { levels: usize, max: u32 },

    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, NameError>;
