//! Record codecs.
//!
//! A record is written verbatim under two keys, so encodings must be
//! deterministic for a given record.

use dotname_types::NameRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub trait RecordCodec {
    fn encode(&self, record: &NameRecord) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<NameRecord, CodecError>;
}

/// JSON encoding, readable when inspecting the store by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn encode(&self, record: &NameRecord) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<NameRecord, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Compact binary encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl RecordCodec for BincodeCodec {
    fn encode(&self, record: &NameRecord) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<NameRecord, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
