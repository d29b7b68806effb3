use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};
use crate::snapshot::SnapshotRecord;

/// Encode a value to UTF-8 JSON bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(Error::from)
}

/// Decode UTF-8 JSON bytes to a value.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(Error::from)
}

/// Encode a snapshot record as the message value.
pub fn encode_record(record: &SnapshotRecord) -> Result<Vec<u8>> {
    encode(record)
}

/// Decode a message value into a snapshot record.
///
/// Rejects payloads with missing or extra fields.
pub fn decode_record(data: &[u8]) -> Result<SnapshotRecord> {
    decode(data)
}
