//! Synthetic save buffers for unit tests.

use crate::record::shape::{NAME_TAG, RECORD_TAG, VALUE_TAG};
use crate::varint;

/// Encode one currency record in the observed layout
pub fn currency_record(name: &str, value: u64) -> Vec<u8> {
    let mut payload = vec![NAME_TAG];
    varint::encode_into(name.len() as u64, &mut payload);
    payload.extend_from_slice(name.as_bytes());
    payload.extend_from_slice(&[0x10, 0x01, VALUE_TAG]);
    varint::encode_into(value, &mut payload);
    payload.extend_from_slice(&[0x30, 0x01]);

    let mut out = vec![RECORD_TAG];
    varint::encode_into(payload.len() as u64, &mut out);
    out.extend(payload);
    out
}

/// Builder for a decoded save buffer with currency records mixed into noise
#[derive(Debug, Default)]
pub struct MockSaveBuilder {
    buf: Vec<u8>,
}

impl MockSaveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a currency record
    pub fn currency(mut self, name: &str, value: u64) -> Self {
        self.buf.extend(currency_record(name, value));
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Save with the three currencies seen in a real player file
pub fn sample_save() -> Vec<u8> {
    MockSaveBuilder::new()
        .bytes(&[0x0A, 0x06, b'p', b'l', b'a', b'y', b'e', b'r', 0x10, 0x2A])
        .currency("gold", 195_225_736)
        .bytes(&[0x22, 0x03, 0x01, 0x02, 0x03])
        .currency("lucky_coin", 195_225_780)
        .currency("friendship_essence", 195_225_776)
        .bytes(&[0x28, 0x00])
        .build()
}
