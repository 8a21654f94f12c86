//! Base-128 little-endian variable-length integers.
//!
//! Each byte carries 7 value bits; the high bit is set when more bytes follow.
//! Values are unsigned and limited to 64 bits (at most 10 bytes).

/// Longest encoding of a `u64`
pub const MAX_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

/// Encode `value`, appending the bytes to `out`
pub fn encode_into(mut value: u64, out: &mut Vec<u8>) {
    while value >= u64::from(CONTINUATION) {
        out.push((value as u8 & VALUE_MASK) | CONTINUATION);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encode `value` into a new buffer
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_into(value, &mut out);
    out
}

/// Number of bytes `encode` produces for `value`
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Decode a varint starting at `pos`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// buffer ends mid-value or the value does not fit in a `u64`.
pub fn decode(buf: &[u8], pos: usize) -> Option<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in buf.get(pos..)?.iter().enumerate() {
        let bits = u64::from(byte & VALUE_MASK);
        // 10th byte may only contribute the single remaining bit
        if shift == 63 && bits > 1 {
            return None;
        }
        result |= bits << shift;

        if byte & CONTINUATION == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
        if shift > 63 {
            return None;
        }
    }
    None
}
