//! Declarative byte shape of a currency record.
//!
//! A shape is a token list walked left to right against the buffer. The
//! known currency record is
//!
//! ```text
//! 1A <record_len> 0A <name_len> <name...> 10 01 18 <value> 30 01
//! ```
//!
//! where `<record_len>`, `<name_len>` and `<value>` are varints.

use crate::varint;

/// One element of a record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Fixed byte
    Byte(u8),
    /// Varint length of the record payload; the payload starts right after it
    RecordLength,
    /// Varint length followed by the name bytes
    Name,
    /// Varint holding the stored currency value
    Value,
}

/// Name constraint applied to the `Name` token
#[derive(Debug, Clone, Copy)]
pub enum NameMatch<'n> {
    /// Bytes must equal this name
    Exact(&'n [u8]),
    /// Any non-empty UTF-8 name
    Any,
}

/// Fields captured by a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMatch {
    pub record_offset: usize,
    pub payload_offset: usize,
    pub payload_length: usize,
    pub name: String,
    pub value_offset: usize,
    pub value_length: usize,
    pub value: u64,
}

impl ShapeMatch {
    /// End of the record's declared payload (exclusive)
    pub fn record_end(&self) -> usize {
        self.payload_offset + self.payload_length
    }
}

/// Sequence of tokens describing one record layout
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    tokens: &'static [Token],
}

/// Layout of a currency entry in the observed save format
pub const CURRENCY_RECORD: Shape = Shape::new(&[
    Token::Byte(RECORD_TAG),
    Token::RecordLength,
    Token::Byte(NAME_TAG),
    Token::Name,
    Token::Byte(0x10),
    Token::Byte(0x01),
    Token::Byte(VALUE_TAG),
    Token::Value,
    Token::Byte(0x30),
    Token::Byte(0x01),
]);

/// Tag byte opening a currency record
pub const RECORD_TAG: u8 = 0x1A;
/// Tag byte opening the name field
pub const NAME_TAG: u8 = 0x0A;
/// Tag byte opening the value field
pub const VALUE_TAG: u8 = 0x18;

impl Shape {
    pub const fn new(tokens: &'static [Token]) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &'static [Token] {
        self.tokens
    }

    /// Try to match the shape starting at `start`.
    ///
    /// Every token must be present, and the declared payload must cover all
    /// matched payload bytes while staying inside the buffer.
    pub fn match_at(&self, buf: &[u8], start: usize, name: NameMatch<'_>) -> Option<ShapeMatch> {
        let mut pos = start;
        let mut payload: Option<(usize, usize)> = None;
        let mut matched_name: Option<String> = None;
        let mut value: Option<(usize, usize, u64)> = None;

        for token in self.tokens {
            match *token {
                Token::Byte(expected) => {
                    if *buf.get(pos)? != expected {
                        return None;
                    }
                    pos += 1;
                }
                Token::RecordLength => {
                    let (len, n) = varint::decode(buf, pos)?;
                    pos += n;
                    payload = Some((pos, usize::try_from(len).ok()?));
                }
                Token::Name => {
                    let (len, n) = varint::decode(buf, pos)?;
                    let begin = pos + n;
                    let end = begin.checked_add(usize::try_from(len).ok()?)?;
                    let bytes = buf.get(begin..end)?;
                    let text = match name {
                        NameMatch::Exact(expected) if bytes == expected => {
                            String::from_utf8_lossy(bytes).into_owned()
                        }
                        NameMatch::Exact(_) => return None,
                        NameMatch::Any if bytes.is_empty() => return None,
                        NameMatch::Any => std::str::from_utf8(bytes).ok()?.to_owned(),
                    };
                    matched_name = Some(text);
                    pos = end;
                }
                Token::Value => {
                    let (v, n) = varint::decode(buf, pos)?;
                    value = Some((pos, n, v));
                    pos += n;
                }
            }
        }

        let (payload_offset, payload_length) = payload?;
        let (value_offset, value_length, value) = value?;
        let payload_end = payload_offset.checked_add(payload_length)?;
        if payload_end < pos || payload_end > buf.len() {
            return None;
        }

        Some(ShapeMatch {
            record_offset: start,
            payload_offset,
            payload_length,
            name: matched_name?,
            value_offset,
            value_length,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::currency_record as record;

    #[test]
    fn test_match_exact_name() {
        let buf = record("gold", 300);
        let m = CURRENCY_RECORD
            .match_at(&buf, 0, NameMatch::Exact(b"gold"))
            .unwrap();
        assert_eq!(m.name, "gold");
        assert_eq!(m.payload_offset, 2);
        assert_eq!(m.payload_length, buf.len() - 2);
        assert_eq!(m.value_offset, 2 + 1 + 1 + 4 + 3);
        assert_eq!(m.value_length, 2);
        assert_eq!(m.value, 300);
        assert_eq!(m.record_end(), buf.len());
    }

    #[test]
    fn test_match_rejects_other_name() {
        let buf = record("gold", 1);
        assert!(
            CURRENCY_RECORD
                .match_at(&buf, 0, NameMatch::Exact(b"gems"))
                .is_none()
        );
    }

    #[test]
    fn test_match_any_name() {
        let buf = record("lucky_coin", 16);
        let m = CURRENCY_RECORD.match_at(&buf, 0, NameMatch::Any).unwrap();
        assert_eq!(m.name, "lucky_coin");
        assert_eq!(m.value, 16);
    }

    #[test]
    fn test_match_rejects_missing_trailer() {
        let mut buf = record("gold", 5);
        let last = buf.len() - 1;
        buf[last] = 0x02;
        assert!(CURRENCY_RECORD.match_at(&buf, 0, NameMatch::Any).is_none());
    }

    #[test]
    fn test_match_rejects_truncated_buffer() {
        let buf = record("gold", 5);
        for cut in 1..buf.len() {
            assert!(
                CURRENCY_RECORD
                    .match_at(&buf[..cut], 0, NameMatch::Any)
                    .is_none(),
                "matched with {} bytes",
                cut
            );
        }
    }

    #[test]
    fn test_match_rejects_short_declared_length() {
        let mut buf = record("gold", 5);
        buf[1] -= 1;
        assert!(CURRENCY_RECORD.match_at(&buf, 0, NameMatch::Any).is_none());
    }

    #[test]
    fn test_match_allows_trailing_payload_fields() {
        let mut buf = record("gold", 5);
        buf[1] += 2;
        buf.extend_from_slice(&[0x38, 0x00]);
        let m = CURRENCY_RECORD.match_at(&buf, 0, NameMatch::Any).unwrap();
        assert_eq!(m.record_end(), buf.len());
    }
}
