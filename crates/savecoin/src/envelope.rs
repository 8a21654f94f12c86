//! Base64 envelope around the binary save content.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::Result;

/// Decode envelope text into raw save bytes, ignoring ASCII whitespace
pub fn decode(text: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Encode raw save bytes as padded standard base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read and decode a save file
pub fn read_save<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let raw = fs::read(&path)?;
    let decoded = decode(&raw)?;
    debug!(
        "Decoded {} ({} -> {} bytes)",
        path.as_ref().display(),
        raw.len(),
        decoded.len()
    );
    Ok(decoded)
}

/// Encode and write a save file
pub fn write_save<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    fs::write(&path, encode(bytes))?;
    debug!("Wrote {} ({} bytes decoded)", path.as_ref().display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock::sample_save;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_known_text() {
        assert_eq!(decode(b"GgQKAmFi").unwrap(), vec![0x1A, 0x04, 0x0A, 0x02, b'a', b'b']);
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        assert_eq!(decode(b"GgQK\r\nAmFi\n").unwrap(), decode(b"GgQKAmFi").unwrap());
    }

    #[test]
    fn test_decode_invalid_text() {
        let err = decode(b"not base64!").unwrap_err();
        assert!(matches!(err, Error::Envelope(_)));
    }

    #[test]
    fn test_encode_is_padded() {
        assert_eq!(encode(&[0x1A]), "Gg==");
    }

    #[test]
    fn test_write_and_read_save() {
        let temp_file = NamedTempFile::new().unwrap();
        let save = sample_save();

        write_save(temp_file.path(), &save).unwrap();
        let text = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(text, encode(&save));
        assert_eq!(read_save(temp_file.path()).unwrap(), save);
    }
}
