//! Input Decoding
//!
//! The scanner works on text. Raw documents are decoded here: the byte
//! order mark, or the byte pattern of a leading '<', selects UTF-16 LE/BE;
//! anything else must be UTF-8. A byte order mark never reaches the scanner.

use super::error::ScanError;

/// Encoding of a raw document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            _ => XmlEncoding::Utf8,
        }
    }

    /// Length of the byte order mark at the start of `input`, if any
    fn bom_len(self, input: &[u8]) -> usize {
        let bom: &[u8] = match self {
            XmlEncoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            XmlEncoding::Utf16Le => &[0xFF, 0xFE],
            XmlEncoding::Utf16Be => &[0xFE, 0xFF],
        };
        if input.starts_with(bom) {
            bom.len()
        } else {
            0
        }
    }
}

/// Decode a raw document to text
pub fn decode(input: &[u8]) -> Result<String, ScanError> {
    let encoding = XmlEncoding::detect(input);
    let body = &input[encoding.bom_len(input)..];

    match encoding {
        XmlEncoding::Utf8 => std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|e| ScanError::Encoding(format!("Invalid UTF-8: {}", e))),
        XmlEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes, "LE"),
        XmlEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes, "BE"),
    }
}

fn decode_utf16(
    bytes: &[u8],
    unit: fn([u8; 2]) -> u16,
    order: &str,
) -> Result<String, ScanError> {
    if bytes.len() % 2 != 0 {
        return Err(ScanError::Encoding(format!(
            "Invalid UTF-16 {}: odd number of bytes",
            order
        )));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map_err(|e| ScanError::Encoding(format!("Invalid UTF-16 {}: {}", order, e)))
}
