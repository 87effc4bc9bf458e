//! Compact-u16: the 1-3 byte little-endian length prefix used throughout
//! the transaction wire format (account counts, instruction counts,
//! instruction data lengths).
//!
//! Each byte carries 7 bits of the value; the high bit set means "another
//! byte follows". At most 3 bytes are ever produced or accepted — a u16
//! needs at most ceil(16/7) = 3 of them.

use crate::error::SolError;

/// Encode a `u16` in compact-u16 form.
pub fn encode(value: u16) -> Vec<u8> {
    let mut val = u32::from(value);
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from the front of `data`.
///
/// Returns `(value, bytes_consumed)`. Fails on truncated input, on a
/// sequence longer than 3 bytes, or on a decoded value that overflows
/// `u16`.
pub fn decode(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;

    for i in 0..3 {
        let byte = *data
            .get(i)
            .ok_or_else(|| SolError::MalformedMessage("truncated compact-u16".into()))?;
        value |= u32::from(byte & 0x7f) << (7 * i);

        if byte & 0x80 == 0 {
            let value = u16::try_from(value)
                .map_err(|_| SolError::MalformedMessage("compact-u16 value overflow".into()))?;
            return Ok((value, i + 1));
        }
    }

    Err(SolError::MalformedMessage(
        "compact-u16 exceeds maximum of 3 bytes".into(),
    ))
}
