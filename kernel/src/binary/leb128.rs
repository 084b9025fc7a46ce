//! LEB128 varint coding, bounded to 32-bit values.
//!
//! A 32-bit value occupies at most [`MAX_LEN_32`] bytes. In the final byte the
//! bits above the value width must be zero (unsigned) or copies of the sign
//! bit (signed); anything else is an overflow.

/// Maximum encoded length of a 32-bit LEB128 value.
pub const MAX_LEN_32: usize = 5;

/// Failure decoding a LEB128 value from a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leb128Error {
    /// Input ended before a byte without the continuation bit.
    Truncated,
    /// Encoding is longer than 5 bytes or sets bits beyond 32.
    Overflow,
}

/// Decode an unsigned 32-bit LEB128 value.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// Returns [`Leb128Error::Truncated`] if `bytes` ends mid-value and
/// [`Leb128Error::Overflow`] if the value does not fit in 32 bits.
pub fn decode_u32(bytes: &[u8]) -> Result<(u32, usize), Leb128Error> {
    let mut result = 0u32;
    let mut shift = 0u32;
    for i in 0..MAX_LEN_32 {
        let byte = *bytes.get(i).ok_or(Leb128Error::Truncated)?;
        if i == MAX_LEN_32 - 1 && byte & 0xF0 != 0 {
            return Err(Leb128Error::Overflow);
        }
        result |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }
    Err(Leb128Error::Overflow)
}

/// Decode a signed 32-bit LEB128 value.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// Returns [`Leb128Error::Truncated`] if `bytes` ends mid-value and
/// [`Leb128Error::Overflow`] if the value does not fit in 32 bits.
pub fn decode_i32(bytes: &[u8]) -> Result<(i32, usize), Leb128Error> {
    let mut result = 0i32;
    let mut shift = 0u32;
    for i in 0..MAX_LEN_32 {
        let byte = *bytes.get(i).ok_or(Leb128Error::Truncated)?;
        if i == MAX_LEN_32 - 1 {
            // Bit 3 carries bit 31; bits 4..=6 must sign-extend it.
            let high = byte & 0x78;
            if byte & 0x80 != 0 || (high != 0 && high != 0x78) {
                return Err(Leb128Error::Overflow);
            }
        }
        result |= i32::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 32 && byte & 0x40 != 0 {
                result |= !0 << shift;
            }
            return Ok((result, i + 1));
        }
    }
    Err(Leb128Error::Overflow)
}

/// Append the minimal unsigned LEB128 encoding of `value`.
#[allow(clippy::cast_possible_truncation)]
pub fn write_u32(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Append the minimal signed LEB128 encoding of `value`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn write_i32(buf: &mut Vec<u8>, mut value: i32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let sign_clear = byte & 0x40 == 0;
        if (value == 0 && sign_clear) || (value == -1 && !sign_clear) {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}
