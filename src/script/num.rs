//! Script number encoding
//!
//! Little-endian sign-magnitude: the high bit of the last byte is the sign,
//! zero is the empty array. `[0x80]` is negative zero and reads as false.

/// Encode `num` as a minimal script number.
pub fn encode_num(num: i64) -> Vec<u8> {
    if num == 0 {
        return Vec::new();
    }
    let negative = num < 0;
    let mut magnitude = num.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while magnitude > 0 {
        result.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }
    // Sign bit must live in a byte of its own if the magnitude already uses it
    if let Some(last) = result.last_mut() {
        if *last & 0x80 != 0 {
            result.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            *last |= 0x80;
        }
    }
    result
}

/// Decode a script number, or `None` when it is wider than 8 bytes.
///
/// Arithmetic opcodes bound their operands to 4 bytes before calling this.
pub fn decode_num(bytes: &[u8]) -> Option<i64> {
    let Some((&last, _)) = bytes.split_last() else {
        return Some(0);
    };
    if bytes.len() > 8 {
        return None;
    }
    let negative = last & 0x80 != 0;
    let mut magnitude: i64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let byte = if i == bytes.len() - 1 { byte & 0x7f } else { byte };
        magnitude |= (byte as i64) << (8 * i);
    }
    Some(if negative { -magnitude } else { magnitude })
}

/// Truthiness of a stack item: any non-zero byte, ignoring a trailing sign bit.
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            return !(i == bytes.len() - 1 && byte == 0x80);
        }
    }
    false
}
