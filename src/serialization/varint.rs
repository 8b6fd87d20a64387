//! Bitcoin VarInt (CompactSize) encoding
//!
//! Scripts are length-prefixed with a VarInt when they travel inside
//! transactions:
//! - value < 0xfd: single byte
//! - value <= 0xffff: 0xfd + 2 bytes little-endian
//! - value <= 0xffffffff: 0xfe + 4 bytes little-endian
//! - otherwise: 0xff + 8 bytes little-endian
//!
//! Non-minimal encodings are rejected on decode.

use crate::error::{ConsensusError, Result};
use std::borrow::Cow;

/// Error type for VarInt encoding/decoding failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarIntError {
    /// Insufficient bytes to decode VarInt
    InsufficientBytes,
    /// Value encoded with a longer form than necessary
    NonMinimal,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::InsufficientBytes => write!(f, "Insufficient bytes to decode VarInt"),
            VarIntError::NonMinimal => write!(f, "Non-minimal VarInt encoding"),
        }
    }
}

impl std::error::Error for VarIntError {}

impl From<VarIntError> for ConsensusError {
    fn from(err: VarIntError) -> Self {
        ConsensusError::Serialization(Cow::Owned(err.to_string()))
    }
}

/// Encode a u64 value as a Bitcoin VarInt
///
/// ```
/// use blvm_script_core::serialization::varint::encode_varint;
///
/// assert_eq!(encode_varint(252), vec![252]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    match value {
        0..=0xfc => vec![value as u8],
        0xfd..=0xffff => {
            let mut result = vec![0xfd];
            result.extend_from_slice(&(value as u16).to_le_bytes());
            result
        }
        0x1_0000..=0xffff_ffff => {
            let mut result = vec![0xfe];
            result.extend_from_slice(&(value as u32).to_le_bytes());
            result
        }
        _ => {
            let mut result = vec![0xff];
            result.extend_from_slice(&value.to_le_bytes());
            result
        }
    }
}

/// Decode a Bitcoin VarInt, returning the value and the number of bytes consumed.
///
/// ```
/// use blvm_script_core::serialization::varint::decode_varint;
///
/// assert_eq!(decode_varint(&[0xfd, 253, 0]).unwrap(), (253, 3));
/// assert!(decode_varint(&[]).is_err());
/// ```
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let first = *data.first().ok_or(VarIntError::InsufficientBytes)?;

    let (width, minimum) = match first {
        b if b < 0xfd => return Ok((b as u64, 1)),
        0xfd => (2, 0xfd),
        0xfe => (4, 0x1_0000),
        _ => (8, 0x1_0000_0000),
    };

    let body = data
        .get(1..1 + width)
        .ok_or(VarIntError::InsufficientBytes)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(body);
    let value = u64::from_le_bytes(buf);

    if value < minimum {
        return Err(VarIntError::NonMinimal.into());
    }
    Ok((value, 1 + width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint_widths() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(0xfc), vec![0xfc]);
        assert_eq!(encode_varint(0xfd), vec![0xfd, 0xfd, 0]);
        assert_eq!(encode_varint(0xffff), vec![0xfd, 255, 255]);
        assert_eq!(encode_varint(0x10000), vec![0xfe, 0, 0, 1, 0]);
        assert_eq!(encode_varint(0xffffffff), vec![0xfe, 255, 255, 255, 255]);
        assert_eq!(
            encode_varint(0x100000000),
            vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_decode_varint_widths() {
        assert_eq!(decode_varint(&[252]).unwrap(), (252, 1));
        assert_eq!(decode_varint(&[0xfd, 255, 255]).unwrap(), (65535, 3));
        assert_eq!(decode_varint(&[0xfe, 0, 0, 1, 0]).unwrap(), (65536, 5));
        assert_eq!(
            decode_varint(&[0xff, 255, 255, 255, 255, 255, 255, 255, 255]).unwrap(),
            (u64::MAX, 9)
        );
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode_varint(&[0x19, 0x76, 0xa9]).unwrap(), (0x19, 1));
    }

    #[test]
    fn test_decode_varint_insufficient_bytes() {
        assert!(decode_varint(&[]).is_err());
        assert!(decode_varint(&[0xfd, 0]).is_err());
        assert!(decode_varint(&[0xfe, 0, 0, 0]).is_err());
        assert!(decode_varint(&[0xff, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_varint_non_minimal() {
        assert!(decode_varint(&[0xfd, 252, 0]).is_err());
        assert!(decode_varint(&[0xfe, 255, 255, 0, 0]).is_err());
        assert!(decode_varint(&[0xff, 255, 255, 255, 255, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_round_trip_boundaries() {
        for value in [0, 252, 253, 65535, 65536, 0xffffffff, 0x100000000, u64::MAX] {
            let encoded = encode_varint(value);
            assert_eq!(decode_varint(&encoded).unwrap(), (value, encoded.len()));
        }
    }
}
