//! SEC public key encoding
//!
//! - uncompressed: `0x04 || x || y` (65 bytes)
//! - compressed: `0x02 || x` for even y, `0x03 || x` for odd y (33 bytes)

use crate::constants::{COORDINATE_SIZE, SEC_COMPRESSED_SIZE, SEC_UNCOMPRESSED_SIZE};
use crate::ecc::point::Point;
use crate::ecc::secp256k1::{curve, field_prime, s256_field, s256_point};
use crate::error::{ConsensusError, Result};
use num_bigint::BigUint;

/// Big-endian, left-padded to 32 bytes. Values must already be below 2^256.
pub(crate) fn to_32_bytes(n: &BigUint) -> [u8; COORDINATE_SIZE] {
    let bytes = n.to_bytes_be();
    let mut out = [0u8; COORDINATE_SIZE];
    let start = COORDINATE_SIZE.saturating_sub(bytes.len());
    let skip = bytes.len().saturating_sub(COORDINATE_SIZE);
    out[start..].copy_from_slice(&bytes[skip..]);
    out
}

/// Encode a secp256k1 point. The point at infinity has no SEC form.
pub fn encode_sec(point: &Point, compressed: bool) -> Result<Vec<u8>> {
    let (x, y) = match point {
        Point::Affine { x, y, .. } => (x, y),
        Point::Infinity(_) => {
            return Err(ConsensusError::InvalidPublicKey(
                "point at infinity has no SEC encoding".into(),
            ))
        }
    };

    if compressed {
        let mut out = Vec::with_capacity(SEC_COMPRESSED_SIZE);
        out.push(if y.is_even() { 0x02 } else { 0x03 });
        out.extend_from_slice(&to_32_bytes(x.num()));
        Ok(out)
    } else {
        let mut out = Vec::with_capacity(SEC_UNCOMPRESSED_SIZE);
        out.push(0x04);
        out.extend_from_slice(&to_32_bytes(x.num()));
        out.extend_from_slice(&to_32_bytes(y.num()));
        Ok(out)
    }
}

/// Decode a SEC public key into a point on secp256k1.
pub fn decode_sec(data: &[u8]) -> Result<Point> {
    match (data.first(), data.len()) {
        (Some(0x04), SEC_UNCOMPRESSED_SIZE) => {
            let x = BigUint::from_bytes_be(&data[1..1 + COORDINATE_SIZE]);
            let y = BigUint::from_bytes_be(&data[1 + COORDINATE_SIZE..]);
            s256_point(x, y).map_err(|e| ConsensusError::InvalidPublicKey(e.to_string().into()))
        }
        (Some(prefix @ (0x02 | 0x03)), SEC_COMPRESSED_SIZE) => {
            let x_num = BigUint::from_bytes_be(&data[1..]);
            if &x_num >= field_prime() {
                return Err(ConsensusError::InvalidPublicKey(
                    "x coordinate not below the field prime".into(),
                ));
            }
            let x = s256_field(x_num)?;
            let c = curve();
            let alpha = &(&(&x * &x) * &x) + &c.b;
            let beta = alpha.sqrt();
            if &beta * &beta != alpha {
                return Err(ConsensusError::InvalidPublicKey(
                    "x coordinate is not on the curve".into(),
                ));
            }
            let want_even = *prefix == 0x02;
            let y = if beta.is_even() == want_even {
                beta
            } else {
                beta.neg()
            };
            Point::new(x, y, c.clone())
        }
        (Some(prefix), len) => Err(ConsensusError::InvalidPublicKey(
            format!("unsupported SEC prefix 0x{prefix:02x} with length {len}").into(),
        )),
        (None, _) => Err(ConsensusError::InvalidPublicKey("empty SEC encoding".into())),
    }
}

impl Point {
    /// SEC encoding; see [`encode_sec`].
    pub fn sec(&self, compressed: bool) -> Result<Vec<u8>> {
        encode_sec(self, compressed)
    }

    /// Parse a SEC-encoded secp256k1 point; see [`decode_sec`].
    pub fn parse_sec(data: &[u8]) -> Result<Point> {
        decode_sec(data)
    }
}
