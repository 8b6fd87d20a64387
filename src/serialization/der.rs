//! DER encoding of ECDSA signatures
//!
//! `0x30 len 0x02 rlen r 0x02 slen s`, each integer big-endian with leading
//! zeros stripped and a `0x00` pad byte when the high bit would read as a sign.

use crate::error::{ConsensusError, Result};
use num_bigint::BigUint;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

fn encode_integer(out: &mut Vec<u8>, n: &BigUint) {
    // to_bytes_be is already minimal; zero comes back as [0]
    let mut bytes = n.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    out.push(INTEGER_TAG);
    out.push(bytes.len() as u8);
    out.extend_from_slice(&bytes);
}

/// DER-encode the pair `(r, s)`. Both must fit in 32 bytes.
pub fn encode_der(r: &BigUint, s: &BigUint) -> Vec<u8> {
    let mut body = Vec::with_capacity(70);
    encode_integer(&mut body, r);
    encode_integer(&mut body, s);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(SEQUENCE_TAG);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

fn invalid(msg: &'static str) -> ConsensusError {
    ConsensusError::InvalidSignature(msg.into())
}

/// Read one INTEGER element starting at `pos`; returns the value and the next offset.
fn decode_integer(data: &[u8], pos: usize) -> Result<(BigUint, usize)> {
    if data.get(pos) != Some(&INTEGER_TAG) {
        return Err(invalid("expected INTEGER marker 0x02"));
    }
    let len = *data
        .get(pos + 1)
        .ok_or_else(|| invalid("missing INTEGER length"))? as usize;
    if len == 0 {
        return Err(invalid("zero-length INTEGER"));
    }
    if len & 0x80 != 0 {
        return Err(invalid("long-form INTEGER length"));
    }
    let start = pos + 2;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| invalid("INTEGER runs past end of signature"))?;
    Ok((BigUint::from_bytes_be(bytes), start + len))
}

/// Decode a DER signature into `(r, s)`.
///
/// The sequence length must cover the rest of the input exactly. Values are
/// not range-checked against the curve order here.
pub fn decode_der(data: &[u8]) -> Result<(BigUint, BigUint)> {
    if data.first() != Some(&SEQUENCE_TAG) {
        return Err(invalid("expected SEQUENCE marker 0x30"));
    }
    let declared = *data
        .get(1)
        .ok_or_else(|| invalid("missing SEQUENCE length"))? as usize;
    if declared & 0x80 != 0 {
        return Err(invalid("long-form SEQUENCE length"));
    }
    if declared + 2 != data.len() {
        return Err(ConsensusError::InvalidSignature(
            format!(
                "SEQUENCE length {declared} does not match {} bytes of content",
                data.len().saturating_sub(2)
            )
            .into(),
        ));
    }

    let (r, next) = decode_integer(data, 2)?;
    let (s, end) = decode_integer(data, next)?;
    if end != data.len() {
        return Err(invalid("trailing bytes after s"));
    }
    Ok((r, s))
}
