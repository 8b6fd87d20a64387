//! Hash functions used by Script opcodes and key commitments
//!
//! All digests come from the RustCrypto `sha2`, `sha1` and `ripemd` crates.
//! Bitcoin's composite hashes are built on top:
//! - HASH256 = SHA256(SHA256(x)), used for checksums and signature hashes
//! - HASH160 = RIPEMD160(SHA256(x)), used for P2PKH / P2SH commitments

use crate::types::{Hash, Hash160};
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Single SHA256
pub fn sha256(data: &[u8]) -> Hash {
    let mut result = [0u8; 32];
    result.copy_from_slice(&Sha256::digest(data));
    result
}

/// Double SHA256 (Bitcoin standard)
pub fn hash256(data: &[u8]) -> Hash {
    sha256(&sha256(data))
}

/// RIPEMD160
pub fn ripemd160(data: &[u8]) -> Hash160 {
    let mut result = [0u8; 20];
    result.copy_from_slice(&Ripemd160::digest(data));
    result
}

/// SHA1 (only reachable through `OP_SHA1`)
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut result = [0u8; 20];
    result.copy_from_slice(&Sha1::digest(data));
    result
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> Hash160 {
    ripemd160(&sha256(data))
}
