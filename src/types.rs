//! Shared byte-level types

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// HASH160 digest: RIPEMD160(SHA256(x))
pub type Hash160 = [u8; 20];

/// Byte string type (stack items, data pushes, encodings)
pub type ByteString = Vec<u8>;

/// Script evaluation stack; the last element is the top
pub type Stack = Vec<ByteString>;
