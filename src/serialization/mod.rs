//! Byte encodings for keys, signatures and script lengths
//!
//! - `sec`: SEC public keys (compressed and uncompressed)
//! - `der`: DER ECDSA signatures
//! - `varint`: Bitcoin CompactSize length prefixes

pub mod der;
pub mod sec;
pub mod varint;

pub use der::{decode_der, encode_der};
pub use sec::{decode_sec, encode_sec};
pub use varint::{decode_varint, encode_varint, VarIntError};
