//! secp256k1 curve parameters and Script limits

/// Field prime p = 2^256 - 2^32 - 977 (big-endian)
pub const SECP256K1_P: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// Group order n of the generator (big-endian)
pub const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Generator x coordinate
pub const SECP256K1_GX: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac,
    0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9,
    0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// Generator y coordinate
pub const SECP256K1_GY: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65,
    0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19,
    0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// Curve coefficient a in y² = x³ + a·x + b
pub const SECP256K1_A: u32 = 0;

/// Curve coefficient b in y² = x³ + a·x + b
pub const SECP256K1_B: u32 = 7;

/// Size in bytes of a serialized coordinate or scalar
pub const COORDINATE_SIZE: usize = 32;

/// Compressed SEC public key length
pub const SEC_COMPRESSED_SIZE: usize = 33;

/// Uncompressed SEC public key length
pub const SEC_UNCOMPRESSED_SIZE: usize = 65;

/// Maximum script length accepted by the parser
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum combined main + alt stack size during script execution
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of non-push operations in one evaluation
pub const MAX_SCRIPT_OPS: usize = 201;

/// Data pushes must be strictly shorter than this when serialized
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Largest push that fits a direct length byte
pub const MAX_DIRECT_PUSH: usize = 75;

/// Arithmetic opcodes reject operands longer than this
pub const MAX_NUM_SIZE: usize = 4;

/// Maximum public keys in one OP_CHECKMULTISIG
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

/// Length of a HASH160 digest (P2PKH / P2SH commitments)
pub const HASH160_SIZE: usize = 20;
