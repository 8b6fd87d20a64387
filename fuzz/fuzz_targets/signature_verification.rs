#![no_main]
use blvm_script_core::ecc::Point;
use blvm_script_core::ecdsa::{verify, Signature};
use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;

fuzz_target!(|data: &[u8]| {
    // Signature verification fuzzing
    // Layout: format byte, SEC pubkey (33 or 65 bytes), 32-byte hash, DER signature

    if data.len() < 2 {
        return;
    }

    let pubkey_len = if data[0] & 0x01 != 0 { 65 } else { 33 };
    let pubkey_start = 1;
    let hash_start = pubkey_start + pubkey_len;
    let sig_start = hash_start + 32;
    if data.len() < sig_start {
        // Still exercise the decoders on short inputs
        let _ = Point::parse_sec(&data[pubkey_start..]);
        let _ = Signature::parse_der(&data[pubkey_start..]);
        return;
    }

    let pubkey_bytes = &data[pubkey_start..hash_start];
    let z = BigUint::from_bytes_be(&data[hash_start..sig_start]);
    let sig_bytes = &data[sig_start..];

    let Ok(point) = Point::parse_sec(pubkey_bytes) else {
        return;
    };
    // Decoded keys re-encode to the same bytes
    let compressed = pubkey_bytes.len() == 33;
    assert_eq!(point.sec(compressed).ok().as_deref(), Some(pubkey_bytes));

    let Ok(sig) = Signature::parse_der(sig_bytes) else {
        return;
    };
    let _valid = verify(&point, &sig, &z);
});
