//! ECDSA signing and verification tests
//!
//! Covers both nonce policies, the RFC 6979 reference nonce for secp256k1,
//! and the rejection paths of `verify`.

use blvm_script_core::config::NoncePolicy;
use blvm_script_core::crypto::sha256;
use blvm_script_core::ecc::secp256k1::{generator, order, public_point};
use blvm_script_core::ecdsa::{verify, PrivateKey, Signature};
use blvm_script_core::ecc::Point;
use blvm_script_core::error::ConsensusError;
use num_bigint::BigUint;
use proptest::prelude::*;

fn from_hex(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap()
}

/// RFC 6979 with secret 1 and z = SHA256("Satoshi Nakamoto") uses
/// k = 8f8a276c...5d15; r is the x coordinate of k·G.
#[test]
fn test_rfc6979_reference_nonce() {
    let key = PrivateKey::new(BigUint::from(1u8)).unwrap();
    let z = BigUint::from_bytes_be(&sha256(b"Satoshi Nakamoto"));
    let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();

    let k = from_hex("8f8a276c19f4149656b280621e358cce24f5f52542772691ee69063b74f15d15");
    let expected_r = public_point(&k).unwrap().x().unwrap().num() % order();
    assert_eq!(sig.r, expected_r);
    assert_eq!(
        sig.r,
        from_hex("934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8")
    );

    // s is not normalised to the low half; accept either representative
    let low_s = from_hex("2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5");
    assert!(sig.s == low_s || sig.s == order() - &low_s);
    assert!(verify(key.public_point(), &sig, &z));
}

#[test]
fn test_random_nonces_differ() {
    let key = PrivateKey::new(BigUint::from(8675309u32)).unwrap();
    let z = BigUint::from(42u8);
    let a = key.sign_with(&z, NoncePolicy::Random).unwrap();
    let b = key.sign_with(&z, NoncePolicy::Random).unwrap();
    assert_ne!(a, b, "two random nonces collided");
    assert!(verify(key.public_point(), &a, &z));
    assert!(verify(key.public_point(), &b, &z));
}

#[test]
fn test_deterministic_nonce_depends_on_message_and_key() {
    let key = PrivateKey::new(BigUint::from(8675309u32)).unwrap();
    let other = PrivateKey::new(BigUint::from(8675310u32)).unwrap();
    let z = BigUint::from(42u8);
    let base = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();
    assert_ne!(base, key.sign_with(&(&z + 1u8), NoncePolicy::Deterministic).unwrap());
    assert_ne!(base, other.sign_with(&z, NoncePolicy::Deterministic).unwrap());
}

#[test]
fn test_hash_reduced_mod_n() {
    let key = PrivateKey::new(BigUint::from(99u8)).unwrap();
    let z = BigUint::from(5u8);
    let wrapped = &z + order();
    let sig = key.sign_with(&wrapped, NoncePolicy::Deterministic).unwrap();
    assert!(verify(key.public_point(), &sig, &z));
    assert_eq!(sig, key.sign_with(&z, NoncePolicy::Deterministic).unwrap());
}

#[test]
fn test_verify_with_wrong_key() {
    let key = PrivateKey::new(BigUint::from(1000u32)).unwrap();
    let z = BigUint::from(77u8);
    let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();
    assert!(!verify(generator(), &sig, &z));
}

#[test]
fn test_verify_against_infinity_is_false() {
    let z = BigUint::from(77u8);
    let sig = Signature::new(BigUint::from(1u8), BigUint::from(1u8));
    let inf = Point::infinity(generator().curve().clone());
    assert!(!verify(&inf, &sig, &z));
}

#[test]
fn test_private_key_sec_matches_point() {
    let key = PrivateKey::new(BigUint::from(5000u32)).unwrap();
    assert_eq!(
        hex::encode(key.sec(false).unwrap()),
        "04ffe558e388852f0120e46af2d1b370f85854a8eb0841811ece0e3e03d282d57c\
         315dc72890a4f10a1481c031b03b351b0dc79901ca18a00cf009dbdb157a1d10"
    );
    assert_eq!(key.secret(), &BigUint::from(5000u32));
}

#[test]
fn test_private_key_out_of_range() {
    assert!(matches!(
        PrivateKey::new(BigUint::from(0u8)),
        Err(ConsensusError::InvalidPrivateKey(_))
    ));
    assert!(matches!(
        PrivateKey::new(order() + 1u8),
        Err(ConsensusError::InvalidPrivateKey(_))
    ));
}

#[test]
fn test_signature_display() {
    let sig = Signature::new(BigUint::from(0xabu8), BigUint::from(0xcdu8));
    assert_eq!(sig.to_string(), "Signature(ab, cd)");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Signatures verify under the signing key and fail for any other hash
    #[test]
    fn prop_sign_then_verify(secret in 1u64.., z in any::<[u8; 32]>()) {
        let key = PrivateKey::new(BigUint::from(secret)).unwrap();
        let z = BigUint::from_bytes_be(&z);
        let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();
        prop_assert!(sig.r < *order() && sig.s < *order());
        prop_assert!(verify(key.public_point(), &sig, &z));
        prop_assert!(!verify(key.public_point(), &sig, &(&z + 1u8)));
    }

    /// Flipping any single bit of r or s invalidates a signature
    #[test]
    fn prop_bit_flip_in_r_or_s_fails(
        secret in 1u64..,
        z in any::<[u8; 32]>(),
        bit in 0usize..256,
    ) {
        let key = PrivateKey::new(BigUint::from(secret)).unwrap();
        let z = BigUint::from_bytes_be(&z);
        let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();
        let mask = BigUint::from(1u8) << bit;

        let flipped_r = Signature::new(&sig.r ^ &mask, sig.s.clone());
        prop_assert!(!verify(key.public_point(), &flipped_r, &z));

        let flipped_s = Signature::new(sig.r.clone(), &sig.s ^ &mask);
        prop_assert!(!verify(key.public_point(), &flipped_s, &z));
    }
}
