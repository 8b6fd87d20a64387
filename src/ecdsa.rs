//! ECDSA over secp256k1
//!
//! Signing, verification and key handling on top of [`crate::ecc`]. All
//! scalar arithmetic is modulo the group order n; inverses use Fermat's
//! little theorem (`k^(n-2) mod n`).

use crate::config::{get_core_config, NoncePolicy};
use crate::ecc::point::Point;
use crate::ecc::secp256k1::{generator, order, public_point, s256_scalar_mul};
use crate::error::{ConsensusError, Result};
use crate::serialization::der::{decode_der, encode_der};
use crate::serialization::sec::to_32_bytes;
use hmac::{Hmac, Mac};
use log::trace;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// An ECDSA signature. `r` and `s` are not range-checked on construction;
/// [`verify`] rejects out-of-range values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// DER encoding
    pub fn der(&self) -> Vec<u8> {
        encode_der(&self.r, &self.s)
    }

    /// Strict DER decoding
    pub fn parse_der(data: &[u8]) -> Result<Self> {
        let (r, s) = decode_der(data)?;
        Ok(Self { r, s })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:x}, {:x})", self.r, self.s)
    }
}

fn inverse_mod_n(k: &BigUint) -> BigUint {
    let n = order();
    k.modpow(&(n - 2u8), n)
}

/// Verify `sig` over message hash `z` against `point`.
///
/// Returns false for out-of-range `r`/`s`, for a public key that is infinity or
/// not on secp256k1, and when `u·G + v·P` is the point at infinity.
pub fn verify(point: &Point, sig: &Signature, z: &BigUint) -> bool {
    let n = order();
    if sig.r.is_zero() || &sig.r >= n || sig.s.is_zero() || &sig.s >= n {
        return false;
    }
    if point.is_infinity() {
        return false;
    }

    let s_inv = inverse_mod_n(&sig.s);
    let u = (z * &s_inv) % n;
    let v = (&sig.r * &s_inv) % n;

    let total = s256_scalar_mul(generator(), &u)
        .and_then(|ug| s256_scalar_mul(point, &v).and_then(|vp| ug.add(&vp)));
    match total {
        Ok(Point::Affine { x, .. }) => x.num() % n == sig.r,
        Ok(Point::Infinity(_)) => false,
        Err(e) => {
            trace!("signature verification rejected public key: {e}");
            false
        }
    }
}

impl Point {
    /// Verify `sig` over `z` with this point as the public key; see [`verify`].
    pub fn verify(&self, z: &BigUint, sig: &Signature) -> bool {
        verify(self, sig, z)
    }
}

/// Source of candidate nonces for one signing operation.
enum NonceSource {
    Random,
    Deterministic(Rfc6979),
}

impl NonceSource {
    fn next_k(&mut self) -> Result<BigUint> {
        match self {
            NonceSource::Random => Ok(random_scalar()),
            NonceSource::Deterministic(drbg) => drbg.next_k(),
        }
    }
}

/// Uniform scalar in [1, n-1] by rejection sampling.
fn random_scalar() -> BigUint {
    let n = order();
    let mut rng = rand::thread_rng();
    let mut buf = [0u8; 32];
    loop {
        rng.fill_bytes(&mut buf);
        let k = BigUint::from_bytes_be(&buf);
        if !k.is_zero() && &k < n {
            return k;
        }
    }
}

/// RFC 6979 HMAC-DRBG with SHA-256 for a 256-bit group order.
struct Rfc6979 {
    key: [u8; 32],
    v: [u8; 32],
    started: bool,
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ConsensusError::InvalidPrivateKey(format!("hmac key: {e}").into()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

impl Rfc6979 {
    fn new(secret: &BigUint, z: &BigUint) -> Result<Self> {
        let x = to_32_bytes(secret);
        let h1 = to_32_bytes(&(z % order()));

        let mut key = [0u8; 32];
        let mut v = [1u8; 32];
        key = hmac_sha256(&key, &[&v, &[0x00], &x, &h1])?;
        v = hmac_sha256(&key, &[&v])?;
        key = hmac_sha256(&key, &[&v, &[0x01], &x, &h1])?;
        v = hmac_sha256(&key, &[&v])?;

        Ok(Self {
            key,
            v,
            started: false,
        })
    }

    fn next_k(&mut self) -> Result<BigUint> {
        let n = order();
        loop {
            if self.started {
                self.key = hmac_sha256(&self.key, &[&self.v, &[0x00]])?;
                self.v = hmac_sha256(&self.key, &[&self.v])?;
            }
            self.started = true;

            self.v = hmac_sha256(&self.key, &[&self.v])?;
            let k = BigUint::from_bytes_be(&self.v);
            if !k.is_zero() && &k < n {
                return Ok(k);
            }
        }
    }
}

/// A secp256k1 private key and its public point.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: BigUint,
    public_point: Point,
}

impl PrivateKey {
    /// Key for `secret`, which must lie in [1, n-1].
    pub fn new(secret: BigUint) -> Result<Self> {
        if secret.is_zero() || &secret >= order() {
            return Err(ConsensusError::InvalidPrivateKey(
                "secret must be in [1, n-1]".into(),
            ));
        }
        let public_point = public_point(&secret)?;
        Ok(Self {
            secret,
            public_point,
        })
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    pub fn public_point(&self) -> &Point {
        &self.public_point
    }

    /// SEC encoding of the public point.
    pub fn sec(&self, compressed: bool) -> Result<Vec<u8>> {
        self.public_point.sec(compressed)
    }

    /// Sign `z` with the nonce policy from the global config.
    pub fn sign(&self, z: &BigUint) -> Result<Signature> {
        self.sign_with(z, get_core_config().signing.nonce)
    }

    /// Sign `z`: `r = (k·G).x mod n`, `s = (z + r·secret)·k⁻¹ mod n`.
    ///
    /// A nonce yielding `r == 0` or `s == 0` is discarded and the next one drawn.
    pub fn sign_with(&self, z: &BigUint, policy: NoncePolicy) -> Result<Signature> {
        let n = order();
        let mut nonces = match policy {
            NoncePolicy::Random => NonceSource::Random,
            NoncePolicy::Deterministic => {
                NonceSource::Deterministic(Rfc6979::new(&self.secret, z)?)
            }
        };

        loop {
            let k = nonces.next_k()?;
            let r = match s256_scalar_mul(generator(), &k)? {
                Point::Affine { x, .. } => x.num() % n,
                Point::Infinity(_) => BigUint::zero(),
            };
            if r.is_zero() {
                trace!("nonce produced r = 0, drawing another");
                continue;
            }
            let s = ((z + &r * &self.secret) * inverse_mod_n(&k)) % n;
            if s.is_zero() {
                trace!("nonce produced s = 0, drawing another");
                continue;
            }
            return Ok(Signature { r, s });
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_point", &self.public_point)
            .finish_non_exhaustive()
    }
}
