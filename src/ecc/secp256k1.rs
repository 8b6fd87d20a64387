//! secp256k1 domain parameters
//!
//! Parameters are built once on first use and shared read-only afterwards.

use crate::constants::{
    SECP256K1_A, SECP256K1_B, SECP256K1_GX, SECP256K1_GY, SECP256K1_N, SECP256K1_P,
};
use crate::ecc::field::FieldElement;
use crate::ecc::point::{Curve, Point};
use crate::error::Result;
use num_bigint::BigUint;
use std::sync::OnceLock;

static FIELD_PRIME: OnceLock<BigUint> = OnceLock::new();
static GROUP_ORDER: OnceLock<BigUint> = OnceLock::new();
static CURVE: OnceLock<Curve> = OnceLock::new();
static GENERATOR: OnceLock<Point> = OnceLock::new();

/// p = 2^256 - 2^32 - 977
pub fn field_prime() -> &'static BigUint {
    FIELD_PRIME.get_or_init(|| BigUint::from_bytes_be(&SECP256K1_P))
}

/// Order n of the generator
pub fn order() -> &'static BigUint {
    GROUP_ORDER.get_or_init(|| BigUint::from_bytes_be(&SECP256K1_N))
}

/// y² = x³ + 7 over F_p
pub fn curve() -> &'static Curve {
    CURVE.get_or_init(|| {
        let p = field_prime();
        Curve {
            a: FieldElement::reduced(BigUint::from(SECP256K1_A), p),
            b: FieldElement::reduced(BigUint::from(SECP256K1_B), p),
        }
    })
}

/// Generator point G
pub fn generator() -> &'static Point {
    GENERATOR.get_or_init(|| {
        let p = field_prime();
        Point::Affine {
            x: FieldElement::reduced(BigUint::from_bytes_be(&SECP256K1_GX), p),
            y: FieldElement::reduced(BigUint::from_bytes_be(&SECP256K1_GY), p),
            curve: curve().clone(),
        }
    })
}

/// Element of the secp256k1 base field.
pub fn s256_field(num: BigUint) -> Result<FieldElement> {
    FieldElement::new(num, field_prime().clone())
}

/// Point on secp256k1; fails if the coordinates are out of range or off the curve.
pub fn s256_point(x: BigUint, y: BigUint) -> Result<Point> {
    Point::new(s256_field(x)?, s256_field(y)?, curve().clone())
}

pub fn infinity() -> Point {
    Point::Infinity(curve().clone())
}

/// `k·P` with `k` reduced modulo n first.
pub fn s256_scalar_mul(point: &Point, k: &BigUint) -> Result<Point> {
    point.scalar_mul(&(k % order()))
}

/// Public point `secret·G`.
pub fn public_point(secret: &BigUint) -> Result<Point> {
    s256_scalar_mul(generator(), secret)
}
