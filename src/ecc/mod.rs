//! Elliptic-curve arithmetic
//!
//! - `field`: prime-field elements
//! - `point`: curve points and the group law
//! - `secp256k1`: Bitcoin's curve parameters and helpers

pub mod field;
pub mod point;
pub mod secp256k1;

pub use field::FieldElement;
pub use point::{Curve, Point};
pub use secp256k1::{generator, order, public_point, s256_point, s256_scalar_mul};
