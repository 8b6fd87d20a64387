//! Prime-field elements with big-integer backing
//!
//! A [`FieldElement`] carries its own modulus so that small test fields
//! (e.g. F_223) and the secp256k1 base field share one implementation.
//! Operator overloads treat mixing moduli as a programming error and panic;
//! construction and division have checked forms that return [`Result`].

use crate::error::{ConsensusError, Result};
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement {
    num: BigUint,
    prime: BigUint,
}

impl FieldElement {
    /// Create an element, rejecting `num >= prime` and moduli below 2.
    pub fn new(num: BigUint, prime: BigUint) -> Result<Self> {
        if prime < BigUint::from(2u8) {
            return Err(ConsensusError::FieldElement(
                format!("modulus {prime} is smaller than 2").into(),
            ));
        }
        if num >= prime {
            return Err(ConsensusError::FieldElement(
                format!("{num} not in field range 0 to {}", &prime - 1u8).into(),
            ));
        }
        Ok(Self { num, prime })
    }

    /// Convenience constructor for small values.
    pub fn from_u64(num: u64, prime: u64) -> Result<Self> {
        Self::new(BigUint::from(num), BigUint::from(prime))
    }

    /// Element with the value reduced into range; never fails for `prime >= 2`.
    pub(crate) fn reduced(num: BigUint, prime: &BigUint) -> Self {
        Self {
            num: num % prime,
            prime: prime.clone(),
        }
    }

    pub fn zero(prime: &BigUint) -> Self {
        Self::reduced(BigUint::zero(), prime)
    }

    pub fn one(prime: &BigUint) -> Self {
        Self::reduced(BigUint::one(), prime)
    }

    pub fn num(&self) -> &BigUint {
        &self.num
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_even(&self) -> bool {
        self.num.is_even()
    }

    /// `self^exponent`; negative exponents are folded into `[0, p-1)` via
    /// Fermat's little theorem.
    pub fn pow(&self, exponent: &BigInt) -> Self {
        let order = BigInt::from_biguint(Sign::Plus, &self.prime - 1u8);
        let e = if order.is_zero() {
            BigUint::zero()
        } else {
            exponent
                .mod_floor(&order)
                .to_biguint()
                .unwrap_or_default()
        };
        Self {
            num: self.num.modpow(&e, &self.prime),
            prime: self.prime.clone(),
        }
    }

    /// `self^exponent` for a non-negative exponent, without normalisation.
    pub fn pow_u(&self, exponent: &BigUint) -> Self {
        Self {
            num: self.num.modpow(exponent, &self.prime),
            prime: self.prime.clone(),
        }
    }

    /// Multiplicative inverse `self^(p-2)`.
    pub fn inverse(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(ConsensusError::DivisionByZero(self.prime.to_string().into()));
        }
        Ok(self.pow_u(&(&self.prime - 2u8)))
    }

    /// `self / rhs`, failing on a zero divisor or mismatched moduli.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        if self.prime != rhs.prime {
            return Err(ConsensusError::FieldElement(
                "cannot divide two numbers in different fields".into(),
            ));
        }
        Ok(self * &rhs.inverse()?)
    }

    /// Square root for fields with `p ≡ 3 (mod 4)`: `self^((p+1)/4)`.
    ///
    /// The result only squares back to `self` when `self` is a quadratic
    /// residue; callers check.
    pub fn sqrt(&self) -> Self {
        let exponent = (&self.prime + 1u8) >> 2;
        self.pow_u(&exponent)
    }

    /// Additive inverse.
    pub fn neg(&self) -> Self {
        if self.is_zero() {
            self.clone()
        } else {
            Self {
                num: &self.prime - &self.num,
                prime: self.prime.clone(),
            }
        }
    }

    fn assert_same_field(&self, rhs: &Self, op: &str) {
        assert!(
            self.prime == rhs.prime,
            "cannot {op} two numbers in different fields ({} and {})",
            self.prime,
            rhs.prime
        );
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement_{}({})", self.prime, self.num)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.num)
    }
}

impl<'a> Add<&'a FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &'a FieldElement) -> FieldElement {
        self.assert_same_field(rhs, "add");
        FieldElement {
            num: (&self.num + &rhs.num) % &self.prime,
            prime: self.prime.clone(),
        }
    }
}

impl<'a> Sub<&'a FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &'a FieldElement) -> FieldElement {
        self.assert_same_field(rhs, "subtract");
        FieldElement {
            num: (&self.num + &self.prime - &rhs.num) % &self.prime,
            prime: self.prime.clone(),
        }
    }
}

impl<'a> Mul<&'a FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &'a FieldElement) -> FieldElement {
        self.assert_same_field(rhs, "multiply");
        FieldElement {
            num: (&self.num * &rhs.num) % &self.prime,
            prime: self.prime.clone(),
        }
    }
}

impl<'a> Div<&'a FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    /// # Panics
    ///
    /// On a zero divisor or mismatched moduli. Use [`FieldElement::checked_div`]
    /// when the divisor comes from untrusted data.
    fn div(self, rhs: &'a FieldElement) -> FieldElement {
        self.assert_same_field(rhs, "divide");
        assert!(!rhs.is_zero(), "division by the zero element of F_{}", self.prime);
        self * &rhs.pow_u(&(&self.prime - 2u8))
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: FieldElement) -> FieldElement {
                (&self).$method(&rhs)
            }
        }

        impl<'a> $imp<&'a FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: &'a FieldElement) -> FieldElement {
                (&self).$method(rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);
forward_owned_binop!(Div, div);
