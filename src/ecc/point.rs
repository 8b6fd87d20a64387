//! Short Weierstrass curve points over a prime field

use crate::ecc::field::FieldElement;
use crate::error::{ConsensusError, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;

/// Curve `y² = x³ + a·x + b`; both coefficients live in the coordinate field.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Curve {
    pub a: FieldElement,
    pub b: FieldElement,
}

impl Curve {
    /// Both coefficients must share a modulus.
    pub fn new(a: FieldElement, b: FieldElement) -> Result<Self> {
        if a.prime() != b.prime() {
            return Err(ConsensusError::CurveMismatch(
                "curve coefficients belong to different fields".into(),
            ));
        }
        Ok(Self { a, b })
    }

    pub fn prime(&self) -> &BigUint {
        self.a.prime()
    }

    /// Whether `(x, y)` satisfies the curve equation.
    pub fn contains(&self, x: &FieldElement, y: &FieldElement) -> bool {
        if x.prime() != self.prime() || y.prime() != self.prime() {
            return false;
        }
        let lhs = y * y;
        let rhs = &(&(x * x) * x) + &(&(&self.a * x) + &self.b);
        lhs == rhs
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Curve(a={}, b={}, p={})", self.a.num(), self.b.num(), self.prime())
    }
}

/// A curve point: the identity or an affine coordinate pair.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity(Curve),
    Affine {
        x: FieldElement,
        y: FieldElement,
        curve: Curve,
    },
}

impl Point {
    /// Affine point; fails unless `(x, y)` is on `curve`.
    pub fn new(x: FieldElement, y: FieldElement, curve: Curve) -> Result<Self> {
        if !curve.contains(&x, &y) {
            return Err(ConsensusError::PointNotOnCurve(
                format!("({}, {})", x.num(), y.num()).into(),
            ));
        }
        Ok(Point::Affine { x, y, curve })
    }

    pub fn infinity(curve: Curve) -> Self {
        Point::Infinity(curve)
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity(_))
    }

    pub fn curve(&self) -> &Curve {
        match self {
            Point::Infinity(curve) | Point::Affine { curve, .. } => curve,
        }
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match self {
            Point::Affine { x, .. } => Some(x),
            Point::Infinity(_) => None,
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match self {
            Point::Affine { y, .. } => Some(y),
            Point::Infinity(_) => None,
        }
    }

    /// Reflection across the x axis.
    pub fn negate(&self) -> Self {
        match self {
            Point::Infinity(curve) => Point::Infinity(curve.clone()),
            Point::Affine { x, y, curve } => Point::Affine {
                x: x.clone(),
                y: y.neg(),
                curve: curve.clone(),
            },
        }
    }

    /// Group law.
    pub fn add(&self, other: &Point) -> Result<Point> {
        if self.curve() != other.curve() {
            return Err(ConsensusError::CurveMismatch(
                format!("{:?} and {:?}", self.curve(), other.curve()).into(),
            ));
        }

        let (x1, y1, x2, y2, curve) = match (self, other) {
            (Point::Infinity(_), _) => return Ok(other.clone()),
            (_, Point::Infinity(_)) => return Ok(self.clone()),
            (
                Point::Affine { x: x1, y: y1, curve },
                Point::Affine { x: x2, y: y2, .. },
            ) => (x1, y1, x2, y2, curve),
        };

        // Vertical line: P + (-P), or a tangent at y = 0
        if x1 == x2 && (y1 != y2 || y1.is_zero()) {
            return Ok(Point::Infinity(curve.clone()));
        }

        let slope = if x1 != x2 {
            (y2 - y1).checked_div(&(x2 - x1))?
        } else {
            let prime = curve.prime();
            let three = FieldElement::reduced(BigUint::from(3u8), prime);
            let two = FieldElement::reduced(BigUint::from(2u8), prime);
            let numerator = &(&three * &(x1 * x1)) + &curve.a;
            numerator.checked_div(&(&two * y1))?
        };

        let x3 = &(&(&slope * &slope) - x1) - x2;
        let y3 = &(&slope * &(x1 - &x3)) - y1;
        Ok(Point::Affine {
            x: x3,
            y: y3,
            curve: curve.clone(),
        })
    }

    /// Binary double-and-add over the bits of `k`, low bit first.
    pub fn scalar_mul(&self, k: &BigUint) -> Result<Point> {
        let mut result = Point::Infinity(self.curve().clone());
        if k.is_zero() {
            return Ok(result);
        }
        let mut current = self.clone();
        let bits = k.bits();
        for i in 0..bits {
            if k.bit(i) {
                result = result.add(&current)?;
            }
            if i + 1 < bits {
                current = current.add(&current)?;
            }
        }
        Ok(result)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Infinity(curve) => write!(f, "Point(infinity)_{:?}", curve),
            Point::Affine { x, y, curve } => {
                write!(f, "Point({:x}, {:x})_{:?}", x.num(), y.num(), curve)
            }
        }
    }
}
