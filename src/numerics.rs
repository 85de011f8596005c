//! Fixed-precision decimal arithmetic for the packing engine.
//!
//! Every geometric comparison and axle-load computation inside the engine runs
//! in this decimal domain rather than `f64`. Mixing the two inside a single
//! comparison is the single most common source of false overlaps and
//! compliance flips, so [`HighPrecision`] deliberately does not implement
//! arithmetic traits against `f64` — conversion is always explicit.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Minimum significant digits this type guarantees. `rust_decimal::Decimal`
/// carries a 96-bit mantissa (28-29 significant digits), comfortably above
/// this floor.
pub const MIN_SIGNIFICANT_DIGITS: u32 = 20;

/// Epsilon used throughout the core for containment, overlap, and compliance
/// comparisons, expressed in the decimal domain.
pub const EPSILON: HighPrecision = HighPrecision(Decimal::from_parts(1, 0, 0, false, 9));

/// A fixed-precision decimal value used for every length, weight, and
/// coordinate inside the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HighPrecision(Decimal);

impl HighPrecision {
    pub const ZERO: HighPrecision = HighPrecision(Decimal::ZERO);
    pub const ONE: HighPrecision = HighPrecision(Decimal::ONE);

    /// The large fail sentinel used by the compliance scorer (§4.6).
    pub fn fail_sentinel() -> Self {
        HighPrecision(Decimal::from(1_000_000_000u64))
    }

    pub fn from_f64(value: f64) -> Self {
        HighPrecision(Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO))
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn from_i64(value: i64) -> Self {
        HighPrecision(Decimal::from(value))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        HighPrecision(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }

    pub fn powi(self, exp: u64) -> Self {
        HighPrecision(self.0.powu(exp))
    }

    /// Square root. Returns `None` only for negative operands, which never
    /// occur for the non-negative quantities (lengths, weights, variances)
    /// this engine computes.
    pub fn sqrt(self) -> Option<Self> {
        self.0.sqrt().map(HighPrecision)
    }

    /// Round half-to-even at `decimal_places` fractional digits.
    pub fn round_half_even(self, decimal_places: u32) -> Self {
        HighPrecision(
            self.0
                .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Truncate toward zero.
    pub fn truncate(self) -> Self {
        HighPrecision(self.0.trunc())
    }

    /// Smallest integer value not less than `self`.
    pub fn ceil(self) -> Self {
        HighPrecision(self.0.ceil())
    }

    /// Largest integer value not greater than `self`.
    pub fn floor(self) -> Self {
        HighPrecision(self.0.floor())
    }

    /// Floor, converted to a non-negative `u64` count (saturating at zero for
    /// negative inputs, which should not occur on the call sites that use this).
    pub fn floor_to_u64(self) -> u64 {
        self.floor().0.to_u64().unwrap_or(0)
    }

    /// Approximate equality within `eps`.
    pub fn approx_eq(self, other: Self, eps: HighPrecision) -> bool {
        (self - other).abs() <= eps
    }

    pub fn approx_le(self, other: Self, eps: HighPrecision) -> bool {
        self <= other + eps
    }

    pub fn approx_ge(self, other: Self, eps: HighPrecision) -> bool {
        self + eps >= other
    }

    pub fn approx_cmp(self, other: Self, eps: HighPrecision) -> Ordering {
        if self.approx_eq(other, eps) {
            Ordering::Equal
        } else if self < other {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl Add for HighPrecision {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        HighPrecision(self.0 + rhs.0)
    }
}

impl Sub for HighPrecision {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        HighPrecision(self.0 - rhs.0)
    }
}

impl Mul for HighPrecision {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        HighPrecision(self.0 * rhs.0)
    }
}

impl Div for HighPrecision {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        HighPrecision(self.0 / rhs.0)
    }
}

impl Neg for HighPrecision {
    type Output = Self;
    fn neg(self) -> Self {
        HighPrecision(-self.0)
    }
}

impl std::iter::Sum for HighPrecision {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HighPrecision::ZERO, Add::add)
    }
}

impl fmt::Display for HighPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for HighPrecision {
    fn from(value: f64) -> Self {
        HighPrecision::from_f64(value)
    }
}

impl From<HighPrecision> for f64 {
    fn from(value: HighPrecision) -> Self {
        value.to_f64()
    }
}
