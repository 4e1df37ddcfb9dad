//! Exact rational arithmetic.
//!
//! Every geometric accumulation in the sampler runs on `Fraction` so that
//! millions of chained additions cannot drift the way floats would; drift
//! along shared triangle edges shows up as visible seams in the voxelized
//! output. Floats appear only at the final grid rounding and inside the
//! square-root fallback below.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num::integer::Roots;
use num::traits::Pow;
use num::{BigInt, Integer, One, Signed, ToPrimitive, Zero};

use crate::core::error::{Error, Result};

/// Denominator used when scaling a float into a fraction (10^10).
const FLOAT_SCALE: i64 = 10_000_000_000;

/// Power of ten both parts are scaled by before the inexact square root,
/// giving roots ~20 decimal digits of precision. This is the one documented
/// precision boundary of the engine.
const SQRT_SCALE_DIGITS: u32 = 40;

/// An arbitrary-precision rational, always kept in lowest terms.
///
/// Invariants: `gcd(numer, denom) == 1`, `denom > 0`, zero is `0/1`. Every
/// operation returns a value already reduced, so equality and hashing work
/// structurally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
    numer: BigInt,
    denom: BigInt,
}

impl Fraction {
    /// The zero fraction, 0/1.
    pub fn zero() -> Self {
        Self {
            numer: BigInt::zero(),
            denom: BigInt::one(),
        }
    }

    /// The unit fraction, 1/1.
    pub fn one() -> Self {
        Self {
            numer: BigInt::one(),
            denom: BigInt::one(),
        }
    }

    /// Build a reduced fraction from an integer pair.
    ///
    /// # Panics
    /// Panics when `denom` is zero; callers only ever pass literal non-zero
    /// denominators.
    pub fn new(numer: i64, denom: i64) -> Self {
        assert!(denom != 0, "fraction denominator must be non-zero");
        Self::from_bigints(BigInt::from(numer), BigInt::from(denom))
    }

    /// Build a whole-number fraction.
    pub fn from_int(value: i64) -> Self {
        Self {
            numer: BigInt::from(value),
            denom: BigInt::one(),
        }
    }

    /// Build from a float by scaling to a fixed 10^10 denominator and
    /// rounding, then reducing.
    pub fn from_f64(value: f64) -> Self {
        let numer = (value * FLOAT_SCALE as f64).round() as i64;
        Self::new(numer, FLOAT_SCALE)
    }

    fn from_bigints(numer: BigInt, denom: BigInt) -> Self {
        let mut f = Self { numer, denom };
        f.reduce();
        f
    }

    /// Restore the lowest-terms / positive-denominator invariant.
    fn reduce(&mut self) {
        if self.numer.is_zero() {
            self.denom = BigInt::one();
            return;
        }
        let gcd = self.numer.gcd(&self.denom);
        self.numer /= &gcd;
        self.denom /= &gcd;
        if self.denom.is_negative() {
            self.numer = -std::mem::take(&mut self.numer);
            self.denom = -std::mem::take(&mut self.denom);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numer.is_negative()
    }

    /// Exact division. A zero divisor is a contract violation surfaced as
    /// [`Error::DivisionByZero`].
    pub fn checked_div(&self, rhs: &Fraction) -> Result<Fraction> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Fraction::from_bigints(
            &self.numer * &rhs.denom,
            &self.denom * &rhs.numer,
        ))
    }

    /// Multiplicative inverse. Errors on zero.
    pub fn recip(&self) -> Result<Fraction> {
        if self.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(Fraction::from_bigints(
            self.denom.clone(),
            self.numer.clone(),
        ))
    }

    /// Integer power. Negative exponents go through the reciprocal, so a
    /// zero base with a negative exponent errors.
    pub fn pow(&self, exp: i64) -> Result<Fraction> {
        if exp < 0 {
            return self.recip()?.pow(-exp);
        }
        let exp = exp as u32;
        Ok(Fraction {
            numer: Pow::pow(&self.numer, exp),
            denom: Pow::pow(&self.denom, exp),
        })
    }

    /// Squared magnitude, cheaper than `pow(2)` for the hot distance path.
    pub fn magnitude_sq(&self) -> Fraction {
        Fraction {
            numer: &self.numer * &self.numer,
            denom: &self.denom * &self.denom,
        }
    }

    /// Largest integer not greater than the fraction.
    pub fn floor(&self) -> BigInt {
        self.numer.div_floor(&self.denom)
    }

    /// Euclidean remainder: the result is always in `[0, modulus)` for a
    /// positive modulus, so a negative value wraps to `modulus - |frac|`.
    /// This is the canonical UV wrap rule for the whole pipeline.
    pub fn rem_euclid(&self, modulus: &Fraction) -> Result<Fraction> {
        let quotient = self.checked_div(modulus)?;
        let whole = Fraction {
            numer: quotient.floor(),
            denom: BigInt::one(),
        };
        Ok(self - &(modulus * &whole))
    }

    /// Square root. Exact when both parts are perfect squares; otherwise a
    /// fixed-precision approximation (see [`SQRT_SCALE_DIGITS`]), which is a
    /// deliberate precision boundary rather than an error.
    ///
    /// # Panics
    /// Panics on negative input; the callers only take roots of sums of
    /// squares.
    pub fn sqrt(&self) -> Fraction {
        let root_n = self.numer.sqrt();
        let root_d = self.denom.sqrt();
        if &root_n * &root_n == self.numer && &root_d * &root_d == self.denom {
            return Fraction::from_bigints(root_n, root_d);
        }
        let scale: BigInt = Pow::pow(&BigInt::from(10), SQRT_SCALE_DIGITS);
        Fraction::from_bigints(
            (&self.numer * &scale).sqrt(),
            (&self.denom * &scale).sqrt(),
        )
    }

    /// Lossy conversion for rounding, texture indexing, and logs.
    pub fn to_f64(&self) -> f64 {
        let n = self.numer.to_f64().unwrap_or(f64::NAN);
        let d = self.denom.to_f64().unwrap_or(f64::NAN);
        n / d
    }
}

fn add_impl(a: &Fraction, b: &Fraction) -> Fraction {
    Fraction::from_bigints(
        &a.numer * &b.denom + &b.numer * &a.denom,
        &a.denom * &b.denom,
    )
}

fn sub_impl(a: &Fraction, b: &Fraction) -> Fraction {
    Fraction::from_bigints(
        &a.numer * &b.denom - &b.numer * &a.denom,
        &a.denom * &b.denom,
    )
}

fn mul_impl(a: &Fraction, b: &Fraction) -> Fraction {
    Fraction::from_bigints(&a.numer * &b.numer, &a.denom * &b.denom)
}

macro_rules! binop {
    ($trait:ident, $method:ident, $imp:path) => {
        impl $trait for &Fraction {
            type Output = Fraction;
            fn $method(self, rhs: &Fraction) -> Fraction {
                $imp(self, rhs)
            }
        }
        impl $trait<&Fraction> for Fraction {
            type Output = Fraction;
            fn $method(self, rhs: &Fraction) -> Fraction {
                $imp(&self, rhs)
            }
        }
        impl $trait<Fraction> for &Fraction {
            type Output = Fraction;
            fn $method(self, rhs: Fraction) -> Fraction {
                $imp(self, &rhs)
            }
        }
        impl $trait for Fraction {
            type Output = Fraction;
            fn $method(self, rhs: Fraction) -> Fraction {
                $imp(&self, &rhs)
            }
        }
    };
}

binop!(Add, add, add_impl);
binop!(Sub, sub, sub_impl);
binop!(Mul, mul, mul_impl);

impl Neg for &Fraction {
    type Output = Fraction;
    fn neg(self) -> Fraction {
        Fraction {
            numer: -self.numer.clone(),
            denom: self.denom.clone(),
        }
    }
}

impl Neg for Fraction {
    type Output = Fraction;
    fn neg(mut self) -> Fraction {
        self.numer = -self.numer;
        self
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order.
        (&self.numer * &other.denom).cmp(&(&other.numer * &self.denom))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}
