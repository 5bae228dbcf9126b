//! Finite field GF(2) arithmetic.
//!
//! This module contains the struct [`GF2`], which represents an element of the
//! finite field GF(2). It implements the arithmetic traits needed to use GF(2)
//! as the scalar type of [`ndarray`] arrays, which is how codewords and
//! generator matrices are represented in this crate.

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use ndarray::ScalarOperand;
use num_traits::{One, Zero};

/// Finite field GF(2) element.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct GF2(u8);

impl GF2 {
    /// Returns the value of the element as a bit.
    pub fn bit(&self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for GF2 {
    fn from(bit: bool) -> GF2 {
        GF2(u8::from(bit))
    }
}

impl From<GF2> for u8 {
    fn from(x: GF2) -> u8 {
        x.0
    }
}

impl Zero for GF2 {
    fn zero() -> GF2 {
        GF2(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl One for GF2 {
    fn one() -> GF2 {
        GF2(1)
    }

    fn is_one(&self) -> bool {
        self.0 == 1
    }
}

impl Add for GF2 {
    type Output = GF2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: GF2) -> GF2 {
        GF2(self.0 ^ rhs.0)
    }
}

impl AddAssign for GF2 {
    fn add_assign(&mut self, rhs: GF2) {
        *self = *self + rhs;
    }
}

impl Sub for GF2 {
    type Output = GF2;

    // In GF(2) every element is its own additive inverse.
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: GF2) -> GF2 {
        self + rhs
    }
}

impl Neg for GF2 {
    type Output = GF2;

    fn neg(self) -> GF2 {
        self
    }
}

impl Mul for GF2 {
    type Output = GF2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: GF2) -> GF2 {
        GF2(self.0 & rhs.0)
    }
}

impl Div for GF2 {
    type Output = GF2;

    /// Divides two GF(2) elements.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn div(self, rhs: GF2) -> GF2 {
        if rhs.is_zero() {
            panic!("division by zero in GF(2)");
        }
        self
    }
}

impl std::iter::Sum for GF2 {
    fn sum<I: Iterator<Item = GF2>>(iter: I) -> GF2 {
        iter.fold(GF2::zero(), |a, b| a + b)
    }
}

impl ScalarOperand for GF2 {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_is_xor() {
        assert_eq!(GF2(0) + GF2(0), GF2(0));
        assert_eq!(GF2(0) + GF2(1), GF2(1));
        assert_eq!(GF2(1) + GF2(0), GF2(1));
        assert_eq!(GF2(1) + GF2(1), GF2(0));
    }

    #[test]
    fn sub_equals_add() {
        for a in [GF2(0), GF2(1)] {
            for b in [GF2(0), GF2(1)] {
                assert_eq!(a - b, a + b);
            }
        }
    }

    #[test]
    fn mul_is_and() {
        assert_eq!(GF2(0) * GF2(0), GF2(0));
        assert_eq!(GF2(0) * GF2(1), GF2(0));
        assert_eq!(GF2(1) * GF2(0), GF2(0));
        assert_eq!(GF2(1) * GF2(1), GF2(1));
    }

    #[test]
    fn sum_is_parity() {
        let odd = [GF2(1), GF2(0), GF2(1), GF2(1)];
        assert_eq!(odd.into_iter().sum::<GF2>(), GF2(1));
        let even = [GF2(1), GF2(1)];
        assert_eq!(even.into_iter().sum::<GF2>(), GF2(0));
    }

    #[test]
    #[should_panic]
    fn div_by_zero() {
        let _ = GF2(1) / GF2(0);
    }
}
