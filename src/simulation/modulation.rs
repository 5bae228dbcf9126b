//! Modulation and demodulation.
//!
//! This module implements routines for modulation of bits to symbols and
//! demodulation of symbols to LLRs.

use super::channel::ChannelSymbol;
use crate::gf2::GF2;
use ndarray::{ArrayBase, Data, Ix1};
use num_complex::Complex;
use std::f32::consts::FRAC_1_SQRT_2;

/// Modulation.
///
/// This trait is used to define the modulations that can be handled by the
/// simulation. It ties together a modulator and demodulator that work over
/// the same channel symbol type (either real or complex), and declares the
/// number of bits per symbol of the modulation.
pub trait Modulation: 'static {
    /// Channel symbol type.
    type Symbol: ChannelSymbol;
    /// Modulator type.
    type Modulator: Modulator<Symbol = Self::Symbol>;
    /// Demodulator type.
    type Demodulator: Demodulator<Symbol = Self::Symbol>;
    /// Number of bits per symbol.
    const BITS_PER_SYMBOL: f64;
}

/// Modulator.
///
/// This trait defines modulators, which can convert a sequence of bits into
/// symbols.
pub trait Modulator: Default + Clone + Send {
    /// Channel symbol type.
    type Symbol;

    /// Modulates a sequence of bits into symbols.
    fn modulate<S>(&self, codeword: &ArrayBase<S, Ix1>) -> Vec<Self::Symbol>
    where
        S: Data<Elem = GF2>;
}

/// Demodulator.
///
/// This trait defines demodulators, which can compute the bit LLRs for a
/// sequence of symbols.
pub trait Demodulator: Send {
    /// Channel symbol type.
    type Symbol;

    /// Creates a new demodulator.
    ///
    /// The parameter `noise_sigma` indicates the channel noise standard
    /// deviation in each real component of the symbols.
    fn from_noise_sigma(noise_sigma: f32) -> Self;

    /// Returns the LLRs corresponding to a sequence of symbols.
    fn demodulate(&self, symbols: &[Self::Symbol]) -> Vec<f32>;
}

/// BPSK modulation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Bpsk {}

impl Modulation for Bpsk {
    type Symbol = f32;
    type Modulator = BpskModulator;
    type Demodulator = BpskDemodulator;
    const BITS_PER_SYMBOL: f64 = 1.0;
}

/// BPSK modulator.
///
/// Maps the bit 0 to the symbol -1.0 and the bit 1 to the symbol +1.0.
#[derive(Debug, Clone, Default)]
pub struct BpskModulator {}

impl BpskModulator {
    /// Creates a new BPSK modulator.
    pub fn new() -> BpskModulator {
        BpskModulator::default()
    }
}

impl Modulator for BpskModulator {
    type Symbol = f32;

    fn modulate<S>(&self, codeword: &ArrayBase<S, Ix1>) -> Vec<f32>
    where
        S: Data<Elem = GF2>,
    {
        codeword
            .iter()
            .map(|bit| if bit.bit() { 1.0 } else { -1.0 })
            .collect()
    }
}

/// BPSK demodulator.
///
/// Assumes the same mapping as the [`BpskModulator`].
#[derive(Debug, Clone, Default)]
pub struct BpskDemodulator {
    scale: f32,
}

impl BpskDemodulator {
    /// Creates a new BPSK demodulator.
    ///
    /// The `noise_sigma` indicates the channel noise standard deviation. The
    /// channel noise is assumed to be a real Gaussian with mean zero and
    /// standard deviation `noise_sigma`.
    pub fn new(noise_sigma: f32) -> BpskDemodulator {
        BpskDemodulator {
            // Negative scale because we use the convention that +1 means a 1
            // bit.
            scale: -2.0 / (noise_sigma * noise_sigma),
        }
    }
}

impl Demodulator for BpskDemodulator {
    type Symbol = f32;

    fn from_noise_sigma(noise_sigma: f32) -> BpskDemodulator {
        BpskDemodulator::new(noise_sigma)
    }

    fn demodulate(&self, symbols: &[f32]) -> Vec<f32> {
        symbols.iter().map(|&x| self.scale * x).collect()
    }
}

/// QPSK modulation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Qpsk {}

impl Modulation for Qpsk {
    type Symbol = Complex<f32>;
    type Modulator = QpskModulator;
    type Demodulator = QpskDemodulator;
    const BITS_PER_SYMBOL: f64 = 2.0;
}

/// QPSK modulator.
///
/// Gray-coded QPSK with unit symbol energy. The first bit of each pair
/// selects the sign of the in-phase component and the second bit the sign of
/// the quadrature component, with the same bit-to-sign mapping as the
/// [`BpskModulator`].
#[derive(Debug, Clone, Default)]
pub struct QpskModulator {}

impl QpskModulator {
    /// Creates a new QPSK modulator.
    pub fn new() -> QpskModulator {
        QpskModulator::default()
    }

    fn component(bit: GF2) -> f32 {
        if bit.bit() {
            FRAC_1_SQRT_2
        } else {
            -FRAC_1_SQRT_2
        }
    }
}

impl Modulator for QpskModulator {
    type Symbol = Complex<f32>;

    /// Modulates a sequence of bits into symbols.
    ///
    /// # Panics
    ///
    /// Panics if the length of the codeword is not a multiple of 2 bits.
    fn modulate<S>(&self, codeword: &ArrayBase<S, Ix1>) -> Vec<Complex<f32>>
    where
        S: Data<Elem = GF2>,
    {
        assert_eq!(codeword.len() % 2, 0);
        codeword
            .iter()
            .step_by(2)
            .zip(codeword.iter().skip(1).step_by(2))
            .map(|(&b0, &b1)| Complex::new(Self::component(b0), Self::component(b1)))
            .collect()
    }
}

/// QPSK demodulator.
///
/// Assumes the same mapping as the [`QpskModulator`]. Since the two bits of a
/// symbol ride on orthogonal components, each component demodulates as an
/// independent BPSK.
#[derive(Debug, Clone, Default)]
pub struct QpskDemodulator {
    scale: f32,
}

impl QpskDemodulator {
    /// Creates a new QPSK demodulator.
    ///
    /// The `noise_sigma` indicates the channel noise standard deviation in
    /// each of the real and imaginary parts.
    pub fn new(noise_sigma: f32) -> QpskDemodulator {
        QpskDemodulator {
            scale: -2.0 * FRAC_1_SQRT_2 / (noise_sigma * noise_sigma),
        }
    }
}

impl Demodulator for QpskDemodulator {
    type Symbol = Complex<f32>;

    fn from_noise_sigma(noise_sigma: f32) -> QpskDemodulator {
        QpskDemodulator::new(noise_sigma)
    }

    fn demodulate(&self, symbols: &[Complex<f32>]) -> Vec<f32> {
        symbols
            .iter()
            .flat_map(|&s| [self.scale * s.re, self.scale * s.im])
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_traits::{One, Zero};

    #[test]
    fn bpsk_modulator() {
        let modulator = BpskModulator::new();
        let x = modulator.modulate(&ndarray::arr1(&[GF2::one(), GF2::zero()]));
        assert_eq!(&x, &[1.0, -1.0]);
    }

    #[test]
    fn bpsk_demodulator() {
        let demodulator = BpskDemodulator::new(2.0_f32.sqrt());
        let x = demodulator.demodulate(&[1.0, -1.0]);
        assert_eq!(x.len(), 2);
        let tol = 1e-4;
        assert!((x[0] + 1.0).abs() < tol);
        assert!((x[1] - 1.0).abs() < tol);
    }

    #[test]
    fn qpsk_modulator() {
        let o = GF2::one();
        let z = GF2::zero();
        let modulator = QpskModulator::new();
        let x = modulator.modulate(&ndarray::arr1(&[o, z, z, o]));
        let a = FRAC_1_SQRT_2;
        assert_eq!(&x, &[Complex::new(a, -a), Complex::new(-a, a)]);
    }

    #[test]
    fn qpsk_round_trip_signs() {
        let o = GF2::one();
        let z = GF2::zero();
        let bits = [o, z, z, o, o, o, z, z];
        let modulator = QpskModulator::new();
        let demodulator = QpskDemodulator::new(1.0);
        let llrs = demodulator.demodulate(&modulator.modulate(&ndarray::arr1(&bits)));
        assert_eq!(llrs.len(), bits.len());
        for (&bit, &llr) in bits.iter().zip(llrs.iter()) {
            // negative LLR means a 1 bit
            assert_eq!(bit.bit(), llr < 0.0);
        }
    }
}
