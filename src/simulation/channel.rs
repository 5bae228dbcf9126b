//! Channel simulation.
//!
//! This module contains the simulation of an AWGN channel over real or
//! complex symbols.

use num_complex::Complex;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Channel symbol.
///
/// This trait is implemented by the scalar types that can be sent through the
/// [`AwgnChannel`]: real symbols ([`f32`]) and complex symbols
/// ([`Complex<f32>`]). For complex symbols an independent noise sample is
/// added to each component.
pub trait ChannelSymbol: Copy + Send {
    /// Adds a noise sample drawn from `distr` to the symbol.
    fn add_noise<R: Rng>(&mut self, distr: &Normal<f32>, rng: &mut R);
}

impl ChannelSymbol for f32 {
    fn add_noise<R: Rng>(&mut self, distr: &Normal<f32>, rng: &mut R) {
        *self += distr.sample(rng);
    }
}

impl ChannelSymbol for Complex<f32> {
    fn add_noise<R: Rng>(&mut self, distr: &Normal<f32>, rng: &mut R) {
        self.re += distr.sample(rng);
        self.im += distr.sample(rng);
    }
}

/// AWGN channel simulation.
///
/// This struct is used to add white Gaussian noise to symbols.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    distr: Normal<f32>,
}

impl AwgnChannel {
    /// Creates a new AWGN channel.
    ///
    /// The channel noise follows a normal distribution with mean zero and
    /// standard deviation `noise_sigma` in each real component.
    ///
    /// # Panics
    ///
    /// This function panics if `noise_sigma` is negative or NaN.
    pub fn new(noise_sigma: f32) -> AwgnChannel {
        assert!(noise_sigma >= 0.0);
        AwgnChannel {
            distr: Normal::new(0.0, noise_sigma).unwrap(),
        }
    }

    /// Adds noise to a sequence of symbols.
    ///
    /// The noise is added in-place to the slice `symbols`. An [Rng] is used
    /// as source of randomness.
    pub fn add_noise<T: ChannelSymbol, R: Rng>(&self, rng: &mut R, symbols: &mut [T]) {
        for x in symbols.iter_mut() {
            x.add_noise(&self.distr, rng);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_awgn() {
        let _channel = AwgnChannel::new(0.2);
    }

    #[test]
    #[should_panic]
    fn negative_noise_sigma() {
        let _channel = AwgnChannel::new(-3.5);
    }

    #[test]
    fn zero_noise_sigma() {
        let channel = AwgnChannel::new(0.0);
        let mut rng = rand::thread_rng();
        let mut symbols = vec![1.0f32; 1024];
        let symbols_orig = symbols.clone();
        channel.add_noise(&mut rng, &mut symbols);
        assert_eq!(&symbols, &symbols_orig);
    }

    #[test]
    fn complex_noise() {
        let channel = AwgnChannel::new(0.1);
        let mut rng = rand::thread_rng();
        let mut symbols = vec![Complex::new(1.0f32, -1.0); 16];
        channel.add_noise(&mut rng, &mut symbols);
        // the noise is small compared to the symbol amplitude
        assert!(symbols.iter().all(|s| s.re > 0.0 && s.im < 0.0));
    }
}
