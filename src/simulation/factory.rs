//! BER test factory.
//!
//! This module contains a factory that generates BER test objects as a boxed
//! trait object using the [`BerTestBuilder`].

use super::{
    ber::{BerTest, BerTestParameters, Statistics},
    modulation::{Bpsk, Qpsk},
};
use clap::ValueEnum;

/// BER test.
///
/// This trait is used to define trait objects that implement BER tests.
pub trait Ber {
    /// Runs the BER test.
    ///
    /// This function runs the BER test until completion. It returns a list of
    /// statistics for each Eb/N0, or an error.
    fn run(self: Box<Self>) -> Result<Vec<Statistics>, Box<dyn std::error::Error>>;

    /// Returns the codeword size of the code.
    fn n(&self) -> usize;

    /// Returns the number of information bits of the code.
    fn k(&self) -> usize;

    /// Returns the rate of the code.
    fn rate(&self) -> f64;
}

impl<Mod: super::modulation::Modulation> Ber for BerTest<Mod> {
    fn run(self: Box<Self>) -> Result<Vec<Statistics>, Box<dyn std::error::Error>> {
        BerTest::run(*self)
    }

    fn n(&self) -> usize {
        BerTest::n(self)
    }

    fn k(&self) -> usize {
        BerTest::k(self)
    }

    fn rate(&self) -> f64 {
        BerTest::rate(self)
    }
}

/// BER test builder.
///
/// This struct contains all the parameters needed to create a BER test.
#[derive(Debug)]
pub struct BerTestBuilder<'a> {
    /// BER test parameters.
    pub parameters: BerTestParameters<'a>,
    /// Modulation.
    pub modulation: Modulation,
}

/// Modulation.
///
/// This enum represents the modulations that can be simulated.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, ValueEnum)]
#[clap(rename_all = "UPPER")]
pub enum Modulation {
    /// BPSK modulation.
    Bpsk,
    /// QPSK modulation.
    Qpsk,
}

impl std::str::FromStr for Modulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Modulation, String> {
        Ok(match s {
            "BPSK" => Modulation::Bpsk,
            "QPSK" => Modulation::Qpsk,
            _ => Err(format!("invalid modulation {s}"))?,
        })
    }
}

impl std::fmt::Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Modulation::Bpsk => "BPSK",
                Modulation::Qpsk => "QPSK",
            }
        )
    }
}

impl BerTestBuilder<'_> {
    /// Creates a BER test.
    ///
    /// This function only defines the BER test. To run it it is necessary to
    /// call the [`Ber::run`] method.
    pub fn build(self) -> Result<Box<dyn Ber>, Box<dyn std::error::Error>> {
        Ok(match self.modulation {
            Modulation::Bpsk => Box::new(BerTest::<Bpsk>::new(self.parameters)?),
            Modulation::Qpsk => Box::new(BerTest::<Qpsk>::new(self.parameters)?),
        })
    }
}
