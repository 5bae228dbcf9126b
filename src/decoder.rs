//! LDPC belief propagation decoding.
//!
//! This module provides an iterative belief propagation LDPC decoder with a
//! flooding message passing schedule and a pluggable check node update rule.
//! The code is described by a [`TannerGraph`], an immutable flat edge-indexed
//! form of the parity check matrix that can be shared by several decoder
//! instances running concurrently on different frames.

use thiserror::Error;

pub mod arithmetic;
pub mod factory;
pub mod flooding;
pub mod graph;

pub use graph::{GraphError, TannerGraph};

/// Decoder configuration error.
///
/// This enum represents the configuration problems that are rejected when
/// constructing a decoder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The maximum number of iterations is zero.
    #[error("the maximum number of iterations must be positive")]
    MaxIterationsZero,
    /// The message saturation bound is not a positive number.
    #[error("the message saturation bound must be a positive number")]
    InvalidClip,
}

/// Tunable decoding parameters.
///
/// These are the knobs of the belief propagation decoder. The defaults
/// correspond to the values commonly used with the normalized offset min-sum
/// rule. The `offset` and `normalize` constants are consumed by the check
/// node update rule; `max_iterations` and `clip` are consumed by the decoder
/// itself.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecoderOptions {
    /// Maximum number of decoding iterations.
    pub max_iterations: usize,
    /// Subtractive correction applied to the check node minima.
    pub offset: f32,
    /// Multiplicative correction applied to the check node minima.
    pub normalize: f32,
    /// Symmetric saturation bound for the check-to-variable messages.
    pub clip: f32,
}

impl Default for DecoderOptions {
    fn default() -> DecoderOptions {
        DecoderOptions {
            max_iterations: 10,
            offset: 0.0,
            normalize: 0.825,
            clip: 15.0,
        }
    }
}

/// Soft decoder output.
///
/// Contains the result of decoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftOutput {
    /// A posteriori LLRs.
    ///
    /// Contains one LLR per codeword bit: the channel LLR plus all the
    /// extrinsic information accumulated by the decoder.
    pub posterior_llr: Vec<f32>,
    /// Whether the syndrome vanished before the iteration cap.
    pub converged: bool,
    /// Number of iterations performed.
    pub iterations: usize,
}

/// Generic LDPC decoder.
///
/// This trait is used to form LDPC decoder trait objects, abstracting over
/// the check node update rule of the decoder.
pub trait LdpcDecoder: std::fmt::Debug + Send {
    /// Decodes a frame.
    ///
    /// The parameter is the channel LLRs for the received codeword. Returns
    /// the a posteriori LLRs and the convergence flag.
    fn decode(&mut self, channel_llr: &[f32]) -> SoftOutput;

    /// Returns the codeword length of the code.
    fn codeword_len(&self) -> usize;
}

/// Hard decision on an LLR.
///
/// Returns the bit corresponding to an LLR, using the convention that
/// negative LLRs correspond to the bit 1.
pub fn hard_decision(llr: f32) -> bool {
    llr <= 0.0
}

/// Hard decisions on a sequence of LLRs.
///
/// Returns the bits corresponding to a slice of LLRs, as in
/// [`hard_decision`].
pub fn hard_decisions(llrs: &[f32]) -> Vec<u8> {
    llrs.iter().map(|&llr| u8::from(hard_decision(llr))).collect()
}
