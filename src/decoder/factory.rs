//! LDPC decoder factory.
//!
//! This module contains routines to build an LDPC decoder generically over
//! the check node update rule. Such decoders are represented by `Box<dyn
//! LdpcDecoder>`, using the trait [`LdpcDecoder`].

use super::{
    arithmetic::{NormalizedMinSum, SumProduct},
    flooding::Decoder,
    DecoderOptions, Error, LdpcDecoder, TannerGraph,
};
use std::sync::Arc;

/// LDPC decoder implementation.
///
/// This enum lists the LDPC decoder implementations corresponding to the
/// different check node update rules.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DecoderImplementation {
    /// The [`NormalizedMinSum`] rule.
    MinSum,
    /// The [`SumProduct`] rule.
    SumProduct,
}

impl DecoderImplementation {
    /// Builds an LDPC decoder.
    ///
    /// Given a Tanner graph and the decoding parameters, this function builds
    /// an LDPC decoder corresponding to this decoder implementation. The
    /// `offset` and `normalize` parameters are only used by the min-sum rule.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the decoding parameters are invalid.
    pub fn build_decoder(
        &self,
        graph: Arc<TannerGraph>,
        options: &DecoderOptions,
    ) -> Result<Box<dyn LdpcDecoder>, Error> {
        Ok(match self {
            DecoderImplementation::MinSum => Box::new(Decoder::new(
                graph,
                NormalizedMinSum::new(options.offset, options.normalize),
                options,
            )?),
            DecoderImplementation::SumProduct => {
                Box::new(Decoder::new(graph, SumProduct::new(), options)?)
            }
        })
    }
}

impl std::str::FromStr for DecoderImplementation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "MinSum" => DecoderImplementation::MinSum,
            "SumProduct" => DecoderImplementation::SumProduct,
            _ => return Err("invalid decoder implementation"),
        })
    }
}

impl std::fmt::Display for DecoderImplementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                DecoderImplementation::MinSum => "MinSum",
                DecoderImplementation::SumProduct => "SumProduct",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sparse::SparseMatrix;

    #[test]
    fn build_and_decode() {
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 1, 2].iter());
        h.insert_row(1, [1, 2, 3].iter());
        let graph = Arc::new(TannerGraph::from_matrix(&h).unwrap());
        for implementation in ["MinSum", "SumProduct"] {
            let implementation: DecoderImplementation = implementation.parse().unwrap();
            let mut decoder = implementation
                .build_decoder(Arc::clone(&graph), &DecoderOptions::default())
                .unwrap();
            assert_eq!(decoder.codeword_len(), 4);
            let output = decoder.decode(&[1.0, 1.0, 1.0, 1.0]);
            assert_eq!(output.posterior_llr.len(), 4);
        }
    }

    #[test]
    fn invalid_name() {
        assert!("Phif64".parse::<DecoderImplementation>().is_err());
    }
}
