//! LDPC decoder with flooding schedule.
//!
//! This module implements a belief propagation LDPC decoder with a flooding
//! message passing schedule. The messages live in two flat edge-indexed
//! buffers laid out by variable node, so both node passes are contiguous
//! scans; the check node pass gathers its incoming messages through the
//! transpose permutation of the [`TannerGraph`]. After every check node pass
//! the check messages are saturated to a fixed symmetric range to bound their
//! growth across iterations, and the decoder stops early as soon as the
//! syndrome vanishes.

use super::{
    arithmetic::{CheckNodeUpdate, NormalizedMinSum},
    graph::TannerGraph,
    DecoderOptions, Error, LdpcDecoder, SoftOutput,
};
use std::sync::Arc;

/// LDPC belief propagation flooding decoder.
#[derive(Debug, Clone)]
pub struct Decoder<C = NormalizedMinSum> {
    graph: Arc<TannerGraph>,
    rule: C,
    max_iterations: usize,
    clip: f32,
    check_to_var: Box<[f32]>,
    var_to_check: Box<[f32]>,
}

impl<C: CheckNodeUpdate> Decoder<C> {
    /// Creates a new flooding LDPC decoder.
    ///
    /// The `graph` describes the code, `rule` is the check node update rule,
    /// and `options` contains the tunable decoding parameters. The message
    /// buffers are allocated here and reused by every [`Decoder::decode`]
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if `options.max_iterations` is zero or
    /// `options.clip` is not a positive number.
    pub fn new(
        graph: Arc<TannerGraph>,
        rule: C,
        options: &DecoderOptions,
    ) -> Result<Decoder<C>, Error> {
        if options.max_iterations == 0 {
            return Err(Error::MaxIterationsZero);
        }
        if !(options.clip > 0.0) {
            return Err(Error::InvalidClip);
        }
        let num_edges = graph.num_edges();
        Ok(Decoder {
            rule,
            max_iterations: options.max_iterations,
            clip: options.clip,
            check_to_var: vec![0.0; num_edges].into_boxed_slice(),
            var_to_check: vec![0.0; num_edges].into_boxed_slice(),
            graph,
        })
    }

    /// Decodes a frame.
    ///
    /// The parameter is the channel LLRs for the received codeword. The
    /// decoder iterates until the syndrome vanishes or the maximum number of
    /// iterations is reached, and returns the a posteriori LLRs together with
    /// the convergence flag.
    ///
    /// # Panics
    ///
    /// Panics if the length of `channel_llr` is not the number of variable
    /// nodes of the graph.
    pub fn decode(&mut self, channel_llr: &[f32]) -> SoftOutput {
        assert_eq!(channel_llr.len(), self.graph.num_variables());
        // No information from the checks yet.
        self.check_to_var.fill(0.0);
        let mut unsatisfied = true;
        let mut iterations = 0;
        while iterations < self.max_iterations {
            self.process_variable_nodes(channel_llr);
            unsatisfied = self.process_check_nodes();
            self.saturate();
            iterations += 1;
            if !unsatisfied {
                break;
            }
        }
        SoftOutput {
            posterior_llr: self.posterior(channel_llr),
            converged: !unsatisfied,
            iterations,
        }
    }

    // Computes the extrinsic variable-to-check messages: the full sum of the
    // channel LLR and the incoming check messages, minus each edge's own
    // contribution.
    fn process_variable_nodes(&mut self, channel_llr: &[f32]) {
        let mut offset = 0;
        for (&llr, &degree) in channel_llr.iter().zip(self.graph.var_degrees().iter()) {
            let degree = usize::from(degree);
            let incoming = &self.check_to_var[offset..offset + degree];
            let total = llr + incoming.iter().sum::<f32>();
            for (outgoing, &c) in self.var_to_check[offset..offset + degree]
                .iter_mut()
                .zip(incoming.iter())
            {
                *outgoing = total - c;
            }
            offset += degree;
        }
    }

    // Runs the check node update rule on every check node. Returns whether
    // any check is unsatisfied (nonzero syndrome).
    fn process_check_nodes(&mut self) -> bool {
        let mut unsatisfied = false;
        let mut offset = 0;
        for &degree in self.graph.check_degrees().iter() {
            let degree = usize::from(degree);
            let edges = &self.graph.transpose()[offset..offset + degree];
            let satisfied = self
                .rule
                .update(&self.var_to_check, &mut self.check_to_var, edges);
            unsatisfied |= !satisfied;
            offset += degree;
        }
        unsatisfied
    }

    fn saturate(&mut self) {
        for x in self.check_to_var.iter_mut() {
            *x = x.clamp(-self.clip, self.clip);
        }
    }

    // A posteriori LLRs: the channel LLR of each variable plus all the
    // incoming check messages, without exclusion.
    fn posterior(&self, channel_llr: &[f32]) -> Vec<f32> {
        let mut posterior = Vec::with_capacity(channel_llr.len());
        let mut offset = 0;
        for (&llr, &degree) in channel_llr.iter().zip(self.graph.var_degrees().iter()) {
            let degree = usize::from(degree);
            let block = &self.check_to_var[offset..offset + degree];
            posterior.push(llr + block.iter().sum::<f32>());
            offset += degree;
        }
        posterior
    }
}

impl<C: CheckNodeUpdate> LdpcDecoder for Decoder<C> {
    fn decode(&mut self, channel_llr: &[f32]) -> SoftOutput {
        Decoder::decode(self, channel_llr)
    }

    fn codeword_len(&self) -> usize {
        self.graph.num_variables()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decoder::hard_decisions;
    use crate::sparse::SparseMatrix;

    fn test_decoder() -> Decoder {
        // Example 2.5 in Sarah J. Johnson - Iterative Error Correction
        let mut h = SparseMatrix::new(4, 6);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 4].iter());
        h.insert_row(2, [0, 4, 5].iter());
        h.insert_row(3, [2, 3, 5].iter());
        let graph = Arc::new(TannerGraph::from_matrix(&h).unwrap());
        Decoder::new(graph, NormalizedMinSum::default(), &DecoderOptions::default()).unwrap()
    }

    fn to_llrs(bits: &[u8]) -> Vec<f32> {
        bits.iter()
            .map(|&b| if b == 0 { 1.3863 } else { -1.3863 })
            .collect()
    }

    #[test]
    fn no_errors() {
        let mut decoder = test_decoder();
        let codeword = [0, 0, 1, 0, 1, 1];
        let output = decoder.decode(&to_llrs(&codeword));
        assert!(output.converged);
        assert_eq!(output.iterations, 1);
        assert_eq!(&hard_decisions(&output.posterior_llr), &codeword);
    }

    #[test]
    fn single_error() {
        let mut decoder = test_decoder();
        let codeword_good = [0, 0, 1, 0, 1, 1];
        for j in 0..codeword_good.len() {
            let mut codeword_bad = codeword_good;
            codeword_bad[j] ^= 1;
            let output = decoder.decode(&to_llrs(&codeword_bad));
            assert!(output.converged);
            assert_eq!(&hard_decisions(&output.posterior_llr), &codeword_good);
        }
    }

    #[test]
    fn zero_input_is_fixed_point() {
        // single-parity-check style graph with 4 variables and 2 checks
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 1].iter());
        h.insert_row(1, [2, 3].iter());
        let graph = Arc::new(TannerGraph::from_matrix(&h).unwrap());
        let mut decoder =
            Decoder::new(graph, NormalizedMinSum::default(), &DecoderOptions::default()).unwrap();
        let output = decoder.decode(&[0.0; 4]);
        // all-zero messages carry even parity, so the zero syndrome must be
        // detected on the first iteration and no information is created
        assert!(output.converged);
        assert_eq!(output.iterations, 1);
        assert_eq!(&output.posterior_llr, &[0.0; 4]);
    }

    #[test]
    fn exhausts_iterations_on_conflict() {
        // a single degree-2 check with opposing strong beliefs never
        // converges: degree-1 variables repeat their channel LLR forever
        let mut h = SparseMatrix::new(1, 2);
        h.insert_row(0, [0, 1].iter());
        let graph = Arc::new(TannerGraph::from_matrix(&h).unwrap());
        let options = DecoderOptions::default();
        let mut decoder =
            Decoder::new(graph, NormalizedMinSum::default(), &options).unwrap();
        let output = decoder.decode(&[1.0, -1.0]);
        assert!(!output.converged);
        assert_eq!(output.iterations, options.max_iterations);
    }

    #[test]
    fn saturation_bounds_messages() {
        let mut decoder = test_decoder();
        let options = DecoderOptions::default();
        let llrs = [1000.0, -1000.0, 1000.0, -1000.0, 1000.0, -1000.0];
        let _ = decoder.decode(&llrs);
        assert!(decoder
            .check_to_var
            .iter()
            .all(|&x| x.abs() <= options.clip));
    }

    #[test]
    fn decode_is_deterministic() {
        let mut decoder = test_decoder();
        let llrs = [0.3, -0.2, -1.1, 0.9, -0.7, 0.1];
        let first = decoder.decode(&llrs);
        let second = decoder.decode(&llrs);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_options() {
        let mut h = SparseMatrix::new(1, 2);
        h.insert_row(0, [0, 1].iter());
        let graph = Arc::new(TannerGraph::from_matrix(&h).unwrap());
        let options = DecoderOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(
            Decoder::new(Arc::clone(&graph), NormalizedMinSum::default(), &options).unwrap_err(),
            Error::MaxIterationsZero
        );
        let options = DecoderOptions {
            clip: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Decoder::new(graph, NormalizedMinSum::default(), &options).unwrap_err(),
            Error::InvalidClip
        );
    }
}
