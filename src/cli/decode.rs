//! Decode CLI subcommand.
//!
//! This subcommand can be used to run the LDPC decoder on frames of channel
//! LLRs read from a file. The input file contains the LLRs in plain text,
//! separated by whitespace, with one value per codeword bit. The hard
//! decisions on the decoded frames are printed to the standard output, one
//! line of `0`/`1` characters per frame, and the convergence of each frame is
//! reported on the standard error.

use crate::{
    cli::Run,
    decoder::{factory::DecoderImplementation, hard_decision, DecoderOptions, TannerGraph},
    sparse::SparseMatrix,
};
use clap::Parser;
use std::{error::Error, path::PathBuf, sync::Arc};

/// Decode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs LDPC decoding")]
pub struct Args {
    /// alist file for the code
    alist: PathBuf,
    /// input file (channel LLRs as whitespace-separated plain text)
    input: PathBuf,
    /// Decoder implementation
    #[arg(long, default_value = "MinSum")]
    decoder: DecoderImplementation,
    /// Maximum number of iterations
    #[arg(long, default_value = "10")]
    max_iter: usize,
    /// Offset correction of the min-sum rule
    #[arg(long, default_value_t = 0.0)]
    offset: f32,
    /// Normalization constant of the min-sum rule
    #[arg(long, default_value_t = 0.825)]
    normalize: f32,
    /// Saturation bound for the check messages
    #[arg(long, default_value_t = 15.0)]
    clip: f32,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let graph = Arc::new(TannerGraph::from_matrix(&h)?);
        let n = graph.num_variables();
        let options = DecoderOptions {
            max_iterations: self.max_iter,
            offset: self.offset,
            normalize: self.normalize,
            clip: self.clip,
        };
        let mut decoder = self.decoder.build_decoder(graph, &options)?;
        let llrs = std::fs::read_to_string(&self.input)?
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()?;
        if llrs.len() % n != 0 {
            return Err(format!(
                "input contains {} LLRs, which is not a multiple of the codeword size {}",
                llrs.len(),
                n
            )
            .into());
        }
        for (frame, llrs) in llrs.chunks_exact(n).enumerate() {
            let output = decoder.decode(llrs);
            let bits = output
                .posterior_llr
                .iter()
                .map(|&llr| if hard_decision(llr) { '1' } else { '0' })
                .collect::<String>();
            println!("{bits}");
            if output.converged {
                eprintln!("frame {frame}: converged in {} iterations", output.iterations);
            } else {
                eprintln!(
                    "frame {frame}: not converged after {} iterations",
                    output.iterations
                );
            }
        }
        Ok(())
    }
}
