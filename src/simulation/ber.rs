//! BER simulation
//!
//! This module contains utilities for BER simulation. A [`BerTest`] runs the
//! full simulation chain (encode, modulate, add noise, demodulate, decode)
//! frame by frame for a list of Eb/N0 values, spreading the frames over
//! several worker threads. All the workers share the same read-only Tanner
//! graph; each of them owns its decoder instance, so no synchronization is
//! needed while decoding.

use super::{
    channel::AwgnChannel,
    modulation::{Demodulator, Modulation, Modulator},
};
use crate::{
    decoder::{
        factory::DecoderImplementation, hard_decisions, DecoderOptions, LdpcDecoder, TannerGraph,
    },
    encoder::Encoder,
    gf2::GF2,
    rand::{Rng, SeedableRng},
    sparse::SparseMatrix,
};
use ndarray::Array1;
use rand::{distributions::Standard, Rng as _};
use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, Sender, channel},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// BER test parameters.
///
/// This struct contains all the parameters needed to define a BER test.
#[derive(Debug)]
pub struct BerTestParameters<'a> {
    /// Parity check matrix of the code.
    pub h: SparseMatrix,
    /// Decoder implementation.
    pub decoder: DecoderImplementation,
    /// Tunable decoding parameters.
    pub decoder_options: DecoderOptions,
    /// Number of frame errors to collect for each Eb/N0.
    pub max_frame_errors: u64,
    /// List of Eb/N0's in dB units.
    pub ebn0s_db: &'a [f32],
    /// Seed for the random number generators.
    ///
    /// Each worker thread derives its own seed from this value.
    pub seed: u64,
    /// Number of worker threads (zero means one per CPU).
    pub workers: usize,
    /// Optional periodic progress reporter.
    pub reporter: Option<Reporter>,
}

/// BER test.
///
/// This struct is used to configure and run a BER test. It is generic over
/// the [`Modulation`] used in the simulation.
#[derive(Debug)]
pub struct BerTest<Mod: Modulation> {
    k: usize,
    n: usize,
    graph: Arc<TannerGraph>,
    encoder: Encoder,
    decoder: DecoderImplementation,
    decoder_options: DecoderOptions,
    max_frame_errors: u64,
    ebn0s_db: Vec<f32>,
    seed: u64,
    workers: usize,
    reporter: Option<Reporter>,
    statistics: Vec<Statistics>,
    _modulation: PhantomData<Mod>,
}

/// BER test statistics.
///
/// This structure contains the statistics for a single Eb/N0 case in a BER
/// test.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Eb/N0 in dB units.
    pub ebn0_db: f32,
    /// Number of frames tested.
    pub num_frames: u64,
    /// Number of bit errors.
    pub bit_errors: u64,
    /// Number of frame errors.
    pub frame_errors: u64,
    /// Number of frames falsely decoded.
    ///
    /// These are frames for which the decoder converged to a valid codeword,
    /// but the codeword is different to the transmitted codeword.
    pub false_decodes: u64,
    /// Bit error rate.
    pub ber: f64,
    /// Frame error rate.
    pub fer: f64,
    /// Average number of decoder iterations per frame.
    pub average_iterations: f64,
    /// Elapsed time for this test case.
    pub elapsed: Duration,
    /// Throughput in Mbps (referred to information bits).
    pub throughput_mbps: f64,
}

/// BER test report.
///
/// This enum represents the messages sent by a running BER test through its
/// [`Reporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Progress statistics for the Eb/N0 case currently running.
    Statistics(Statistics),
    /// The BER test has finished.
    Finished,
}

/// BER test reporter.
///
/// Passed to a [`BerTest`] to receive periodic progress reports over a
/// channel while the test runs.
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Sender for the reports.
    pub tx: Sender<Report>,
    /// Interval between consecutive progress reports.
    pub interval: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CurrentStatistics {
    num_frames: u64,
    bit_errors: u64,
    frame_errors: u64,
    false_decodes: u64,
    total_iterations: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct FrameResult {
    bit_errors: u64,
    converged: bool,
    iterations: u64,
}

impl<Mod: Modulation> BerTest<Mod> {
    /// Creates a new BER test.
    ///
    /// This function only defines the BER test. To run it it is necessary to
    /// call the [`BerTest::run`] method.
    ///
    /// # Errors
    ///
    /// Returns an error if the parity check matrix does not admit a
    /// systematic encoder or a valid Tanner graph.
    pub fn new(parameters: BerTestParameters<'_>) -> Result<BerTest<Mod>, Box<dyn std::error::Error>> {
        let encoder = Encoder::from_h(&parameters.h)?;
        let graph = Arc::new(TannerGraph::from_matrix(&parameters.h)?);
        let workers = if parameters.workers == 0 {
            num_cpus::get()
        } else {
            parameters.workers
        };
        Ok(BerTest {
            k: parameters.h.num_cols() - parameters.h.num_rows(),
            n: parameters.h.num_cols(),
            graph,
            encoder,
            decoder: parameters.decoder,
            decoder_options: parameters.decoder_options,
            max_frame_errors: parameters.max_frame_errors,
            ebn0s_db: parameters.ebn0s_db.to_owned(),
            seed: parameters.seed,
            workers,
            reporter: parameters.reporter,
            statistics: Vec::with_capacity(parameters.ebn0s_db.len()),
            _modulation: PhantomData,
        })
    }

    /// Returns the codeword size of the code.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the number of information bits of the code.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the rate of the code.
    pub fn rate(&self) -> f64 {
        self.k as f64 / self.n as f64
    }

    /// Runs the BER test.
    ///
    /// This function runs the BER test until completion. It returns a list of
    /// statistics for each Eb/N0, or an error.
    pub fn run(mut self) -> Result<Vec<Statistics>, Box<dyn std::error::Error>> {
        let ebn0s_db = std::mem::take(&mut self.ebn0s_db);
        for ebn0_db in ebn0s_db {
            let statistics = self.run_case(ebn0_db)?;
            if let Some(reporter) = &self.reporter {
                let _ = reporter.tx.send(Report::Statistics(statistics.clone()));
            }
            self.statistics.push(statistics);
        }
        if let Some(reporter) = &self.reporter {
            let _ = reporter.tx.send(Report::Finished);
        }
        Ok(self.statistics)
    }

    fn run_case(&self, ebn0_db: f32) -> Result<Statistics, Box<dyn std::error::Error>> {
        let ebn0 = 10.0_f64.powf(0.1 * f64::from(ebn0_db));
        let esn0 = self.rate() * Mod::BITS_PER_SYMBOL * ebn0;
        let noise_sigma = (0.5 / esn0).sqrt() as f32;

        // The decoders are built here rather than in the workers so that
        // configuration errors surface before any thread is spawned.
        let mut decoders = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            decoders.push(
                self.decoder
                    .build_decoder(Arc::clone(&self.graph), &self.decoder_options)?,
            );
        }

        let stop = AtomicBool::new(false);
        let (tx, rx) = channel();
        let start = Instant::now();
        let statistics = thread::scope(|scope| {
            for (w, decoder) in decoders.into_iter().enumerate() {
                let results = tx.clone();
                let stop = &stop;
                let encoder = &self.encoder;
                let k = self.k;
                let seed = self.seed.wrapping_add(w as u64);
                scope.spawn(move || {
                    Self::simulate_frames(encoder, k, decoder, noise_sigma, seed, stop, results)
                });
            }
            drop(tx);
            self.collect(ebn0_db, start, &stop, rx)
        });
        Ok(statistics)
    }

    // Simulation loop of one worker thread. Runs frames until the collector
    // raises the stop flag.
    fn simulate_frames(
        encoder: &Encoder,
        k: usize,
        mut decoder: Box<dyn LdpcDecoder>,
        noise_sigma: f32,
        seed: u64,
        stop: &AtomicBool,
        results: Sender<FrameResult>,
    ) {
        let mut rng = Rng::seed_from_u64(seed);
        let modulator = Mod::Modulator::default();
        let demodulator = Mod::Demodulator::from_noise_sigma(noise_sigma);
        let channel = AwgnChannel::new(noise_sigma);
        while !stop.load(Ordering::Relaxed) {
            let message = Self::random_message(&mut rng, k);
            let codeword = encoder.encode(&Self::gf2_array(&message));
            let mut symbols = modulator.modulate(&codeword);
            channel.add_noise(&mut rng, &mut symbols);
            let llrs = demodulator.demodulate(&symbols);
            let output = decoder.decode(&llrs);
            let decisions = hard_decisions(&output.posterior_llr);
            // Count only bit errors in the systematic part of the codeword.
            let bit_errors = message
                .iter()
                .zip(decisions.iter())
                .filter(|(&a, &b)| a != b)
                .count() as u64;
            let result = FrameResult {
                bit_errors,
                converged: output.converged,
                iterations: output.iterations as u64,
            };
            if results.send(result).is_err() {
                break;
            }
        }
    }

    // Accumulates the frame results of the workers until enough frame errors
    // have been collected, reporting progress periodically.
    fn collect(
        &self,
        ebn0_db: f32,
        start: Instant,
        stop: &AtomicBool,
        results: Receiver<FrameResult>,
    ) -> Statistics {
        let mut current = CurrentStatistics::default();
        let mut last_report = Instant::now();
        for frame in results.iter() {
            current.num_frames += 1;
            current.bit_errors += frame.bit_errors;
            current.total_iterations += frame.iterations;
            if frame.bit_errors > 0 {
                current.frame_errors += 1;
                if frame.converged {
                    current.false_decodes += 1;
                }
            }
            if current.frame_errors >= self.max_frame_errors {
                stop.store(true, Ordering::Relaxed);
            }
            if let Some(reporter) = &self.reporter {
                if last_report.elapsed() >= reporter.interval {
                    let _ = reporter.tx.send(Report::Statistics(Statistics::from_current(
                        &current, ebn0_db, self.k, start,
                    )));
                    last_report = Instant::now();
                }
            }
        }
        Statistics::from_current(&current, ebn0_db, self.k, start)
    }

    fn random_message(rng: &mut Rng, size: usize) -> Vec<u8> {
        rng.sample_iter(Standard)
            .map(<u8 as From<bool>>::from)
            .take(size)
            .collect()
    }

    fn gf2_array(bits: &[u8]) -> Array1<GF2> {
        Array1::from_iter(bits.iter().map(|&b| GF2::from(b == 1)))
    }
}

impl Statistics {
    fn from_current(stats: &CurrentStatistics, ebn0_db: f32, k: usize, start: Instant) -> Statistics {
        let elapsed = start.elapsed();
        Statistics {
            ebn0_db,
            num_frames: stats.num_frames,
            bit_errors: stats.bit_errors,
            frame_errors: stats.frame_errors,
            false_decodes: stats.false_decodes,
            ber: stats.bit_errors as f64 / (k as f64 * stats.num_frames as f64),
            fer: stats.frame_errors as f64 / stats.num_frames as f64,
            average_iterations: stats.total_iterations as f64 / stats.num_frames as f64,
            elapsed,
            throughput_mbps: 1e-6 * (k as f64 * stats.num_frames as f64) / elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulation::modulation::Bpsk;

    fn test_matrix() -> SparseMatrix {
        // (8, 4) code with an invertible parity submatrix
        let mut h = SparseMatrix::new(4, 8);
        h.insert_row(0, [0, 1, 4].iter());
        h.insert_row(1, [1, 2, 4, 5].iter());
        h.insert_row(2, [0, 2, 3, 6].iter());
        h.insert_row(3, [1, 3, 6, 7].iter());
        h
    }

    #[test]
    fn low_snr_collects_frame_errors() {
        // at -10 dB virtually every frame fails, so the test stops quickly
        // once the requested frame errors have been collected
        let test: BerTest<Bpsk> = BerTest::new(BerTestParameters {
            h: test_matrix(),
            decoder: DecoderImplementation::MinSum,
            decoder_options: DecoderOptions::default(),
            max_frame_errors: 5,
            ebn0s_db: &[-10.0],
            seed: 7,
            workers: 2,
            reporter: None,
        })
        .unwrap();
        assert_eq!(test.k(), 4);
        assert_eq!(test.n(), 8);
        assert_eq!(test.rate(), 0.5);
        let statistics = test.run().unwrap();
        assert_eq!(statistics.len(), 1);
        let stats = &statistics[0];
        assert_eq!(stats.ebn0_db, -10.0);
        assert!(stats.frame_errors >= 5);
        assert!(stats.num_frames >= stats.frame_errors);
        assert!(stats.ber > 0.0);
        assert!(stats.fer > 0.0);
    }

    #[test]
    fn reporter_receives_final_report() {
        let (tx, rx) = channel();
        let reporter = Reporter {
            tx,
            interval: Duration::from_millis(500),
        };
        let test: BerTest<Bpsk> = BerTest::new(BerTestParameters {
            h: test_matrix(),
            decoder: DecoderImplementation::MinSum,
            decoder_options: DecoderOptions::default(),
            max_frame_errors: 2,
            ebn0s_db: &[-10.0],
            seed: 0,
            workers: 1,
            reporter: Some(reporter),
        })
        .unwrap();
        test.run().unwrap();
        let reports = rx.iter().collect::<Vec<_>>();
        assert!(matches!(reports.last(), Some(Report::Finished)));
        assert!(reports
            .iter()
            .any(|r| matches!(r, Report::Statistics(s) if s.frame_errors >= 2)));
    }
}
