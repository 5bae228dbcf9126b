//! BER test CLI subcommand.
//!
//! This subcommand can be used to perform a BER test of an LDPC decoder.
//!
//! # Examples
//!
//! A rate 1/2 code stored in `code.alist` can be simulated with
//! ```shell
//! $ fecsim ber --min-ebn0 0.0 --max-ebn0 2.0 --step-ebn0 0.25 code.alist
//! ```

use crate::{
    cli::Run,
    decoder::{factory::DecoderImplementation, DecoderOptions},
    simulation::{
        ber::{BerTestParameters, Report, Reporter, Statistics},
        factory::{Ber, BerTestBuilder, Modulation},
    },
    sparse::SparseMatrix,
};
use clap::Parser;
use console::Term;
use std::{
    error::Error,
    fs::File,
    io::Write,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

/// BER test CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs a BER simulation")]
pub struct Args {
    /// alist file for the code
    alist: String,
    /// Output file for simulation results
    #[arg(long)]
    output_file: Option<String>,
    /// Decoder implementation
    #[arg(long, default_value = "MinSum")]
    decoder: DecoderImplementation,
    /// Modulation
    #[arg(long, default_value_t = Modulation::Bpsk)]
    modulation: Modulation,
    /// Minimum Eb/N0 (dB)
    #[arg(long)]
    min_ebn0: f64,
    /// Maximum Eb/N0 (dB)
    #[arg(long)]
    max_ebn0: f64,
    /// Eb/N0 step (dB)
    #[arg(long)]
    step_ebn0: f64,
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
    /// Number of frame errors to collect
    #[arg(long, default_value = "100")]
    frame_errors: u64,
    /// Seed for the random number generators
    #[arg(long, default_value = "0")]
    seed: u64,
    /// Number of worker threads (0 means one per CPU)
    #[arg(long, default_value = "0")]
    workers: usize,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let mut output_file = if let Some(f) = &self.output_file {
            Some(File::create(f)?)
        } else {
            None
        };
        let num_ebn0s = ((self.max_ebn0 - self.min_ebn0) / self.step_ebn0).floor() as usize + 1;
        let ebn0s = (0..num_ebn0s)
            .map(|k| (self.min_ebn0 + k as f64 * self.step_ebn0) as f32)
            .collect::<Vec<_>>();
        let (report_tx, report_rx) = mpsc::channel();
        let reporter = Reporter {
            tx: report_tx,
            interval: Duration::from_millis(500),
        };
        let test = BerTestBuilder {
            parameters: BerTestParameters {
                h,
                decoder: self.decoder,
                decoder_options: DecoderOptions {
                    max_iterations: self.max_iter,
                    offset: self.offset,
                    normalize: self.normalize,
                    clip: self.clip,
                },
                max_frame_errors: self.frame_errors,
                ebn0s_db: &ebn0s,
                seed: self.seed,
                workers: self.workers,
                reporter: Some(reporter),
            },
            modulation: self.modulation,
        }
        .build()?;
        self.write_details(std::io::stdout(), &*test)?;
        if let Some(f) = &mut output_file {
            self.write_details(&*f, &*test)?;
        }
        let mut progress = Progress::new(report_rx, output_file);
        let progress = std::thread::spawn(move || progress.run());
        test.run()?;
        // This block cannot actually be written with the ? operator
        #[allow(clippy::question_mark)]
        if let Err(e) = progress.join().unwrap() {
            return Err(e);
        }
        Ok(())
    }
}

impl Args {
    fn write_details<W: Write>(&self, mut f: W, test: &dyn Ber) -> std::io::Result<()> {
        writeln!(f, "BER TEST PARAMETERS")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "Simulation:")?;
        writeln!(f, " - Minimum Eb/N0: {:.2} dB", self.min_ebn0)?;
        writeln!(f, " - Maximum Eb/N0: {:.2} dB", self.max_ebn0)?;
        writeln!(f, " - Eb/N0 step: {:.2} dB", self.step_ebn0)?;
        writeln!(f, " - Number of frame errors: {}", self.frame_errors)?;
        writeln!(f, " - Seed: {}", self.seed)?;
        writeln!(f, "Channel:")?;
        writeln!(f, " - Modulation: {}", self.modulation)?;
        writeln!(f, "LDPC code:")?;
        writeln!(f, " - alist: {}", self.alist)?;
        writeln!(f, " - Information bits (k): {}", test.k())?;
        writeln!(f, " - Codeword size (N): {}", test.n())?;
        writeln!(f, " - Code rate: {:.3}", test.rate())?;
        writeln!(f, "LDPC decoder:")?;
        writeln!(f, " - Implementation: {}", self.decoder)?;
        writeln!(f, " - Maximum iterations: {}", self.max_iter)?;
        writeln!(f, " - Offset: {}", self.offset)?;
        writeln!(f, " - Normalization: {}", self.normalize)?;
        writeln!(f, " - Saturation: {}", self.clip)?;
        writeln!(f)?;
        Ok(())
    }
}

#[derive(Debug)]
struct Progress {
    rx: Receiver<Report>,
    term: Term,
    output_file: Option<File>,
}

impl Progress {
    fn new(rx: Receiver<Report>, output_file: Option<File>) -> Progress {
        Progress {
            rx,
            term: Term::stdout(),
            output_file,
        }
    }

    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        ctrlc::set_handler({
            let term = self.term.clone();
            move || {
                let _ = term.write_line("");
                let _ = term.show_cursor();
                std::process::exit(0);
            }
        })?;

        let ret = self.work();
        self.term.write_line("")?;
        self.term.show_cursor()?;
        ret
    }

    fn work(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        self.term.set_title("fecsim ber");
        self.term.hide_cursor()?;
        self.term.write_line(Self::format_header())?;
        if let Some(f) = &mut self.output_file {
            writeln!(f, "{}", Self::format_header())?;
        }
        let mut last_stats: Option<Statistics> = None;
        loop {
            let Report::Statistics(stats) = self.rx.recv().unwrap() else {
                // BER test has finished
                if let (Some(f), Some(s)) = (&mut self.output_file, &last_stats) {
                    writeln!(f, "{}", &Self::format_progress(s))?;
                }
                return Ok(());
            };
            match &last_stats {
                Some(s) if s.ebn0_db == stats.ebn0_db => {
                    self.term.move_cursor_up(1)?;
                    self.term.clear_line()?;
                }
                Some(s) => {
                    // a new Eb/N0 case has started; record the final
                    // statistics of the previous one
                    if let Some(f) = &mut self.output_file {
                        writeln!(f, "{}", &Self::format_progress(s))?;
                    }
                }
                None => (),
            };
            self.term.write_line(&Self::format_progress(&stats))?;
            last_stats = Some(stats);
        }
    }

    fn format_header() -> &'static str {
        "  Eb/N0 |   Frames | Bit errs | Frame er | False de |     BER |     FER | Avg iter | Throughp | Elapsed\n\
         --------|----------|----------|----------|----------|---------|---------|----------|----------|----------"
    }

    fn format_progress(stats: &Statistics) -> String {
        format!(
            "{:7.2} | {:8} | {:8} | {:8} | {:8} | {:7.2e} | {:7.2e} | {:8.1} | {:8.3} | {}",
            stats.ebn0_db,
            stats.num_frames,
            stats.bit_errors,
            stats.frame_errors,
            stats.false_decodes,
            stats.ber,
            stats.fer,
            stats.average_iterations,
            stats.throughput_mbps,
            humantime::format_duration(Duration::from_secs(stats.elapsed.as_secs()))
        )
    }
}
