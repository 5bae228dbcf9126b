//! `fecsim` CLI application
//!
//! The CLI application is organized in several subcommands. The supported
//! subcommands can be seen by running `fecsim`. See the modules below for
//! examples and more information about how to use each subcommand.

use clap::Parser;
use std::error::Error;

pub mod ber;
pub mod decode;

/// Trait to run a CLI subcommand
pub trait Run {
    /// Run the CLI subcommand
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(author, version, name = "fecsim", about = "FEC simulation toolbox")]
pub enum Args {
    /// ber subcommand
    Ber(ber::Args),
    /// decode subcommand
    Decode(decode::Args),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match self {
            Args::Ber(x) => x.run(),
            Args::Decode(x) => x.run(),
        }
    }
}
