use std::path::PathBuf;

use catsim_materials::{
    DEFAULT_FRACTION_TOLERANCE, OptionsError, ParseOptions, SumCheck, is_valid_tolerance,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "catsim-materials", version, about = "Check, inspect and bundle CatSim material files")]
pub struct Cli {
    #[command(flatten)]
    pub validation: ValidationArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ValidationArgs {
    /// Allowed distance of the mass fraction sum from 1.0
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_FRACTION_TOLERANCE,
        value_parser = parse_tolerance
    )]
    pub tolerance: f64,

    /// What to do when the fraction sum is out of tolerance: strict, warn or skip
    #[arg(long, global = true, default_value = "strict")]
    pub sum_check: SumCheck,
}

impl ValidationArgs {
    pub fn options(&self) -> Result<ParseOptions, OptionsError> {
        ParseOptions::try_new(self.tolerance, self.sum_check)
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if is_valid_tolerance(value) {
        Ok(value)
    } else {
        Err(OptionsError::InvalidTolerance(value).to_string())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse material files and report the first problem in each
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Resolve a material by name and print its composition
    Show {
        name: String,

        /// Directory to search; repeatable. Defaults to CATSIM_MATERIAL_PATH
        #[arg(long = "path", short = 'p')]
        paths: Vec<PathBuf>,
    },

    /// Pack every material file in a directory into a compressed bundle
    Pack {
        dir: PathBuf,

        #[arg(long, short = 'o')]
        output: PathBuf,

        /// zstd compression level
        #[arg(long, default_value_t = 19)]
        level: i32,
    },
}
