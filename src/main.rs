// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod cli;
mod columns;
mod config;
mod export;
mod input;
mod json_helpers;
mod matrix;
mod record;
mod sheet;
mod state;
mod types;
mod ui;

use config::ReportConfig;
use input::{LineRecords, RecordStream};
use log::{debug, info};
use matrix::TraceabilityMatrix;
use std::io::BufReader;

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        println!("{}", cli::CliArgs::usage());
        std::process::exit(1);
    }

    // Resolve configuration before touching any input
    let config = match config::resolve_config(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        ui::print_error(&e);
        std::process::exit(1);
    }
}

fn run(args: &cli::CliArgs, config: &ReportConfig) -> Result<(), String> {
    let matrix = TraceabilityMatrix::from_config(config)?;
    let output = export::resolve_output_path(&args.output)?;
    if args.no_clobber && output.exists() {
        return Err(format!("Output {} already exists and --no-clobber was given", output.display()));
    }

    let resources = input::resolve_resources(&args.input)?;
    info!("Reading {} input resource(s)", resources.len());
    for resource in &resources {
        debug!("  {}", resource);
    }
    let reader = input::open_all(&resources)?;

    let (document, summary) = if args.line_mode {
        matrix.create_report(LineRecords::new(BufReader::new(reader)))?
    } else {
        matrix.create_report(RecordStream::new(reader))?
    };

    export::save_workbook(&document, &output, !args.no_clobber)?;
    ui::print_summary(&summary, &output);
    Ok(())
}
