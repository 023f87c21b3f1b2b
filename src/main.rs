// ga2sam: Conversion of GA4GH read alignments to the SAM format.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use clap::CommandFactory;
use clap::Parser;

use ga2sam::ConvertOptions;
use ga2sam::Format;
use ga2sam::parser::client::LocalClient;
use ga2sam::sam::line::UnknownReferencePolicy;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

/// Opens `out_file` for writing, or stdout if it is None.
fn open_output(out_file: &Option<impl AsRef<Path>>) -> Result<Box<dyn Write>, E> {
    match out_file {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

fn exit_on_error<T>(result: Result<T, impl std::fmt::Display>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        },
    }
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        // Sam
        Some(cli::Commands::Sam {
            input_files,
            references,
            reference_id,
            read_group_ids,
            start,
            end,
            out_file,
            binary,
            unknown_reference,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });

            let unknown_reference = exit_on_error(UnknownReferencePolicy::from_str(unknown_reference));
            let options = ConvertOptions {
                read_group_ids: read_group_ids.clone(),
                reference_id: reference_id.clone(),
                start: *start,
                end: *end,
                format: if *binary { Format::Binary } else { Format::Sam },
                unknown_reference,
            };

            let client = input_files.iter().fold(
                exit_on_error(LocalClient::from_references_file(references)),
                |client, file| client.with_read_file(file),
            );

            let mut conn_out = exit_on_error(open_output(out_file));
            exit_on_error(ga2sam::convert_to_write(&client, options, &mut conn_out));
        },

        // View
        Some(cli::Commands::View {
            input_file,
            out_file,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });

            let mut conn_in = BufReader::new(exit_on_error(File::open(input_file)));
            let mut conn_out = exit_on_error(open_output(out_file));
            exit_on_error(ga2sam::view_to_write(&mut conn_in, &mut conn_out));
        },

        None => {
            let _ = cli::Cli::command().print_help();
        },
    }
}
