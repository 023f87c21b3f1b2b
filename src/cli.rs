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
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Convert reads aligned to a reference to SAM
    Sam {
        // Input reads as JSON lines, plain or gzip compressed
        #[arg(group = "input", required = true, help = "Input file(s)")]
        input_files: Vec<PathBuf>,

        // References as JSON lines
        #[arg(long = "references", required = true)]
        references: PathBuf,

        // Reference to fetch reads for
        #[arg(long = "reference-id", required = true)]
        reference_id: String,

        // Read groups to include, all if not given
        #[arg(long = "read-group-id", required = false)]
        read_group_ids: Vec<String>,

        // 0-based start of the range
        #[arg(long = "start", required = false)]
        start: Option<i64>,

        // 0-based exclusive end of the range
        #[arg(long = "end", required = false)]
        end: Option<i64>,

        // Output file path, defaults to stdout
        #[arg(short = 'o', long = "output", required = false)]
        out_file: Option<PathBuf>,

        // Write length-prefixed binary records instead of SAM text
        #[arg(short = 'b', long = "binary", default_value_t = false)]
        binary: bool,

        // What to do with references that are not in the header
        #[arg(long = "unknown-reference", default_value = "fail")]
        unknown_reference: String,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Print binary records as SAM
    View {
        // Input file
        #[arg(group = "input", required = true, help = "Input file")]
        input_file: PathBuf,

        // Output file path, defaults to stdout
        #[arg(short = 'o', long = "output", required = false)]
        out_file: Option<PathBuf>,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
