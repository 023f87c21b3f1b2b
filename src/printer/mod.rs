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

//! Printer for outputting [SamRecord] records in any supported [Format].
//!
//! Formats the header and one record at a time into a `Vec<u8>`. A record
//! that can't be formatted returns an error and no bytes, so writing the
//! returned bytes never leaves a partial record in the output.
//!
//! ## Usage
//!
//! ```rust
//! use ga2sam::Format;
//! use ga2sam::printer::Printer;
//! use ga2sam::sam::SamRecord;
//! use ga2sam::sam::header::{HeaderDescription, ReferenceSequence};
//!
//! let header = HeaderDescription {
//!     version: "1.0".to_string(),
//!     reference_sequences: vec![ReferenceSequence { name: "chr1".to_string(), length: 1000 }],
//! };
//! let record = SamRecord {
//!     query_name: "r1".to_string(), flag: 4 | 8, reference_id: -1,
//!     next_reference_id: -1, next_reference_start: -1,
//!     ..Default::default()
//! };
//!
//! let printer = Printer::new(&header, Format::Sam).unwrap();
//! let mut output = printer.print_header().unwrap();
//! output.append(&mut printer.print_record(&record).unwrap());
//!
//! let text = String::from_utf8(output).unwrap();
//! assert!(text.starts_with("@HD\tVN:1.0\n@SQ\tSN:chr1\tLN:1000\n"));
//! assert!(text.lines().nth(2).unwrap().starts_with("r1\t12\t*\t"));
//! ```
//!

use crate::Format;
use crate::sam::SamRecord;
use crate::sam::header::HeaderDescription;

use binary::format_binary_header;
use binary::format_binary_record;
use sam::build_sam_header;
use sam::format_sam_header;
use sam::format_sam_line;

// Format specific implementations
pub mod binary;
pub mod sam;

type E = Box<dyn std::error::Error>;

// Format specific state
enum Output {
    Sam(noodles_sam::Header),
    Binary,
}

pub struct Printer {
    header: HeaderDescription,
    output: Output,

    pub format: Format,
}

impl Printer {
    pub fn new(
        header: &HeaderDescription,
        format: Format,
    ) -> Result<Self, E> {
        let output = match format {
            Format::Sam => Output::Sam(build_sam_header(header)?),
            Format::Binary => Output::Binary,
        };

        Ok(Printer{
            header: header.clone(),
            output,
            format,
        })
    }

    pub fn header(&self) -> &HeaderDescription {
        &self.header
    }

    pub fn print_header(
        &self,
    ) -> Result<Vec<u8>, E> {
        let mut out: Vec<u8> = Vec::new();
        match &self.output {
            Output::Sam(sam_header) => format_sam_header(sam_header, &mut out)?,
            Output::Binary => format_binary_header(&self.header, &mut out)?,
        }
        Ok(out)
    }

    pub fn print_record(
        &self,
        record: &SamRecord,
    ) -> Result<Vec<u8>, E> {
        let mut out: Vec<u8> = Vec::new();
        match &self.output {
            Output::Sam(sam_header) => format_sam_line(record, sam_header, &mut out)?,
            Output::Binary => format_binary_record(record, &mut out)?,
        }
        Ok(out)
    }
}
