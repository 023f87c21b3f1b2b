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

//! Input side of the conversion.
//!
//! [Parser] reads GA4GH read alignments stored as JSON lines, one record at
//! a time. [client] wraps the parser in the query interface used by
//! [SamConverter](crate::SamConverter).
//!
//! ## Usage
//!
//! ```rust
//! use ga2sam::parser::Parser;
//! use std::io::Cursor;
//!
//! let mut data = String::new();
//! data += "{\"fragmentName\":\"r1\",\"alignedSequence\":\"ACGT\"}\n";
//! data += "\n";
//! data += "{\"fragmentName\":\"r2\",\"alignedSequence\":\"TTGA\"}\n";
//!
//! let parser = Parser::new(Cursor::new(data));
//! let names: Vec<String> = parser.map(|read| read.unwrap().fragment_name).collect();
//!
//! assert_eq!(names, vec!["r1".to_string(), "r2".to_string()]);
//! ```
//!

// Format specific implementations
pub mod client;
pub mod ga4gh;

use crate::error::ConvertError;
use crate::protocol::AlignmentRecord;

use ga4gh::read_alignment;

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Lines;
use std::path::Path;

use flate2::read::MultiGzDecoder;

type E = Box<dyn std::error::Error>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone)]
pub struct UnparseableLine {
    line_number: usize,
    reason: String,
}

impl std::fmt::Display for UnparseableLine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.reason)
    }
}

impl std::error::Error for UnparseableLine {}

/// Wraps `reader` in a gzip decoder if its contents start with the gzip magic bytes.
pub fn decompress<R: BufRead + 'static>(
    mut reader: R,
) -> Result<Box<dyn BufRead>, E> {
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        log::debug!("Reading gzip compressed input");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Opens a plain or gzip compressed file for reading.
pub fn open_input(
    path: &Path,
) -> Result<Box<dyn BufRead>, E> {
    let f = File::open(path)?;
    decompress(BufReader::new(f))
}

pub struct Parser<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> Parser<R> {
    pub fn new(
        conn: R,
    ) -> Self {
        Parser{
            lines: conn.lines(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for Parser<R> {
    type Item = Result<AlignmentRecord, ConvertError>;

    fn next(
        &mut self,
    ) -> Option<Result<AlignmentRecord, ConvertError>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ConvertError::Input(Box::new(e)))),
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(read_alignment(&line).map_err(|e| {
                ConvertError::Input(Box::new(UnparseableLine{ line_number: self.line_number, reason: e.to_string() }))
            }));
        }
    }
}
