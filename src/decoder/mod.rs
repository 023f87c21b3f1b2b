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

//! Reader for streams written in [Format::Binary](crate::Format::Binary).
//!
//! Reads the headers on construction and returns one [SamRecord] at a time
//! using next().
//!
use crate::headers::file::FileHeader;
use crate::headers::file::read_file_header;
use crate::headers::file::read_header_description;
use crate::sam::SamRecord;
use crate::sam::header::HeaderDescription;

use std::io::Read;

use bincode::decode_from_slice;

type E = Box<dyn std::error::Error>;

pub struct Decoder<'a, R: Read> {
    // Inputs
    conn: &'a mut R,

    file_header: FileHeader,
    header: HeaderDescription,

    // Internals
    records_read: usize,
    finished: bool,
}

impl<'a, R: Read> Decoder<'a, R> {
    pub fn new(
        conn: &'a mut R,
    ) -> Result<Self, E> {
        let file_header = read_file_header(conn)?;
        let header = read_header_description(&file_header, conn)?;

        Ok(Decoder{
            conn,
            file_header, header,
            records_read: 0, finished: false,
        })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn header(&self) -> &HeaderDescription {
        &self.header
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    // Returns None at a clean end of input
    fn read_record_len(&mut self) -> Result<Option<usize>, E> {
        let mut len_bytes: [u8; 4] = [0_u8; 4];
        loop {
            match self.conn.read(&mut len_bytes[0..1]) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Box::new(e)),
            }
        }
        self.conn.read_exact(&mut len_bytes[1..4])?;
        Ok(Some(u32::from_le_bytes(len_bytes) as usize))
    }

    fn read_record(&mut self) -> Result<Option<SamRecord>, E> {
        let Some(len) = self.read_record_len()? else {
            return Ok(None)
        };
        let mut bytes: Vec<u8> = vec![0; len];
        self.conn.read_exact(&mut bytes)?;
        let record: SamRecord = decode_from_slice(&bytes, bincode::config::standard())?.0;
        Ok(Some(record))
    }
}

impl<R: Read> Iterator for Decoder<'_, R> {
    type Item = Result<SamRecord, E>;

    fn next(
        &mut self,
    ) -> Option<Result<SamRecord, E>> {
        if self.finished {
            return None
        }
        match self.read_record() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Some(Ok(record))
            },
            Ok(None) => {
                self.finished = true;
                None
            },
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            },
        }
    }
}
