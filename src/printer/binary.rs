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
use std::io::Write;

use bincode::encode_to_vec;

use crate::headers::file::encode_file_header;
use crate::headers::file::encode_header_description;
use crate::sam::header::HeaderDescription;
use crate::sam::SamRecord;

type E = Box<dyn std::error::Error>;

/// Writes the [FileHeader](crate::headers::file::FileHeader) and the encoded `header` to `conn`.
pub fn format_binary_header<W: Write>(
    header: &HeaderDescription,
    conn: &mut W,
) -> Result<(), E> {
    let header_bytes = encode_header_description(header)?;
    let file_header = encode_file_header(header.reference_sequences.len() as u32, header_bytes.len() as u64)?;
    conn.write_all(&file_header)?;
    conn.write_all(&header_bytes)?;
    Ok(())
}

/// Writes `record` prefixed with its length in bytes.
pub fn format_binary_record<W: Write>(
    record: &SamRecord,
    conn: &mut W,
) -> Result<(), E> {
    let bytes = encode_to_vec(record, bincode::config::standard())?;
    let len = u32::try_from(bytes.len())?;
    conn.write_all(&len.to_le_bytes())?;
    conn.write_all(&bytes)?;
    Ok(())
}
