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
use std::io::Read;

use bincode::{Encode, Decode};
use bincode::encode_into_std_write;
use bincode::decode_from_slice;

use crate::sam::header::HeaderDescription;

type E = Box<dyn std::error::Error>;

/// `GA2SAMB1` as a little-endian u64.
pub const MAGIC: u64 = u64::from_le_bytes(*b"GA2SAMB1");

/// Version of the binary layout.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct InvalidFileHeader;

impl std::fmt::Display for InvalidFileHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "input is not a ga2sam binary stream")
    }
}

impl std::error::Error for InvalidFileHeader {}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u64,
    pub format_version: u32,
    pub n_references: u32,
    pub header_len: u64,
    pub placeholder: u64,
}

pub fn encode_file_header(
    n_references: u32,
    header_len: u64,
) -> Result<Vec<u8>, E> {
    let mut bytes: Vec<u8> = Vec::new();
    let file_header = FileHeader{ magic: MAGIC, format_version: FORMAT_VERSION, n_references, header_len, placeholder: 0 };
    let nbytes = encode_into_std_write(
        &file_header,
        &mut bytes,
        bincode::config::standard().with_fixed_int_encoding(),
    )?;
    assert_eq!(nbytes, 32);
    Ok(bytes)
}

pub fn decode_file_header(
    header_bytes: &[u8],
) -> Result<FileHeader, E> {
    let header: FileHeader = decode_from_slice(header_bytes, bincode::config::standard().with_fixed_int_encoding())?.0;
    if header.magic != MAGIC || header.format_version != FORMAT_VERSION {
        return Err(Box::new(InvalidFileHeader{}))
    }
    Ok(header)
}

pub fn read_file_header<R: Read>(
    conn: &mut R,
) -> Result<FileHeader, E> {
    let mut header_bytes: [u8; 32] = [0_u8; 32];
    conn.read_exact(&mut header_bytes)?;
    let res = decode_file_header(&header_bytes)?;
    Ok(res)
}

/// Encodes the SAM header contents that follow the [FileHeader].
pub fn encode_header_description(
    header: &HeaderDescription,
) -> Result<Vec<u8>, E> {
    let mut bytes: Vec<u8> = Vec::new();
    let _ = encode_into_std_write(
        header,
        &mut bytes,
        bincode::config::standard(),
    )?;
    Ok(bytes)
}

pub fn decode_header_description(
    bytes: &[u8],
) -> Result<HeaderDescription, E> {
    Ok(decode_from_slice(bytes, bincode::config::standard())?.0)
}

pub fn read_header_description<R: Read>(
    file_header: &FileHeader,
    conn: &mut R,
) -> Result<HeaderDescription, E> {
    let mut bytes: Vec<u8> = vec![0; file_header.header_len as usize];
    conn.read_exact(&mut bytes)?;
    decode_header_description(&bytes)
}
