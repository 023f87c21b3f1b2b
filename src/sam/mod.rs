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

//! SAM records built from GA4GH read alignments.
//!
//! A [SamRecord] holds the fields of a single
//! [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf) alignment line with
//! reference names replaced by target ids. It does not depend on the output
//! format, the [printer](crate::printer) encodes it as text or binary.
//!
//! Coordinates are 0-based. An unmapped read has reference id
//! [UNMAPPED_REFERENCE_ID] and position 0, an absent mate has reference id
//! and position -1.
//!
use bincode::{Encode, Decode};

use crate::protocol::AttributeValue;

pub mod cigar;
pub mod flags;
pub mod header;
pub mod line;

/// Reference id of a read that is not placed on any reference.
pub const UNMAPPED_REFERENCE_ID: i32 = -1;

/// Value of an optional field.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Tags with more than one value, in input order.
    Multi(Vec<AttributeValue>),
}

/// A single alignment line.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct SamRecord {
    pub query_name: String,
    pub flag: u16,
    pub reference_id: i32,
    pub reference_start: i64,
    pub mapping_quality: u8,
    /// (operation code, length) pairs, see [cigar].
    pub cigar: Vec<(u8, u32)>,
    pub next_reference_id: i32,
    pub next_reference_start: i64,
    pub template_length: i64,
    pub query_sequence: String,
    pub query_qualities: Vec<u8>,
    pub tags: Vec<(String, TagValue)>,
}
