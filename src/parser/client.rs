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

//! Query interface for fetching references and reads.
//!
//! [ReadsClient] is what [SamConverter](crate::SamConverter) needs from a
//! GA4GH server: a reference lookup and a lazy reads search. [LocalClient]
//! answers the same queries from JSON lines files.
//!
use std::io::Cursor;
use std::path::Path;
use std::path::PathBuf;

use crate::error::ConvertError;
use crate::parser::decompress;
use crate::parser::ga4gh::read_references;
use crate::parser::open_input;
use crate::parser::Parser;
use crate::protocol::AlignmentRecord;
use crate::protocol::ReferenceInfo;
use crate::sam::cigar::reference_span;

type E = Box<dyn std::error::Error>;

/// Lazy sequence of reads returned by a search.
pub type Reads<'a> = Box<dyn Iterator<Item = Result<AlignmentRecord, ConvertError>> + 'a>;

/// Parameters of a reads search.
///
/// `start` and `end` are 0-based and `end` is exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchReadsRequest {
    /// Read groups to include, all read groups if empty.
    pub read_group_ids: Vec<String>,
    pub reference_name: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

pub trait ReadsClient {
    /// Look up a reference by its id.
    ///
    /// Terminates with [ConvertError::Configuration] if there is no reference with `reference_id`.
    fn get_reference(&self, reference_id: &str) -> Result<ReferenceInfo, ConvertError>;

    /// Search for reads matching `request`.
    ///
    /// Reads are returned in the order they are stored in.
    fn search_reads<'a>(&'a self, request: &SearchReadsRequest) -> Result<Reads<'a>, ConvertError>;
}

/// True if `read` is aligned to the requested reference, read group, and range.
///
/// An alignment overlaps the range if any base in `[position, position +
/// reference span)` is within `[start, end)`. Alignments with no reference
/// span are treated as covering one base.
///
pub fn matches_request(
    read: &AlignmentRecord,
    request: &SearchReadsRequest,
) -> bool {
    if !request.read_group_ids.is_empty() && !request.read_group_ids.contains(&read.read_group_id) {
        return false
    }

    let Some(alignment) = &read.alignment else {
        return false
    };
    if alignment.position.reference_name != request.reference_name {
        return false
    }

    let aln_start = alignment.position.position;
    let aln_end = aln_start.saturating_add(reference_span(&alignment.cigar).max(1));
    request.start.map_or(true, |start| aln_end > start) && request.end.map_or(true, |end| aln_start < end)
}

enum ReadSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl ReadSource {
    fn open(&self) -> Result<Parser<Box<dyn std::io::BufRead>>, E> {
        let reader = match self {
            ReadSource::File(path) => open_input(path)?,
            ReadSource::Bytes(bytes) => decompress(Cursor::new(bytes.clone()))?,
        };
        Ok(Parser::new(reader))
    }
}

/// A [ReadsClient] backed by JSON lines files.
///
/// ## Usage
///
/// ```rust
/// use ga2sam::parser::client::{LocalClient, ReadsClient, SearchReadsRequest};
/// use ga2sam::protocol::ReferenceInfo;
///
/// let references = vec![ReferenceInfo { id: "ref-1".to_string(), name: "chr1".to_string(), length: 1000 }];
/// let reads = concat!(
///     r#"{"fragmentName":"r1","alignment":{"position":{"referenceName":"chr1","position":10},"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]}}"#, "\n",
///     r#"{"fragmentName":"r2"}"#, "\n",
///     r#"{"fragmentName":"r3","alignment":{"position":{"referenceName":"chr1","position":500},"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]}}"#, "\n",
/// );
///
/// let client = LocalClient::new(references).with_read_bytes(reads.as_bytes().to_vec());
/// let reference = client.get_reference("ref-1").unwrap();
///
/// let request = SearchReadsRequest { reference_name: reference.name, start: Some(0), end: Some(100), ..Default::default() };
/// let names: Vec<String> = client.search_reads(&request).unwrap().map(|read| read.unwrap().fragment_name).collect();
///
/// assert_eq!(names, vec!["r1".to_string()]);
/// ```
///
pub struct LocalClient {
    references: Vec<ReferenceInfo>,
    sources: Vec<ReadSource>,
}

impl LocalClient {
    pub fn new(
        references: Vec<ReferenceInfo>,
    ) -> Self {
        LocalClient{ references, sources: Vec::new() }
    }

    /// Reads the references from a JSON lines file.
    pub fn from_references_file(
        path: &Path,
    ) -> Result<Self, E> {
        let references = read_references(open_input(path)?)?;
        log::info!("Read {} reference(s) from {}", references.len(), path.display());
        Ok(LocalClient::new(references))
    }

    /// Adds a plain or gzip compressed JSON lines file of reads.
    pub fn with_read_file(
        mut self,
        path: &Path,
    ) -> Self {
        self.sources.push(ReadSource::File(path.to_path_buf()));
        self
    }

    /// Adds plain or gzip compressed JSON lines of reads stored in memory.
    pub fn with_read_bytes(
        mut self,
        bytes: Vec<u8>,
    ) -> Self {
        self.sources.push(ReadSource::Bytes(bytes));
        self
    }

    pub fn references(&self) -> &[ReferenceInfo] {
        &self.references
    }
}

impl ReadsClient for LocalClient {
    fn get_reference(
        &self,
        reference_id: &str,
    ) -> Result<ReferenceInfo, ConvertError> {
        self.references.iter()
            .find(|reference| reference.id == reference_id)
            .cloned()
            .ok_or_else(|| ConvertError::Configuration(format!("no reference with id '{}'", reference_id)))
    }

    fn search_reads<'a>(
        &'a self,
        request: &SearchReadsRequest,
    ) -> Result<Reads<'a>, ConvertError> {
        if let (Some(start), Some(end)) = (request.start, request.end) {
            if start > end {
                return Err(ConvertError::Configuration(format!("search start {} is after end {}", start, end)))
            }
        }

        let request = request.clone();
        let reads = self.sources.iter().flat_map(|source| -> Reads<'static> {
            match source.open() {
                Ok(parser) => Box::new(parser),
                Err(e) => Box::new(std::iter::once(Err(ConvertError::Input(e)))),
            }
        }).filter(move |read| match read {
            Ok(read) => matches_request(read, &request),
            Err(_) => true,
        });

        Ok(Box::new(reads))
    }
}
