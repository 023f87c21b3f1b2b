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

//! ga2sam is a library and a command-line client for:
//!
//!   - Converting [GA4GH](https://ga4gh-schemas.readthedocs.io/) read alignments into [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf) records.
//!   - Writing the records as SAM text or as a length-prefixed binary stream.
//!   - Decoding the binary stream back into SAM text.
//!
//! Reads are fetched for one reference at a time through a [ReadsClient].
//! ga2sam ships [LocalClient](parser::client::LocalClient), which reads
//! references and reads from JSON lines files.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The ga2sam CLI supports the following subcommands:
//!   - `ga2sam sam` convert reads aligned to a reference to SAM.
//!   - `ga2sam view` print a binary stream written by `ga2sam sam --binary` as SAM.
//!
//! ### Rust API
//!
//! [convert_to_write] and [view_to_write] process an entire stream.
//!
//! For use cases requiring access to a single record at a time, the following
//! are provided:
//!
//!   - [to_sam_record](sam::line::to_sam_record): converts an [AlignmentRecord](protocol::AlignmentRecord) into a [SamRecord](sam::SamRecord).
//!   - [Printer](printer::Printer): formats the header and [SamRecord](sam::SamRecord) records in a supported [Format].
//!   - [Decoder](decoder::Decoder): takes a [Read] containing a binary stream and decodes it into [SamRecord](sam::SamRecord).
//!   - [Parser](parser::Parser): takes a [BufRead](std::io::BufRead) containing JSON lines and parses them into [AlignmentRecord](protocol::AlignmentRecord).
//!
//! ```rust
//! use ga2sam::{convert_to_write, ConvertOptions};
//! use ga2sam::parser::client::LocalClient;
//! use ga2sam::protocol::ReferenceInfo;
//!
//! let references = vec![ReferenceInfo { id: "ref-1".to_string(), name: "chr1".to_string(), length: 1000 }];
//! let reads = r#"{"fragmentName":"r1","alignment":{"position":{"referenceName":"chr1","position":99},"mappingQuality":60,"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]},"alignedSequence":"ACGT"}"#;
//!
//! let client = LocalClient::new(references).with_read_bytes(reads.as_bytes().to_vec());
//! let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };
//!
//! let mut output: Vec<u8> = Vec::new();
//! let n_records = convert_to_write(&client, options, &mut output).unwrap();
//!
//! let text = String::from_utf8(output).unwrap();
//! assert_eq!(n_records, 1);
//! assert!(text.starts_with("@HD\tVN:1.0\n@SQ\tSN:chr1\tLN:1000\n"));
//! assert!(text.lines().nth(2).unwrap().starts_with("r1\t74\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*"));
//! ```
//!
//! ## Binary format
//!
//! See [headers] for the layout written with [Format::Binary].
//!

use decoder::Decoder;
use error::ConvertError;
use parser::client::ReadsClient;
use parser::client::SearchReadsRequest;
use printer::Printer;
use protocol::ReferenceInfo;
use sam::header::build_header;
use sam::line::to_sam_record_with_policy;
use sam::line::UnknownReferencePolicy;

use std::io::Read;
use std::io::Write;

pub mod decoder;
pub mod error;
pub mod headers;
pub mod parser;
pub mod printer;
pub mod protocol;
pub mod sam;

type E = Box<dyn std::error::Error>;

/// Supported output formats.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// SAM text with a header.
    #[default]
    Sam,
    /// Length-prefixed binary records, see [headers].
    Binary,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sam" => Ok(Format::Sam),
            "binary" => Ok(Format::Binary),
            _ => Err(format!("'{}' is not a valid Format", s)),
        }
    }
}

/// Parameters of a conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Read groups to include, all read groups if empty.
    pub read_group_ids: Vec<String>,
    /// Id of the reference to fetch reads for.
    pub reference_id: String,
    /// 0-based start of the range to fetch reads from.
    pub start: Option<i64>,
    /// 0-based exclusive end of the range to fetch reads from.
    pub end: Option<i64>,
    pub format: Format,
    pub unknown_reference: UnknownReferencePolicy,
}

/// Converts the reads of one reference to SAM.
///
/// The reference is resolved once in [new](SamConverter::new). Each call
/// to [convert](SamConverter::convert) searches the reads again and writes
/// a complete output.
///
pub struct SamConverter<'a, C: ReadsClient> {
    client: &'a C,
    reference: ReferenceInfo,
    options: ConvertOptions,
}

impl<'a, C: ReadsClient> SamConverter<'a, C> {
    /// Resolves `options.reference_id` through `client`.
    ///
    /// Terminates with [ConvertError::Configuration] if the reference can't
    /// be found.
    ///
    pub fn new(
        client: &'a C,
        options: ConvertOptions,
    ) -> Result<Self, ConvertError> {
        let reference = client.get_reference(&options.reference_id)?;
        log::info!("Converting reads aligned to {} (length {})", reference.name, reference.length);
        Ok(SamConverter{ client, reference, options })
    }

    pub fn reference(&self) -> &ReferenceInfo {
        &self.reference
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Writes the header and all matching reads to `conn_out`.
    ///
    /// Each record is formatted in full before it is written, so an error
    /// leaves only complete records in `conn_out`.
    ///
    /// Returns the number of records written.
    ///
    pub fn convert<W: Write>(
        &self,
        conn_out: &mut W,
    ) -> Result<usize, ConvertError> {
        let (header, target_ids) = build_header(&self.reference)?;

        let printer = Printer::new(&header, self.options.format).map_err(|e| ConvertError::Configuration(e.to_string()))?;
        let header_bytes = printer.print_header().map_err(|e| ConvertError::Configuration(e.to_string()))?;
        conn_out.write_all(&header_bytes).map_err(|e| ConvertError::Sink(Box::new(e)))?;

        let request = SearchReadsRequest {
            read_group_ids: self.options.read_group_ids.clone(),
            reference_name: self.reference.name.clone(),
            start: self.options.start,
            end: self.options.end,
        };

        let mut n_records: usize = 0;
        for read in self.client.search_reads(&request)? {
            let read = read?;
            let record = to_sam_record_with_policy(&read, &target_ids, self.options.unknown_reference)?;
            let bytes = printer.print_record(&record).map_err(|e| ConvertError::malformed_record(&read.fragment_name, e.to_string()))?;
            conn_out.write_all(&bytes).map_err(|e| ConvertError::Sink(Box::new(e)))?;
            n_records += 1;
        }
        conn_out.flush().map_err(|e| ConvertError::Sink(Box::new(e)))?;

        log::info!("Wrote {} record(s)", n_records);
        Ok(n_records)
    }
}

/// Convert the reads returned by [ReadsClient] to [Write].
///
/// Shorthand for [SamConverter::new] followed by [SamConverter::convert].
///
pub fn convert_to_write<C: ReadsClient, W: Write>(
    client: &C,
    options: ConvertOptions,
    conn_out: &mut W,
) -> Result<usize, ConvertError> {
    let converter = SamConverter::new(client, options)?;
    converter.convert(conn_out)
}

/// Print a binary stream from [Read] as SAM text to [Write].
///
/// Returns the number of records printed.
///
/// ## Usage
///
/// ```rust
/// use ga2sam::{convert_to_write, view_to_write, ConvertOptions, Format};
/// use ga2sam::parser::client::LocalClient;
/// use ga2sam::protocol::ReferenceInfo;
/// use std::io::Cursor;
///
/// let references = vec![ReferenceInfo { id: "ref-1".to_string(), name: "chr1".to_string(), length: 1000 }];
/// let reads = r#"{"fragmentName":"r1","alignedSequence":"ACGT"}"#;
/// let client = LocalClient::new(references).with_read_bytes(reads.as_bytes().to_vec());
///
/// // Reads on no reference are not returned by a search
/// let options = ConvertOptions { reference_id: "ref-1".to_string(), format: Format::Binary, ..Default::default() };
/// let mut binary: Vec<u8> = Vec::new();
/// convert_to_write(&client, options, &mut binary).unwrap();
///
/// let mut text: Vec<u8> = Vec::new();
/// let n_records = view_to_write(&mut Cursor::new(binary), &mut text).unwrap();
///
/// assert_eq!(n_records, 0);
/// assert_eq!(text, b"@HD\tVN:1.0\n@SQ\tSN:chr1\tLN:1000\n".to_vec());
/// ```
///
pub fn view_to_write<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<usize, E> {
    let mut decoder = Decoder::new(conn_in)?;
    let printer = Printer::new(decoder.header(), Format::Sam)?;

    conn_out.write_all(&printer.print_header()?)?;
    for record in decoder.by_ref() {
        conn_out.write_all(&printer.print_record(&record?)?)?;
    }
    conn_out.flush()?;

    log::info!("Printed {} record(s)", decoder.records_read());
    Ok(decoder.records_read())
}

// Tests
#[cfg(test)]
mod tests {
    use crate::parser::client::LocalClient;
    use crate::protocol::ReferenceInfo;

    const MAPPED_PAIR: &str = r#"{"readGroupId":"rg1","fragmentName":"r1","numberReads":2,"readNumber":0,"fragmentLength":150,"alignment":{"position":{"referenceName":"chr1","position":100,"strand":"POS_STRAND"},"mappingQuality":60,"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]},"alignedSequence":"ACGT","nextMatePosition":{"referenceName":"chr1","position":200,"strand":"POS_STRAND"}}"#;
    const FAR_READ: &str = r#"{"readGroupId":"rg2","fragmentName":"r2","alignment":{"position":{"referenceName":"chr1","position":800,"strand":"NEG_STRAND"},"mappingQuality":20,"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]},"alignedSequence":"TTGA"}"#;
    const MATE_ON_CHR2: &str = r#"{"fragmentName":"r3","numberReads":2,"readNumber":1,"alignment":{"position":{"referenceName":"chr1","position":300},"mappingQuality":60,"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":4}]},"alignedSequence":"GGCC","nextMatePosition":{"referenceName":"chr2","position":50}}"#;

    fn chr1_client(reads: &[&str]) -> LocalClient {
        let references = vec![ReferenceInfo { id: "ref-1".to_string(), name: "chr1".to_string(), length: 1000 }];
        LocalClient::new(references).with_read_bytes(reads.join("\n").into_bytes())
    }

    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn convert_mapped_pair() {
        use super::SamConverter;
        use super::ConvertOptions;

        let client = chr1_client(&[MAPPED_PAIR]);
        let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };
        let converter = SamConverter::new(&client, options).unwrap();

        let mut got: Vec<u8> = Vec::new();
        let n_records = converter.convert(&mut got).unwrap();
        let text = String::from_utf8(got).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let fields: Vec<&str> = lines[2].split('\t').collect();

        assert_eq!(n_records, 1);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "@HD\tVN:1.0");
        assert_eq!(lines[1], "@SQ\tSN:chr1\tLN:1000");
        assert_eq!(fields[0..6], ["r1", "67", "chr1", "101", "60", "4M"]);
        assert!(fields[6] == "=" || fields[6] == "chr1");
        assert_eq!(fields[7..11], ["201", "150", "ACGT", "*"]);
    }

    #[test]
    fn convert_filters_range_and_read_group() {
        use super::convert_to_write;
        use super::ConvertOptions;

        let client = chr1_client(&[MAPPED_PAIR, FAR_READ]);

        let options = ConvertOptions { reference_id: "ref-1".to_string(), start: Some(500), end: Some(1000), ..Default::default() };
        let mut got: Vec<u8> = Vec::new();
        assert_eq!(convert_to_write(&client, options, &mut got).unwrap(), 1);
        assert!(String::from_utf8(got).unwrap().lines().nth(2).unwrap().starts_with("r2\t90\tchr1\t801\t20\t4M"));

        let options = ConvertOptions { reference_id: "ref-1".to_string(), read_group_ids: vec!["rg1".to_string()], ..Default::default() };
        let mut got: Vec<u8> = Vec::new();
        assert_eq!(convert_to_write(&client, options, &mut got).unwrap(), 1);
        assert!(String::from_utf8(got).unwrap().lines().nth(2).unwrap().starts_with("r1\t67\t"));
    }

    #[test]
    fn convert_unknown_reference_id() {
        use super::SamConverter;
        use super::ConvertOptions;
        use crate::error::ConvertError;

        let client = chr1_client(&[MAPPED_PAIR]);
        let options = ConvertOptions { reference_id: "ref-9".to_string(), ..Default::default() };

        assert!(matches!(SamConverter::new(&client, options), Err(ConvertError::Configuration(_))));
    }

    #[test]
    fn convert_mate_on_unknown_reference() {
        use super::convert_to_write;
        use super::ConvertOptions;
        use crate::error::ConvertError;
        use crate::sam::line::UnknownReferencePolicy;

        let client = chr1_client(&[MAPPED_PAIR, MATE_ON_CHR2]);

        let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };
        let mut got: Vec<u8> = Vec::new();
        let err = convert_to_write(&client, options, &mut got).unwrap_err();

        assert!(matches!(err, ConvertError::UnknownReference(ref name) if name == "chr2"));
        // the record before the failing one is complete
        assert!(String::from_utf8(got).unwrap().ends_with("\n"));

        let options = ConvertOptions { reference_id: "ref-1".to_string(), unknown_reference: UnknownReferencePolicy::Unmapped, ..Default::default() };
        let mut got: Vec<u8> = Vec::new();
        assert_eq!(convert_to_write(&client, options, &mut got).unwrap(), 2);

        let text = String::from_utf8(got).unwrap();
        let fields: Vec<&str> = text.lines().nth(3).unwrap().split('\t').collect();
        assert_eq!(fields[0..3], ["r3", "131", "chr1"]);
        assert_eq!(fields[6], "*");
    }

    #[test]
    fn convert_to_failing_writer() {
        use super::convert_to_write;
        use super::ConvertOptions;
        use crate::error::ConvertError;

        let client = chr1_client(&[MAPPED_PAIR]);
        let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };

        let err = convert_to_write(&client, options, &mut FailingWriter).unwrap_err();

        assert!(matches!(err, ConvertError::Sink(_)));
    }

    #[test]
    fn convert_malformed_input_line() {
        use super::convert_to_write;
        use super::ConvertOptions;
        use crate::error::ConvertError;

        let client = chr1_client(&[MAPPED_PAIR, "{\"fragmentName\":"]);
        let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };
        let mut got: Vec<u8> = Vec::new();

        assert!(matches!(convert_to_write(&client, options, &mut got), Err(ConvertError::Input(_))));
    }

    #[test]
    fn binary_round_trip_through_view() {
        use super::convert_to_write;
        use super::view_to_write;
        use super::ConvertOptions;
        use super::Format;
        use std::io::Cursor;

        let client = chr1_client(&[MAPPED_PAIR, FAR_READ]);

        let options = ConvertOptions { reference_id: "ref-1".to_string(), ..Default::default() };
        let mut expected: Vec<u8> = Vec::new();
        convert_to_write(&client, options, &mut expected).unwrap();

        let options = ConvertOptions { reference_id: "ref-1".to_string(), format: Format::Binary, ..Default::default() };
        let mut binary: Vec<u8> = Vec::new();
        convert_to_write(&client, options, &mut binary).unwrap();

        let mut got: Vec<u8> = Vec::new();
        let n_records = view_to_write(&mut Cursor::new(binary), &mut got).unwrap();

        assert_eq!(n_records, 2);
        assert_eq!(got, expected);
    }

    #[test]
    fn binary_rejects_long_tag_name() {
        use super::convert_to_write;
        use super::view_to_write;
        use super::ConvertOptions;
        use super::Format;
        use crate::error::ConvertError;
        use std::io::Cursor;

        let long_tag = r#"{"fragmentName":"r9","alignment":{"position":{"referenceName":"chr1","position":"300"},"cigar":[{"operation":"ALIGNMENT_MATCH","operationLength":"4"}]},"alignedSequence":"ACGT","attributes":{"attr":{"LONGTAG":{"values":[{"int32Value":1}]}}}}"#;
        let client = chr1_client(&[MAPPED_PAIR, long_tag]);

        let options = ConvertOptions { reference_id: "ref-1".to_string(), format: Format::Binary, ..Default::default() };
        let mut binary: Vec<u8> = Vec::new();
        let err = convert_to_write(&client, options, &mut binary).unwrap_err();

        assert!(matches!(err, ConvertError::MalformedRecord { ref fragment_name, .. } if fragment_name == "r9"));

        // only the complete records before the failing one were written
        let mut text: Vec<u8> = Vec::new();
        assert_eq!(view_to_write(&mut Cursor::new(binary), &mut text).unwrap(), 1);
    }

    #[test]
    fn format_from_str() {
        use super::Format;
        use std::str::FromStr;

        assert_eq!(Format::from_str("sam").unwrap(), Format::Sam);
        assert_eq!(Format::from_str("binary").unwrap(), Format::Binary);
        assert!(Format::from_str("bam").is_err());
    }
}
