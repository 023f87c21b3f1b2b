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

use bstr::BString;
use indexmap::map::IndexMap;
use noodles_sam::{
    self as sam,
    alignment::io::Write as AlignmentWrite,
    alignment::record::cigar::{op::Kind, Op},
    alignment::record::data::field::Tag,
    alignment::record::{Flags, MappingQuality},
    alignment::record_buf::data::field::{value::Array, Value},
    alignment::record_buf::{Cigar, Data, QualityScores, RecordBuf, Sequence},
    header::record::value::{map::{self, header::Version, ReferenceSequence}, Map},
};

use crate::protocol::AttributeValue;
use crate::protocol::CigarOperation;
use crate::sam::cigar::code_to_operation;
use crate::sam::header::HeaderDescription;
use crate::sam::SamRecord;
use crate::sam::TagValue;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct SamPrinterError {
    reason: String,
}

impl std::fmt::Display for SamPrinterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "invalid input to format as SAM: {}", self.reason)
    }
}

impl std::error::Error for SamPrinterError {}

fn printer_error(reason: String) -> E {
    Box::new(SamPrinterError{ reason })
}

/// Builds a [sam::Header] from the header contents.
///
/// Terminates with a [SamPrinterError] if `header.version` is not of the
/// form `major.minor`.
///
pub fn build_sam_header(
    header: &HeaderDescription,
) -> Result<sam::Header, E> {
    let (major, minor) = header.version.split_once('.')
        .ok_or_else(|| printer_error(format!("version '{}' is not major.minor", header.version)))?;
    let hd = Map::<map::Header>::builder()
        .set_version(Version::new(major.parse()?, minor.parse()?))
        .build()?;

    let mut refs: IndexMap<BString, Map<ReferenceSequence>> = IndexMap::new();
    for seq in &header.reference_sequences {
        let length = std::num::NonZeroUsize::try_from(seq.length as usize)?;
        refs.insert(BString::from(seq.name.clone()), Map::<ReferenceSequence>::new(length));
    }

    Ok(
        sam::Header::builder()
            .set_header(hd)
            .set_reference_sequences(refs)
            .build()
    )
}

/// Writes the @HD and @SQ lines of `header` to `conn`.
pub fn format_sam_header<W: Write>(
    header: &sam::Header,
    conn: &mut W,
) -> Result<(), E> {
    let mut writer = sam::io::Writer::new(conn);
    writer.write_header(header)?;
    Ok(())
}

fn to_kind(code: u8) -> Result<Kind, E> {
    Ok(match code_to_operation(code)? {
        CigarOperation::AlignmentMatch => Kind::Match,
        CigarOperation::Insert => Kind::Insertion,
        CigarOperation::Delete => Kind::Deletion,
        CigarOperation::Skip => Kind::Skip,
        CigarOperation::ClipSoft => Kind::SoftClip,
        CigarOperation::ClipHard => Kind::HardClip,
        CigarOperation::Pad => Kind::Pad,
        CigarOperation::SequenceMatch => Kind::SequenceMatch,
        CigarOperation::SequenceMismatch => Kind::SequenceMismatch,
    })
}

fn to_tag(name: &str) -> Result<Tag, E> {
    match name.as_bytes() {
        [a, b] => Ok(Tag::from([*a, *b])),
        _ => Err(printer_error(format!("tag '{}' is not two characters", name))),
    }
}

fn int_value(x: i64) -> Value {
    if let Ok(x) = i32::try_from(x) {
        Value::Int32(x)
    } else if let Ok(x) = u32::try_from(x) {
        Value::UInt32(x)
    } else {
        Value::String(BString::from(x.to_string()))
    }
}

/// Converts a tag value to a SAM optional field value.
///
/// Multiple values are stored in a `B` array if all are integers that fit in
/// 32 bits (`B:i`, or `B:I` if some only fit unsigned), or if all are numbers
/// and every integer among them fits in `B:i` (`B:f`). Otherwise the values
/// are joined with ',' into a `Z` string.
///
pub fn to_field_value(value: &TagValue) -> Value {
    match value {
        TagValue::Int(x) => int_value(*x),
        TagValue::Float(x) => Value::Float(*x as f32),
        TagValue::Text(x) => Value::String(BString::from(x.as_str())),
        TagValue::Multi(values) => {
            let ints = values.iter().map(|value| value.as_int()).collect::<Option<Vec<i64>>>();
            if let Some(ints) = ints {
                if let Ok(x) = ints.iter().map(|x| i32::try_from(*x)).collect::<Result<Vec<i32>, _>>() {
                    return Value::Array(Array::Int32(x))
                }
                if let Ok(x) = ints.iter().map(|x| u32::try_from(*x)).collect::<Result<Vec<u32>, _>>() {
                    return Value::Array(Array::UInt32(x))
                }
            } else {
                let floats = values.iter().map(|value| match value {
                    AttributeValue::Float(x) => Some(*x as f32),
                    AttributeValue::Text(_) => None,
                    _ => value.as_int().and_then(|x| i32::try_from(x).ok()).map(|x| x as f32),
                }).collect::<Option<Vec<f32>>>();
                if let Some(floats) = floats {
                    return Value::Array(Array::Float(floats))
                }
            }
            let joined = values.iter().map(|value| value.to_string()).collect::<Vec<String>>().join(",");
            Value::String(BString::from(joined))
        },
    }
}

/// Converts `record` to a noodles [RecordBuf].
///
/// 0-based positions are converted to 1-based. A mate position of -1 and
/// reference ids of -1 are left empty.
///
/// Terminates with a [SamPrinterError] if a tag name is not two characters,
/// or with a conversion error if a position or template length does not fit
/// in SAM.
///
pub fn to_record_buf(
    record: &SamRecord,
) -> Result<RecordBuf, E> {
    let cigar = record.cigar.iter().map(|(code, len)| {
        Ok(Op::new(to_kind(*code)?, *len as usize))
    }).collect::<Result<Cigar, E>>()?;

    let mut data = Data::default();
    for (name, value) in &record.tags {
        data.insert(to_tag(name)?, to_field_value(value));
    }

    let mut builder = RecordBuf::builder();
    if !record.query_name.is_empty() {
        builder = builder.set_name(record.query_name.clone());
    }
    let mut buf = builder
        .set_flags(Flags::from(record.flag))
        .set_cigar(cigar)
        .set_template_length(i32::try_from(record.template_length)?)
        .set_sequence(Sequence::from(record.query_sequence.as_bytes().to_vec()))
        .set_quality_scores(QualityScores::from(record.query_qualities.clone()))
        .set_data(data)
        .build();

    // RNAME, POS, MAPQ
    if record.reference_id >= 0 {
        *buf.reference_sequence_id_mut() = Some(record.reference_id as usize);
    }
    *buf.alignment_start_mut() = Some(usize::try_from(record.reference_start + 1)?.try_into()?);
    *buf.mapping_quality_mut() = MappingQuality::new(record.mapping_quality);

    // RNEXT, PNEXT
    if record.next_reference_id >= 0 {
        *buf.mate_reference_sequence_id_mut() = Some(record.next_reference_id as usize);
    }
    if record.next_reference_start >= 0 {
        *buf.mate_alignment_start_mut() = Some(usize::try_from(record.next_reference_start + 1)?.try_into()?);
    }

    Ok(buf)
}

/// Format a single record in SAM format
///
/// Writes bytes containing the formatted line containing the contents of
/// `record` to `conn`.
///
pub fn format_sam_line<W: Write>(
    record: &SamRecord,
    header: &sam::Header,
    conn: &mut W,
) -> Result<(), E> {
    let buf = to_record_buf(record)?;
    let mut writer = sam::io::Writer::new(conn);
    writer.write_alignment_record(header, &buf)?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {
    use crate::sam::header::HeaderDescription;
    use crate::sam::header::ReferenceSequence;
    use crate::sam::SamRecord;

    fn chr1_header() -> HeaderDescription {
        HeaderDescription {
            version: "1.0".to_string(),
            reference_sequences: vec![ReferenceSequence { name: "chr1".to_string(), length: 1000 }],
        }
    }

    #[test]
    fn format_sam_header_single_reference() {
        use super::build_sam_header;
        use super::format_sam_header;

        let expected: Vec<u8> = b"@HD\tVN:1.0\n@SQ\tSN:chr1\tLN:1000\n".to_vec();

        let header = build_sam_header(&chr1_header()).unwrap();
        let mut got: Vec<u8> = Vec::new();
        format_sam_header(&header, &mut got).unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn format_sam_line_mapped() {
        use super::build_sam_header;
        use super::format_sam_line;
        use crate::sam::TagValue;

        let record = SamRecord {
            query_name: "r1".to_string(),
            flag: 0x43,
            reference_id: 0,
            reference_start: 100,
            mapping_quality: 60,
            cigar: vec![(4, 1), (0, 3)],
            next_reference_id: 0,
            next_reference_start: 200,
            template_length: 150,
            query_sequence: "ACGT".to_string(),
            query_qualities: vec![30, 30, 30, 40],
            tags: vec![("NM".to_string(), TagValue::Int(0)), ("MD".to_string(), TagValue::Text("3".to_string()))],
        };

        let header = build_sam_header(&chr1_header()).unwrap();
        let mut got: Vec<u8> = Vec::new();
        format_sam_line(&record, &header, &mut got).unwrap();
        let line = String::from_utf8(got).unwrap();
        let fields: Vec<&str> = line.trim_end().split('\t').collect();

        assert!(line.ends_with('\n'));
        assert_eq!(fields[0], "r1");
        assert_eq!(fields[1], "67");
        assert_eq!(fields[2], "chr1");
        assert_eq!(fields[3], "101");
        assert_eq!(fields[4], "60");
        assert_eq!(fields[5], "1S3M");
        assert_eq!(fields[7], "201");
        assert_eq!(fields[8], "150");
        assert_eq!(fields[9], "ACGT");
        assert_eq!(fields[10], "???I");
        assert_eq!(&fields[11..], &["NM:i:0", "MD:Z:3"]);
    }

    #[test]
    fn format_sam_line_unmapped() {
        use super::build_sam_header;
        use super::format_sam_line;
        use crate::sam::UNMAPPED_REFERENCE_ID;

        let record = SamRecord {
            query_name: "u1".to_string(),
            flag: 0x4 | 0x8,
            reference_id: UNMAPPED_REFERENCE_ID,
            reference_start: 0,
            next_reference_id: -1,
            next_reference_start: -1,
            query_sequence: "ACGT".to_string(),
            ..Default::default()
        };

        let header = build_sam_header(&chr1_header()).unwrap();
        let mut got: Vec<u8> = Vec::new();
        format_sam_line(&record, &header, &mut got).unwrap();
        let line = String::from_utf8(got).unwrap();
        let fields: Vec<&str> = line.trim_end().split('\t').collect();

        assert_eq!(fields[1], "12");
        assert_eq!(fields[2], "*");
        assert_eq!(fields[3], "1");
        assert_eq!(fields[5], "*");
        assert_eq!(fields[6], "*");
        assert_eq!(fields[7], "0");
    }

    #[test]
    fn format_sam_line_bad_tag_name() {
        use super::build_sam_header;
        use super::format_sam_line;
        use crate::sam::TagValue;

        let record = SamRecord {
            query_name: "r1".to_string(),
            reference_id: -1,
            next_reference_id: -1,
            next_reference_start: -1,
            tags: vec![("LONG".to_string(), TagValue::Int(1))],
            ..Default::default()
        };

        let header = build_sam_header(&chr1_header()).unwrap();
        let mut got: Vec<u8> = Vec::new();

        assert!(format_sam_line(&record, &header, &mut got).is_err());
        assert!(got.is_empty());
    }

    #[test]
    fn to_field_value_multi() {
        use super::to_field_value;
        use crate::protocol::AttributeValue;
        use crate::sam::TagValue;
        use bstr::BString;
        use noodles_sam::alignment::record_buf::data::field::{value::Array, Value};

        let ints = TagValue::Multi(vec![AttributeValue::Int(1), AttributeValue::Int(-2)]);
        let numbers = TagValue::Multi(vec![AttributeValue::Int(1), AttributeValue::Float(0.5)]);
        let mixed = TagValue::Multi(vec![AttributeValue::Text("a".to_string()), AttributeValue::Int(3)]);

        assert_eq!(to_field_value(&ints), Value::Array(Array::Int32(vec![1, -2])));
        assert_eq!(to_field_value(&numbers), Value::Array(Array::Float(vec![1.0, 0.5])));
        assert_eq!(to_field_value(&mixed), Value::String(BString::from("a,3")));
    }

    #[test]
    fn to_field_value_multi_wide_ints() {
        use super::to_field_value;
        use crate::protocol::AttributeValue;
        use crate::sam::TagValue;
        use bstr::BString;
        use noodles_sam::alignment::record_buf::data::field::{value::Array, Value};

        let unsigned = TagValue::Multi(vec![AttributeValue::Int(1), AttributeValue::Int(4000000000)]);
        let too_wide = TagValue::Multi(vec![AttributeValue::Int(-1), AttributeValue::Int(4000000000)]);
        let wide_with_float = TagValue::Multi(vec![AttributeValue::Int(5000000000), AttributeValue::Float(0.5)]);
        let bools = TagValue::Multi(vec![AttributeValue::Bool(true), AttributeValue::Bool(false)]);

        assert_eq!(to_field_value(&unsigned), Value::Array(Array::UInt32(vec![1, 4000000000])));
        assert_eq!(to_field_value(&too_wide), Value::String(BString::from("-1,4000000000")));
        assert_eq!(to_field_value(&wide_with_float), Value::String(BString::from("5000000000,0.5")));
        assert_eq!(to_field_value(&bools), Value::Array(Array::Int32(vec![1, 0])));
    }
}
