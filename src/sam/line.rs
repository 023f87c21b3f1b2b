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

//! Conversion of a single [AlignmentRecord] into a [SamRecord].
//!
//! ## Usage
//!
//! ```rust
//! use ga2sam::protocol::{AlignmentRecord, CigarOperation, CigarUnit, LinearAlignment, Position, ReferenceInfo};
//! use ga2sam::sam::header::build_header;
//! use ga2sam::sam::line::to_sam_record;
//!
//! let reference = ReferenceInfo { id: "1".to_string(), name: "chr1".to_string(), length: 1000 };
//! let (_header, target_ids) = build_header(&reference).unwrap();
//!
//! let read = AlignmentRecord {
//!     fragment_name: "r1".to_string(),
//!     aligned_sequence: "ACGT".to_string(),
//!     number_reads: 2,
//!     read_number: 0,
//!     fragment_length: 150,
//!     alignment: Some(LinearAlignment {
//!         position: Position { reference_name: "chr1".to_string(), position: 100, ..Default::default() },
//!         mapping_quality: 60,
//!         cigar: vec![CigarUnit { operation: CigarOperation::AlignmentMatch, operation_length: 4 }],
//!     }),
//!     next_mate_position: Some(Position { reference_name: "chr1".to_string(), position: 200, ..Default::default() }),
//!     ..Default::default()
//! };
//!
//! let record = to_sam_record(&read, &target_ids).unwrap();
//!
//! assert_eq!(record.flag, 0x43);
//! assert_eq!(record.reference_id, 0);
//! assert_eq!(record.reference_start, 100);
//! assert_eq!(record.cigar, vec![(0, 4)]);
//! assert_eq!(record.next_reference_start, 200);
//! ```
//!
use crate::error::ConvertError;
use crate::protocol::AlignmentRecord;
use crate::protocol::AttributeValue;
use crate::protocol::Strand;
use crate::sam::cigar::operation_to_code;
use crate::sam::flags;
use crate::sam::header::TargetIds;
use crate::sam::SamRecord;
use crate::sam::TagValue;
use crate::sam::UNMAPPED_REFERENCE_ID;

// Highest Phred score that fits in SAM QUAL
const MAX_BASE_QUALITY: i32 = 93;

// CIGAR operation lengths are stored in 28 bits
const MAX_CIGAR_OP_LENGTH: u32 = (1 << 28) - 1;

/// What to do with a reference name that is not in the header.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownReferencePolicy {
    /// Return [ConvertError::UnknownReference].
    #[default]
    Fail,
    /// Use [UNMAPPED_REFERENCE_ID] for the reference id.
    Unmapped,
}

impl std::str::FromStr for UnknownReferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(UnknownReferencePolicy::Fail),
            "unmapped" => Ok(UnknownReferencePolicy::Unmapped),
            _ => Err(format!("'{}' is not a valid UnknownReferencePolicy", s)),
        }
    }
}

/// Converts `read` to a [SamRecord].
///
/// Fails with [ConvertError::UnknownReference] if `read` or its mate is
/// placed on a reference that is not in `target_ids`.
///
pub fn to_sam_record(
    read: &AlignmentRecord,
    target_ids: &TargetIds,
) -> Result<SamRecord, ConvertError> {
    to_sam_record_with_policy(read, target_ids, UnknownReferencePolicy::Fail)
}

/// Converts `read` to a [SamRecord], resolving unknown reference names with `policy`.
///
/// Terminates with [ConvertError::MalformedRecord] if a mapping quality,
/// base quality, or CIGAR length can't be stored in SAM.
///
pub fn to_sam_record_with_policy(
    read: &AlignmentRecord,
    target_ids: &TargetIds,
    policy: UnknownReferencePolicy,
) -> Result<SamRecord, ConvertError> {
    let mut record = SamRecord {
        query_name: read.fragment_name.clone(),
        flag: to_sam_flag(read),
        template_length: read.fragment_length,
        query_sequence: read.aligned_sequence.clone(),
        query_qualities: to_qualities(read)?,
        cigar: to_cigar(read)?,
        tags: to_tags(read)?,
        ..Default::default()
    };

    // RNAME, POS, MAPQ
    if let Some(alignment) = &read.alignment {
        record.reference_id = lookup_target_id(target_ids, &alignment.position.reference_name, policy)?;
        record.reference_start = alignment.position.position;
        record.mapping_quality = u8::try_from(alignment.mapping_quality).map_err(|_| {
            ConvertError::malformed_record(&read.fragment_name, format!("mapping quality {} is out of range", alignment.mapping_quality))
        })?;
    } else {
        record.reference_id = UNMAPPED_REFERENCE_ID;
        record.reference_start = 0;
    }

    // RNEXT, PNEXT
    if let Some(mate) = read.mate_position() {
        record.next_reference_id = lookup_target_id(target_ids, &mate.reference_name, policy)?;
        record.next_reference_start = mate.position;
    } else {
        record.next_reference_id = -1;
        record.next_reference_start = -1;
    }

    Ok(record)
}

fn lookup_target_id(
    target_ids: &TargetIds,
    reference_name: &str,
    policy: UnknownReferencePolicy,
) -> Result<i32, ConvertError> {
    match (target_ids.get(reference_name), policy) {
        (Some(id), _) => Ok(id as i32),
        (None, UnknownReferencePolicy::Fail) => Err(ConvertError::UnknownReference(reference_name.to_string())),
        (None, UnknownReferencePolicy::Unmapped) => {
            log::debug!("Reference '{}' is not in the header, marking as unmapped", reference_name);
            Ok(UNMAPPED_REFERENCE_ID)
        },
    }
}

/// Computes the FLAG field of `read`.
///
/// Based on the GA4GH to SAM mapping in
/// <https://github.com/googlegenomics/readthedocs/blob/master/docs/source/migrating_tips.rst>.
///
/// A `read_number` other than -1, 0, or 1 sets both FIRST_IN_PAIR and
/// SECOND_IN_PAIR.
///
pub fn to_sam_flag(read: &AlignmentRecord) -> u16 {
    let mut flag: u16 = 0;
    if read.number_reads == 2 {
        flag = flags::set_flag(flag, flags::READ_PAIRED);
    }
    if !read.improper_placement {
        flag = flags::set_flag(flag, flags::READ_PROPER_PAIR);
    }
    if read.alignment.is_none() {
        flag = flags::set_flag(flag, flags::READ_UNMAPPED);
    }
    if read.mate_position().is_none() {
        flag = flags::set_flag(flag, flags::MATE_UNMAPPED);
    }
    if read.alignment.as_ref().is_some_and(|aln| aln.position.strand == Strand::Negative) {
        flag = flags::set_flag(flag, flags::READ_REVERSE_STRAND);
    }
    if read.mate_position().is_some_and(|mate| mate.strand == Strand::Negative) {
        flag = flags::set_flag(flag, flags::MATE_REVERSE_STRAND);
    }
    flag = match read.read_number {
        -1 => flag,
        0 => flags::set_flag(flag, flags::FIRST_IN_PAIR),
        1 => flags::set_flag(flag, flags::SECOND_IN_PAIR),
        _ => flags::set_flag(flag, flags::FIRST_IN_PAIR | flags::SECOND_IN_PAIR),
    };
    if read.secondary_alignment {
        flag = flags::set_flag(flag, flags::SECONDARY_ALIGNMENT);
    }
    if read.failed_vendor_quality_checks {
        flag = flags::set_flag(flag, flags::FAILED_QUALITY_CHECK);
    }
    if read.duplicate_fragment {
        flag = flags::set_flag(flag, flags::DUPLICATE_READ);
    }
    if read.supplementary_alignment {
        flag = flags::set_flag(flag, flags::SUPPLEMENTARY_ALIGNMENT);
    }
    flag
}

/// Converts the CIGAR of `read` to (code, length) pairs in input order.
///
/// Unmapped reads have an empty CIGAR.
pub fn to_cigar(read: &AlignmentRecord) -> Result<Vec<(u8, u32)>, ConvertError> {
    let Some(alignment) = &read.alignment else {
        return Ok(Vec::new());
    };

    alignment.cigar.iter().map(|unit| {
        let length = u32::try_from(unit.operation_length).ok()
            .filter(|length| *length <= MAX_CIGAR_OP_LENGTH)
            .ok_or_else(|| {
                ConvertError::malformed_record(&read.fragment_name, format!("CIGAR operation length {} is out of range", unit.operation_length))
            })?;
        Ok((operation_to_code(unit.operation), length))
    }).collect()
}

fn to_qualities(read: &AlignmentRecord) -> Result<Vec<u8>, ConvertError> {
    read.aligned_quality.iter().map(|qual| {
        if (0..=MAX_BASE_QUALITY).contains(qual) {
            Ok(*qual as u8)
        } else {
            Err(ConvertError::malformed_record(&read.fragment_name, format!("base quality {} is out of range", qual)))
        }
    }).collect()
}

/// Converts the values of a single attribute to a tag value.
///
/// More than one value is kept as is. A single numeric value is returned as
/// a number and anything else as text. Returns None if `values` is empty.
///
pub fn parse_tag_value(values: &[AttributeValue]) -> Option<TagValue> {
    match values {
        [] => None,
        [AttributeValue::Int(x)] => Some(TagValue::Int(*x)),
        [AttributeValue::Float(x)] => Some(TagValue::Float(*x)),
        [AttributeValue::Bool(x)] => Some(TagValue::Int(i64::from(*x))),
        [value] => Some(TagValue::Text(value.to_string())),
        _ => Some(TagValue::Multi(values.to_vec())),
    }
}

/// Converts the attributes of `read` to optional fields in input order.
///
/// Attributes without values are dropped.
///
/// Terminates with [ConvertError::MalformedRecord] if a tag name is not two
/// ASCII characters.
///
pub fn to_tags(read: &AlignmentRecord) -> Result<Vec<(String, TagValue)>, ConvertError> {
    let mut tags: Vec<(String, TagValue)> = Vec::with_capacity(read.attributes.attr.len());
    for (tag, values) in &read.attributes.attr {
        if tag.len() != 2 || !tag.is_ascii() {
            return Err(ConvertError::malformed_record(&read.fragment_name, format!("tag '{}' is not two characters", tag)));
        }
        match parse_tag_value(&values.values) {
            Some(value) => tags.push((tag.clone(), value)),
            None => log::debug!("Dropping attribute '{}' of '{}' with no values", tag, read.fragment_name),
        }
    }
    Ok(tags)
}
