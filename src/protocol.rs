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

//! GA4GH read alignment and reference records.
//!
//! Field names follow the GA4GH JSON representation (camelCase) so that
//! records can be deserialized directly from the output of a reads search.
//! Fields that are missing from the input take their protobuf default.
//!
use bincode::{Encode, Decode};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::IgnoredAny;

use crate::error::ConvertError;

// protobuf writes 64-bit integers as JSON strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Deserializes an integer written either as a JSON number or as a numeric string.
fn number_or_string<'de, D, T>(
    deserializer: D,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(x) => Ok(x),
        NumberOrString::Text(x) => x.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Strand of a [Position].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Strand {
    #[default]
    #[serde(rename = "STRAND_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "NEG_STRAND")]
    Negative,
    #[serde(rename = "POS_STRAND")]
    Positive,
}

/// A 0-based position on a named reference sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub reference_name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub position: i64,
    pub strand: Strand,
}

impl Position {
    /// True if every field has its default value.
    ///
    /// A cleared position carries no placement and is treated as if the
    /// position was not given at all.
    pub fn is_cleared(&self) -> bool {
        *self == Position::default()
    }
}

/// Alignment operations that can appear in a GA4GH CIGAR.
///
/// See [crate::sam::cigar] for the SAM operation codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CigarOperation {
    AlignmentMatch,
    Insert,
    Delete,
    Skip,
    ClipSoft,
    ClipHard,
    Pad,
    SequenceMatch,
    SequenceMismatch,
}

impl std::str::FromStr for CigarOperation {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALIGNMENT_MATCH" => Ok(CigarOperation::AlignmentMatch),
            "INSERT" => Ok(CigarOperation::Insert),
            "DELETE" => Ok(CigarOperation::Delete),
            "SKIP" => Ok(CigarOperation::Skip),
            "CLIP_SOFT" => Ok(CigarOperation::ClipSoft),
            "CLIP_HARD" => Ok(CigarOperation::ClipHard),
            "PAD" => Ok(CigarOperation::Pad),
            "SEQUENCE_MATCH" => Ok(CigarOperation::SequenceMatch),
            "SEQUENCE_MISMATCH" => Ok(CigarOperation::SequenceMismatch),
            _ => Err(ConvertError::MalformedCigarCode(s.to_string())),
        }
    }
}

impl TryFrom<String> for CigarOperation {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single CIGAR operation and its length.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CigarUnit {
    pub operation: CigarOperation,
    #[serde(default, deserialize_with = "number_or_string")]
    pub operation_length: i64,
}

/// Placement of a read on a reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinearAlignment {
    pub position: Position,
    pub mapping_quality: i32,
    pub cigar: Vec<CigarUnit>,
}

/// A typed value in a read's attributes.
///
/// Encodes in the GA4GH JSON form, eg. `{"int32Value": 0}`.
#[derive(Clone, Debug, PartialEq, Deserialize, Encode, Decode)]
pub enum AttributeValue {
    #[serde(rename = "int32Value", alias = "int64Value", deserialize_with = "number_or_string")]
    Int(i64),
    #[serde(rename = "doubleValue", alias = "floatValue")]
    Float(f64),
    #[serde(rename = "stringValue")]
    Text(String),
    /// Written to SAM as the integer 0 or 1.
    #[serde(rename = "boolValue")]
    Bool(bool),
}

impl AttributeValue {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, AttributeValue::Text(_))
    }

    /// The value as an integer if it is one, with booleans as 0 or 1.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(x) => Some(*x),
            AttributeValue::Bool(x) => Some(i64::from(*x)),
            _ => None,
        }
    }
}

// Values of other kinds (ontology terms, nested attributes, ...) have no SAM
// representation.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnyAttributeValue {
    Supported(AttributeValue),
    Unsupported(IgnoredAny),
}

/// Deserializes the values of an attribute, dropping the kinds SAM can't store.
fn supported_values<'de, D>(
    deserializer: D,
) -> Result<Vec<AttributeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<AnyAttributeValue>::deserialize(deserializer)?;
    let n_values = values.len();
    let supported: Vec<AttributeValue> = values.into_iter().filter_map(|value| match value {
        AnyAttributeValue::Supported(value) => Some(value),
        AnyAttributeValue::Unsupported(_) => None,
    }).collect();
    if supported.len() < n_values {
        log::debug!("Dropping {} attribute value(s) with no SAM type", n_values - supported.len());
    }
    Ok(supported)
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AttributeValue::Int(x) => write!(f, "{}", x),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Text(x) => write!(f, "{}", x),
            AttributeValue::Bool(x) => write!(f, "{}", i64::from(*x)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttributeValueList {
    #[serde(deserialize_with = "supported_values")]
    pub values: Vec<AttributeValue>,
}

/// Tag name to values, in input order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub attr: IndexMap<String, AttributeValueList>,
}

/// A GA4GH read alignment.
///
/// `read_number` is -1 for reads that are not part of a numbered pair, 0 for
/// the first read and 1 for the second read.
///
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignmentRecord {
    pub id: String,
    pub read_group_id: String,
    pub fragment_name: String,
    pub improper_placement: bool,
    pub duplicate_fragment: bool,
    pub number_reads: i32,
    #[serde(deserialize_with = "number_or_string")]
    pub fragment_length: i64,
    pub read_number: i32,
    pub failed_vendor_quality_checks: bool,
    /// Absent if the read is unmapped.
    pub alignment: Option<LinearAlignment>,
    pub secondary_alignment: bool,
    pub supplementary_alignment: bool,
    pub aligned_sequence: String,
    pub aligned_quality: Vec<i32>,
    pub next_mate_position: Option<Position>,
    pub attributes: Attributes,
}

impl AlignmentRecord {
    /// Placement of the mate, or None if it is absent or cleared.
    pub fn mate_position(&self) -> Option<&Position> {
        self.next_mate_position.as_ref().filter(|pos| !pos.is_cleared())
    }
}

/// Name and length of a reference sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReferenceInfo {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub length: u64,
}
