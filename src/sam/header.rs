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

//! SAM header contents and the target id table.
//!
//! The header is kept independent of the output format. It is turned into a
//! [noodles_sam::Header] or into bytes by the [printer](crate::printer).
//!
//! ```rust
//! use ga2sam::protocol::ReferenceInfo;
//! use ga2sam::sam::header::build_header;
//!
//! let reference = ReferenceInfo { id: "ref-1".to_string(), name: "chr1".to_string(), length: 1000 };
//! let (header, target_ids) = build_header(&reference).unwrap();
//!
//! assert_eq!(header.version, "1.0");
//! assert_eq!(target_ids.get("chr1"), Some(0));
//! assert_eq!(target_ids.get("chr2"), None);
//! ```
//!
use bincode::{Encode, Decode};
use indexmap::IndexSet;

use crate::error::ConvertError;
use crate::protocol::ReferenceInfo;

/// Value of the VN field in the @HD line.
pub const SAM_VERSION: &str = "1.0";

// Largest LN accepted by SAM
const MAX_REFERENCE_LENGTH: u64 = i32::MAX as u64;

/// An @SQ line.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct ReferenceSequence {
    pub name: String,
    pub length: u64,
}

/// Contents of a SAM header.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct HeaderDescription {
    pub version: String,
    pub reference_sequences: Vec<ReferenceSequence>,
}

/// Reference sequence names and their target ids.
///
/// The target id of a reference is its index in the @SQ lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetIds {
    names: IndexSet<String>,
}

impl TargetIds {
    pub fn from_header(
        header: &HeaderDescription,
    ) -> Self {
        let names = header.reference_sequences.iter()
                                              .map(|seq| seq.name.clone())
                                              .collect::<IndexSet<String>>();
        TargetIds { names }
    }

    /// Target id of `name`, or None if `name` is not in the header.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Builds the header for a set of references.
///
/// Target ids are assigned in the order of `references`.
///
/// Terminates with [ConvertError::Configuration] if `references` is empty,
/// contains a reference with no name, a reference length outside the range
/// allowed by SAM, or the same name twice.
///
pub fn build_header_for_references(
    references: &[ReferenceInfo],
) -> Result<(HeaderDescription, TargetIds), ConvertError> {
    if references.is_empty() {
        return Err(ConvertError::Configuration("no reference sequences".to_string()));
    }

    let mut reference_sequences: Vec<ReferenceSequence> = Vec::with_capacity(references.len());
    for reference in references {
        if reference.name.is_empty() {
            return Err(ConvertError::Configuration(format!("reference '{}' has no name", reference.id)));
        }
        if reference.length == 0 || reference.length > MAX_REFERENCE_LENGTH {
            return Err(ConvertError::Configuration(format!("reference '{}' has invalid length {}", reference.name, reference.length)));
        }
        if reference_sequences.iter().any(|seq| seq.name == reference.name) {
            return Err(ConvertError::Configuration(format!("reference '{}' is listed twice", reference.name)));
        }
        reference_sequences.push(ReferenceSequence { name: reference.name.clone(), length: reference.length });
    }

    let header = HeaderDescription { version: SAM_VERSION.to_string(), reference_sequences };
    let target_ids = TargetIds::from_header(&header);

    log::info!("Built header with {} reference sequence(s)", target_ids.len());

    Ok((header, target_ids))
}

/// Builds the header for a single reference.
pub fn build_header(
    reference: &ReferenceInfo,
) -> Result<(HeaderDescription, TargetIds), ConvertError> {
    build_header_for_references(std::slice::from_ref(reference))
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn build_header_single_reference() {
        use super::build_header;
        use super::HeaderDescription;
        use super::ReferenceSequence;
        use crate::protocol::ReferenceInfo;

        let reference = ReferenceInfo { id: "hg38-chr1".to_string(), name: "chr1".to_string(), length: 1000 };
        let expected = HeaderDescription {
            version: "1.0".to_string(),
            reference_sequences: vec![ReferenceSequence { name: "chr1".to_string(), length: 1000 }],
        };

        let (got, target_ids) = build_header(&reference).unwrap();

        assert_eq!(got, expected);
        assert_eq!(target_ids.get("chr1"), Some(0));
        assert_eq!(target_ids.len(), 1);
    }

    #[test]
    fn target_ids_follow_header_order() {
        use super::build_header_for_references;
        use crate::protocol::ReferenceInfo;

        let references = vec![
            ReferenceInfo { id: "a".to_string(), name: "OZ038621.1".to_string(), length: 5000 },
            ReferenceInfo { id: "b".to_string(), name: "OZ038622.1".to_string(), length: 100 },
            ReferenceInfo { id: "c".to_string(), name: "chrM".to_string(), length: 16569 },
        ];

        let (_, target_ids) = build_header_for_references(&references).unwrap();

        assert_eq!(target_ids.get("OZ038621.1"), Some(0));
        assert_eq!(target_ids.get("OZ038622.1"), Some(1));
        assert_eq!(target_ids.get("chrM"), Some(2));
    }

    #[test]
    fn build_header_rejects_malformed_reference() {
        use super::build_header;
        use super::build_header_for_references;
        use crate::error::ConvertError;
        use crate::protocol::ReferenceInfo;

        let no_name = ReferenceInfo { id: "x".to_string(), name: String::new(), length: 10 };
        let no_length = ReferenceInfo { id: "y".to_string(), name: "chr1".to_string(), length: 0 };

        assert!(matches!(build_header(&no_name), Err(ConvertError::Configuration(_))));
        assert!(matches!(build_header(&no_length), Err(ConvertError::Configuration(_))));
        assert!(matches!(build_header_for_references(&[]), Err(ConvertError::Configuration(_))));
    }
}
