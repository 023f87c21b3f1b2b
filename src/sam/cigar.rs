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

//! Conversion between GA4GH CIGAR operations and SAM operation codes.
//!
//! The position of an operation in [CIGAR_OPERATIONS] is its code in the
//! [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf) binary encoding:
//!
//! | code | op  | [CigarOperation]   |
//! |------|-----|--------------------|
//! | 0    | `M` | `AlignmentMatch`   |
//! | 1    | `I` | `Insert`           |
//! | 2    | `D` | `Delete`           |
//! | 3    | `N` | `Skip`             |
//! | 4    | `S` | `ClipSoft`         |
//! | 5    | `H` | `ClipHard`         |
//! | 6    | `P` | `Pad`              |
//! | 7    | `=` | `SequenceMatch`    |
//! | 8    | `X` | `SequenceMismatch` |
//!
use crate::error::ConvertError;
use crate::protocol::CigarOperation;
use crate::protocol::CigarUnit;

pub const CIGAR_OPERATIONS: [CigarOperation; 9] = [
    CigarOperation::AlignmentMatch,
    CigarOperation::Insert,
    CigarOperation::Delete,
    CigarOperation::Skip,
    CigarOperation::ClipSoft,
    CigarOperation::ClipHard,
    CigarOperation::Pad,
    CigarOperation::SequenceMatch,
    CigarOperation::SequenceMismatch,
];

/// Returns the SAM code of `op`.
pub fn operation_to_code(op: CigarOperation) -> u8 {
    match op {
        CigarOperation::AlignmentMatch => 0,
        CigarOperation::Insert => 1,
        CigarOperation::Delete => 2,
        CigarOperation::Skip => 3,
        CigarOperation::ClipSoft => 4,
        CigarOperation::ClipHard => 5,
        CigarOperation::Pad => 6,
        CigarOperation::SequenceMatch => 7,
        CigarOperation::SequenceMismatch => 8,
    }
}

/// Returns the operation for a SAM code.
///
/// Terminates with [ConvertError::MalformedCigarCode] if `code` is not in 0..=8.
///
pub fn code_to_operation(code: u8) -> Result<CigarOperation, ConvertError> {
    CIGAR_OPERATIONS.get(code as usize)
        .copied()
        .ok_or_else(|| ConvertError::MalformedCigarCode(code.to_string()))
}

/// SAM text character for a SAM code.
pub fn code_to_char(code: u8) -> Result<char, ConvertError> {
    let op = code_to_operation(code)?;
    Ok(match op {
        CigarOperation::AlignmentMatch => 'M',
        CigarOperation::Insert => 'I',
        CigarOperation::Delete => 'D',
        CigarOperation::Skip => 'N',
        CigarOperation::ClipSoft => 'S',
        CigarOperation::ClipHard => 'H',
        CigarOperation::Pad => 'P',
        CigarOperation::SequenceMatch => '=',
        CigarOperation::SequenceMismatch => 'X',
    })
}

/// True if `op` advances the position on the reference.
pub fn consumes_reference(op: CigarOperation) -> bool {
    matches!(op,
             CigarOperation::AlignmentMatch
             | CigarOperation::Delete
             | CigarOperation::Skip
             | CigarOperation::SequenceMatch
             | CigarOperation::SequenceMismatch)
}

/// Number of reference bases covered by `cigar`.
pub fn reference_span(cigar: &[CigarUnit]) -> i64 {
    cigar.iter()
         .filter(|unit| consumes_reference(unit.operation))
         .map(|unit| unit.operation_length.max(0))
         .fold(0_i64, |span, len| span.saturating_add(len))
}
