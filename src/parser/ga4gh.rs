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
use std::io::BufRead;

use crate::protocol::AlignmentRecord;
use crate::protocol::ReferenceInfo;

type E = Box<dyn std::error::Error>;

/// Parse a line containing a GA4GH `ReadAlignment` as JSON.
///
/// Returns the [read](AlignmentRecord) on the line.
///
pub fn read_alignment(
    line: &str,
) -> Result<AlignmentRecord, E> {
    let record: AlignmentRecord = serde_json::from_str(line)?;
    Ok(record)
}

/// Parse a line containing a GA4GH `Reference` as JSON.
pub fn read_reference(
    line: &str,
) -> Result<ReferenceInfo, E> {
    let reference: ReferenceInfo = serde_json::from_str(line)?;
    Ok(reference)
}

/// Read all references from a JSON lines input.
///
/// Blank lines are skipped.
pub fn read_references<R: BufRead>(
    conn: R,
) -> Result<Vec<ReferenceInfo>, E> {
    let mut references: Vec<ReferenceInfo> = Vec::new();
    for line in conn.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        references.push(read_reference(&line)?);
    }
    Ok(references)
}
