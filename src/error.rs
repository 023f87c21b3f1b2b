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

//! Errors returned by the conversion.
//!
//! None of the errors are recovered from inside ga2sam. They are returned to
//! the caller of [SamConverter::convert](crate::SamConverter::convert), which
//! decides whether to abort or skip.

/// Something that went wrong while converting reads to SAM.
#[derive(Debug)]
pub enum ConvertError {
    /// Reference metadata is missing or unusable.
    Configuration(String),
    /// A record references a sequence that is not in the header.
    UnknownReference(String),
    /// A CIGAR operation name or code outside the nine SAM operations.
    MalformedCigarCode(String),
    /// A field in a record can't be represented in SAM.
    MalformedRecord {
        fragment_name: String,
        reason: String,
    },
    /// Reads could not be fetched or parsed.
    Input(Box<dyn std::error::Error>),
    /// The output could not accept a record.
    Sink(Box<dyn std::error::Error>),
}

impl ConvertError {
    pub fn malformed_record(
        fragment_name: &str,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::MalformedRecord { fragment_name: fragment_name.to_string(), reason: reason.into() }
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConvertError::Configuration(msg) => write!(f, "invalid reference configuration: {}", msg),
            ConvertError::UnknownReference(name) => write!(f, "reference '{}' is not in the header", name),
            ConvertError::MalformedCigarCode(code) => write!(f, "'{}' is not a valid CIGAR operation", code),
            ConvertError::MalformedRecord { fragment_name, reason } => write!(f, "malformed record '{}': {}", fragment_name, reason),
            ConvertError::Input(err) => write!(f, "could not read input: {}", err),
            ConvertError::Sink(err) => write!(f, "could not write output: {}", err),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Input(err) | ConvertError::Sink(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
