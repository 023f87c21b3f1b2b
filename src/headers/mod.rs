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

//! Headers used in the binary output mode.
//!
//! A binary stream consists of three parts, in order:
//!
//! 1. A [FileHeader](file::FileHeader).
//! 2. The SAM header contents as a bincode encoded
//!    [HeaderDescription](crate::sam::header::HeaderDescription).
//! 3. The records. Each record is a little-endian u32 giving the length of
//!    the record in bytes, followed by the bincode encoded
//!    [SamRecord](crate::sam::SamRecord).
//!
//! ## FileHeader
//!
//! A FileHeader must contain this information:
//!
//! - Magic bytes `GA2SAMB1`.
//! - Version of the binary layout.
//! - Number of reference sequences in the SAM header.
//! - Length of the encoded HeaderDescription (bytes).
//!
//! In addition, the header contains an 8 byte placeholder that is currently
//! not used.
//!
//! An encoded FileHeader is always 32 bytes long and appears at the start of a
//! valid binary stream.
//!

pub mod file;
