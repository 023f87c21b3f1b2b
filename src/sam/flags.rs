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

//! Bitwise FLAG values of a SAM record.
//!
//! ```rust
//! use ga2sam::sam::flags;
//!
//! let flag = flags::set_flag(flags::READ_PAIRED, flags::FIRST_IN_PAIR);
//!
//! assert_eq!(flag, 0x41);
//! assert!(flags::is_flag_set(flag, flags::FIRST_IN_PAIR));
//! assert!(!flags::is_flag_set(flag, flags::READ_UNMAPPED));
//! ```
//!

pub const READ_PAIRED: u16 = 0x1;
pub const READ_PROPER_PAIR: u16 = 0x2;
pub const READ_UNMAPPED: u16 = 0x4;
pub const MATE_UNMAPPED: u16 = 0x8;
pub const READ_REVERSE_STRAND: u16 = 0x10;
pub const MATE_REVERSE_STRAND: u16 = 0x20;
pub const FIRST_IN_PAIR: u16 = 0x40;
pub const SECOND_IN_PAIR: u16 = 0x80;
pub const SECONDARY_ALIGNMENT: u16 = 0x100;
pub const FAILED_QUALITY_CHECK: u16 = 0x200;
pub const DUPLICATE_READ: u16 = 0x400;
pub const SUPPLEMENTARY_ALIGNMENT: u16 = 0x800;

pub const ALL_FLAGS: [u16; 12] = [
    READ_PAIRED, READ_PROPER_PAIR, READ_UNMAPPED, MATE_UNMAPPED,
    READ_REVERSE_STRAND, MATE_REVERSE_STRAND, FIRST_IN_PAIR, SECOND_IN_PAIR,
    SECONDARY_ALIGNMENT, FAILED_QUALITY_CHECK, DUPLICATE_READ, SUPPLEMENTARY_ALIGNMENT,
];

/// True if all bits of `flag` are set in `flags`.
pub const fn is_flag_set(flags: u16, flag: u16) -> bool {
    flags & flag == flag
}

/// Returns `flags` with the bits of `flag` set.
pub const fn set_flag(flags: u16, flag: u16) -> u16 {
    flags | flag
}
