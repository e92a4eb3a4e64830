//! Error handling.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt};
use crate::ident::Tag;
use crate::source::Pos;


//------------ Error ---------------------------------------------------------

/// An error happened while transcoding a value.
///
/// The error combines the condition that was detected, available via
/// [`kind`][Self::kind], with the position in the input at which it was
/// detected, available via [`pos`][Self::pos].
///
/// Transcoding aborts on the first error and produces no output. Since the
/// transform is a pure function of its input, retrying with the same input
/// is pointless: any error means the input is not acceptable BER.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Error {
    /// The condition that was detected.
    kind: ErrorKind,

    /// Where in the input it was detected.
    pos: Pos,
}

impl Error {
    /// Creates a new error from a kind and a position.
    pub(crate) fn new(kind: ErrorKind, pos: Pos) -> Self {
        Self { kind, pos }
    }

    /// Returns the condition that was detected.
    pub fn kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns the position in the input at which the error was detected.
    pub fn pos(self) -> Pos {
        self.pos
    }
}


//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.pos)
    }
}

impl error::Error for Error { }


//------------ ErrorKind -----------------------------------------------------

/// The conditions under which transcoding fails.
///
/// This is a closed set: every way in which input can be rejected is one
/// of these variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The input ended before a tag, length, or value was complete.
    Truncated,

    /// A tag number was encoded in a redundant high tag number form.
    ///
    /// Either the number would have fit the single octet form, or the
    /// multiple octet form started with an all-zero leading group. Both
    /// are forbidden by X.690, clause 8.1.2.4.2.
    RedundantTag,

    /// A tag number needs more than 31 bits.
    TagOverflow,

    /// A value uses the indefinite length form.
    ///
    /// The transcoder only supports definite length values.
    IndefiniteLength,

    /// The length octets use the reserved initial octet 0xFF.
    ReservedLength,

    /// A definite length needs more than 31 bits.
    LengthOverflow,

    /// A length claims more octets than the input has left.
    OversizedLength,

    /// A primitive-only type was encountered in constructed encoding.
    ConstructedPrimitive(Tag),

    /// Values are nested deeper than the configured maximum.
    DepthExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::Truncated => {
                f.write_str("unexpected end of data")
            }
            ErrorKind::RedundantTag => {
                f.write_str("redundant high tag number form")
            }
            ErrorKind::TagOverflow => {
                f.write_str("tag number more than 31 bits")
            }
            ErrorKind::IndefiniteLength => {
                f.write_str("indefinite length not supported")
            }
            ErrorKind::ReservedLength => {
                f.write_str("reserved length octets")
            }
            ErrorKind::LengthOverflow => {
                f.write_str("definite length more than 31 bits")
            }
            ErrorKind::OversizedLength => {
                f.write_str("length out of bounds of remaining data")
            }
            ErrorKind::ConstructedPrimitive(tag) => {
                write!(f, "constructed encoding of primitive type {}", tag)
            }
            ErrorKind::DepthExceeded => {
                f.write_str("maximum nesting depth exceeded")
            }
        }
    }
}


//============ Tests =========================================================
