//! The length octets of a BER encoded value.
//!
//! This is a private module. The [`Length`] defined herein is not
//! publicly exposed.

use crate::error::{Error, ErrorKind};
use crate::source::SliceSource;


//------------ Length --------------------------------------------------------

/// The definite length of an encoded value.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways, determined by the
/// most significant bit of the first octet. If it is not set, the
/// remaining bits of this first octet provide the length directly. If it
/// is set, the remaining bits specify the number of octets that follow
/// with the big-endian encoding of the length. A first octet of exactly
/// 0x80 announces the indefinite form, which the transcoder does not
/// support, and 0xFF is reserved.
///
/// BER allows the long form to be redundant – extra length octets or a
/// long form where the short form would have sufficed. Such input is
/// accepted here and erased on re-encoding, which always produces the
/// minimal form DER requires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Length(usize);

impl Length {
    /// Creates a length for the given number of content octets.
    pub fn new(len: usize) -> Self {
        Self(len)
    }

    /// Returns the length as a `usize`.
    pub fn to_usize(self) -> usize {
        self.0
    }

    /// Takes the length octets from the beginning of a source.
    ///
    /// `avail` is the number of octets available from the start of the
    /// value whose length this is, i.e., including its identifier and
    /// length octets. A long form length that is not strictly smaller
    /// than `avail` cannot possibly be satisfied and is rejected as out
    /// of bounds. A short form length makes no such claim here; if it
    /// turns out to be too big, taking the content octets will produce a
    /// truncation error.
    pub fn take_from(
        source: &mut SliceSource, avail: usize
    ) -> Result<Self, Error> {
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            // Definite short form.
            return Ok(Self(first as usize))
        }
        if first == 0x80 {
            return Err(source.err(ErrorKind::IndefiniteLength))
        }
        if first == 0xFF {
            return Err(source.err(ErrorKind::ReservedLength))
        }
        let count = (first & 0x7F) as usize;
        let mut len = 0usize;
        for _ in 0..count {
            if len >> 23 != 0 {
                return Err(source.err(ErrorKind::LengthOverflow))
            }
            len = len << 8 | source.take_u8()? as usize;
        }
        if len >= avail {
            return Err(source.err(ErrorKind::OversizedLength))
        }
        Ok(Self(len))
    }

    /// Appends the minimal form of the length octets to `target`.
    ///
    /// A length below 128 becomes a single octet. Anything larger is
    /// written in the long form with no leading zero octets.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        if self.0 < 0x80 {
            target.push(self.0 as u8);
        }
        else {
            let octets = self.0.to_be_bytes();
            let start = (self.0.leading_zeros() / 8) as usize;
            target.push(0x80 | (octets.len() - start) as u8);
            target.extend_from_slice(&octets[start..]);
        }
    }
}


//============ Tests =========================================================
