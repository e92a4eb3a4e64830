//! Transcoding of BER encoded data into canonical DER.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::cmp;
use std::cmp::Ordering;
use bytes::Bytes;
use smallvec::SmallVec;
use crate::error::{Error, ErrorKind};
use crate::ident::{Ident, Tag};
use crate::length::Length;
use crate::source::SliceSource;


//------------ Options -------------------------------------------------------

/// The set of enabled transcoder behaviors.
///
/// The two capabilities – rewriting of encodings with canonical lengths
/// and sorting of SET elements – can be enabled independently. With
/// neither capability enabled, the transcoder is in pass-through mode: it
/// returns its input untouched and never even parses it.
///
/// Note that the capabilities only gate pass-through mode as a whole:
/// enabling just [`sort_sets`][Self::sort_sets] still performs the full
/// recursive rewrite including length minimization. Length minimization
/// is not independently switchable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Rewrite encodings with minimal tag and length octets.
    canonical_lengths: bool,

    /// Reorder the elements of SET values canonically.
    sort_sets: bool,

    /// The maximum allowed nesting depth.
    max_depth: usize,
}

impl Options {
    /// The nesting depth allowed unless configured otherwise.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Returns options that produce canonical DER.
    ///
    /// Both capabilities are enabled.
    pub fn der() -> Self {
        Self {
            canonical_lengths: true,
            sort_sets: true,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Returns options that return all input unchanged.
    ///
    /// Neither capability is enabled. These options are useful as an
    /// unmodified baseline when comparing encodings in tests.
    pub fn pass_through() -> Self {
        Self {
            canonical_lengths: false,
            sort_sets: false,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Enables or disables rewriting with canonical lengths.
    pub fn canonical_lengths(mut self, enable: bool) -> Self {
        self.canonical_lengths = enable;
        self
    }

    /// Enables or disables sorting of SET elements.
    pub fn sort_sets(mut self, enable: bool) -> Self {
        self.sort_sets = enable;
        self
    }

    /// Sets the maximum allowed nesting depth.
    ///
    /// Input with values nested more than `max_depth` levels deep – the
    /// top-level value being level zero – is rejected with a dedicated
    /// error instead of descending further.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns whether these options leave all input unchanged.
    fn is_pass_through(self) -> bool {
        !self.canonical_lengths && !self.sort_sets
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::der()
    }
}


//------------ Transcoder ----------------------------------------------------

/// A transcoder of BER encoded data into canonical DER.
///
/// A value of this type holds nothing but its [`Options`] and is never
/// mutated. Each call allocates and owns its output, so a single
/// configured transcoder can be shared freely between threads and reused
/// for any number of independent invocations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Transcoder {
    /// The enabled behaviors.
    options: Options,
}

impl Transcoder {
    /// Creates a new transcoder from the given options.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Returns the transcoder’s options.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Canonicalizes a buffer holding a single BER encoded value.
    ///
    /// Returns the canonical encoding of that value or an error if the
    /// input cannot be interpreted as well-formed BER. In pass-through
    /// mode the input is returned unchanged without being parsed, so
    /// that mode never fails.
    ///
    /// Octets trailing the top-level value do not become part of the
    /// output.
    pub fn canonicalize(&self, input: Bytes) -> Result<Bytes, Error> {
        if self.options.is_pass_through() {
            return Ok(input)
        }
        let mut out = Vec::with_capacity(input.len());
        self.transcode_into(&mut out, input.as_ref(), 0, input.len(), 0)?;
        Ok(out.into())
    }

    /// Transcodes the single value starting at `offset` of `data`.
    ///
    /// Returns the number of octets the value occupies in `data` together
    /// with its rebuilt encoding. The consumed count refers to the
    /// original input – it lets a caller advance past the value even
    /// though the rebuilt encoding may well be shorter.
    pub fn transcode(
        &self, data: &[u8], offset: usize
    ) -> Result<(usize, Bytes), Error> {
        let mut out = Vec::new();
        let consumed = self.transcode_into(
            &mut out, data, offset, data.len(), 0
        )?;
        Ok((consumed, out.into()))
    }

    /// Transcodes one value and appends its rebuilt encoding to `out`.
    ///
    /// The value starts at `offset` of `data` and must be contained
    /// entirely in `data[..end]`. Returns the number of octets consumed
    /// from the original input.
    fn transcode_into(
        &self,
        out: &mut Vec<u8>,
        data: &[u8],
        offset: usize,
        end: usize,
        depth: usize,
    ) -> Result<usize, Error> {
        if depth >= self.options.max_depth {
            return Err(Error::new(ErrorKind::DepthExceeded, offset.into()))
        }
        let tail = match data.get(offset..end) {
            Some(tail) => tail,
            None => {
                return Err(Error::new(ErrorKind::Truncated, offset.into()))
            }
        };
        let avail = tail.len();
        let mut source = SliceSource::new(tail, offset);
        let ident = Ident::take_from(&mut source)?;
        let length = Length::take_from(&mut source, avail)?;
        let value = source.take_slice(length.to_usize())?;
        let consumed = avail - source.remaining();

        if ident.is_constructed() {
            let start = offset + consumed - value.len();
            let content = self.transcode_children(
                data, ident, offset, start, start + value.len(), depth
            )?;
            append_value(out, ident, &content);
        }
        else {
            // Primitive content is never reinterpreted.
            append_value(out, ident, value);
        }
        Ok(consumed)
    }

    /// Rebuilds the content octets of a constructed value.
    ///
    /// The content octets live in `data[start..end]`; `pos` is the start
    /// of the enclosing value and only used for diagnostics. Dispatch
    /// follows the tag number: SET content is collected element by
    /// element so it can be reordered, SEQUENCE and explicitly tagged
    /// content is rebuilt in place. Any other constructed value belongs
    /// to a type that only permits primitive encoding.
    fn transcode_children(
        &self,
        data: &[u8],
        ident: Ident,
        pos: usize,
        start: usize,
        end: usize,
        depth: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut res = Vec::with_capacity(end - start);
        if ident.number() == Tag::SET.number() {
            let mut elements = SmallVec::<[Vec<u8>; 8]>::new();
            let mut index = start;
            while index < end {
                let mut element = Vec::new();
                index += self.transcode_into(
                    &mut element, data, index, end, depth + 1
                )?;
                elements.push(element);
            }
            if self.options.sort_sets {
                // sort_by is stable, so elements the comparator treats
                // as equal keep their original order.
                elements.sort_by(|a, b| compare_elements(a, b));
            }
            for element in elements {
                res.extend_from_slice(&element);
            }
        }
        else if ident.number() == Tag::SEQUENCE.number()
            || ident.class().is_tagged()
        {
            let mut index = start;
            while index < end {
                index += self.transcode_into(
                    &mut res, data, index, end, depth + 1
                )?;
            }
        }
        else {
            return Err(Error::new(
                ErrorKind::ConstructedPrimitive(ident.tag()), pos.into()
            ))
        }
        Ok(res)
    }
}


//------------ Helper Functions ----------------------------------------------

/// Appends a complete value with minimal tag and length octets.
fn append_value(out: &mut Vec<u8>, ident: Ident, content: &[u8]) {
    ident.append_encoded(out);
    Length::new(content.len()).append_encoded(out);
    out.extend_from_slice(content);
}

/// Compares two rebuilt SET elements for canonical order.
///
/// Elements are ordered by their first octets with the constructed bit
/// masked off – the bit is not part of the tag – and then octet by octet
/// up to the final octet of the shorter element, which is compared
/// inclusively: elements that agree through that octet are equal no
/// matter what the longer one carries beyond it. This is deliberately
/// not a full lexicographic order on unequal length strings.
fn compare_elements(a: &[u8], b: &[u8]) -> Ordering {
    let left = a[0] & !Ident::CONSTRUCTED_MASK;
    let right = b[0] & !Ident::CONSTRUCTED_MASK;
    match left.cmp(&right) {
        Ordering::Equal => {}
        other => return other,
    }
    let last = cmp::min(a.len(), b.len()) - 1;
    for i in 1..last {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a[last].cmp(&b[last])
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::ident::Class;
    use super::*;

    fn canonicalize(
        options: Options, input: &[u8]
    ) -> Result<Bytes, Error> {
        Transcoder::new(options).canonicalize(Bytes::copy_from_slice(input))
    }

    fn kind_of(options: Options, input: &[u8]) -> ErrorKind {
        canonicalize(options, input).unwrap_err().kind()
    }

    #[test]
    fn pass_through_returns_anything_unchanged() {
        for input in [
            b"".as_ref(),
            b"\x00\xff\x80".as_ref(),
            b"\x30\x81\x03\x02\x01\x2a".as_ref(),
        ] {
            assert_eq!(
                canonicalize(Options::pass_through(), input).unwrap(),
                input
            );
        }
    }

    #[test]
    fn canonical_input_stays_put() {
        let input = b"\x30\x06\x02\x01\x01\x02\x01\x02";
        assert_eq!(
            canonicalize(Options::der(), input).unwrap().as_ref(),
            input.as_ref()
        );
    }

    #[test]
    fn redundant_lengths_are_minimized() {
        // Outer and inner values both use a redundant long form.
        assert_eq!(
            canonicalize(
                Options::der(),
                b"\x30\x81\x06\x02\x81\x01\x01\x02\x01\x02"
            ).unwrap().as_ref(),
            b"\x30\x06\x02\x01\x01\x02\x01\x02".as_ref()
        );
        // Zero-padded long form.
        assert_eq!(
            canonicalize(
                Options::der(), b"\x30\x83\x00\x00\x03\x02\x01\x2a"
            ).unwrap().as_ref(),
            b"\x30\x03\x02\x01\x2a".as_ref()
        );
    }

    #[test]
    fn sort_alone_still_minimizes_lengths() {
        assert_eq!(
            canonicalize(
                Options::pass_through().sort_sets(true),
                b"\x30\x81\x03\x02\x01\x2a"
            ).unwrap().as_ref(),
            b"\x30\x03\x02\x01\x2a".as_ref()
        );
    }

    #[test]
    fn set_of_is_sorted_by_content() {
        assert_eq!(
            canonicalize(
                Options::der(), b"\x31\x06\x04\x01\xbb\x04\x01\xaa"
            ).unwrap().as_ref(),
            b"\x31\x06\x04\x01\xaa\x04\x01\xbb".as_ref()
        );
    }

    #[test]
    fn set_is_sorted_by_tag() {
        // INTEGER before BOOLEAN on input, BOOLEAN first on output.
        assert_eq!(
            canonicalize(
                Options::der(), b"\x31\x06\x02\x01\x05\x01\x01\xff"
            ).unwrap().as_ref(),
            b"\x31\x06\x01\x01\xff\x02\x01\x05".as_ref()
        );
    }

    #[test]
    fn set_elements_are_rebuilt_before_sorting() {
        // The first element’s padded length would sort it last if the
        // comparison looked at the original octets.
        assert_eq!(
            canonicalize(
                Options::der(), b"\x31\x07\x04\x81\x01\xaa\x04\x01\xab"
            ).unwrap().as_ref(),
            b"\x31\x06\x04\x01\xaa\x04\x01\xab".as_ref()
        );
    }

    #[test]
    fn set_order_is_kept_without_sorting() {
        assert_eq!(
            canonicalize(
                Options::der().sort_sets(false),
                b"\x31\x06\x04\x01\xbb\x04\x01\xaa"
            ).unwrap().as_ref(),
            b"\x31\x06\x04\x01\xbb\x04\x01\xaa".as_ref()
        );
        assert_eq!(
            canonicalize(
                Options::pass_through().canonical_lengths(true),
                b"\x31\x07\x04\x81\x01\xbb\x04\x01\xaa"
            ).unwrap().as_ref(),
            b"\x31\x06\x04\x01\xbb\x04\x01\xaa".as_ref()
        );
    }

    #[test]
    fn empty_set() {
        assert_eq!(
            canonicalize(Options::der(), b"\x31\x00").unwrap().as_ref(),
            b"\x31\x00".as_ref()
        );
    }

    #[test]
    fn tagged_values_recurse() {
        for input in [
            b"\xa0\x03\x02\x01\x05".as_ref(),   // context specific
            b"\xe3\x03\x02\x01\x05".as_ref(),   // private
        ] {
            assert_eq!(
                canonicalize(Options::der(), input).unwrap(),
                input
            );
        }
    }

    #[test]
    fn dispatch_goes_by_tag_number_first() {
        // Application class, tag number 16: rebuilt as a child sequence.
        assert_eq!(
            canonicalize(
                Options::der(), b"\x70\x03\x02\x01\x05"
            ).unwrap().as_ref(),
            b"\x70\x03\x02\x01\x05".as_ref()
        );
        // Context specific, tag number 17: sorted like a SET.
        assert_eq!(
            canonicalize(
                Options::der(), b"\xb1\x06\x04\x01\xbb\x04\x01\xaa"
            ).unwrap().as_ref(),
            b"\xb1\x06\x04\x01\xaa\x04\x01\xbb".as_ref()
        );
    }

    #[test]
    fn constructed_primitive_is_rejected() {
        assert_eq!(
            kind_of(Options::der(), b"\x21\x01\xff"),
            ErrorKind::ConstructedPrimitive(Tag::BOOLEAN)
        );
        assert_eq!(
            kind_of(Options::der(), b"\x65\x03\x02\x01\x05"),
            ErrorKind::ConstructedPrimitive(Tag::new(Class::Application, 5))
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(kind_of(Options::der(), b""), ErrorKind::Truncated);
        // Short form length claiming more than is left.
        assert_eq!(
            kind_of(Options::der(), b"\x30\x05\x02\x01"),
            ErrorKind::Truncated
        );
        // Long form length claiming more than is left.
        assert_eq!(
            kind_of(Options::der(), b"\x30\x81\x05\x00\x00"),
            ErrorKind::OversizedLength
        );
        assert_eq!(
            kind_of(Options::der(), b"\x30\x80\x02\x01\x00\x00\x00"),
            ErrorKind::IndefiniteLength
        );
        // Child with a redundant high tag number form.
        assert_eq!(
            kind_of(Options::der(), b"\x30\x04\x1f\x80\x01\x00"),
            ErrorKind::RedundantTag
        );
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let input =
            b"\xa0\x0d\xa0\x0b\xa0\x09\xa0\x07\xa0\x05\xa0\x03\x02\x01\x00";
        assert_eq!(
            canonicalize(Options::der(), input).unwrap(),
            input.as_ref()
        );
        assert_eq!(
            canonicalize(Options::der().max_depth(7), input).unwrap(),
            input.as_ref()
        );
        assert_eq!(
            kind_of(Options::der().max_depth(6), input),
            ErrorKind::DepthExceeded
        );
    }

    #[test]
    fn trailing_octets_are_dropped() {
        assert_eq!(
            canonicalize(Options::der(), b"\x05\x00\xff\xff")
                .unwrap().as_ref(),
            b"\x05\x00".as_ref()
        );
    }

    #[test]
    fn transcode_reports_original_consumption() {
        let transcoder = Transcoder::new(Options::der());
        let (consumed, rebuilt) = transcoder.transcode(
            b"\xa5\xa5\x02\x81\x01\x2a", 2
        ).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(rebuilt.as_ref(), b"\x02\x01\x2a");
        assert_eq!(
            transcoder.transcode(b"\x05\x00", 4).unwrap_err().kind(),
            ErrorKind::Truncated
        );
    }

    #[test]
    fn element_comparison() {
        // The constructed bit does not participate.
        assert_eq!(
            compare_elements(b"\x04\x01\xaa", b"\x24\x01\xaa"),
            Ordering::Equal
        );
        // Octets past the shorter element’s last octet do not either.
        assert_eq!(
            compare_elements(b"\x02\x01\x05", b"\x02\x01\x05\x99"),
            Ordering::Equal
        );
        assert_eq!(
            compare_elements(b"\x01\x01\xff", b"\x02\x01\x00"),
            Ordering::Less
        );
        assert_eq!(
            compare_elements(b"\x04\x02\xaa\xcc", b"\x04\x02\xaa\xbb"),
            Ordering::Greater
        );
    }
}
