//! Canonicalization of BER encoded data into DER.
//!
//! The Basic Encoding Rules of ASN.1 permit several encodings of the same
//! abstract value: lengths may be written in redundant long forms and the
//! elements of a SET may appear in any order. The Distinguished Encoding
//! Rules single out exactly one of these encodings. This crate rewrites a
//! buffer holding any valid BER encoding of a value into that one
//! distinguished encoding – or refuses the buffer if it isn’t well-formed
//! BER to begin with.
//!
//! The crate operates purely on the tag-length-value structure of the
//! input. Primitive content octets are copied through untouched, nothing
//! is interpreted against an ASN.1 schema, and indefinite length values
//! are rejected rather than reframed.
//!
//! The central type is [`Transcoder`], configured through [`Options`]:
//!
//! ```
//! use ber2der::{Options, Transcoder};
//!
//! // A SEQUENCE of one INTEGER using a redundant long form length.
//! let input = bytes::Bytes::from_static(b"\x30\x81\x03\x02\x01\x2a");
//!
//! let transcoder = Transcoder::new(Options::der());
//! let canonical = transcoder.canonicalize(input).unwrap();
//! assert_eq!(canonical.as_ref(), b"\x30\x03\x02\x01\x2a");
//! ```

pub use self::error::{Error, ErrorKind};
pub use self::ident::{Class, Tag};
pub use self::source::Pos;
pub use self::transcode::{Options, Transcoder};

mod error;
mod ident;
mod length;
mod source;
mod transcode;
