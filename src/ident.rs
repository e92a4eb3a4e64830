//! The identifier octets of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::error::{Error, ErrorKind};
use crate::source::SliceSource;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// Encoded in the two most significant bits of the first identifier octet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    /// Returns the class encoded in the given first identifier octet.
    const fn from_u8(octet: u8) -> Self {
        match octet >> 6 {
            0 => Self::Universal,
            1 => Self::Application,
            2 => Self::Context,
            _ => Self::Private,
        }
    }

    /// Returns the class bits for the first identifier octet.
    const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }

    /// Returns whether the class marks an explicitly tagged value.
    ///
    /// This is the case for the context specific and the private class.
    pub fn is_tagged(self) -> bool {
        matches!(self, Self::Context | Self::Private)
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags identify the type of a value. A tag consists of one of
/// four classes, represented by the [`Class`] enum, and a non-negative
/// number within this class.
///
/// In BER encoding, the tag becomes part of the identifier octets by
/// combining it with a bit indicating whether the value uses primitive or
/// constructed encoding. That distinction is kept by [`Ident`] instead.
///
/// # Limitations
///
/// Tag numbers are limited to 31 bits, which is more than enough in
/// practice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The number of the tag.
    number: u32,
}

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Self { class, number }
    }

    /// Creates a new tag in class “context specific” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the REAL type, UNIVERSAL 9.
    pub const REAL: Self = Self::new(Class::Universal, 9);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::REAL => write!(f, "REAL"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            tag => {
                match tag.class() {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number())
            }
        }
    }
}


//------------ Ident ---------------------------------------------------------

/// The decoded identifier octets of a value.
///
/// This combines the [`Tag`] with the bit that distinguishes primitive
/// from constructed encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ident {
    /// The tag of the value.
    tag: Tag,

    /// Whether the value uses constructed encoding.
    constructed: bool,
}

impl Ident {
    /// The mask for the constructed bit in the first identifier octet.
    ///
    /// The bit is not part of the tag itself.
    pub(crate) const CONSTRUCTED_MASK: u8 = 0x20;

    /// The mask for the tag number bits of the first identifier octet.
    const NUMBER_MASK: u8 = 0x1f;

    /// The mask for the data bits of a continuation octet.
    const DATA_MASK: u8 = 0x7f;

    /// The mask for the continuation bit of a continuation octet.
    const CONTINUE_MASK: u8 = 0x80;

    /// Takes identifier octets from the beginning of a source.
    ///
    /// If the low five bits of the first octet are not all set, they are
    /// the tag number. Otherwise the number follows in base 128 with bit 8
    /// marking continuation. Returns a redundant-encoding error if the
    /// first subsequent octet encodes a number that would have fit the
    /// single octet form or has all-zero data bits, and an overflow error
    /// if the number needs more than 31 bits.
    pub fn take_from(source: &mut SliceSource) -> Result<Self, Error> {
        let first = source.take_u8()?;
        let constructed = first & Self::CONSTRUCTED_MASK != 0;
        let class = Class::from_u8(first);
        let mut number = u32::from(first & Self::NUMBER_MASK);
        if number == u32::from(Self::NUMBER_MASK) {
            let mut octet = source.take_u8()?;
            if octet < Self::NUMBER_MASK {
                // The number would have fit the first octet.
                return Err(source.err(ErrorKind::RedundantTag))
            }
            number = u32::from(octet & Self::DATA_MASK);
            if number == 0 {
                // X.690 8.1.2.4.2 c): bits 7 to 1 of the first subsequent
                // octet shall not all be zero.
                return Err(source.err(ErrorKind::RedundantTag))
            }
            while octet & Self::CONTINUE_MASK != 0 {
                if number >> 24 != 0 {
                    return Err(source.err(ErrorKind::TagOverflow))
                }
                octet = source.take_u8()?;
                number = number << 7 | u32::from(octet & Self::DATA_MASK);
            }
        }
        Ok(Self { tag: Tag::new(class, number), constructed })
    }

    /// Returns the tag of the value.
    pub fn tag(self) -> Tag {
        self.tag
    }

    /// Returns the class of the tag.
    pub fn class(self) -> Class {
        self.tag.class()
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.tag.number()
    }

    /// Returns whether the value uses constructed encoding.
    pub fn is_constructed(self) -> bool {
        self.constructed
    }

    /// Appends the minimal form of the identifier octets to `target`.
    ///
    /// A number below 31 becomes a single octet. Anything larger follows
    /// in base 128, big-endian, with as few octets as possible and bit 8
    /// set on all but the last.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        let flags = self.tag.class().into_u8()
            | if self.constructed { Self::CONSTRUCTED_MASK } else { 0 };
        let number = self.tag.number();
        if number < u32::from(Self::NUMBER_MASK) {
            target.push(flags | number as u8);
        }
        else {
            // A u32 needs at most five base 128 groups.
            let mut buf = [0u8; 5];
            let mut idx = buf.len() - 1;
            buf[idx] = (number as u8) & Self::DATA_MASK;
            let mut number = number >> 7;
            while number != 0 {
                idx -= 1;
                buf[idx] = (number as u8) & Self::DATA_MASK
                    | Self::CONTINUE_MASK;
                number >>= 7;
            }
            target.push(flags | Self::NUMBER_MASK);
            target.extend_from_slice(&buf[idx..]);
        }
    }
}


//============ Tests =========================================================
