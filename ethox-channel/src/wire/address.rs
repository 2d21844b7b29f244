use core::{fmt, str::FromStr};

use super::ethernet;

/// A link layer address of arbitrary length.
///
/// Unlike an Ethernet address this is not fixed to six octets: a virtual link may choose any
/// identification it likes. The empty address means that no address was given, which is what
/// inbound frames injected without a remote carry.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Default)]
pub struct LinkAddress(Box<[u8]>);

/// The error returned when parsing a link address fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAddressError {
    kind: ParseAddressErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseAddressErrorKind {
    ComponentError,
    LengthError,
}

impl LinkAddress {
    /// The empty address.
    pub fn unspecified() -> Self {
        LinkAddress::default()
    }

    /// Construct an address from a sequence of octets.
    pub fn from_bytes(data: &[u8]) -> Self {
        LinkAddress(data.into())
    }

    /// Return the address as a sequence of octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The number of octets in the address.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Query whether this is the empty address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ParseAddressError {
    pub(crate) fn length() -> Self {
        ParseAddressError { kind: ParseAddressErrorKind::LengthError }
    }

    fn component() -> Self {
        ParseAddressError { kind: ParseAddressErrorKind::ComponentError }
    }
}

impl From<ethernet::Address> for LinkAddress {
    fn from(addr: ethernet::Address) -> Self {
        LinkAddress::from_bytes(addr.as_bytes())
    }
}

impl From<&'_ [u8]> for LinkAddress {
    fn from(data: &[u8]) -> Self {
        LinkAddress::from_bytes(data)
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, byte) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self.kind {
            ParseAddressErrorKind::ComponentError => "invalid link address component",
            ParseAddressErrorKind::LengthError => "unexpected number of link address components",
        })
    }
}

impl std::error::Error for ParseAddressError { }

impl FromStr for LinkAddress {
    type Err = ParseAddressError;

    /// Parse colon separated hex octets, such as `aa:bb`.
    ///
    /// The empty string is the empty address.
    fn from_str(src: &str) -> Result<Self, ParseAddressError> {
        if src.is_empty() {
            return Ok(LinkAddress::unspecified());
        }

        src.split(':')
            .map(|part| match part.len() {
                1 | 2 => u8::from_str_radix(part, 16)
                    .map_err(|_| ParseAddressError::component()),
                _ => Err(ParseAddressError::component()),
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(|bytes| LinkAddress(bytes.into_boxed_slice()))
    }
}
