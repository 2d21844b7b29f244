//! Ethernet II addresses, protocol types and headers.
use core::{fmt, str::FromStr};
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// Ethernet protocol type.
    ///
    /// Doubles as the network protocol number handed between the stack and a link endpoint.
    pub enum EtherType(u16) {
        Ipv4 = 0x0800,
        Arp  = 0x0806,
        Ipv6 = 0x86DD,
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Ipv6 => write!(f, "IPv6"),
            EtherType::Arp  => write!(f, "ARP"),
            EtherType::Unknown(id) => write!(f, "0x{:04x}", id)
        }
    }
}

/// A six-octet Ethernet II address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 6]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the "multicast" bit in the OUI is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
               bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
    }
}

impl FromStr for Address {
    type Err = super::ParseAddressError;

    fn from_str(src: &str) -> core::result::Result<Self, Self::Err> {
        let link: super::LinkAddress = src.parse()?;
        let mut parsed = [0; 6];
        if link.len() != parsed.len() {
            return Err(super::ParseAddressError::length());
        }
        parsed.copy_from_slice(link.as_bytes());
        Ok(Address(parsed))
    }
}

mod field {
    use core::ops::Range;

    pub(crate) const DESTINATION: Range<usize> =  0..6;
    pub(crate) const SOURCE:      Range<usize> =  6..12;
    pub(crate) const ETHERTYPE:   Range<usize> = 12..14;
}

/// A high-level representation of an Ethernet II header.
///
/// The channel endpoint never looks at frame contents. This exists for the producers and
/// consumers on the outside of the endpoint which do the framing themselves.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The source address.
    pub src_addr: Address,
    /// The destination address.
    pub dst_addr: Address,
    /// The protocol of the payload.
    pub ethertype: EtherType,
}

impl Repr {
    /// The length of an emitted header.
    pub const HEADER_LEN: usize = field::ETHERTYPE.end;

    /// Parse the header at the start of a frame.
    pub fn parse(frame: &[u8]) -> Result<Repr> {
        if frame.len() < Self::HEADER_LEN {
            return Err(Error::Truncated);
        }

        let mut dst_addr = [0; 6];
        let mut src_addr = [0; 6];
        dst_addr.copy_from_slice(&frame[field::DESTINATION]);
        src_addr.copy_from_slice(&frame[field::SOURCE]);
        let ethertype = NetworkEndian::read_u16(&frame[field::ETHERTYPE]);

        Ok(Repr {
            src_addr: Address(src_addr),
            dst_addr: Address(dst_addr),
            ethertype: ethertype.into(),
        })
    }

    /// Emit the header into the start of `frame`.
    ///
    /// # Panics
    /// This function panics if the buffer is shorter than `HEADER_LEN`.
    pub fn emit(&self, frame: &mut [u8]) {
        frame[field::DESTINATION].copy_from_slice(self.dst_addr.as_bytes());
        frame[field::SOURCE].copy_from_slice(self.src_addr.as_bytes());
        NetworkEndian::write_u16(&mut frame[field::ETHERTYPE], self.ethertype.into());
    }
}
