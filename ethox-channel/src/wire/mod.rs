//! Data carried through a link endpoint.
//!
//! A link endpoint treats frames as opaque. The types in here describe what is handed over at the
//! link layer boundary: an address identifying an endpoint, the network protocol a frame
//! belongs to, and the (possibly segmented) bytes of the frame itself. Framing is the business of
//! whoever sits on the outside of the endpoint, though `ethernet` offers the minimal header
//! representation needed to do so.
pub mod ethernet;
mod address;
mod buffer;

pub use self::address::{LinkAddress, ParseAddressError};
pub use self::buffer::{PacketBuffer, VectorisedView, View};
pub use self::ethernet::{Address as EthernetAddress, EtherType};

/// The error type for parsing of wire data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// An incoming packet was shorter than its header.
    #[error("truncated packet")]
    Truncated,
}

/// The result type for parsing of wire data.
pub type Result<T> = core::result::Result<T, Error>;
