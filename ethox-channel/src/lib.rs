//! A link layer endpoint backed by a channel.
//!
//! The endpoint sits where a network interface card would sit below a network stack but owns no
//! transport. Instead, it bridges the stack to some other party exchanging raw frames with it: a
//! test harness, a tunnel device, or another process.
//!
//! * Inbound frames are injected with [`Endpoint::inject_inbound`] and delivered synchronously to
//!   the [`NetworkDispatcher`] of the stack.
//! * Outbound packets written by the stack through the [`LinkEndpoint`] interface are stored in a
//!   bounded queue and collected with [`Endpoint::read`] or discarded with [`Endpoint::drain`].
//! * [`Endpoint::close`] ends both directions. Readers see the end of the channel once all queued
//!   packets were consumed.
//!
//! ## Design
//!
//! Writes never block the stack. A full queue drops packets, as a congested link would, and only
//! a closed endpoint is reported as an error. A batch write accepts a prefix of its packets and
//! reports its length.
//!
//! Frames are opaque throughout. Protocol numbers and segmentation offload parameters are passed
//! along with them but never interpreted.
//!
//! ```
//! use ethox_channel::nic::{channel::Endpoint, LinkEndpoint, Route};
//! use ethox_channel::wire::{EtherType, PacketBuffer};
//!
//! let endpoint = Endpoint::new(2, 1500, "aa:bb".parse().unwrap());
//! let packet = PacketBuffer::from_data(vec![0u8; 64]);
//! endpoint.write_packet(&Route::default(), None, EtherType::Ipv4, packet).unwrap();
//!
//! let info = endpoint.read().unwrap();
//! assert_eq!(info.packet.size(), 64);
//! ```
//!
//! [`Endpoint::inject_inbound`]: nic::channel::Endpoint::inject_inbound
//! [`Endpoint::read`]: nic::channel::Endpoint::read
//! [`Endpoint::drain`]: nic::channel::Endpoint::drain
//! [`Endpoint::close`]: nic::channel::Endpoint::close
//! [`NetworkDispatcher`]: nic::NetworkDispatcher
//! [`LinkEndpoint`]: nic::LinkEndpoint
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
pub mod config;
pub mod nic;
pub mod wire;
