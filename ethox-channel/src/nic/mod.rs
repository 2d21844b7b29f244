//! Encapsulates a link layer endpoint.
//!
//! A network stack talks to its links through two contracts. Downwards, the [`LinkEndpoint`]
//! accepts outbound packets and advertises what the link can do. Upwards, the link hands inbound
//! frames to a [`NetworkDispatcher`] which the stack attached to it beforehand.
//!
//! The only link implemented here is the [`channel`] endpoint which owns no transport at all.
//! Outbound packets end up in a bounded queue for someone else to collect while inbound frames
//! are injected by that same someone.
use std::sync::{Arc, Weak};

use crate::wire::{EtherType, LinkAddress, PacketBuffer, VectorisedView, View};

pub mod channel;
pub mod lifecycle;
pub mod queue;
mod gso;
mod personality;

pub use self::gso::{Gso, GsoType, GSO_MAX_SIZE};
pub use self::personality::Capabilities;

/// The result type of link operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by a link endpoint.
///
/// Note that congestion is not an error. A full queue drops outbound packets silently, just as a
/// physical link would under load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The endpoint has been closed and accepts no more packets.
    #[error("endpoint is closed")]
    ClosedEndpoint,

    /// The outbound channel was closed and every queued packet has been consumed.
    ///
    /// This is the regular end of stream for a reader.
    #[error("link channel closed")]
    ChannelClosed,

    /// A packet descriptor referred to bytes outside of the payload it was given with.
    #[error("packet descriptor out of payload bounds")]
    BadSize,
}

/// The route an outbound packet takes.
///
/// Links which resolve addresses themselves may use this. The channel endpoint ignores it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    /// The link address of the sending interface.
    pub local_link_address: LinkAddress,
    /// The link address of the next hop, if resolved.
    pub remote_link_address: LinkAddress,
    /// The network protocol of packets on this route.
    pub net_proto: Option<EtherType>,
}

/// One packet of a batch, sliced from a shared payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketDescriptor {
    /// The headers of this packet.
    pub header: View,
    /// Offset of this packet's data within the payload.
    pub off: usize,
    /// Length of this packet's data.
    pub size: usize,
}

/// Receives inbound frames from a link.
pub trait NetworkDispatcher: Send + Sync {
    /// Process one inbound frame.
    ///
    /// Called synchronously by the link which received the frame. Delivery is infallible from the
    /// point of view of the link, whatever happens to the frame afterwards is up to the
    /// dispatcher.
    fn deliver_network_packet(
        &self,
        link: &dyn LinkEndpoint,
        remote: &LinkAddress,
        local: &LinkAddress,
        protocol: EtherType,
        packet: PacketBuffer,
    );
}

/// A layer 2 endpoint as seen by a network stack.
///
/// All methods take a shared reference. Endpoints are shared between the send path of the stack,
/// inbound producers and consumers of outbound packets which all run concurrently.
pub trait LinkEndpoint: Send + Sync {
    /// Register the dispatcher for inbound frames.
    ///
    /// The link does not own the dispatcher. Attaching again replaces the previous one.
    fn attach(&self, dispatcher: Weak<dyn NetworkDispatcher>);

    /// Whether a dispatcher is attached.
    fn is_attached(&self) -> bool;

    /// The maximum transmission unit of the link.
    fn mtu(&self) -> u32;

    /// The link layer address of this endpoint.
    fn link_address(&self) -> &LinkAddress;

    /// Features supported by the link.
    fn capabilities(&self) -> Capabilities;

    /// The number of bytes of header the link prepends to outbound packets.
    fn max_header_length(&self) -> u16;

    /// The largest packet accepted for segmentation offload.
    fn gso_max_size(&self) -> u32;

    /// Send a single packet.
    fn write_packet(
        &self,
        route: &Route,
        gso: Option<Arc<Gso>>,
        protocol: EtherType,
        packet: PacketBuffer,
    ) -> Result<()>;

    /// Send a batch of packets sharing one payload.
    ///
    /// Returns the number of packets accepted, which may be fewer than the number of
    /// descriptors. Packets are accepted in order, so the count identifies a prefix of the batch.
    fn write_packets(
        &self,
        route: &Route,
        gso: Option<Arc<Gso>>,
        descriptors: &[PacketDescriptor],
        payload: &VectorisedView,
        protocol: EtherType,
    ) -> Result<usize>;

    /// Send a complete frame without any protocol information.
    fn write_raw_packet(&self, data: VectorisedView) -> Result<()>;

    /// Wait for the link to finish all of its work.
    fn wait(&self);
}
