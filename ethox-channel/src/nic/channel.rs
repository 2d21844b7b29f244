//! A link endpoint backed by a channel.
//!
//! The endpoint allows injecting inbound frames into the attached dispatcher and stores outbound
//! packets in a bounded queue. Whoever holds the endpoint reads or drains that queue later. There
//! is no transport underneath, which makes this suitable for tests, tunnels or handing frames to
//! another process.
//!
//! ## Congestion
//!
//! Writes never block. When the queue is full the packet is dropped without reporting an error,
//! a batch write stops at the first packet that does not fit and reports how many were accepted.
//! Only a closed endpoint makes writes fail.
use std::sync::{Arc, RwLock, Weak};

use crate::wire::{EtherType, LinkAddress, PacketBuffer, VectorisedView, View};

use super::{Capabilities, Error, Gso, LinkEndpoint, NetworkDispatcher, PacketDescriptor, Result,
    Route, GSO_MAX_SIZE};
use super::lifecycle::Lifecycle;
use super::queue::{self, Consumer, Producer, TryPopError};

/// All the information about an outbound packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketInfo {
    /// The packet buffers.
    pub packet: PacketBuffer,
    /// The network protocol, `None` for raw packets.
    pub protocol: Option<EtherType>,
    /// Segmentation offload parameters passed with the packet.
    pub gso: Option<Arc<Gso>>,
}

/// A link endpoint storing outbound packets in a queue.
///
/// Share it with an `Arc`, all operations take `&self`.
pub struct Endpoint {
    /// Not owned, the stack that attaches itself outlives us or detaches by dropping.
    dispatcher: RwLock<Option<Weak<dyn NetworkDispatcher>>>,
    mtu: u32,
    link_address: LinkAddress,
    gso: bool,
    /// Holds the sending half while open, closing drops it.
    lifecycle: Lifecycle<Producer<PacketInfo>>,
    /// Where outbound packets are read from.
    queue: Consumer<PacketInfo>,
}

impl Endpoint {
    /// Create an endpoint queueing up to `capacity` outbound packets.
    pub fn new(capacity: usize, mtu: u32, link_address: LinkAddress) -> Self {
        Endpoint::with_gso(capacity, mtu, link_address, false)
    }

    /// Create an endpoint which may advertise hardware segmentation offload.
    pub fn with_gso(capacity: usize, mtu: u32, link_address: LinkAddress, gso: bool) -> Self {
        net_debug!("channel endpoint {}: capacity {}, mtu {}, gso {}",
            link_address, capacity, mtu, gso);
        let (producer, queue) = queue::bounded(capacity);
        Endpoint {
            dispatcher: RwLock::new(None),
            mtu,
            link_address,
            gso,
            lifecycle: Lifecycle::new(producer),
            queue,
        }
    }

    /// Inject an inbound frame.
    pub fn inject_inbound(&self, protocol: EtherType, packet: PacketBuffer) {
        self.inject_link_addr(protocol, &LinkAddress::unspecified(), packet)
    }

    /// Inject an inbound frame with the link address of its sender.
    ///
    /// The frame is delivered synchronously to the attached dispatcher. Frames are dropped
    /// silently when the endpoint is closed or no dispatcher is attached.
    pub fn inject_link_addr(&self, protocol: EtherType, remote: &LinkAddress, packet: PacketBuffer) {
        let dispatcher = match self.lifecycle.operate(|_| self.dispatcher()) {
            Some(Some(dispatcher)) => dispatcher,
            Some(None) => {
                net_trace!("channel endpoint {}: no dispatcher, dropping {} inbound", self.link_address, protocol);
                return;
            },
            None => {
                net_trace!("channel endpoint {}: closed, dropping {} inbound", self.link_address, protocol);
                return;
            },
        };

        // Delivered outside the guard, the dispatcher may well answer through this endpoint.
        dispatcher.deliver_network_packet(
            self,
            remote,
            &LinkAddress::unspecified(),
            protocol,
            packet);
    }

    /// Take the oldest outbound packet, waiting until there is one.
    ///
    /// Fails with `ChannelClosed` once the endpoint is closed and all packets were read.
    pub fn read(&self) -> Result<PacketInfo> {
        self.queue.pop().ok_or(Error::ChannelClosed)
    }

    /// Take the oldest outbound packet if there is one.
    ///
    /// Like `read` but returns `Ok(None)` instead of waiting.
    pub fn try_read(&self) -> Result<Option<PacketInfo>> {
        match self.queue.try_pop() {
            Ok(info) => Ok(Some(info)),
            Err(TryPopError::Empty) => Ok(None),
            Err(TryPopError::Closed) => Err(Error::ChannelClosed),
        }
    }

    /// Remove all outbound packets and count them.
    pub fn drain(&self) -> usize {
        let count = self.queue.drain();
        net_trace!("channel endpoint {}: drained {} packets", self.link_address, count);
        count
    }

    /// Close the endpoint.
    ///
    /// Writes fail afterwards and injected frames are dropped. Packets already queued can still
    /// be read, then readers see the end of the channel. Closing again has no effect.
    ///
    /// An injected frame that passed its check before the close is delivered to the dispatcher
    /// outside of the guard. Such a delivery may still be running when this returns.
    pub fn close(&self) {
        if self.lifecycle.close(drop) {
            net_debug!("channel endpoint {}: closed", self.link_address);
        }
    }

    /// Whether the endpoint has been closed.
    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }

    /// The number of queued outbound packets.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no outbound packet is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The maximum number of queued outbound packets.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    fn dispatcher(&self) -> Option<Arc<dyn NetworkDispatcher>> {
        self.dispatcher
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Queue a packet or drop it on congestion.
    fn enqueue(&self, producer: &Producer<PacketInfo>, info: PacketInfo) -> bool {
        match producer.try_push(info) {
            Ok(()) => true,
            Err(dropped) => {
                net_trace!("channel endpoint {}: queue full, dropping {} byte packet",
                    self.link_address, dropped.packet.size());
                false
            },
        }
    }

    /// Check that all descriptors lie within a payload of `len` bytes.
    fn check_descriptors(descriptors: &[PacketDescriptor], len: usize) -> Result<()> {
        let fits = |desc: &PacketDescriptor| desc.off
            .checked_add(desc.size)
            .map_or(false, |end| end <= len);

        if descriptors.iter().all(fits) {
            Ok(())
        } else {
            Err(Error::BadSize)
        }
    }
}

impl LinkEndpoint for Endpoint {
    fn attach(&self, dispatcher: Weak<dyn NetworkDispatcher>) {
        net_debug!("channel endpoint {}: dispatcher attached", self.link_address);
        *self.dispatcher
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(dispatcher);
    }

    fn is_attached(&self) -> bool {
        self.dispatcher().is_some()
    }

    fn mtu(&self) -> u32 {
        self.mtu
    }

    fn link_address(&self) -> &LinkAddress {
        &self.link_address
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        if self.gso {
            caps |= Capabilities::HARDWARE_GSO;
        }
        caps
    }

    /// There is no link header, packets are queued as handed to us.
    fn max_header_length(&self) -> u16 {
        0
    }

    fn gso_max_size(&self) -> u32 {
        GSO_MAX_SIZE
    }

    fn write_packet(
        &self,
        _: &Route,
        gso: Option<Arc<Gso>>,
        protocol: EtherType,
        packet: PacketBuffer,
    ) -> Result<()> {
        self.lifecycle.operate(|producer| {
            self.enqueue(producer, PacketInfo {
                packet,
                protocol: Some(protocol),
                gso,
            });
        }).ok_or(Error::ClosedEndpoint)
    }

    fn write_packets(
        &self,
        _: &Route,
        gso: Option<Arc<Gso>>,
        descriptors: &[PacketDescriptor],
        payload: &VectorisedView,
        protocol: EtherType,
    ) -> Result<usize> {
        self.lifecycle.operate(|producer| -> Result<usize> {
            let payload = payload.to_view();
            Self::check_descriptors(descriptors, payload.len())?;

            let mut count = 0;
            for desc in descriptors {
                let data = View::from_bytes(&payload[desc.off..desc.off + desc.size]);
                let accepted = self.enqueue(producer, PacketInfo {
                    packet: PacketBuffer {
                        header: desc.header.clone(),
                        data: data.to_vectorised_view(),
                    },
                    protocol: Some(protocol),
                    gso: gso.clone(),
                });

                if !accepted {
                    break;
                }

                count += 1;
            }

            Ok(count)
        }).unwrap_or(Err(Error::ClosedEndpoint))
    }

    fn write_raw_packet(&self, data: VectorisedView) -> Result<()> {
        self.lifecycle.operate(|producer| {
            self.enqueue(producer, PacketInfo {
                packet: PacketBuffer::from_data(data),
                protocol: None,
                gso: None,
            });
        }).ok_or(Error::ClosedEndpoint)
    }

    fn wait(&self) { }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nic::GsoType;
    use std::sync::{Barrier, Mutex};
    use std::thread;

    /// Records every delivered frame.
    #[derive(Default)]
    struct Recorder {
        frames: Mutex<Vec<(LinkAddress, LinkAddress, EtherType, Vec<u8>)>>,
    }

    impl NetworkDispatcher for Recorder {
        fn deliver_network_packet(
            &self,
            link: &dyn LinkEndpoint,
            remote: &LinkAddress,
            local: &LinkAddress,
            protocol: EtherType,
            packet: PacketBuffer,
        ) {
            assert_eq!(link.mtu(), 1500);
            self.frames.lock().unwrap().push((remote.clone(), local.clone(), protocol, packet.to_vec()));
        }
    }

    /// Answers every inbound frame by writing it back out.
    struct Echo;

    impl NetworkDispatcher for Echo {
        fn deliver_network_packet(
            &self,
            link: &dyn LinkEndpoint,
            _: &LinkAddress,
            _: &LinkAddress,
            protocol: EtherType,
            packet: PacketBuffer,
        ) {
            assert_eq!(link.write_packet(&Route::default(), None, protocol, packet), Ok(()));
        }
    }

    /// Holds each delivery until released.
    struct Parked {
        entered: Barrier,
        release: Barrier,
    }

    impl NetworkDispatcher for Parked {
        fn deliver_network_packet(
            &self,
            _: &dyn LinkEndpoint,
            _: &LinkAddress,
            _: &LinkAddress,
            _: EtherType,
            _: PacketBuffer,
        ) {
            self.entered.wait();
            self.release.wait();
        }
    }

    fn endpoint(capacity: usize) -> Endpoint {
        Endpoint::new(capacity, 1500, "02:00:00:00:00:01".parse().unwrap())
    }

    fn write(endpoint: &Endpoint, data: &[u8]) -> Result<()> {
        let packet = PacketBuffer::from_data(data.to_vec());
        endpoint.write_packet(&Route::default(), None, EtherType::Ipv4, packet)
    }

    #[test]
    fn write_and_read() {
        let endpoint = endpoint(4);
        let gso = Arc::new(Gso {
            kind: GsoType::TcpV4,
            needs_checksum: true,
            checksum_offset: 16,
            mss: 1460,
            l3_header_len: 20,
            max_size: GSO_MAX_SIZE,
        });

        let packet = PacketBuffer {
            header: View::from_bytes(&[0xff]),
            data: vec![1u8, 2, 3].into(),
        };
        assert_eq!(endpoint.write_packet(&Route::default(), Some(gso.clone()), EtherType::Ipv6, packet.clone()), Ok(()));

        let info = endpoint.read().unwrap();
        assert_eq!(info.packet, packet);
        assert_eq!(info.protocol, Some(EtherType::Ipv6));
        assert!(Arc::ptr_eq(info.gso.as_ref().unwrap(), &gso));
        assert_eq!(endpoint.try_read(), Ok(None));
    }

    #[test]
    fn congestion_drops_silently() {
        let endpoint = endpoint(2);
        for i in 0..5 {
            assert_eq!(write(&endpoint, &[i]), Ok(()));
        }

        assert_eq!(endpoint.len(), 2);
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![0]);
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![1]);
        assert!(endpoint.is_empty());
    }

    #[test]
    fn raw_packet() {
        let endpoint = endpoint(1);
        assert_eq!(endpoint.write_raw_packet(vec![9u8, 9].into()), Ok(()));
        assert_eq!(endpoint.write_raw_packet(vec![8u8].into()), Ok(()));

        let info = endpoint.read().unwrap();
        assert_eq!(info.protocol, None);
        assert_eq!(info.gso, None);
        assert_eq!(info.packet.header, View::default());
        assert_eq!(info.packet.to_vec(), vec![9, 9]);
        assert_eq!(endpoint.drain(), 0);
    }

    #[test]
    fn batch_slices_payload() {
        let endpoint = endpoint(8);
        let payload = VectorisedView::new(vec![
            View::from_bytes(&[0, 1, 2]),
            View::from_bytes(&[3, 4, 5, 6]),
        ]);
        let descriptors = [
            PacketDescriptor { header: View::from_bytes(&[0xa]), off: 0, size: 2 },
            PacketDescriptor { header: View::from_bytes(&[0xb]), off: 2, size: 4 },
            PacketDescriptor { header: View::from_bytes(&[0xc]), off: 6, size: 1 },
        ];

        let count = endpoint.write_packets(&Route::default(), None, &descriptors, &payload, EtherType::Ipv4);
        assert_eq!(count, Ok(3));
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![0xa, 0, 1]);
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![0xb, 2, 3, 4, 5]);
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![0xc, 6]);
    }

    #[test]
    fn batch_out_of_bounds() {
        let endpoint = endpoint(8);
        let payload = VectorisedView::from(vec![0u8; 4]);
        let descriptors = [
            PacketDescriptor { header: View::default(), off: 0, size: 2 },
            PacketDescriptor { header: View::default(), off: 3, size: 2 },
        ];

        let result = endpoint.write_packets(&Route::default(), None, &descriptors, &payload, EtherType::Ipv4);
        assert_eq!(result, Err(Error::BadSize));
        assert!(endpoint.is_empty());

        let overflow = [PacketDescriptor { header: View::default(), off: usize::MAX, size: 2 }];
        let result = endpoint.write_packets(&Route::default(), None, &overflow, &payload, EtherType::Ipv4);
        assert_eq!(result, Err(Error::BadSize));
    }

    #[test]
    fn inject_delivers() {
        let endpoint = endpoint(1);
        let recorder = Arc::new(Recorder::default());
        assert!(!endpoint.is_attached());

        let weak = Arc::downgrade(&recorder);
        endpoint.attach(weak);
        assert!(endpoint.is_attached());

        let remote: LinkAddress = "aa:bb".parse().unwrap();
        endpoint.inject_inbound(EtherType::Arp, PacketBuffer::from_data(vec![1u8]));
        endpoint.inject_link_addr(EtherType::Ipv4, &remote, PacketBuffer::from_data(vec![2u8]));

        let frames = recorder.frames.lock().unwrap();
        assert_eq!(*frames, vec![
            (LinkAddress::unspecified(), LinkAddress::unspecified(), EtherType::Arp, vec![1]),
            (remote, LinkAddress::unspecified(), EtherType::Ipv4, vec![2]),
        ]);
    }

    #[test]
    fn inject_without_dispatcher() {
        let endpoint = endpoint(1);
        endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![1u8]));

        let recorder = Arc::new(Recorder::default());
        let weak = Arc::downgrade(&recorder);
        endpoint.attach(weak);
        drop(recorder);

        assert!(!endpoint.is_attached());
        endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![1u8]));
    }

    #[test]
    fn reattach_replaces() {
        let endpoint = endpoint(1);
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let weak = Arc::downgrade(&first);
        endpoint.attach(weak);
        let weak = Arc::downgrade(&second);
        endpoint.attach(weak);
        endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![1u8]));

        assert!(first.frames.lock().unwrap().is_empty());
        assert_eq!(second.frames.lock().unwrap().len(), 1);
    }

    #[test]
    fn dispatcher_may_write_back() {
        let endpoint = endpoint(2);
        let echo = Arc::new(Echo);
        let weak = Arc::downgrade(&echo);
        endpoint.attach(weak);

        endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![7u8, 7]));
        let info = endpoint.try_read().unwrap().unwrap();
        assert_eq!(info.packet.to_vec(), vec![7, 7]);
        assert_eq!(info.protocol, Some(EtherType::Ipv4));
    }

    #[test]
    fn close_during_delivery() {
        let endpoint = endpoint(2);
        let parked = Arc::new(Parked { entered: Barrier::new(2), release: Barrier::new(2) });
        let weak = Arc::downgrade(&parked);
        endpoint.attach(weak);

        thread::scope(|scope| {
            let delivery = scope.spawn(|| {
                endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![1u8]));
            });

            parked.entered.wait();
            endpoint.close();
            assert!(endpoint.is_closed());
            assert!(!delivery.is_finished());
            parked.release.wait();
        });

        assert_eq!(write(&endpoint, &[2]), Err(Error::ClosedEndpoint));
    }

    #[test]
    fn closed_endpoint() {
        let endpoint = endpoint(2);
        let recorder = Arc::new(Recorder::default());
        let weak = Arc::downgrade(&recorder);
        endpoint.attach(weak);
        assert_eq!(write(&endpoint, &[1]), Ok(()));

        endpoint.close();
        endpoint.close();
        assert!(endpoint.is_closed());

        assert_eq!(write(&endpoint, &[2]), Err(Error::ClosedEndpoint));
        assert_eq!(endpoint.write_raw_packet(vec![3u8].into()), Err(Error::ClosedEndpoint));
        let batch = endpoint.write_packets(&Route::default(), None, &[], &VectorisedView::default(), EtherType::Ipv4);
        assert_eq!(batch, Err(Error::ClosedEndpoint));

        endpoint.inject_inbound(EtherType::Ipv4, PacketBuffer::from_data(vec![4u8]));
        assert!(recorder.frames.lock().unwrap().is_empty());

        // Queued before closing, still readable.
        assert_eq!(endpoint.read().unwrap().packet.to_vec(), vec![1]);
        assert_eq!(endpoint.read(), Err(Error::ChannelClosed));
        assert_eq!(endpoint.try_read(), Err(Error::ChannelClosed));
    }

    #[test]
    fn capabilities() {
        let plain = endpoint(1);
        assert_eq!(plain.capabilities(), Capabilities::empty());
        assert!(!plain.capabilities().hardware_gso());

        let gso = Endpoint::with_gso(1, 9000, LinkAddress::unspecified(), true);
        assert!(gso.capabilities().hardware_gso());
        assert_eq!(gso.mtu(), 9000);
        assert_eq!(gso.max_header_length(), 0);
        assert_eq!(gso.gso_max_size(), 32768);
        assert_eq!(gso.capacity(), 1);
        gso.wait();
    }
}
