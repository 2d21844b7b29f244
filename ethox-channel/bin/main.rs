//! Pumps frames through a channel endpoint.
//!
//! Builds an endpoint from the arguments, attaches a dispatcher counting inbound frames and
//! spawns a reader collecting the outbound queue. Then writes and injects some Ethernet framed
//! packets and reports how many of them made it. Call example:
//!
//! * `channel-pump --capacity 16 --link-address 02:00:00:00:00:01 --frames 1000 --size 1400`
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use structopt::StructOpt;

use ethox_channel::config::Config;
use ethox_channel::nic::{LinkEndpoint, NetworkDispatcher, Route};
use ethox_channel::wire::{ethernet, EtherType, LinkAddress, PacketBuffer, View};

#[derive(StructOpt)]
struct Args {
    #[structopt(flatten)]
    config: Config,

    /// Number of frames to send in each direction.
    #[structopt(long, default_value = "64")]
    frames: usize,

    /// Payload bytes per frame, excluding the Ethernet header.
    #[structopt(long, default_value = "1024")]
    size: usize,
}

/// Counts delivered frames and their bytes.
#[derive(Default)]
struct Counter {
    frames: AtomicUsize,
    bytes: AtomicUsize,
}

impl NetworkDispatcher for Counter {
    fn deliver_network_packet(
        &self,
        _: &dyn LinkEndpoint,
        _: &LinkAddress,
        _: &LinkAddress,
        _: EtherType,
        packet: PacketBuffer,
    ) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(packet.size(), Ordering::Relaxed);
    }
}

fn frame(src: ethernet::Address, seq: usize, size: usize) -> PacketBuffer {
    let mut header = vec![0; ethernet::Repr::HEADER_LEN];
    ethernet::Repr {
        src_addr: src,
        dst_addr: ethernet::Address::BROADCAST,
        ethertype: EtherType::Ipv4,
    }.emit(&mut header);

    let payload = (0..size).map(|i| (seq + i) as u8).collect::<Vec<_>>();
    PacketBuffer {
        header: View::from(header),
        data: payload.into(),
    }
}

fn main() {
    // Set RUST_LOG to see the endpoint's own logging.
    env_logger::init();

    let args = Args::from_args();
    let endpoint = Arc::new(args.config.build());
    let counter = Arc::new(Counter::default());
    let dispatcher: Arc<dyn NetworkDispatcher> = counter.clone();
    endpoint.attach(Arc::downgrade(&dispatcher));

    println!("[+] Endpoint {} with room for {} packets",
        endpoint.link_address(), endpoint.capacity());

    let reader = {
        let endpoint = Arc::clone(&endpoint);
        thread::spawn(move || {
            let mut packets = 0usize;
            let mut bytes = 0usize;
            while let Ok(info) = endpoint.read() {
                packets += 1;
                bytes += info.packet.size();
            }
            (packets, bytes)
        })
    };

    let src = ethernet::Address([0x02, 0, 0, 0, 0, 0x02]);
    let route = Route::default();
    for seq in 0..args.frames {
        endpoint.write_packet(&route, None, EtherType::Ipv4, frame(src, seq, args.size))
            .expect("Endpoint closed while writing");
        endpoint.inject_inbound(EtherType::Ipv4, frame(src, seq, args.size));
    }

    endpoint.close();
    let (read, read_bytes) = reader.join().expect("Reader panicked");

    println!("[+] Written:   {} frames", args.frames);
    println!("[+] Read:      {} frames, {} bytes", read, read_bytes);
    println!("[+] Dropped:   {} frames", args.frames - read);
    println!("[+] Delivered: {} frames, {} bytes",
        counter.frames.load(Ordering::Relaxed),
        counter.bytes.load(Ordering::Relaxed));
}
