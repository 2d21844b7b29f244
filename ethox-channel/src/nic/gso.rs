/// Upper bound on the size of a packet handed over for segmentation offload.
pub const GSO_MAX_SIZE: u32 = 1 << 15;

/// The kind of segmentation requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GsoType {
    /// No segmentation.
    None,
    /// Segment a TCP over IPv4 packet.
    TcpV4,
    /// Segment a TCP over IPv6 packet.
    TcpV6,
}

/// Parameters for segmentation offload of one packet.
///
/// Links carry this next to the packet they belong to. Splitting the packet is the job of
/// whoever finally transmits it, a link endpoint never interprets these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gso {
    /// The kind of segmentation.
    pub kind: GsoType,
    /// Whether the transport checksum still needs to be computed.
    pub needs_checksum: bool,
    /// Offset of the transport checksum from the start of the transport header.
    pub checksum_offset: u16,
    /// Maximum segment size.
    pub mss: u16,
    /// The length of the network layer header.
    pub l3_header_len: u16,
    /// The largest packet to segment.
    pub max_size: u32,
}
