use bitflags::bitflags;

bitflags! {
    /// Operations supported natively by a link.
    ///
    /// A link starts out with no support for anything, `Capabilities::empty()`, and adds those
    /// for which it can provide support. Most of them concern offloading of work that the stack
    /// would otherwise perform itself.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Received packets have their checksums verified.
        const RX_CHECKSUM_OFFLOAD = 1 << 0;
        /// The link fills in checksums of sent packets.
        const TX_CHECKSUM_OFFLOAD = 1 << 1;
        /// Link addresses must be resolved before sending.
        const RESOLUTION_REQUIRED = 1 << 2;
        /// The link state can be saved and restored.
        const SAVE_RESTORE = 1 << 3;
        /// The link may be disconnected without tearing down the stack.
        const DISCONNECT_OK = 1 << 4;
        /// Sent packets are looped back to the sender.
        const LOOPBACK = 1 << 5;
        /// Large packets are segmented by the link itself.
        const HARDWARE_GSO = 1 << 6;
        /// Large packets are segmented in software before reaching the link.
        const SOFTWARE_GSO = 1 << 7;
    }
}

impl Capabilities {
    /// Query whether the link segments large packets itself.
    pub fn hardware_gso(&self) -> bool {
        self.contains(Capabilities::HARDWARE_GSO)
    }
}
