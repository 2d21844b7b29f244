//! Configuration of a channel endpoint.
use structopt::StructOpt;

use crate::nic::channel::Endpoint;
use crate::wire::LinkAddress;

/// The construction parameters of a channel endpoint.
///
/// Can be parsed from command line arguments, for drivers that prepend these to their own.
#[derive(Clone, Debug, PartialEq, Eq, StructOpt)]
pub struct Config {
    /// Number of outbound packets queued before dropping.
    #[structopt(long, default_value = "256")]
    pub capacity: usize,

    /// The maximum transmission unit advertised to the stack.
    #[structopt(long, default_value = "1500")]
    pub mtu: u32,

    /// The link address of the endpoint, as colon separated hex octets.
    #[structopt(long = "link-address", default_value = "02:00:00:00:00:01")]
    pub link_address: LinkAddress,

    /// Advertise hardware segmentation offload.
    #[structopt(long)]
    pub gso: bool,
}

impl Config {
    /// Parse the configuration from the process arguments.
    pub fn from_args() -> Self {
        StructOpt::from_args()
    }

    /// Create an endpoint with this configuration.
    pub fn build(&self) -> Endpoint {
        Endpoint::with_gso(self.capacity, self.mtu, self.link_address.clone(), self.gso)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: 256,
            mtu: 1500,
            link_address: LinkAddress::from_bytes(&[0x02, 0, 0, 0, 0, 0x01]),
            gso: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nic::{Capabilities, LinkEndpoint};

    #[test]
    fn defaults_match_arguments() {
        let parsed = Config::from_iter(&["channel"]);
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn parse_arguments() {
        let config = Config::from_iter(&[
            "channel",
            "--capacity", "2",
            "--mtu", "9000",
            "--link-address", "aa:bb",
            "--gso",
        ]);

        let endpoint = config.build();
        assert_eq!(endpoint.capacity(), 2);
        assert_eq!(endpoint.mtu(), 9000);
        assert_eq!(endpoint.link_address().as_bytes(), &[0xaa, 0xbb]);
        assert_eq!(endpoint.capabilities(), Capabilities::HARDWARE_GSO);
    }

    #[test]
    fn reject_bad_address() {
        let result = Config::from_iter_safe(&["channel", "--link-address", "zz"]);
        assert!(result.is_err());
    }
}
