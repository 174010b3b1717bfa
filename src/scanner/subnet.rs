use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

/// Reasons a CIDR string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("Empty CIDR range")]
    Empty,

    #[error("Missing '/prefix' in CIDR notation: {0}")]
    MissingPrefix(String),

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefix(String),

    #[error("Prefix length {0} is out of range (0-32)")]
    PrefixOutOfRange(u32),
}

/// An IPv4 network computed from `A.B.C.D/prefix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    prefix: u8,
    mask: u32,
    start: u32,
    end: u32,
}

impl Subnet {
    /// Parse a CIDR string and compute the inclusive address range it covers.
    ///
    /// Host bits in the address are ignored: `10.0.0.77/24` covers
    /// `10.0.0.0` through `10.0.0.255`.
    pub fn parse(input: &str) -> Result<Self, CidrError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(CidrError::Empty);
        }

        let (addr, prefix) = input
            .split_once('/')
            .ok_or_else(|| CidrError::MissingPrefix(input.to_string()))?;

        let addr = Ipv4Addr::from_str(addr.trim())
            .map_err(|_| CidrError::InvalidAddress(addr.to_string()))?;

        let prefix: u32 = prefix
            .trim()
            .parse()
            .map_err(|_| CidrError::InvalidPrefix(prefix.to_string()))?;

        let prefix = u8::try_from(prefix)
            .ok()
            .filter(|p| *p <= 32)
            .ok_or(CidrError::PrefixOutOfRange(prefix))?;

        Ok(Self::from_parts(addr, prefix))
    }

    fn from_parts(addr: Ipv4Addr, prefix: u8) -> Self {
        let mask = prefix_mask(prefix);
        let start = u32::from(addr) & mask;
        let end = start | !mask;

        Self {
            prefix,
            mask,
            start,
            end,
        }
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask)
    }

    pub fn start(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start)
    }

    pub fn end(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end)
    }

    /// Numeric inclusive bounds, suitable for [`AddressList::build`](super::AddressList::build)
    pub fn bounds(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    /// Number of addresses in the range. A `/0` holds 2^32, hence `u64`.
    pub fn total(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start(), self.prefix)
    }
}

impl FromStr for Subnet {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Top `prefix` bits set. Shifting a `u32` by 32 is not defined, so /0 maps
/// to an empty mask explicitly.
fn prefix_mask(prefix: u8) -> u32 {
    u32::MAX
        .checked_shl(32 - u32::from(prefix))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use ipnetwork::Ipv4Network;

    use super::*;

    #[test]
    fn test_slash_30() {
        let subnet = Subnet::parse("192.168.1.0/30").unwrap();
        assert_eq!(subnet.total(), 4);
        assert_eq!(subnet.start(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(subnet.end(), Ipv4Addr::new(192, 168, 1, 3));
        assert_eq!(subnet.mask(), Ipv4Addr::new(255, 255, 255, 252));
    }

    #[test]
    fn test_slash_24_drops_host_bits() {
        let subnet = Subnet::parse("10.0.0.77/24").unwrap();
        assert_eq!(subnet.total(), 256);
        assert_eq!(subnet.start(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(subnet.end(), Ipv4Addr::new(10, 0, 0, 255));
        assert_eq!(subnet.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_slash_32_is_single_host() {
        let subnet = Subnet::parse("8.8.4.4/32").unwrap();
        assert_eq!(subnet.total(), 1);
        assert_eq!(subnet.start(), subnet.end());
        assert_eq!(subnet.mask(), Ipv4Addr::BROADCAST);
    }

    #[test]
    fn test_slash_1() {
        let subnet = Subnet::parse("200.1.2.3/1").unwrap();
        assert_eq!(subnet.start(), Ipv4Addr::new(128, 0, 0, 0));
        assert_eq!(subnet.end(), Ipv4Addr::BROADCAST);
        assert_eq!(subnet.total(), 1 << 31);
    }

    #[test]
    fn test_slash_0_covers_everything() {
        let subnet = Subnet::parse("172.16.5.4/0").unwrap();
        assert_eq!(subnet.mask(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(subnet.start(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(subnet.end(), Ipv4Addr::BROADCAST);
        assert_eq!(subnet.total(), 1 << 32);
    }

    #[test]
    fn test_total_for_every_prefix() {
        for prefix in 1..=32u8 {
            let subnet = Subnet::parse(&format!("192.168.100.200/{prefix}")).unwrap();
            let (start, end) = subnet.bounds();
            assert_eq!(subnet.total(), 1u64 << (32 - prefix), "prefix {prefix}");
            assert_eq!(u64::from(end) - u64::from(start) + 1, subnet.total());
            assert!(end >= start);
        }
    }

    #[test]
    fn test_agrees_with_ipnetwork() {
        let addr = Ipv4Addr::new(93, 184, 216, 34);
        for prefix in 1..=32u8 {
            let subnet = Subnet::parse(&format!("{addr}/{prefix}")).unwrap();
            let network = Ipv4Network::new(addr, prefix).unwrap();
            assert_eq!(subnet.mask(), network.mask(), "prefix {prefix}");
            assert_eq!(subnet.start(), network.network(), "prefix {prefix}");
            assert_eq!(subnet.end(), network.broadcast(), "prefix {prefix}");
        }
    }

    #[test]
    fn test_prefix_bound_matches_ipnetwork() {
        let addr = Ipv4Addr::new(10, 1, 2, 3);
        for prefix in 0..=40u8 {
            let ours = Subnet::parse(&format!("{addr}/{prefix}"));
            let theirs = Ipv4Network::new(addr, prefix);
            assert_eq!(ours.is_ok(), theirs.is_ok(), "prefix {prefix}");
            if theirs.is_err() {
                assert_eq!(ours, Err(CidrError::PrefixOutOfRange(prefix.into())));
            }
        }
    }

    #[test]
    fn test_rejects_missing_prefix() {
        assert_eq!(
            Subnet::parse("10.0.0.1"),
            Err(CidrError::MissingPrefix("10.0.0.1".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(matches!(
            Subnet::parse("10.0.0/24"),
            Err(CidrError::InvalidAddress(_))
        ));
        assert!(matches!(
            Subnet::parse("256.1.1.1/24"),
            Err(CidrError::InvalidAddress(_))
        ));
        assert!(matches!(
            Subnet::parse("example.com/24"),
            Err(CidrError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rejects_bad_prefix() {
        assert_eq!(
            Subnet::parse("10.0.0.0/33"),
            Err(CidrError::PrefixOutOfRange(33))
        );
        assert_eq!(
            Subnet::parse("10.0.0.0/4000"),
            Err(CidrError::PrefixOutOfRange(4000))
        );
        assert!(matches!(
            Subnet::parse("10.0.0.0/-1"),
            Err(CidrError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Subnet::parse("10.0.0.0/"),
            Err(CidrError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Subnet::parse("   "), Err(CidrError::Empty));
    }
}
