//! Target specifications and address expansion.
//!
//! Provides target parsing supporting:
//! - Single IP addresses and hostnames (`10.0.0.5`, `db.internal`)
//! - CIDR notation (`192.168.1.0/24`, `2001:db8::/120`)
//! - Inclusive ranges (`10.0.0.1-10.0.0.20`)
//!
//! Hostnames are passed through unresolved and only looked up when a probe
//! connects to them.

use super::parsed::Parsed;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A single concrete thing to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScanAddress {
    /// A literal IP address.
    Ip(IpAddr),
    /// A hostname, resolved at connect time.
    Host(String),
}

impl ScanAddress {
    /// The IP address, if this is not a hostname.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            Self::Host(_) => None,
        }
    }
}

impl From<IpAddr> for ScanAddress {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(ip)
    }
}

impl fmt::Display for ScanAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Host(host) => write!(f, "{}", host),
        }
    }
}

/// Why a target specification was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("empty target specification")]
    Empty,
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("invalid address range: {0}")]
    InvalidRange(String),
    #[error("range bounds are of different address families")]
    MixedFamilies,
    #[error("range start {0} is after range end {1}")]
    ReversedRange(IpAddr, IpAddr),
    #[error("target too large: {0} addresses (max: {1})")]
    TooLarge(u128, u128),
}

/// Default ceiling on how many addresses one specification may expand to.
pub const MAX_HOSTS_PER_TARGET: u128 = 65536;

const PREALLOC_LIMIT: u128 = 65536;

/// Return the address one unit after `addr`.
///
/// The address is treated as a fixed-width big-endian byte string: the last
/// byte is incremented and overflow carries leftwards. Overflow of the first
/// byte wraps silently, so the all-ones address is followed by all-zeros.
pub fn next_address(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V4(v4) => {
            let mut octets = v4.octets();
            increment_bytes(&mut octets);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IpAddr::V6(v6) => {
            let mut octets = v6.octets();
            increment_bytes(&mut octets);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    }
}

fn increment_bytes(bytes: &mut [u8]) {
    for byte in bytes.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

fn block_size(network: &IpNetwork) -> u128 {
    let width: u32 = match network {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    };
    let host_bits = width - u32::from(network.prefix());
    if host_bits >= 128 {
        u128::MAX
    } else {
        1u128 << host_bits
    }
}

fn address_value(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4).into(),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Expand a CIDR block into its host addresses.
///
/// The given address is masked down to the network address and every
/// address the block contains is enumerated. Blocks of more than two
/// addresses lose their first (network) and last (broadcast) entries;
/// `/31`, `/32` and their IPv6 equivalents are returned whole.
pub fn expand_cidr(cidr: &str, max_hosts: u128) -> Result<Vec<IpAddr>, TargetError> {
    let parsed: IpNetwork = cidr
        .trim()
        .parse()
        .map_err(|_| TargetError::InvalidCidr(cidr.to_string()))?;
    let network = IpNetwork::new(parsed.network(), parsed.prefix())
        .map_err(|_| TargetError::InvalidCidr(cidr.to_string()))?;

    let size = block_size(&network);
    if size > max_hosts {
        return Err(TargetError::TooLarge(size, max_hosts));
    }

    let mut addresses = Vec::with_capacity(size.min(PREALLOC_LIMIT) as usize);
    let mut current = network.network();
    while network.contains(current) && (addresses.len() as u128) < size {
        addresses.push(current);
        current = next_address(current);
    }

    if addresses.len() > 2 {
        addresses.pop();
        addresses.remove(0);
    }

    Ok(addresses)
}

/// Expand an inclusive address range.
///
/// Enumeration runs from `start` until the cursor equals `end`, then `end`
/// is appended explicitly, so equal bounds yield a single address.
pub fn expand_range(start: IpAddr, end: IpAddr, max_hosts: u128) -> Result<Vec<IpAddr>, TargetError> {
    if start.is_ipv4() != end.is_ipv4() {
        return Err(TargetError::MixedFamilies);
    }

    let (low, high) = (address_value(start), address_value(end));
    if low > high {
        return Err(TargetError::ReversedRange(start, end));
    }
    let count = (high - low).saturating_add(1);
    if count > max_hosts {
        return Err(TargetError::TooLarge(count, max_hosts));
    }

    let mut addresses = Vec::with_capacity(count.min(PREALLOC_LIMIT) as usize);
    let mut current = start;
    while current != end {
        addresses.push(current);
        current = next_address(current);
    }
    addresses.push(end);

    Ok(addresses)
}

fn parse_range_spec(spec: &str, max_hosts: u128) -> Result<Vec<IpAddr>, TargetError> {
    let bounds: Vec<&str> = spec.split('-').collect();
    if bounds.len() != 2 {
        return Err(TargetError::InvalidRange(spec.to_string()));
    }

    let start: IpAddr = bounds[0]
        .trim()
        .parse()
        .map_err(|_| TargetError::InvalidRange(spec.to_string()))?;
    let end: IpAddr = bounds[1]
        .trim()
        .parse()
        .map_err(|_| TargetError::InvalidRange(spec.to_string()))?;

    expand_range(start, end, max_hosts)
}

/// Expand one target specification.
///
/// Dispatch is purely syntactic: a `/` means CIDR, otherwise a `-` means an
/// address range, otherwise the text is a single IP or hostname. Note that a
/// hostname containing `-` is therefore read as a (failing) range.
pub fn parse_target(spec: &str, max_hosts: u128) -> Parsed<ScanAddress, TargetError> {
    let spec = spec.trim();
    let mut parsed = Parsed::new();

    if spec.is_empty() {
        parsed.skip(spec, TargetError::Empty);
        return parsed;
    }

    let expanded = if spec.contains('/') {
        expand_cidr(spec, max_hosts)
    } else if spec.contains('-') {
        parse_range_spec(spec, max_hosts)
    } else {
        let address = match spec.parse::<IpAddr>() {
            Ok(ip) => ScanAddress::Ip(ip),
            Err(_) => ScanAddress::Host(spec.to_string()),
        };
        parsed.items.push(address);
        return parsed;
    };

    match expanded {
        Ok(ips) => parsed.items = ips.into_iter().map(ScanAddress::Ip).collect(),
        Err(e) => parsed.skip(spec, e),
    }
    parsed
}

/// Expand many target specifications, keeping their order.
pub fn parse_targets<I, S>(specs: I, max_hosts: u128) -> Parsed<ScanAddress, TargetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut all = Parsed::new();
    for spec in specs {
        all.extend(parse_target(spec.as_ref(), max_hosts));
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn strings(parsed: &Parsed<ScanAddress, TargetError>) -> Vec<String> {
        parsed.items.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_next_address_carries() {
        assert_eq!(next_address(ip("10.0.0.1")), ip("10.0.0.2"));
        assert_eq!(next_address(ip("10.0.0.255")), ip("10.0.1.0"));
        assert_eq!(next_address(ip("10.255.255.255")), ip("11.0.0.0"));
        assert_eq!(next_address(ip("::ff")), ip("::100"));
    }

    #[test]
    fn test_next_address_wraps() {
        assert_eq!(next_address(ip("255.255.255.255")), ip("0.0.0.0"));
        assert_eq!(
            next_address(ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")),
            ip("::")
        );
    }

    #[test]
    fn test_cidr_trims_network_and_broadcast() {
        let ips = expand_cidr("192.168.1.0/24", MAX_HOSTS_PER_TARGET).unwrap();
        assert_eq!(ips.len(), 254);
        assert_eq!(ips[0], ip("192.168.1.1"));
        assert_eq!(ips[253], ip("192.168.1.254"));

        let ips = expand_cidr("10.0.0.0/30", MAX_HOSTS_PER_TARGET).unwrap();
        assert_eq!(ips, vec![ip("10.0.0.1"), ip("10.0.0.2")]);
    }

    #[test]
    fn test_cidr_masks_host_bits() {
        let ips = expand_cidr("10.0.0.77/29", MAX_HOSTS_PER_TARGET).unwrap();
        assert_eq!(ips.len(), 6);
        assert_eq!(ips[0], ip("10.0.0.73"));
    }

    #[test]
    fn test_small_cidr_blocks_are_untrimmed() {
        assert_eq!(
            expand_cidr("10.0.0.4/31", MAX_HOSTS_PER_TARGET).unwrap(),
            vec![ip("10.0.0.4"), ip("10.0.0.5")]
        );
        assert_eq!(
            expand_cidr("10.0.0.9/32", MAX_HOSTS_PER_TARGET).unwrap(),
            vec![ip("10.0.0.9")]
        );
        assert_eq!(
            expand_cidr("255.255.255.255/32", MAX_HOSTS_PER_TARGET).unwrap(),
            vec![ip("255.255.255.255")]
        );
        assert_eq!(
            expand_cidr("2001:db8::1/128", MAX_HOSTS_PER_TARGET).unwrap(),
            vec![ip("2001:db8::1")]
        );
    }

    #[test]
    fn test_ipv6_cidr() {
        let ips = expand_cidr("2001:db8::/124", MAX_HOSTS_PER_TARGET).unwrap();
        assert_eq!(ips.len(), 14);
        assert_eq!(ips[0], ip("2001:db8::1"));
    }

    #[test]
    fn test_cidr_too_large() {
        assert!(matches!(
            expand_cidr("10.0.0.0/8", MAX_HOSTS_PER_TARGET),
            Err(TargetError::TooLarge(_, _))
        ));
        assert!(matches!(
            expand_cidr("::/0", MAX_HOSTS_PER_TARGET),
            Err(TargetError::TooLarge(_, _))
        ));
    }

    #[test]
    fn test_invalid_cidr() {
        assert!(matches!(
            expand_cidr("10.0.0.0/33", MAX_HOSTS_PER_TARGET),
            Err(TargetError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_range_inclusive() {
        let ips = expand_range(ip("10.0.0.254"), ip("10.0.1.1"), MAX_HOSTS_PER_TARGET).unwrap();
        assert_eq!(
            ips,
            vec![ip("10.0.0.254"), ip("10.0.0.255"), ip("10.0.1.0"), ip("10.0.1.1")]
        );
    }

    #[test]
    fn test_range_equal_bounds() {
        let parsed = parse_target("10.0.0.1-10.0.0.1", MAX_HOSTS_PER_TARGET);
        assert_eq!(strings(&parsed), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_range_rejections() {
        assert_eq!(
            expand_range(ip("10.0.0.5"), ip("10.0.0.1"), MAX_HOSTS_PER_TARGET),
            Err(TargetError::ReversedRange(ip("10.0.0.5"), ip("10.0.0.1")))
        );
        assert_eq!(
            expand_range(ip("10.0.0.1"), ip("::1"), MAX_HOSTS_PER_TARGET),
            Err(TargetError::MixedFamilies)
        );
        assert!(matches!(
            expand_range(ip("10.0.0.0"), ip("10.2.0.0"), MAX_HOSTS_PER_TARGET),
            Err(TargetError::TooLarge(_, _))
        ));
    }

    #[test]
    fn test_parse_target_dispatch() {
        assert_eq!(strings(&parse_target("10.0.0.5", 16)), vec!["10.0.0.5"]);
        assert_eq!(strings(&parse_target(" scanme.example ", 16)), vec!["scanme.example"]);
        assert_eq!(parse_target("10.0.0.0/30", 16).items.len(), 2);
        assert_eq!(parse_target("10.0.0.1-10.0.0.3", 16).items.len(), 3);
        assert!(matches!(
            parse_target("example.com", 16).items[0],
            ScanAddress::Host(_)
        ));
    }

    #[test]
    fn test_malformed_targets_are_skipped() {
        for spec in ["10.0.0.1-100", "my-host.example", "10.0.0.0/abc", "", "a-b-c"] {
            let parsed = parse_target(spec, 16);
            assert!(parsed.items.is_empty(), "{spec} should expand to nothing");
            assert_eq!(parsed.skipped.len(), 1);
        }
    }

    #[test]
    fn test_parse_targets_keeps_order() {
        let parsed = parse_targets(["10.0.0.9", "bad-range", "10.0.0.1-10.0.0.2"], 16);
        assert_eq!(strings(&parsed), vec!["10.0.0.9", "10.0.0.1", "10.0.0.2"]);
        assert_eq!(parsed.skipped[0].input, "bad-range");
    }
}
