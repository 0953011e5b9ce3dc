// [libs/core-ipgen/src/ip.rs]
//! Dotted-quad <-> u32 conversions, matching `socket.inet_aton`/`inet_ntoa`
//! byte order (network / big-endian).

use std::fmt;
use std::net::Ipv4Addr;

/// Parses a dotted-quad string into its big-endian `u32` representation.
pub fn ip_to_u32(ip: &str) -> Result<u32, std::net::AddrParseError> {
    ip.parse::<Ipv4Addr>().map(u32::from)
}

/// Renders a big-endian `u32` as a dotted-quad string.
pub fn u32_to_ip(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Thin wrapper so callers can `Display` an address without allocating
/// at every call site.
pub struct DottedQuad(pub u32);

impl fmt::Display for DottedQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv4Addr::from(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_dotted_quad() {
        assert_eq!(ip_to_u32("9.255.255.0").unwrap(), 0x09FF_FF00);
        assert_eq!(u32_to_ip(0x09FF_FF00), "9.255.255.0");
    }

    #[test]
    fn matches_class_a_private_base() {
        assert_eq!(ip_to_u32("10.0.0.0").unwrap(), 0x0A00_0000);
    }
}
