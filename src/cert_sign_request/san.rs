use std::net::{IpAddr, Ipv4Addr};

use log::debug;
use once_cell::sync::Lazy;
use rcgen::{Ia5String, SanType};
use regex::Regex;

use crate::{error::CsrError, utils::LineSource};

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})\.){3}(?:25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})$",
    )
    .expect("IPv4 pattern is valid")
});

// Hostname heuristic, not RFC 1123: `*` and `_` are accepted in any label.
static DNS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\-_*]+\.)+[a-z]{2,}$")
        .expect("DNS pattern is valid")
});

pub fn is_ipv4_address(value: &str) -> bool {
    IPV4_RE.is_match(value)
}

pub fn is_dns_name(value: &str) -> bool {
    DNS_RE.is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    DnsName(String),
    IpAddress(IpAddr),
}

/// Classifies one trimmed SAN entry. `None` if it is neither a DNS name nor
/// an IPv4 address.
pub fn classify(value: &str) -> Option<SanEntry> {
    if is_dns_name(value) {
        Some(SanEntry::DnsName(value.to_owned()))
    } else if is_ipv4_address(value) {
        parse_ipv4(value).map(|ip| SanEntry::IpAddress(IpAddr::V4(ip)))
    } else {
        None
    }
}

// `Ipv4Addr::from_str` rejects "01.2.3.4", the pattern above does not.
fn parse_ipv4(value: &str) -> Option<Ipv4Addr> {
    let mut groups = value.split('.');
    let mut octets = [0u8; 4];
    for octet in octets.iter_mut() {
        *octet = groups.next()?.parse().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

/// Outcome of offering one value to [`SubjectAltNames::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    DnsName,
    IpAddress,
    Duplicate,
    Unrecognized,
}

/// The ordered, duplicate free SAN sets of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltNames {
    dns_names: Vec<String>,
    ip_addresses: Vec<IpAddr>,
}

impl SubjectAltNames {
    /// Starts the DNS set with the common name, whatever it looks like.
    pub fn new(common_name: &str) -> Self {
        Self {
            dns_names: vec![common_name.to_owned()],
            ip_addresses: Vec::new(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.dns_names.iter().any(|name| name == value)
            || self.ip_addresses.iter().any(|ip| ip.to_string() == value)
    }

    pub fn insert(&mut self, value: &str) -> Insertion {
        if self.contains(value) {
            return Insertion::Duplicate;
        }
        match classify(value) {
            Some(SanEntry::DnsName(name)) => {
                self.dns_names.push(name);
                Insertion::DnsName
            }
            Some(SanEntry::IpAddress(ip)) if self.ip_addresses.contains(&ip) => {
                Insertion::Duplicate
            }
            Some(SanEntry::IpAddress(ip)) => {
                self.ip_addresses.push(ip);
                Insertion::IpAddress
            }
            None => Insertion::Unrecognized,
        }
    }

    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    pub fn ip_addresses(&self) -> &[IpAddr] {
        &self.ip_addresses
    }

    /// DNS names first, then IP addresses, each in insertion order.
    pub fn to_san_types(&self) -> Result<Vec<SanType>, rcgen::Error> {
        let mut san =
            Vec::with_capacity(self.dns_names.len() + self.ip_addresses.len());
        for name in &self.dns_names {
            san.push(SanType::DnsName(Ia5String::try_from(name.clone())?));
        }
        san.extend(self.ip_addresses.iter().copied().map(SanType::IpAddress));
        Ok(san)
    }
}

/// Reads SAN entries until a blank line or the end of input.
pub fn collect_sans(
    input: &mut impl LineSource,
    sans: &mut SubjectAltNames,
) -> Result<(), CsrError> {
    while let Some(line) = input.read_line("SAN Field: ")? {
        let value = line.trim();
        if value.is_empty() {
            break;
        }
        match sans.insert(value) {
            Insertion::Duplicate => {
                println!("{value} is already in the SAN fields.")
            }
            Insertion::Unrecognized => {
                println!("The provided string isn't an IP or a DNS name.")
            }
            kind => debug!("added {value} to the SAN fields as {kind:?}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::utils::scripted::ScriptedInput;

    #[test]
    fn ipv4_boundaries() {
        for ip in ["0.0.0.0", "10.0.0.1", "192.168.1.254", "255.255.255.255"] {
            assert!(is_ipv4_address(ip), "{ip} should be an IPv4 address");
        }
        for not_ip in [
            "256.1.1.1",
            "1.1.1.256",
            "1.1.1",
            "1.1.1.1.1",
            "1..1.1",
            "a.b.c.d",
            "25525525510",
            " 1.1.1.1",
        ] {
            assert!(!is_ipv4_address(not_ip), "{not_ip} is not an IPv4 address");
        }
    }

    #[test]
    fn dns_pattern() {
        for name in [
            "a.bc",
            "example.com",
            "www.example.com",
            "*.example.com",
            "_acme-challenge.Example.org",
            "host-1.internal.lan",
        ] {
            assert!(is_dns_name(name), "{name} should look like a hostname");
        }
        for not_name in [
            "localhost",
            "a.b",
            "example.COM",
            "example.c0m",
            ".com",
            "example..com",
            "exa mple.com",
            "10.0.0.1",
        ] {
            assert!(!is_dns_name(not_name), "{not_name} is not a hostname");
        }
    }

    #[test]
    fn classify_picks_one_kind() {
        assert_eq!(
            classify("www.example.com"),
            Some(SanEntry::DnsName("www.example.com".into()))
        );
        assert_eq!(
            classify("10.0.0.1"),
            Some(SanEntry::IpAddress(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))))
        );
        assert_eq!(
            classify("01.2.3.4"),
            Some(SanEntry::IpAddress(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))))
        );
        assert_eq!(classify("not a name"), None);
        assert_eq!(classify("::1"), None);
    }

    #[test]
    fn common_name_is_always_present() {
        let sans = SubjectAltNames::new("example.com");
        assert_eq!(sans.dns_names(), ["example.com"]);
        assert!(sans.ip_addresses().is_empty());
        assert!(sans.contains("example.com"));
    }

    #[test]
    fn second_insertion_is_a_duplicate() {
        let mut sans = SubjectAltNames::new("example.com");
        assert_eq!(sans.insert("www.example.com"), Insertion::DnsName);
        assert_eq!(sans.insert("www.example.com"), Insertion::Duplicate);
        assert_eq!(sans.insert("10.0.0.1"), Insertion::IpAddress);
        assert_eq!(sans.insert("10.0.0.1"), Insertion::Duplicate);
        assert_eq!(sans.insert("10.00.0.1"), Insertion::Duplicate);
        assert_eq!(sans.dns_names(), ["example.com", "www.example.com"]);
        assert_eq!(sans.ip_addresses().len(), 1);
    }

    #[test]
    fn value_never_lands_in_both_sets() {
        let mut sans = SubjectAltNames::new("10.0.0.1");
        assert_eq!(sans.insert("10.0.0.1"), Insertion::Duplicate);
        assert!(sans.ip_addresses().is_empty());
    }

    #[test]
    fn unrecognized_values_are_dropped() {
        let mut sans = SubjectAltNames::new("example.com");
        assert_eq!(sans.insert("300.1.1.1"), Insertion::Unrecognized);
        assert_eq!(sans.insert("intranet"), Insertion::Unrecognized);
        assert_eq!(sans, SubjectAltNames::new("example.com"));
    }

    #[test]
    fn collector_stops_on_blank_line() {
        let mut input = ScriptedInput::new(&[
            "example.com",
            "www.example.com",
            "  10.0.0.1 ",
            "bogus",
            "",
            "never.read.com",
        ]);
        let mut sans = SubjectAltNames::new("example.com");
        collect_sans(&mut input, &mut sans).unwrap();

        assert_eq!(sans.dns_names(), ["example.com", "www.example.com"]);
        assert_eq!(
            sans.ip_addresses(),
            [IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))]
        );
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn collector_stops_at_end_of_input() {
        let mut input = ScriptedInput::new(&["api.example.com"]);
        let mut sans = SubjectAltNames::new("example.com");
        collect_sans(&mut input, &mut sans).unwrap();
        assert_eq!(sans.dns_names(), ["example.com", "api.example.com"]);
    }

    #[test]
    fn san_types_keep_order() {
        let mut sans = SubjectAltNames::new("example.com");
        sans.insert("192.168.0.1");
        sans.insert("b.example.com");
        sans.insert("10.0.0.1");
        let san = sans.to_san_types().unwrap();
        assert_eq!(san.len(), 4);
        assert!(matches!(&san[0], SanType::DnsName(name) if name.as_str() == "example.com"));
        assert!(matches!(&san[1], SanType::DnsName(name) if name.as_str() == "b.example.com"));
        assert_eq!(
            san[2],
            SanType::IpAddress(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)))
        );
        assert_eq!(san[3], SanType::IpAddress(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
    }
}
