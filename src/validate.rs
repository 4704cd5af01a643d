//! Syntactic checks on user input. Everything here runs before the zone store is contacted.

use crate::error::ValidationError;
use std::net::{Ipv4Addr, Ipv6Addr};
use trust_dns_proto::rr::domain::{Label, Name};

/// Largest TTL a record may carry (RFC 2181 §8).
pub const MAX_TTL: u32 = 2_147_483_647;

/// Maximum length of a domain name in dotted form, excluding the final dot.
pub const MAX_NAME_LEN: usize = 253;

/// Parse a TTL, accepting `1..=MAX_TTL`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTtl`] carrying the literal input on failure.
pub fn ttl(value: &str) -> Result<u32, ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(ttl) if (1..=MAX_TTL).contains(&ttl) => Ok(ttl),
        _ => Err(ValidationError::InvalidTtl(value.to_string())),
    }
}

/// Parse a domain name in presentation form. A single trailing dot makes it fully qualified,
/// and `.` alone is the root.
///
/// # Errors
///
/// Returns a short reason describing the first problem found.
pub fn domain_name(name: &str) -> Result<Name, String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    let parsed = Name::from_ascii(name).map_err(|err| err.to_string())?;
    name_length(&parsed)?;
    Ok(parsed)
}

/// Names are limited to 253 characters in dotted form, not counting the final dot.
///
/// # Errors
///
/// Returns a short reason when `name` is too long.
pub fn name_length(name: &Name) -> Result<(), String> {
    // Name::len counts the final dot even for relative names.
    if name.len() > MAX_NAME_LEN + 1 {
        return Err(format!("name is longer than {MAX_NAME_LEN} characters"));
    }
    Ok(())
}

/// Validate a domain name field and return it dot-terminated.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDomainName`] naming the field.
pub fn fqdn(field: &str, value: &str) -> Result<String, ValidationError> {
    let mut name = domain_name(value).map_err(|reason| ValidationError::InvalidDomainName {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    })?;
    name.set_fqdn(true);
    Ok(name.to_ascii())
}

/// # Errors
///
/// Returns [`ValidationError::InvalidIpv4`] for anything but a dotted-quad IPv4 literal.
pub fn ipv4(field: &str, value: &str) -> Result<Ipv4Addr, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::InvalidIpv4 {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// # Errors
///
/// Returns [`ValidationError::InvalidIpv6`] for anything but an IPv6 literal. IPv4 literals
/// are rejected as the wrong address family.
pub fn ipv6(field: &str, value: &str) -> Result<Ipv6Addr, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::InvalidIpv6 {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Parse an unsigned integer that must fit in `width` bits.
///
/// # Errors
///
/// Returns [`ValidationError::Range`] naming the field and width.
pub fn uint(field: &str, value: &str, width: u8) -> Result<u32, ValidationError> {
    let parsed = match width {
        8 => value.parse::<u8>().map(u32::from).ok(),
        16 => value.parse::<u16>().map(u32::from).ok(),
        _ => value.parse::<u32>().ok(),
    };
    parsed.ok_or_else(|| ValidationError::Range {
        field: field.to_string(),
        width,
        value: value.to_string(),
    })
}

/// Usernames become a single label of the zone name, so they follow label syntax, restricted
/// to letters, digits, `-` and `_`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUsername`] for empty, dotted or otherwise invalid names.
pub fn username(username: &str) -> Result<Label, ValidationError> {
    let lowered = username.trim().to_ascii_lowercase();
    let allowed = lowered
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    match Label::from_ascii(&lowered) {
        Ok(label) if allowed => Ok(label),
        _ => Err(ValidationError::InvalidUsername(username.to_string())),
    }
}
