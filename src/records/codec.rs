//! Translation between [`FieldValueSet`]s and the canonical content strings the zone store keeps.
//!
//! `decode(encode(v)) == v` for every valid, canonical `v` (numbers without leading zeros,
//! domain names dot-terminated), and `encode(decode(c)) == c` for content already in canonical
//! form.

use super::text;
use super::{FieldKind, FieldSpec, FieldValueSet, RecordType};
use crate::error::{DecodeError, ValidationError};
use crate::validate;

/// Build canonical content for `rtype` from user field values.
///
/// Values are used as given; whitespace trimming belongs to the caller.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first field that is missing, unexpected or
/// malformed.
pub fn encode(rtype: RecordType, values: &FieldValueSet) -> Result<String, ValidationError> {
    let fields = rtype.fields();
    if let Some(extra) = values
        .keys()
        .find(|key| !fields.iter().any(|spec| spec.name == key.as_str()))
    {
        return Err(ValidationError::UnexpectedField {
            field: extra.clone(),
            rtype,
        });
    }

    let mut parts = Vec::with_capacity(fields.len());
    for spec in fields {
        let value = values
            .get(spec.name)
            .ok_or_else(|| ValidationError::ValueMissing {
                field: spec.name.to_string(),
            })?;
        let part = encode_field(spec, value)?;
        if !part.is_empty() {
            parts.push(part);
        }
    }
    Ok(parts.join(" "))
}

fn encode_field(spec: &FieldSpec, value: &str) -> Result<String, ValidationError> {
    match spec.kind {
        FieldKind::Ipv4 => Ok(validate::ipv4(spec.name, value)?.to_string()),
        FieldKind::Ipv6 => Ok(validate::ipv6(spec.name, value)?.to_string()),
        FieldKind::Fqdn => validate::fqdn(spec.name, value),
        // Only the first '@' separates the local part from the domain.
        FieldKind::Mailbox => validate::fqdn(spec.name, &value.replacen('@', ".", 1)),
        FieldKind::Uint8 => Ok(validate::uint(spec.name, value, 8)?.to_string()),
        FieldKind::Uint16 => Ok(validate::uint(spec.name, value, 16)?.to_string()),
        FieldKind::Uint32 => Ok(validate::uint(spec.name, value, 32)?.to_string()),
        FieldKind::Token => {
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric()) {
                Ok(value.to_string())
            } else {
                Err(ValidationError::InvalidToken {
                    field: spec.name.to_string(),
                    value: value.to_string(),
                })
            }
        }
        FieldKind::Quoted => Ok(text::quote(value)),
        FieldKind::CharacterStrings => Ok(text::quote_split(value)),
        FieldKind::Text => Ok(value.to_string()),
    }
}

/// Recover field values from canonical content of type `rtype`.
///
/// Domain names are returned with whatever terminator the content carries.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the content has the wrong number of positional fields or
/// malformed quoting.
pub fn decode(rtype: RecordType, content: &str) -> Result<FieldValueSet, DecodeError> {
    let fields = rtype.fields();
    let tokens = split_positional(content, fields).ok_or_else(|| DecodeError::FieldCount {
        rtype,
        expected: fields.len(),
        content: content.to_string(),
    })?;

    let mut values = FieldValueSet::new();
    for (spec, token) in fields.iter().zip(tokens) {
        let value = match spec.kind {
            FieldKind::Quoted | FieldKind::CharacterStrings => {
                text::unquote(token).ok_or_else(|| DecodeError::Quoting {
                    rtype,
                    content: content.to_string(),
                })?
            }
            FieldKind::Mailbox => token.replacen('.', "@", 1),
            _ => token.to_string(),
        };
        values.insert(spec.name.to_string(), value);
    }
    Ok(values)
}

/// Split `content` into one token per field. All but the last field are single whitespace
/// separated tokens; a free-text last field takes the remainder and may be empty.
fn split_positional<'a>(content: &'a str, fields: &[FieldSpec]) -> Option<Vec<&'a str>> {
    let (last, leading) = fields.split_last()?;
    let mut rest = content.trim();
    let mut tokens = Vec::with_capacity(fields.len());
    for _ in leading {
        if rest.is_empty() {
            return None;
        }
        let (token, remainder) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        tokens.push(token);
        rest = remainder.trim_start();
    }
    if last.kind.is_free_text() {
        if rest.is_empty() && last.kind != FieldKind::Text {
            return None;
        }
    } else if rest.is_empty() || rest.contains(char::is_whitespace) {
        return None;
    }
    tokens.push(rest);
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FieldValueSet {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn round_trips_representative_values() {
        let cases: Vec<(RecordType, FieldValueSet)> = vec![
            (RecordType::A, values(&[("A", "1.2.3.4")])),
            (RecordType::AAAA, values(&[("AAAA", "2001:db8::1")])),
            (RecordType::CNAME, values(&[("Target", "example.com.")])),
            (
                RecordType::MX,
                values(&[("Preference", "10"), ("Mx", "mail.example.com.")]),
            ),
            (RecordType::NS, values(&[("Ns", "ns1.example.com.")])),
            (RecordType::PTR, values(&[("Ptr", "www.example.com.")])),
            (
                RecordType::SRV,
                values(&[
                    ("Priority", "10"),
                    ("Weight", "10"),
                    ("Port", "8080"),
                    ("Target", "orange-ip.fly.dev."),
                ]),
            ),
            (RecordType::TXT, values(&[("Txt", "hello \"quoted\" world")])),
            (RecordType::TXT, values(&[("Txt", "x".repeat(600).as_str())])),
            (
                RecordType::CAA,
                values(&[("Flag", "0"), ("Tag", "issue"), ("Value", "letsencrypt.org")]),
            ),
            (
                RecordType::SOA,
                values(&[
                    ("Mname", "ns1.example.com."),
                    ("Rname", "hostmaster@example.com."),
                    ("Serial", "2021091008"),
                    ("Refresh", "10800"),
                    ("Retry", "3600"),
                    ("Expire", "604800"),
                    ("Minimum", "3600"),
                ]),
            ),
            (
                RecordType::SVCB,
                values(&[("Priority", "1"), ("Target", "."), ("Params", "alpn=h2,h3 port=8443")]),
            ),
            (
                RecordType::HTTPS,
                values(&[("Priority", "0"), ("Target", "example.com."), ("Params", "")]),
            ),
        ];
        for (rtype, v) in cases {
            let content = encode(rtype, &v).unwrap();
            assert_eq!(decode(rtype, &content).unwrap(), v, "{rtype} {content}");
        }
    }

    #[test]
    fn round_trips_backend_content() {
        let cases = [
            (RecordType::A, "1.2.3.4"),
            (RecordType::AAAA, "2001:db8::1"),
            (RecordType::CNAME, "example.com."),
            (RecordType::MX, "10 mail.example.com."),
            (RecordType::NS, "ns1.example.com."),
            (RecordType::PTR, "www.example.com."),
            (RecordType::SRV, "10 10 8080 orange-ip.fly.dev."),
            (RecordType::TXT, "\"hello world\""),
            (RecordType::CAA, "0 issue \"letsencrypt.org\""),
            (
                RecordType::SOA,
                "ns1.example.com. hostmaster.example.com. 2021091008 10800 3600 604800 3600",
            ),
            (RecordType::HTTPS, "1 . alpn=h2"),
            (RecordType::SVCB, "0 svc.example.com."),
        ];
        for (rtype, content) in cases {
            let v = decode(rtype, content).unwrap();
            assert_eq!(encode(rtype, &v).unwrap(), content, "{rtype}");
        }
    }

    #[test]
    fn fqdn_fields_gain_trailing_dot() {
        let content = encode(
            RecordType::MX,
            &values(&[("Preference", "10"), ("Mx", "example.com")]),
        )
        .unwrap();
        assert_eq!(content, "10 example.com.");
    }

    #[test]
    fn soa_mailbox_substitutes_first_separator_only() {
        let v = values(&[
            ("Mname", "ns1.example.com."),
            ("Rname", "hostmaster@example.com."),
            ("Serial", "1"),
            ("Refresh", "2"),
            ("Retry", "3"),
            ("Expire", "4"),
            ("Minimum", "5"),
        ]);
        let content = encode(RecordType::SOA, &v).unwrap();
        assert_eq!(content.split(' ').nth(1), Some("hostmaster.example.com."));
        assert_eq!(
            decode(RecordType::SOA, &content).unwrap()["Rname"],
            "hostmaster@example.com."
        );
    }

    #[test]
    fn txt_decode_rejoins_segments() {
        let v = decode(RecordType::TXT, "\"hello \" \"world\"").unwrap();
        assert_eq!(v["Txt"], "hello world");
    }

    #[test]
    fn missing_and_extra_fields_are_rejected() {
        assert_eq!(
            encode(RecordType::MX, &values(&[("Preference", "10")])),
            Err(ValidationError::ValueMissing {
                field: "Mx".to_string()
            })
        );
        assert_eq!(
            encode(RecordType::A, &values(&[("A", "1.2.3.4"), ("Mx", "x")])),
            Err(ValidationError::UnexpectedField {
                field: "Mx".to_string(),
                rtype: RecordType::A
            })
        );
    }

    #[test]
    fn field_errors_name_the_field() {
        let err = encode(
            RecordType::SRV,
            &values(&[
                ("Priority", "10"),
                ("Weight", "10"),
                ("Port", "99999"),
                ("Target", "x.example."),
            ]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Port is not between 0-65535: 99999");

        let err = encode(RecordType::AAAA, &values(&[("AAAA", "1.2.3.4")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIpv6 { .. }));

        let err = encode(RecordType::CNAME, &values(&[("Target", "bad name")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDomainName { field, .. } if field == "Target"));

        let err = encode(
            RecordType::CAA,
            &values(&[("Flag", "0"), ("Tag", "is sue"), ("Value", "x")]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidToken { .. }));
    }

    #[test]
    fn decode_rejects_wrong_field_counts() {
        assert!(matches!(
            decode(RecordType::MX, "10"),
            Err(DecodeError::FieldCount { expected: 2, .. })
        ));
        assert!(matches!(
            decode(RecordType::SRV, "10 10 8080 a. b."),
            Err(DecodeError::FieldCount { .. })
        ));
        assert!(matches!(
            decode(RecordType::TXT, "\"unterminated"),
            Err(DecodeError::Quoting { .. })
        ));
    }
}
