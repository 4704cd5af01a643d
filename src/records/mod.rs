//! The closed set of supported record types and their field schemas.
//!
//! Each [`RecordType`] owns an ordered list of [`FieldSpec`]s. The order is the positional order
//! of the fields inside the canonical content string the zone store keeps for one RRset member,
//! e.g. `MX` content `10 mail.example.com.` is `Preference` followed by `Mx`.
//!
//! [`codec::encode`] and [`codec::decode`] translate between a [`FieldValueSet`] and that
//! canonical content. [`schemas`] exports the field lists for driving a generic input form.

use crate::error::ValidationError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod codec;
mod text;

/// Field name to field value, as supplied by or returned to a user. Keys are exactly the
/// [`FieldSpec::name`]s of one record type.
pub type FieldValueSet = BTreeMap<String, String>;

/// DNS record types that can be created and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    PTR,
    SRV,
    TXT,
    CAA,
    SOA,
    SVCB,
    HTTPS,
}

/// The semantic type of one field, deciding how it is validated and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Ipv4,
    Ipv6,
    /// A domain name, dot-terminated on encode.
    Fqdn,
    /// The SOA responsible mailbox, written `user@example.com.` by users and
    /// `user.example.com.` in canonical content.
    Mailbox,
    Uint8,
    Uint16,
    Uint32,
    /// A bare alphanumeric token such as a CAA tag.
    Token,
    /// One quoted string, e.g. a CAA value.
    Quoted,
    /// One or more quoted character-strings, re-joined on decode (TXT).
    CharacterStrings,
    /// Unquoted free text taking the rest of the content; may be empty.
    Text,
}

impl FieldKind {
    /// Input type used by the schema export.
    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Uint8 | FieldKind::Uint16 | FieldKind::Uint32 => "number",
            _ => "text",
        }
    }

    /// Whether the field swallows the remainder of the content when it is last.
    pub(crate) fn is_free_text(self) -> bool {
        matches!(
            self,
            FieldKind::Quoted | FieldKind::CharacterStrings | FieldKind::Text
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub example: &'static str,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    example: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        example,
    }
}

const A_FIELDS: &[FieldSpec] = &[field("A", "IPv4 Address", FieldKind::Ipv4, "1.2.3.4")];

const AAAA_FIELDS: &[FieldSpec] = &[field(
    "AAAA",
    "IPv6 Address",
    FieldKind::Ipv6,
    "2001:db8::1",
)];

const CNAME_FIELDS: &[FieldSpec] = &[field(
    "Target",
    "Target",
    FieldKind::Fqdn,
    "orange-ip.fly.dev",
)];

const MX_FIELDS: &[FieldSpec] = &[
    field("Preference", "Preference", FieldKind::Uint16, "10"),
    field(
        "Mx",
        "Mail Server",
        FieldKind::Fqdn,
        "mail.messagingengine.com",
    ),
];

const NS_FIELDS: &[FieldSpec] = &[field(
    "Ns",
    "Nameserver",
    FieldKind::Fqdn,
    "ns1.example.com",
)];

const PTR_FIELDS: &[FieldSpec] = &[field(
    "Ptr",
    "Pointer",
    FieldKind::Fqdn,
    "www.example.com",
)];

const SRV_FIELDS: &[FieldSpec] = &[
    field("Priority", "Priority", FieldKind::Uint16, "10"),
    field("Weight", "Weight", FieldKind::Uint16, "5"),
    field("Port", "Port", FieldKind::Uint16, "8080"),
    field("Target", "Target", FieldKind::Fqdn, "orange-ip.fly.dev"),
];

const TXT_FIELDS: &[FieldSpec] = &[field(
    "Txt",
    "Content",
    FieldKind::CharacterStrings,
    "hello world",
)];

const CAA_FIELDS: &[FieldSpec] = &[
    field("Flag", "Flag", FieldKind::Uint8, "0"),
    field("Tag", "Tag", FieldKind::Token, "issue"),
    field("Value", "CA domain name", FieldKind::Quoted, "letsencrypt.org"),
];

const SOA_FIELDS: &[FieldSpec] = &[
    field("Mname", "Primary nameserver", FieldKind::Fqdn, "ns1.example.com"),
    field(
        "Rname",
        "Responsible mailbox",
        FieldKind::Mailbox,
        "hostmaster@example.com",
    ),
    field("Serial", "Serial", FieldKind::Uint32, "2024010101"),
    field("Refresh", "Refresh", FieldKind::Uint32, "10800"),
    field("Retry", "Retry", FieldKind::Uint32, "3600"),
    field("Expire", "Expire", FieldKind::Uint32, "604800"),
    field("Minimum", "Minimum TTL", FieldKind::Uint32, "3600"),
];

const SVCB_FIELDS: &[FieldSpec] = &[
    field("Priority", "Priority", FieldKind::Uint16, "1"),
    field("Target", "Target", FieldKind::Fqdn, "."),
    field("Params", "Parameters", FieldKind::Text, "alpn=h2,h3"),
];

impl RecordType {
    pub const ALL: [RecordType; 12] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::CNAME,
        RecordType::MX,
        RecordType::NS,
        RecordType::PTR,
        RecordType::SRV,
        RecordType::TXT,
        RecordType::CAA,
        RecordType::SOA,
        RecordType::SVCB,
        RecordType::HTTPS,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::PTR => "PTR",
            RecordType::SRV => "SRV",
            RecordType::TXT => "TXT",
            RecordType::CAA => "CAA",
            RecordType::SOA => "SOA",
            RecordType::SVCB => "SVCB",
            RecordType::HTTPS => "HTTPS",
        }
    }

    /// The ordered field schema for this record type.
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            RecordType::A => A_FIELDS,
            RecordType::AAAA => AAAA_FIELDS,
            RecordType::CNAME => CNAME_FIELDS,
            RecordType::MX => MX_FIELDS,
            RecordType::NS => NS_FIELDS,
            RecordType::PTR => PTR_FIELDS,
            RecordType::SRV => SRV_FIELDS,
            RecordType::TXT => TXT_FIELDS,
            RecordType::CAA => CAA_FIELDS,
            RecordType::SOA => SOA_FIELDS,
            RecordType::SVCB | RecordType::HTTPS => SVCB_FIELDS,
        }
    }

    /// Types of which a name may hold at most one record.
    pub const fn is_singleton(self) -> bool {
        matches!(self, RecordType::CNAME | RecordType::SOA)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RecordType::ALL
            .into_iter()
            .find(|rtype| rtype.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnsupportedType(wanted.to_string()))
    }
}

/// One entry of the schema export.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub input_type: &'static str,
    pub example: &'static str,
}

pub type RecordSchemas = BTreeMap<RecordType, Vec<SchemaField>>;

lazy_static! {
    static ref SCHEMAS: RecordSchemas = RecordType::ALL
        .into_iter()
        .map(|rtype| {
            let fields = rtype
                .fields()
                .iter()
                .map(|spec| SchemaField {
                    name: spec.name,
                    label: spec.label,
                    input_type: spec.kind.input_type(),
                    example: spec.example,
                })
                .collect();
            (rtype, fields)
        })
        .collect();
}

/// The field schema of every record type, in the positional order the codec uses.
pub fn schemas() -> &'static RecordSchemas {
    &SCHEMAS
}
