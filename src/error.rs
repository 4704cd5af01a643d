//! Error types.

use crate::records::RecordType;
use axum::extract::rejection::JsonRejection;
use std::net::IpAddr;

/// Error enumerates the possible zonecraft error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when user input fails a syntactic or range check. Always raised before the
    /// zone store is contacted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Returned when canonical content held by the zone store can't be decoded back into
    /// field values for its record type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Returned when a client supplied record identifier is malformed.
    #[error(transparent)]
    InvalidRecordId(#[from] RecordIdError),

    /// Returned when the zone store rejected a change that conflicts with existing records.
    /// The message is the [translated][crate::translate] form naming the exact name, type and
    /// content involved.
    #[error("{0}")]
    Conflict(String),

    /// Returned when an update or delete addresses a record that isn't in the user's zone.
    #[error("record not found: {name} {rtype}")]
    RecordNotFound { name: String, rtype: RecordType },

    /// Returned when the zone store answered with an error we have no translation for.
    #[error("{message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// Returned when the zone store couldn't be reached, timed out, or sent an unreadable
    /// response.
    #[error("zone store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Returned when the configured zone store API key can't be sent as a header value.
    #[error("zone store API key is not a valid header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    /// Returned when a request arrives without an authenticated username.
    #[error("you must be logged in")]
    Unauthenticated,

    /// Returned by the [reaper][crate::reaper] when a zone's SOA serial isn't `YYYYMMDDnn`.
    #[error("could not parse serial {serial} for zone {zone}")]
    InvalidSerial { zone: String, serial: u32 },

    /// Returned when the [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is
    /// not a loopback address, or an address within a private network space. The
    /// [HTTP API][crate::api] trusts the `X-Username` header and must only be reachable
    /// through an authenticating proxy on a private network.
    #[error("API bind address ({0}) must be a loopback or private IP")]
    InsecureAPIBind(IpAddr),

    /// Returned when clients `POST` invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [loading a `Config`][crate::config::Config::try_from_file]) fails due to invalid JSON
    /// content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by the caller rather than by this service or its backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidRecordId(_)
                | Error::Conflict(_)
                | Error::RecordNotFound { .. }
                | Error::Unauthenticated
                | Error::JsonExtractorRejection(_)
        )
    }
}

/// Problems with user supplied record data, each naming the field or value at fault.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value missing for field {field}")]
    ValueMissing { field: String },

    #[error("{rtype} records have no field named {field}")]
    UnexpectedField { field: String, rtype: RecordType },

    #[error("{field} is not between 0-{}: {value}", max_for_width(.width))]
    Range {
        field: String,
        width: u8,
        value: String,
    },

    #[error("invalid IPv4 address for {field}: {value}")]
    InvalidIpv4 { field: String, value: String },

    #[error("invalid IPv6 address for {field}: {value}")]
    InvalidIpv6 { field: String, value: String },

    #[error("invalid domain name for {field}: {value} ({reason})")]
    InvalidDomainName {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field} must be letters and digits only, got \"{value}\"")]
    InvalidToken { field: String, value: String },

    #[error("{field} must be a string or a number")]
    NotText { field: String },

    #[error("TTL must be a number from 1 to 2147483647, got \"{0}\"")]
    InvalidTtl(String),

    #[error("name \"{0}\" contains a space")]
    NameContainsSpace(String),

    #[error("invalid name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },

    #[error("failed to convert \"{label}\" to punycode: {reason}")]
    Punycode { label: String, reason: String },

    #[error("invalid username \"{0}\"")]
    InvalidUsername(String),

    #[error("unsupported record type: {0}")]
    UnsupportedType(String),
}

fn max_for_width(width: &u8) -> u64 {
    u64::MAX >> (64 - u32::from(*width))
}

/// Problems turning canonical zone store content back into field values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid {rtype} record: expected {expected} fields, got \"{content}\"")]
    FieldCount {
        rtype: RecordType,
        expected: usize,
        content: String,
    },

    #[error("invalid {rtype} record: malformed quoted text in \"{content}\"")]
    Quoting { rtype: RecordType, content: String },
}

/// Problems parsing a [`RecordId`][crate::record_id::RecordId].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordIdError {
    #[error("invalid record ID \"{id}\": expected 3 parts separated by '|', got {parts}")]
    WrongPartCount { id: String, parts: usize },

    #[error("invalid record ID \"{id}\": content is not valid base64")]
    InvalidBase64 {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid record ID \"{id}\": content is not valid UTF-8")]
    InvalidUtf8 { id: String },

    #[error("invalid record ID \"{id}\": unsupported record type {rtype}")]
    UnknownType { id: String, rtype: String },
}
