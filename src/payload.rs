//! The JSON shapes records take on their way in and out of the service.
//!
//! Inbound, a record is a flat object:
//!
//! ```json
//! { "subdomain": "@", "type": "MX", "ttl": "60", "value_Preference": "10", "value_Mx": "example.com" }
//! ```
//!
//! Outbound, each RRset member is listed with its [`RecordId`] and the same flat field layout.

use crate::error::{DecodeError, ValidationError};
use crate::normalize::Normalizer;
use crate::record_id::RecordId;
use crate::records::{codec, FieldValueSet, RecordType};
use crate::zone::RRset;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const VALUE_PREFIX: &str = "value_";

/// A record as submitted for creation or as the replacement in an update. Every value is
/// trimmed; nothing else is checked until the service parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    pub subdomain: String,
    pub rtype: RecordType,
    pub ttl: String,
    pub values: FieldValueSet,
}

impl RecordRequest {
    /// # Errors
    ///
    /// [`ValidationError::ValueMissing`] for an absent `subdomain`, `type` or `ttl`, and
    /// [`ValidationError::UnsupportedType`] for an unknown `type`. Keys that are neither one
    /// of those nor `value_<Field>` are ignored.
    pub fn from_fields(mut fields: HashMap<String, String>) -> Result<Self, ValidationError> {
        let mut take = |key: &str| {
            fields
                .remove(key)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| ValidationError::ValueMissing {
                    field: key.to_string(),
                })
        };
        let subdomain = take("subdomain")?;
        let rtype = take("type")?.parse::<RecordType>()?;
        let ttl = take("ttl")?;

        let values = fields
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(VALUE_PREFIX)
                    .map(|field| (field.to_string(), value.trim().to_string()))
            })
            .collect();
        Ok(RecordRequest {
            subdomain,
            rtype,
            ttl,
            values,
        })
    }
}

impl TryFrom<Map<String, Value>> for RecordRequest {
    type Error = ValidationError;

    /// Accepts strings and numbers, so `"ttl": 60` works as well as `"ttl": "60"`.
    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields = object
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text)),
                Value::Number(number) => Ok((key, number.to_string())),
                _ => Err(ValidationError::NotText { field: key }),
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        RecordRequest::from_fields(fields)
    }
}

/// One RRset member as shown to its owner.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ListedRecord {
    pub id: String,
    pub record: RecordResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResponse {
    pub subdomain: String,
    pub rtype: RecordType,
    pub ttl: String,
    pub content: String,
    pub domain_name: String,
    pub values: FieldValueSet,
}

impl ListedRecord {
    /// Decode `content`, one member of `rrset`, for display within `zone`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the content doesn't fit the RRset's type.
    pub fn from_member(rrset: &RRset, content: &str, zone: &str) -> Result<Self, DecodeError> {
        let values = codec::decode(rrset.rtype, content)?;
        Ok(ListedRecord {
            id: RecordId::new(rrset.name.as_str(), rrset.rtype, content).to_string(),
            record: RecordResponse {
                subdomain: Normalizer::subdomain(&rrset.name, zone),
                rtype: rrset.rtype,
                ttl: rrset.ttl.to_string(),
                content: content.to_string(),
                domain_name: rrset.name.clone(),
                values,
            },
        })
    }
}

impl Serialize for RecordResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5 + self.values.len()))?;
        map.serialize_entry("subdomain", &self.subdomain)?;
        map.serialize_entry("type", &self.rtype)?;
        map.serialize_entry("ttl", &self.ttl)?;
        map.serialize_entry("content", &self.content)?;
        map.serialize_entry("domain_name", &self.domain_name)?;
        for (field, value) in &self.values {
            map.serialize_entry(&format!("{VALUE_PREFIX}{field}"), value)?;
        }
        map.end()
    }
}
