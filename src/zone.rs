//! Zones and RRsets as the zone store represents them, plus the in-memory working set
//! mutations applied to a fetched zone before changed RRsets are pushed back.
//!
//! The serde representation matches the PowerDNS authoritative server's HTTP API.

use crate::error::Error;
use crate::normalize::names_equal;
use crate::record_id::RecordId;
use crate::records::RecordType;
use serde::{Deserialize, Serialize};

/// All RRsets owned by one user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub serial: u32,
    #[serde(default)]
    pub rrsets: Vec<RRset>,
}

/// Every record sharing one name and one type: the zone store's unit of replacement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RRset {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>,
    pub records: Vec<Member>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
}

/// How the zone store should apply a pushed RRset.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// The pushed member list is authoritative and overwrites whatever the store holds for
    /// that name and type. An empty member list removes the RRset.
    #[serde(rename = "REPLACE")]
    Replace,
}

/// A zone name and its SOA serial, as listed by the zone store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    pub name: String,
    #[serde(default)]
    pub serial: u32,
}

/// One fully validated record, ready to be added to a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub name: String,
    pub rtype: RecordType,
    pub ttl: u32,
    pub content: String,
}

impl Member {
    pub fn new(content: impl Into<String>) -> Self {
        Member {
            content: content.into(),
            disabled: false,
        }
    }
}

impl RRset {
    pub fn new(name: impl Into<String>, rtype: RecordType, ttl: u32, contents: &[&str]) -> Self {
        RRset {
            name: name.into(),
            rtype,
            ttl,
            changetype: None,
            records: contents.iter().map(|c| Member::new(*c)).collect(),
        }
    }

    pub fn is_replace(&self) -> bool {
        self.changetype == Some(ChangeType::Replace)
    }

    fn matches(&self, name: &str, rtype: RecordType) -> bool {
        self.rtype == rtype && names_equal(&self.name, name)
    }
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Zone {
            name: name.into(),
            ..Zone::default()
        }
    }

    pub fn rrset(&self, name: &str, rtype: RecordType) -> Option<&RRset> {
        self.rrsets.iter().find(|rrset| rrset.matches(name, rtype))
    }

    fn rrset_mut(&mut self, name: &str, rtype: RecordType) -> Option<&mut RRset> {
        self.rrsets.iter_mut().find(|rrset| rrset.matches(name, rtype))
    }

    /// Add `record` to the working set and mark its RRset for replacement.
    ///
    /// An existing RRset for the same name and type takes the new TTL and gains the content
    /// unless an identical member is already present. Returns whether a member was added.
    pub fn add(&mut self, record: &ZoneRecord) -> bool {
        match self.rrset_mut(&record.name, record.rtype) {
            Some(rrset) => {
                rrset.ttl = record.ttl;
                rrset.changetype = Some(ChangeType::Replace);
                if rrset.records.iter().any(|m| m.content == record.content) {
                    return false;
                }
                rrset.records.push(Member::new(record.content.clone()));
                true
            }
            None => {
                let mut rrset = RRset::new(
                    record.name.clone(),
                    record.rtype,
                    record.ttl,
                    &[record.content.as_str()],
                );
                rrset.changetype = Some(ChangeType::Replace);
                self.rrsets.push(rrset);
                true
            }
        }
    }

    /// Remove the member addressed by `id` and mark its RRset for replacement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no RRset holds a member with exactly that content.
    pub fn remove(&mut self, id: &RecordId) -> Result<(), Error> {
        let not_found = || Error::RecordNotFound {
            name: id.name.clone(),
            rtype: id.rtype,
        };
        let rrset = self.rrset_mut(&id.name, id.rtype).ok_or_else(not_found)?;
        let position = rrset
            .records
            .iter()
            .position(|m| m.content == id.content)
            .ok_or_else(not_found)?;
        rrset.records.remove(position);
        rrset.changetype = Some(ChangeType::Replace);
        Ok(())
    }

    /// The RRsets touched since the zone was fetched.
    pub fn changed_rrsets(&self) -> Vec<RRset> {
        self.rrsets
            .iter()
            .filter(|rrset| rrset.is_replace())
            .cloned()
            .collect()
    }
}
