//! An in-memory implementation of the [`ZoneStore`][super::ZoneStore] trait.
//!
//! Zones are not durable across restarts. Patches are validated against the whole resulting
//! zone before being committed, and rejected with the error texts a PowerDNS server produces
//! for the same mistakes.
use crate::error::Error;
use crate::normalize::names_equal;
use crate::reaper::serial_for;
use crate::records::RecordType;
use crate::zone::{RRset, Zone, ZoneSummary};
use crate::zone_store::ZoneStore;
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use trust_dns_proto::rr::domain::Name;

const DEFAULT_TTL: u32 = 3600;
const FALLBACK_PRIMARY: &str = "a.misconfigured.dns.server.invalid.";

#[derive(Debug, Default)]
pub struct InMemoryZoneStore {
    zones: RwLock<BTreeMap<Name, Zone>>,
    nameservers: Vec<String>,
}

impl InMemoryZoneStore {
    /// Zones created by this store get an NS RRset listing `nameservers`; the first one is also
    /// the SOA primary.
    pub fn new(nameservers: Vec<String>) -> Self {
        InMemoryZoneStore {
            zones: RwLock::default(),
            nameservers,
        }
    }

    /// Store `zone` exactly as given, replacing any zone of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the zone's name isn't a valid domain name.
    pub async fn insert_zone(&self, zone: Zone) -> Result<(), Error> {
        let key = key(&zone.name)?;
        self.zones.write().await.insert(key, zone);
        Ok(())
    }

    fn new_zone(&self, name: &str, today: Date) -> Zone {
        let serial = serial_for(today, 1);
        let primary = self
            .nameservers
            .first()
            .map_or(FALLBACK_PRIMARY, String::as_str);
        let soa = format!("{primary} hostmaster.{name} {serial} 10800 3600 604800 3600");
        let mut rrsets = vec![RRset::new(name, RecordType::SOA, DEFAULT_TTL, &[&soa])];
        if !self.nameservers.is_empty() {
            let nameservers: Vec<&str> = self.nameservers.iter().map(String::as_str).collect();
            rrsets.push(RRset::new(name, RecordType::NS, DEFAULT_TTL, &nameservers));
        }
        Zone {
            name: name.to_string(),
            serial,
            rrsets,
        }
    }
}

fn key(name: &str) -> Result<Name, Error> {
    let mut parsed = Name::from_ascii(name)
        .map_err(|err| unprocessable(format!("'{name}' is not a valid domain name: {err}")))?;
    parsed.set_fqdn(true);
    Ok(parsed.to_lowercase())
}

fn not_found(name: &str) -> Error {
    Error::Backend {
        status: Some(404),
        message: format!("Could not find domain '{name}'"),
    }
}

fn unprocessable(message: String) -> Error {
    Error::Backend {
        status: Some(422),
        message,
    }
}

fn in_zone(name: &str, zone: &str) -> bool {
    match (Name::from_ascii(name), Name::from_ascii(zone)) {
        (Ok(name), Ok(zone)) => zone.zone_of(&name),
        _ => false,
    }
}

/// Apply `rrsets` to a copy of `zone`, checking the result the way PowerDNS does.
fn apply(zone: &Zone, rrsets: &[RRset]) -> Result<Zone, String> {
    let mut next = zone.clone();
    for rrset in rrsets {
        let (name, rtype) = (&rrset.name, rrset.rtype);
        if !in_zone(name, &zone.name) {
            return Err(format!("RRset {name} IN {rtype}: Name is out of zone"));
        }
        if !rrset.is_replace() {
            return Err(format!("RRset {name} IN {rtype}: changetype not understood"));
        }
        for (i, member) in rrset.records.iter().enumerate() {
            if rrset.records[..i].iter().any(|m| m.content == member.content) {
                return Err(format!(
                    "Duplicate record in RRset {name} IN {rtype} with content \"{}\"",
                    member.content
                ));
            }
        }
        if rtype.is_singleton() && rrset.records.len() > 1 {
            return Err(format!("RRset {name} IN {rtype} has more than one record"));
        }

        let existing = next
            .rrsets
            .iter()
            .position(|r| r.rtype == rtype && names_equal(&r.name, name));
        let mut stored = rrset.clone();
        stored.changetype = None;
        match (existing, stored.records.is_empty()) {
            (Some(index), true) => {
                next.rrsets.remove(index);
            }
            (Some(index), false) => next.rrsets[index] = stored,
            (None, false) => next.rrsets.push(stored),
            (None, true) => {}
        }
    }

    for rrset in rrsets.iter().filter(|r| !r.records.is_empty()) {
        let (name, rtype) = (&rrset.name, rrset.rtype);
        let shares_name = |other: &&RRset| names_equal(&other.name, name) && other.rtype != rtype;
        if rtype == RecordType::CNAME && next.rrsets.iter().any(|r| shares_name(&r)) {
            return Err(format!(
                "RRset {name} IN CNAME: Conflicts with pre-existing RRset"
            ));
        }
        if rtype != RecordType::CNAME && next.rrset(name, RecordType::CNAME).is_some() {
            return Err(format!(
                "RRset {name} IN {rtype}: Conflicts with pre-existing CNAME RRset"
            ));
        }
    }
    Ok(next)
}

/// Advance the serial to today's `YYYYMMDD01`, or by one if it is already past that, and
/// mirror it into the apex SOA.
fn bump_serial(zone: &mut Zone, today: Date) {
    zone.serial = serial_for(today, 1).max(zone.serial.wrapping_add(1));
    let serial = zone.serial.to_string();
    let apex = zone.name.clone();
    for rrset in zone
        .rrsets
        .iter_mut()
        .filter(|r| r.rtype == RecordType::SOA && names_equal(&r.name, &apex))
    {
        for member in &mut rrset.records {
            let mut fields: Vec<&str> = member.content.split_whitespace().collect();
            if fields.len() == 7 {
                fields[2] = &serial;
                member.content = fields.join(" ");
            }
        }
    }
}

#[async_trait::async_trait]
impl ZoneStore for InMemoryZoneStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        let key = key(name)?;
        Ok(self.zones.read().await.get(&key).cloned())
    }

    async fn create_zone(&self, name: &str) -> Result<Zone, Error> {
        let key = key(name)?;
        let mut zones = self.zones.write().await;
        if zones.contains_key(&key) {
            return Err(Error::Backend {
                status: Some(409),
                message: format!("Domain '{name}' already exists"),
            });
        }
        let zone = self.new_zone(name, OffsetDateTime::now_utc().date());
        zones.insert(key, zone.clone());
        Ok(zone)
    }

    async fn patch_rrsets(&self, name: &str, rrsets: &[RRset]) -> Result<(), Error> {
        let key = key(name)?;
        let mut zones = self.zones.write().await;
        let zone = zones.get_mut(&key).ok_or_else(|| not_found(name))?;
        let mut next = apply(zone, rrsets).map_err(unprocessable)?;
        bump_serial(&mut next, OffsetDateTime::now_utc().date());
        *zone = next;
        Ok(())
    }

    async fn delete_zone(&self, name: &str) -> Result<(), Error> {
        let key = key(name)?;
        self.zones
            .write()
            .await
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }

    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, Error> {
        Ok(self
            .zones
            .read()
            .await
            .values()
            .map(|zone| ZoneSummary {
                name: zone.name.clone(),
                serial: zone.serial,
            })
            .collect())
    }
}
