//! Record operations for one user's zone.
//!
//! Every operation follows the same pattern: fetch the user's zone (creating it on first use),
//! mutate the fetched copy, then push back only the RRsets that changed. Each pushed RRset
//! replaces whatever the zone store holds for that name and type.
//!
//! Nothing serializes concurrent operations on the same zone. Two requests that fetch the
//! same RRset and push it back in turn leave only the second request's view of it, losing
//! whatever the first one added. Users only edit their own zone, one browser tab at a time,
//! so this is accepted.

use crate::error::{Error, ValidationError};
use crate::normalize::{names_equal, Normalizer};
use crate::payload::{ListedRecord, RecordRequest};
use crate::record_id::RecordId;
use crate::records::{codec, RecordType};
use crate::translate::translate;
use crate::validate;
use crate::zone::{Zone, ZoneRecord};
use crate::zone_store::DynZoneStore;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct RecordService {
    store: DynZoneStore,
    normalizer: Normalizer,
}

impl RecordService {
    pub fn new(store: DynZoneStore, normalizer: Normalizer) -> Self {
        RecordService { store, normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Validate `request` and turn it into the record to store in `username`'s zone.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking the TTL, then the name, then
    /// the field values.
    pub fn parse_request(
        &self,
        username: &str,
        request: &RecordRequest,
    ) -> Result<ZoneRecord, ValidationError> {
        let ttl = validate::ttl(&request.ttl)?;
        let name = self.normalizer.record_name(&request.subdomain, username)?;
        let content = codec::encode(request.rtype, &request.values)?;
        Ok(ZoneRecord {
            name,
            rtype: request.rtype,
            ttl,
            content,
        })
    }

    /// Fetch `username`'s zone, creating it if it doesn't exist yet. A zone created by a
    /// concurrent request between the lookup and the create is fetched instead.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUsername`] for a bad username, or whatever the zone
    /// store failed with.
    pub async fn fetch_or_create_zone(&self, username: &str) -> Result<Zone, Error> {
        let name = self.normalizer.zone_name(username)?;
        if let Some(zone) = self.store.get_zone(&name).await? {
            return Ok(zone);
        }
        info!(zone = %name, "creating zone");
        match self.store.create_zone(&name).await {
            Ok(zone) => Ok(zone),
            Err(err) => match self.store.get_zone(&name).await {
                Ok(Some(zone)) => {
                    debug!(zone = %name, "zone was created by another request");
                    Ok(zone)
                }
                _ => Err(err),
            },
        }
    }

    async fn push_changed(&self, zone: &Zone) -> Result<(), Error> {
        let changed = zone.changed_rrsets();
        if changed.is_empty() {
            return Ok(());
        }
        self.store.patch_rrsets(&zone.name, &changed).await
    }

    /// Add one record to `username`'s zone.
    ///
    /// Adding content that is already present only updates the RRset's TTL.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] before the zone store is contacted.
    /// - [`Error::Conflict`] when the zone store rejects the resulting RRset.
    /// - [`Error::Backend`] or [`Error::Transport`] for anything else the zone store reports.
    pub async fn create_record(&self, username: &str, request: &RecordRequest) -> Result<(), Error> {
        self.try_create(username, request)
            .await
            .map_err(|err| log_failure(username, "create", err))
    }

    /// Replace the record identified by `id` with `request`, in a single push.
    ///
    /// # Errors
    ///
    /// As [`create_record`][Self::create_record], plus [`Error::InvalidRecordId`] for a
    /// malformed `id` and [`Error::RecordNotFound`] when `id` isn't in the zone.
    pub async fn update_record(
        &self,
        username: &str,
        id: &str,
        request: &RecordRequest,
    ) -> Result<(), Error> {
        self.try_update(username, id, request)
            .await
            .map_err(|err| log_failure(username, "update", err))
    }

    /// Remove the single RRset member identified by `id`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRecordId`] for a malformed `id`, [`Error::RecordNotFound`] when it
    /// isn't in the zone, or whatever the zone store failed with.
    pub async fn delete_record(&self, username: &str, id: &str) -> Result<(), Error> {
        self.try_delete(username, id)
            .await
            .map_err(|err| log_failure(username, "delete", err))
    }

    /// Delete `username`'s whole zone. A zone that doesn't exist is already deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUsername`] for a bad username, or whatever the zone
    /// store failed with.
    pub async fn delete_all_records(&self, username: &str) -> Result<(), Error> {
        self.try_delete_all(username)
            .await
            .map_err(|err| log_failure(username, "delete all", err))
    }

    async fn try_create(&self, username: &str, request: &RecordRequest) -> Result<(), Error> {
        let record = self.parse_request(username, request)?;
        let mut zone = self.fetch_or_create_zone(username).await?;
        zone.add(&record);
        self.push_changed(&zone)
            .await
            .map_err(|err| translate(err, &record))?;
        info!(
            username,
            name = %record.name,
            rtype = %record.rtype,
            content = %record.content,
            "created record"
        );
        Ok(())
    }

    async fn try_update(
        &self,
        username: &str,
        id: &str,
        request: &RecordRequest,
    ) -> Result<(), Error> {
        let record = self.parse_request(username, request)?;
        let id: RecordId = id.parse()?;
        let mut zone = self.fetch_or_create_zone(username).await?;
        zone.remove(&id)?;
        zone.add(&record);
        self.push_changed(&zone)
            .await
            .map_err(|err| translate(err, &record))?;
        info!(
            username,
            old = %id.content,
            name = %record.name,
            rtype = %record.rtype,
            content = %record.content,
            "updated record"
        );
        Ok(())
    }

    async fn try_delete(&self, username: &str, id: &str) -> Result<(), Error> {
        let id: RecordId = id.parse()?;
        let mut zone = self.fetch_or_create_zone(username).await?;
        zone.remove(&id)?;
        self.push_changed(&zone).await?;
        info!(username, name = %id.name, rtype = %id.rtype, content = %id.content, "deleted record");
        Ok(())
    }

    async fn try_delete_all(&self, username: &str) -> Result<(), Error> {
        let name = self.normalizer.zone_name(username)?;
        if self.store.get_zone(&name).await?.is_none() {
            return Ok(());
        }
        self.store.delete_zone(&name).await?;
        info!(username, zone = %name, "deleted zone");
        Ok(())
    }

    /// Every member of every RRset in `username`'s zone, one entry each.
    ///
    /// With `hide_managed` the apex SOA and NS RRsets, which the zone store maintains itself,
    /// are left out.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the zone store holds content we can't decode, or whatever the
    /// zone store failed with.
    pub async fn list_records(
        &self,
        username: &str,
        hide_managed: bool,
    ) -> Result<Vec<ListedRecord>, Error> {
        let zone = self.fetch_or_create_zone(username).await?;
        let managed = |rtype: RecordType, name: &str| {
            hide_managed
                && matches!(rtype, RecordType::SOA | RecordType::NS)
                && names_equal(name, &zone.name)
        };

        let mut listed = Vec::new();
        for rrset in zone.rrsets.iter().filter(|r| !managed(r.rtype, &r.name)) {
            for member in &rrset.records {
                listed.push(ListedRecord::from_member(rrset, &member.content, &zone.name)?);
            }
        }
        Ok(listed)
    }
}

fn log_failure(username: &str, action: &'static str, err: Error) -> Error {
    if err.is_client_error() {
        debug!(username, action, %err, "rejected record change");
    } else {
        warn!(username, action, %err, "record change failed");
    }
    err
}
