//! Deletes user zones that haven't changed in a while.
//!
//! A zone's SOA serial is `YYYYMMDDnn`, the date of its last change followed by a revision
//! counter, so the serial alone says how stale a zone is.

use crate::error::Error;
use crate::normalize::names_equal;
use crate::zone_store::DynZoneStore;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};
use tracing::{info, warn};

/// The serial for revision `revision` of a zone last changed on `date`.
pub fn serial_for(date: Date, revision: u8) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or_default();
    year * 1_000_000
        + u32::from(u8::from(date.month())) * 10_000
        + u32::from(date.day()) * 100
        + u32::from(revision % 100)
}

/// The date encoded in the first eight digits of a zero-padded serial.
///
/// # Errors
///
/// Returns an error if those digits aren't a calendar date.
pub fn parse_serial(serial: u32) -> Result<Date, time::error::Parse> {
    let digits = format!("{serial:010}");
    Date::parse(&digits[..8], format_description!("[year][month][day]"))
}

/// True once at least `retention` has passed since midnight UTC on `date`.
pub fn is_stale(date: Date, now: OffsetDateTime, retention: Duration) -> bool {
    now - date.midnight().assume_utc() >= retention
}

/// Delete every zone other than `base_zone` whose serial is at least `retention` old.
///
/// Returns the names of the deleted zones.
///
/// # Errors
///
/// Stops at the first zone whose serial can't be parsed ([`Error::InvalidSerial`]) or that
/// the zone store fails to list or delete.
pub async fn delete_old_zones(
    store: &DynZoneStore,
    base_zone: &str,
    now: OffsetDateTime,
    retention: Duration,
) -> Result<Vec<String>, Error> {
    let mut deleted = Vec::new();
    for zone in store.list_zones().await? {
        if names_equal(&zone.name, base_zone) {
            continue;
        }
        let date = parse_serial(zone.serial).map_err(|_| Error::InvalidSerial {
            zone: zone.name.clone(),
            serial: zone.serial,
        })?;
        if !is_stale(date, now, retention) {
            continue;
        }
        store.delete_zone(&zone.name).await?;
        info!(zone = %zone.name, serial = zone.serial, "deleted stale zone");
        deleted.push(zone.name);
    }
    Ok(deleted)
}

/// Run [`delete_old_zones`] every `every`, forever.
pub async fn run(
    store: DynZoneStore,
    base_zone: String,
    retention: Duration,
    every: std::time::Duration,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match delete_old_zones(&store, &base_zone, OffsetDateTime::now_utc(), retention).await {
            Ok(deleted) => info!(count = deleted.len(), "reaped stale zones"),
            Err(err) => warn!(%err, "failed to reap stale zones"),
        }
    }
}
