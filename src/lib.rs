//! Zonecraft
//!
//! A playground for DNS records. Every user gets a zone, `<username>.<base-domain>.`, and can
//! create, edit and delete records of the common types in it through a JSON API, entering each
//! record as a handful of named fields rather than as zone file syntax.
//!
//! Records are stored in an authoritative DNS server's zone store (see [`zone_store`]).
//! Each change fetches the user's zone, edits it in memory, and pushes back only the RRsets
//! that changed (see [`service`]). Zones nobody has touched for a while are removed by the
//! [`reaper`].
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod normalize;
pub mod payload;
pub mod reaper;
pub mod record_id;
pub mod records;
pub mod service;
pub mod translate;
pub mod validate;
pub mod zone;
pub mod zone_store;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use service::RecordService;
pub use zone_store::{DynZoneStore, InMemoryZoneStore, PowerDnsZoneStore, ZoneStore};
