//! The authoritative zone store.
//!
//! Records live in an external authoritative DNS server reached through its zone management
//! API. [`ZoneStore`] is the interface the [record service][crate::service::RecordService]
//! needs from it.
//!
//! Two implementations are provided, [`powerdns::PowerDnsZoneStore`] and
//! [`memory::InMemoryZoneStore`]. The former talks to a PowerDNS authoritative server over
//! HTTP. The latter keeps zones in process memory and enforces the same RRset rules with the
//! same error phrasings, which makes it suitable for tests and for trying things out without a
//! nameserver.

use crate::error::Error;
use crate::zone::{RRset, Zone, ZoneSummary};
use std::sync::Arc;

pub mod memory;
pub mod powerdns;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryZoneStore;
#[allow(clippy::module_name_repetitions)]
pub use powerdns::PowerDnsZoneStore;

/// `DynZoneStore` is a type alias for a [`ZoneStore`] shared between request handlers.
///
/// There is no lock around it: every request fetches, mutates and pushes independently.
#[allow(clippy::module_name_repetitions)]
pub type DynZoneStore = Arc<dyn ZoneStore + Send + Sync>;

/// Zone management operations of an authoritative DNS server.
#[async_trait::async_trait]
pub trait ZoneStore {
    /// Fetch a zone with all of its RRsets, or `None` if it doesn't exist.
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error>;

    /// Create an empty zone. The store adds its own SOA and NS RRsets.
    async fn create_zone(&self, name: &str) -> Result<Zone, Error>;

    /// Apply RRsets marked with a change type. RRsets not included are left untouched.
    async fn patch_rrsets(&self, name: &str, rrsets: &[RRset]) -> Result<(), Error>;

    /// Delete a zone and everything in it.
    async fn delete_zone(&self, name: &str) -> Result<(), Error>;

    /// List every zone with its SOA serial.
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, Error>;
}
