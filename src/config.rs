use crate::error::Error;
use crate::normalize::Normalizer;
use crate::service::RecordService;
use crate::validate;
use crate::zone_store::{DynZoneStore, InMemoryZoneStore, PowerDnsZoneStore};
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

const DEFAULT_RETENTION_DAYS: u16 = 7;
const DEFAULT_ZONE_STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub base_domain: String,
    pub nameservers: Vec<String>,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub zone_store: ZoneStoreConfig,
    #[serde(default = "default_retention_days")]
    pub retention_days: u16,
    /// How often to look for stale zones. The reaper doesn't run when unset.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(default)]
    pub reap_interval: Option<Duration>,
}

/// Where zones live.
#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ZoneStoreConfig {
    Memory,
    PowerDns {
        url: String,
        api_key: String,
        #[serde(default = "default_server_id")]
        server_id: String,
        /// Upper bound on each request to the PowerDNS API.
        #[serde_as(as = "DurationSeconds<u64>")]
        #[serde(default = "default_zone_store_timeout")]
        timeout: Duration,
    },
}

fn default_retention_days() -> u16 {
    DEFAULT_RETENTION_DAYS
}

fn default_server_id() -> String {
    "localhost".to_string()
}

fn default_zone_store_timeout() -> Duration {
    DEFAULT_ZONE_STORE_TIMEOUT
}

lazy_static! {
    // NOTE(XXX): Once the "ip" feature has stabilized we can use Ipv6Addr.is_unique_local[0].
    //            Presently this feature is unstable so we home-roll. See also RFC 4193[1].
    // [0]: https://doc.rust-lang.org/std/net/struct.Ipv6Addr.html#method.is_unique_local
    // [1]: https://www.rfc-editor.org/rfc/rfc4193.html
    static ref IPV6_UNIQUE_LOCAL_NETWORK: IpNetwork =
        IpNetwork::from_str("fc00::/7").expect("fc00::/7 is a valid network");
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.bind_addr_is_secure()?;
        conf.normalizer()?;
        conf.nameservers()?;
        Ok(conf)
    }

    pub fn normalizer(&self) -> Result<Normalizer, Error> {
        Ok(Normalizer::new(&self.base_domain)?)
    }

    /// Nameservers as lower-cased, dot-terminated names, the form the zone store wants them in.
    pub fn nameservers(&self) -> Result<Vec<String>, Error> {
        self.nameservers
            .iter()
            .map(|ns| -> Result<String, Error> {
                let ns = validate::fqdn("nameservers", ns.trim())?;
                Ok(ns.to_ascii_lowercase())
            })
            .collect()
    }

    pub fn zone_store(&self) -> Result<DynZoneStore, Error> {
        let store: DynZoneStore = match &self.zone_store {
            ZoneStoreConfig::Memory => Arc::new(InMemoryZoneStore::new(self.nameservers()?)),
            ZoneStoreConfig::PowerDns {
                url,
                api_key,
                server_id,
                timeout,
            } => Arc::new(PowerDnsZoneStore::new(
                url,
                api_key,
                server_id,
                self.nameservers()?,
                *timeout,
            )?),
        };
        Ok(store)
    }

    pub fn record_service(&self, store: DynZoneStore) -> Result<RecordService, Error> {
        Ok(RecordService::new(store, self.normalizer()?))
    }

    pub fn retention(&self) -> time::Duration {
        time::Duration::days(i64::from(self.retention_days))
    }

    fn bind_addr_is_secure(&self) -> Result<(), Error> {
        match self.api_bind_addr {
            SocketAddr::V4(v4_addr) => {
                let ip = v4_addr.ip();
                if !ip.is_loopback() && !ip.is_private() {
                    return Err(Error::InsecureAPIBind(IpAddr::V4(*ip)));
                }
                Ok(())
            }
            SocketAddr::V6(v6_addr) => {
                let ip = v6_addr.ip();
                if !ip.is_loopback() && !IPV6_UNIQUE_LOCAL_NETWORK.contains(IpAddr::V6(*ip)) {
                    return Err(Error::InsecureAPIBind(IpAddr::V6(*ip)));
                }
                Ok(())
            }
        }
    }
}
