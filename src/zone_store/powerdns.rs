//! A [`ZoneStore`][super::ZoneStore] backed by the HTTP API of a PowerDNS authoritative server.
use crate::error::Error;
use crate::zone::{RRset, Zone, ZoneSummary};
use crate::zone_store::ZoneStore;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone)]
pub struct PowerDnsZoneStore {
    http_client: HttpClient,
    base_url: String,
    server_id: String,
    nameservers: Vec<String>,
}

#[derive(Serialize)]
struct CreateZone<'a> {
    name: &'a str,
    kind: &'static str,
    nameservers: &'a [String],
}

#[derive(Serialize)]
struct PatchRRsets<'a> {
    rrsets: &'a [RRset],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl PowerDnsZoneStore {
    /// Requests that take longer than `timeout` fail with [`Error::Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if `api_key` can't be used as a header value, or
    /// [`Error::Transport`] if the HTTP client can't be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        server_id: &str,
        nameservers: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        headers.append(API_KEY_HEADER, key);

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(PowerDnsZoneStore {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            server_id: server_id.to_string(),
            nameservers,
        })
    }

    fn zones_url(&self) -> String {
        format!("{}/api/v1/servers/{}/zones", self.base_url, self.server_id)
    }

    fn zone_url(&self, name: &str) -> String {
        format!("{}/{name}", self.zones_url())
    }
}

/// Turn a non-2xx response into [`Error::Backend`], keeping the server's message verbatim.
async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&body).map_or(body, |parsed| parsed.error);
    Err(Error::Backend {
        status: Some(status.as_u16()),
        message,
    })
}

fn is_missing_zone(status: StatusCode, err: &Error) -> bool {
    match err {
        Error::Backend { message, .. } => {
            status == StatusCode::NOT_FOUND
                || (status == StatusCode::UNPROCESSABLE_ENTITY
                    && message.contains("Could not find domain"))
        }
        _ => false,
    }
}

#[async_trait::async_trait]
impl ZoneStore for PowerDnsZoneStore {
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        let response = self.http_client.get(self.zone_url(name)).send().await?;
        let status = response.status();
        match check(response).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(err) if is_missing_zone(status, &err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_zone(&self, name: &str) -> Result<Zone, Error> {
        let body = CreateZone {
            name,
            kind: "Native",
            nameservers: &self.nameservers,
        };
        let response = self
            .http_client
            .post(self.zones_url())
            .json(&body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn patch_rrsets(&self, name: &str, rrsets: &[RRset]) -> Result<(), Error> {
        let response = self
            .http_client
            .patch(self.zone_url(name))
            .json(&PatchRRsets { rrsets })
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    async fn delete_zone(&self, name: &str) -> Result<(), Error> {
        let response = self.http_client.delete(self.zone_url(name)).send().await?;
        check(response).await.map(|_| ())
    }

    async fn list_zones(&self) -> Result<Vec<ZoneSummary>, Error> {
        let response = self.http_client.get(self.zones_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store(base_url: &str, api_key: &str) -> Result<PowerDnsZoneStore, Error> {
        PowerDnsZoneStore::new(
            base_url,
            api_key,
            "localhost",
            vec![],
            Duration::from_secs(10),
        )
    }

    #[test]
    fn urls_follow_server_layout() {
        let store = new_store("http://127.0.0.1:8081/", "secret").unwrap();
        assert_eq!(
            store.zones_url(),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones"
        );
        assert_eq!(
            store.zone_url("alice.messwithdns.example."),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones/alice.messwithdns.example."
        );
    }

    #[test]
    fn rejects_unusable_api_key() {
        let err = new_store("http://127.0.0.1:8081", "bad\nkey").unwrap_err();
        assert!(matches!(err, Error::InvalidApiKey(_)));
    }

    #[test]
    fn missing_zone_detection() {
        let backend = |message: &str| Error::Backend {
            status: None,
            message: message.to_string(),
        };
        assert!(is_missing_zone(StatusCode::NOT_FOUND, &backend("Not Found")));
        assert!(is_missing_zone(
            StatusCode::UNPROCESSABLE_ENTITY,
            &backend("Could not find domain 'x.'")
        ));
        assert!(!is_missing_zone(
            StatusCode::UNPROCESSABLE_ENTITY,
            &backend("RRset x. IN A: Name is out of zone")
        ));
    }
}
