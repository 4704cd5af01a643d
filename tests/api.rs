//! The HTTP API served on an ephemeral port, backed by the in-memory zone store.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use zonecraft::Config;

struct TestApi {
    base: String,
    client: reqwest::Client,
}

impl TestApi {
    async fn start() -> Self {
        let config: Config = serde_json::from_value(json!({
            "base_domain": "messwithdns.example",
            "nameservers": ["ns1.messwithdns.example", "ns2.messwithdns.example"],
            "api_bind_addr": "127.0.0.1:0",
            "api_timeout": 5,
            "zone_store": {"kind": "memory"},
        }))
        .unwrap();
        let config = Arc::new(config);
        let store = config.zone_store().unwrap();
        let records = config.record_service(store).unwrap();

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let server = axum::Server::bind(&addr)
            .serve(zonecraft::api::router(config, records).into_make_service());
        let base = format!("http://{}", server.local_addr());
        tokio::spawn(server);

        TestApi {
            base,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.client.get(self.url(path)).header("X-Username", "alice"))
            .await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            self.client
                .post(self.url(path))
                .header("X-Username", "alice")
                .json(&body),
        )
        .await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.client.delete(self.url(path)).header("X-Username", "alice"))
            .await
    }
}

fn record_path(id: &str) -> String {
    let encoded = id
        .replace('|', "%7C")
        .replace('/', "%2F")
        .replace('+', "%2B")
        .replace('=', "%3D");
    format!("/records/{encoded}")
}

fn a_record(subdomain: &str, address: &str) -> Value {
    json!({"subdomain": subdomain, "type": "A", "ttl": "60", "value_A": address})
}

#[tokio::test]
async fn health_and_schemas() {
    let api = TestApi::start().await;
    let (status, body) = api.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": "healthy"}));

    let (status, body) = api.get("/schemas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["MX"][0]["name"], "Preference");
    assert_eq!(body["MX"][0]["type"], "number");
    assert_eq!(body["MX"][1]["name"], "Mx");
    assert_eq!(body["SOA"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn requests_need_a_username() {
    let api = TestApi::start().await;
    let (status, body) = api
        .send(api.client.get(api.url("/records")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "you must be logged in"}));
}

#[tokio::test]
async fn record_lifecycle() {
    let api = TestApi::start().await;
    let (status, body) = api
        .post(
            "/records",
            json!({"subdomain": "@", "type": "MX", "ttl": 60, "value_Preference": "10", "value_Mx": "example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = api.get("/records?hide_managed=true").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["record"]["content"], "10 example.com.");
    assert_eq!(body[0]["record"]["domain_name"], "alice.messwithdns.example.");
    let id = body[0]["id"].as_str().unwrap().to_string();

    let (status, _) = api
        .post(
            &record_path(&id),
            json!({"subdomain": "@", "type": "MX", "ttl": "60", "value_Preference": "20", "value_Mx": "example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = api.get("/records?hide_managed=true").await;
    assert_eq!(body[0]["record"]["value_Preference"], "20");
    let id = body[0]["id"].as_str().unwrap().to_string();

    let (status, _) = api.delete(&record_path(&id)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = api.get("/records?hide_managed=true").await;
    assert_eq!(body, json!([]));

    let (status, body) = api.delete(&record_path(&id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("record not found"));
}

#[tokio::test]
async fn managed_records_are_listed_by_default() {
    let api = TestApi::start().await;
    api.post("/records", a_record("www", "1.2.3.4")).await;
    let (_, body) = api.get("/records").await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn client_errors() {
    let api = TestApi::start().await;

    let (status, body) = api
        .post(
            "/records",
            json!({"subdomain": "www", "type": "A", "ttl": "abc", "value_A": "1.2.3.4"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "TTL must be a number from 1 to 2147483647, got \"abc\""
    );

    api.post("/records", a_record("www", "1.2.3.4")).await;
    let (status, body) = api
        .post(
            "/records",
            json!({"subdomain": "www", "type": "CNAME", "ttl": "60", "value_Target": "example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("CNAME records aren't allowed"));

    let (status, _) = api.delete("/records/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = api
        .client
        .post(api.url("/records"))
        .header("X-Username", "alice")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_all_records() {
    let api = TestApi::start().await;
    api.post("/records", a_record("www", "1.2.3.4")).await;
    let (status, body) = api.delete("/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    let (_, body) = api.get("/records?hide_managed=true").await;
    assert_eq!(body, json!([]));
}
