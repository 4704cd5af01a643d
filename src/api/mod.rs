//! HTTP API for managing the records in a user's zone.
//!
//! Authentication is left to a proxy in front of the API, which passes the authenticated
//! username in the `X-Username` header. Requests without it are refused with HTTP 401
//! (Unauthorized). Errors are returned as `{"error": "..."}`.
//!
//! # API Endpoints
//!
//! ## `/health` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/schemas` (GET)
//!
//!   Returns, for every supported record type, the ordered list of fields a record of that
//!   type is made of:
//!
//!   ```json
//!   { "MX": [ { "name": "Preference", "label": "Preference", "type": "number", "example": "10" },
//!             { "name": "Mx", "label": "Mail Server", "type": "text", "example": "mail.messagingengine.com" } ] }
//!   ```
//!
//! ## `/records` (GET)
//!
//!   Lists every record in the user's zone, creating the zone if needed. With
//!   `?hide_managed=true` the apex SOA and NS records are left out.
//!
//!   ```json
//!   [ { "id": "alice.messwithdns.example.|MX|MTAgZXhhbXBsZS5jb20u",
//!       "record": { "subdomain": "@", "type": "MX", "ttl": "60", "content": "10 example.com.",
//!                   "domain_name": "alice.messwithdns.example.",
//!                   "value_Preference": "10", "value_Mx": "example.com." } } ]
//!   ```
//!
//! ## `/records` (POST)
//!
//!   Creates a record from a JSON body of the form:
//!
//!   ```json
//!   { "subdomain": "@", "type": "MX", "ttl": "60", "value_Preference": "10", "value_Mx": "example.com" }
//!   ```
//!
//!   Returns `{"ok":true}`. Invalid input is HTTP 400 (Bad Request) and a record that can't
//!   coexist with the zone's existing records is HTTP 409 (Conflict).
//!
//! ## `/records/{id}` (POST)
//!
//!   Replaces the record identified by the (percent-encoded) `id` with the record in the body.
//!   An `id` that isn't in the zone is HTTP 404 (Not Found).
//!
//! ## `/records/{id}` (DELETE)
//!
//!   Deletes the record identified by `id`.
//!
//! ## `/records` (DELETE)
//!
//!   Deletes the user's whole zone.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::{new, router};
