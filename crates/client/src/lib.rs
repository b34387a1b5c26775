//! # Cartão Client
//!
//! REST client for the vaccination-card backend.
//!
//! Handles:
//! - typed calls for persons, the vaccine catalog, vaccinations and authentication
//! - bearer-token storage and forced logout on 401
//! - [`CardService`], which ties the calls to the view snapshot, the local dose
//!   rules and the exporters from `cartao-core`
//!
//! The card projection itself lives in `cartao-core` and never performs I/O.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod persons;
pub mod service;
pub mod session;
pub mod vaccines;

#[cfg(test)]
mod fake_backend;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use service::{CardService, CsvExport};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use vaccines::CreatedVaccination;
