//! # Cartão Core
//!
//! Core logic of the vaccination-card client.
//!
//! This crate contains pure data operations only:
//! - the card data model and its JSON wire mapping
//! - projection of a person's registrations onto the vaccine × dose grid
//! - local dose-sequence validation
//! - screen-table and CSV serialisation of a projected grid
//! - the immutable view snapshot and its generation guard
//!
//! **No network concerns**: HTTP calls, authentication and token storage belong in
//! `cartao-client`.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod constants;
pub mod csv;
pub mod error;
pub mod model;
pub mod projector;
pub mod slots;
pub mod table;
pub mod validation;
pub mod validator;
pub mod view;

pub use config::CardConfig;
pub use constants::DEFAULT_CATEGORY;
pub use error::{CardError, CardResult};
pub use model::{
    parse_application_date, Credentials, DoseRecord, NewPerson, NewVaccination, NewVaccine,
    Person, VaccinationCard, VaccineCatalogEntry, VaccineRegistration,
};
pub use projector::{CardProjector, Cell, DoseStatus, Grid, GridRow};
pub use slots::DoseSlot;
pub use table::{render_table, TableOptions};
pub use validator::{DoseSequenceValidator, RejectReason, Verdict};
pub use view::{Generation, ViewCell, ViewState};

// Re-export shared value types so callers need a single dependency.
pub use cartao_types::{AccessToken, NonEmptyText, PersonId, TextError, VaccinationId, VaccineId};
