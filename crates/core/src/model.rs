//! Vaccination-card data model and its JSON wire mapping.
//!
//! Field names follow the backend (`nome`, `dose_aplicada`, ...) on the wire and
//! English names in Rust. Create payloads are built through validating constructors
//! so a malformed request never reaches the network.

use crate::constants::{WIRE_DATETIME_FORMAT, WIRE_DATE_FORMAT};
use crate::validation::{validate_identification_number, validate_name};
use crate::{CardError, CardResult, DoseSlot};
use cartao_types::{NonEmptyText, PersonId, VaccinationId, VaccineId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Reference data and records
// ============================================================================

/// A person whose card is managed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "numero_identificacao")]
    pub identification_number: String,
}

/// One vaccine of the reference catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineCatalogEntry {
    pub id: VaccineId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
}

/// One applied (or missed) dose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseRecord {
    #[serde(rename = "id_vacinacao", alias = "id")]
    pub id: VaccinationId,
    /// Raw slot label; compared by exact match.
    #[serde(rename = "dose_aplicada")]
    pub dose: String,
    #[serde(rename = "data_aplicacao", with = "application_date")]
    pub applied_on: NaiveDate,
}

impl DoseRecord {
    /// The known slot this record occupies, if the label is one of the fixed set.
    pub fn slot(&self) -> Option<DoseSlot> {
        DoseSlot::from_label(&self.dose)
    }
}

/// All doses of one vaccine for one person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineRegistration {
    #[serde(rename = "nome_vacina")]
    pub vaccine_name: String,
    #[serde(default)]
    pub doses: Vec<DoseRecord>,
}

impl VaccineRegistration {
    /// First record whose label equals `slot_label`, in input order.
    pub fn dose_for(&self, slot_label: &str) -> Option<&DoseRecord> {
        self.doses.iter().find(|dose| dose.dose == slot_label)
    }

    pub fn applied_slots(&self) -> BTreeSet<String> {
        self.doses.iter().map(|dose| dose.dose.clone()).collect()
    }
}

/// Body of `GET /pessoas/{id}/cartao_vacinacao`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationCard {
    #[serde(rename = "pessoa")]
    pub person: Person,
    #[serde(rename = "vacinas_registradas", default)]
    pub registrations: Vec<VaccineRegistration>,
}

impl VaccinationCard {
    /// Registration for `vaccine_name`. When the backend repeats a name, the last
    /// one wins, matching what the projector displays.
    pub fn registration(&self, vaccine_name: &str) -> Option<&VaccineRegistration> {
        self.registrations
            .iter()
            .rev()
            .find(|registration| registration.vaccine_name == vaccine_name)
    }

    /// Raw labels already recorded for `vaccine_name`.
    pub fn applied_slots(&self, vaccine_name: &str) -> BTreeSet<String> {
        self.registration(vaccine_name)
            .map(VaccineRegistration::applied_slots)
            .unwrap_or_default()
    }
}

// ============================================================================
// Create payloads
// ============================================================================

/// Body of `POST /pessoas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPerson {
    #[serde(rename = "nome")]
    pub name: NonEmptyText,
    #[serde(rename = "numero_identificacao")]
    pub identification_number: NonEmptyText,
}

impl NewPerson {
    pub fn new(name: &str, identification_number: &str) -> CardResult<Self> {
        Ok(Self {
            name: validate_name("nome", name)?,
            identification_number: validate_identification_number(identification_number)?,
        })
    }
}

/// Body of `POST /vacinas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewVaccine {
    #[serde(rename = "nome")]
    pub name: NonEmptyText,
    #[serde(rename = "categoria")]
    pub category: NonEmptyText,
}

impl NewVaccine {
    pub fn new(name: &str, category: &str) -> CardResult<Self> {
        Ok(Self {
            name: validate_name("nome", name)?,
            category: validate_name("categoria", category)?,
        })
    }
}

/// Body of `POST /vacinacoes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewVaccination {
    #[serde(rename = "pessoa_id")]
    pub person_id: PersonId,
    #[serde(rename = "vacina_id")]
    pub vaccine_id: VaccineId,
    #[serde(rename = "dose_aplicada")]
    pub dose: String,
    #[serde(rename = "data_aplicacao", with = "application_date")]
    pub applied_on: NaiveDate,
}

/// Credentials for `POST /login` and `POST /register`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: NonEmptyText,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: impl Into<String>) -> CardResult<Self> {
        let password = password.into();
        if password.is_empty() {
            return Err(CardError::InvalidInput("password cannot be empty".into()));
        }
        Ok(Self {
            username: NonEmptyText::new(username)?,
            password,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Application dates
// ============================================================================

/// Parse an application date as sent by the backend or typed by an operator.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (optionally with fractional seconds)
/// and RFC 3339 timestamps. Any time component is discarded.
pub fn parse_application_date(value: &str) -> CardResult<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, WIRE_DATETIME_FORMAT) {
        return Ok(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }

    Err(CardError::InvalidDate {
        value: value.to_string(),
    })
}

mod application_date {
    use super::parse_application_date;
    use crate::constants::WIRE_DATETIME_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        serializer.serialize_str(&midnight.format(WIRE_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_application_date(&raw).map_err(serde::de::Error::custom)
    }
}
