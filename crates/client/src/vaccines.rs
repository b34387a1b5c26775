//! `/vacinas` (catalog) and `/vacinacoes` (applied doses) endpoints.

use crate::{ApiClient, ClientResult};
use cartao_core::{NewVaccination, NewVaccine, VaccinationId, VaccineCatalogEntry, VaccineId};
use serde::Deserialize;

/// What `POST /vacinacoes` returns. Only the id is relied upon.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedVaccination {
    #[serde(alias = "id_vacinacao")]
    pub id: VaccinationId,
}

impl ApiClient {
    pub async fn list_vaccines(&self) -> ClientResult<Vec<VaccineCatalogEntry>> {
        self.get_json("vacinas").await
    }

    pub async fn get_vaccine(&self, id: VaccineId) -> ClientResult<VaccineCatalogEntry> {
        self.get_json(&format!("vacinas/{id}")).await
    }

    pub async fn create_vaccine(&self, vaccine: &NewVaccine) -> ClientResult<VaccineCatalogEntry> {
        let created: VaccineCatalogEntry = self.post_json("vacinas", vaccine).await?;
        tracing::info!(id = %created.id, name = %created.name, "vaccine created");
        Ok(created)
    }

    /// Deleting a vaccine also removes every dose recorded for it.
    pub async fn delete_vaccine(&self, id: VaccineId) -> ClientResult<Option<String>> {
        self.delete(&format!("vacinas/{id}")).await
    }

    /// Submit a dose. Callers are expected to have checked the dose sequence first;
    /// see `CardService::register_dose`.
    pub async fn create_vaccination(
        &self,
        vaccination: &NewVaccination,
    ) -> ClientResult<CreatedVaccination> {
        let created: CreatedVaccination = self.post_json("vacinacoes", vaccination).await?;
        tracing::info!(
            id = %created.id,
            person = %vaccination.person_id,
            dose = %vaccination.dose,
            "vaccination recorded"
        );
        Ok(created)
    }

    pub async fn delete_vaccination(&self, id: VaccinationId) -> ClientResult<Option<String>> {
        self.delete(&format!("vacinacoes/{id}")).await
    }
}
