//! `/pessoas` endpoints.

use crate::{ApiClient, ClientResult};
use cartao_core::{NewPerson, Person, PersonId, VaccinationCard};

impl ApiClient {
    pub async fn list_persons(&self) -> ClientResult<Vec<Person>> {
        self.get_json("pessoas").await
    }

    pub async fn get_person(&self, id: PersonId) -> ClientResult<Person> {
        self.get_json(&format!("pessoas/{id}")).await
    }

    /// The backend answers 409 when the identification number is already taken.
    pub async fn create_person(&self, person: &NewPerson) -> ClientResult<Person> {
        let created: Person = self.post_json("pessoas", person).await?;
        tracing::info!(id = %created.id, "person created");
        Ok(created)
    }

    /// Removes the person and, on the backend, their whole card.
    pub async fn delete_person(&self, id: PersonId) -> ClientResult<Option<String>> {
        self.delete(&format!("pessoas/{id}")).await
    }

    pub async fn vaccination_card(&self, id: PersonId) -> ClientResult<VaccinationCard> {
        self.get_json(&format!("pessoas/{id}/cartao_vacinacao")).await
    }
}
