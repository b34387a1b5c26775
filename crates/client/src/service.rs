//! Card workflows on top of [`ApiClient`].
//!
//! `CardService` owns the operator's [`ViewCell`]. Loads go through the cell's
//! generation guard, so only the most recent load can replace the snapshot.
//! Registering a dose checks the local sequence rules against the snapshot first
//! and never touches the network when they reject.

use crate::{ApiClient, ClientError, ClientResult};
use cartao_core::csv::{file_name, to_csv, write_csv};
use cartao_core::{
    render_table, CardConfig, DoseSequenceValidator, DoseSlot, NewVaccination, PersonId,
    TableOptions, VaccinationId, ViewCell, ViewState, Verdict,
};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A card export ready to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug)]
pub struct CardService {
    client: ApiClient,
    config: CardConfig,
    validator: DoseSequenceValidator,
    view: ViewCell,
}

impl CardService {
    pub fn new(client: ApiClient, config: CardConfig) -> Self {
        Self {
            client,
            config,
            validator: DoseSequenceValidator::default(),
            view: ViewCell::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Latest committed snapshot.
    pub fn current_view(&self) -> ClientResult<Arc<ViewState>> {
        self.view.current().ok_or(ClientError::NoView)
    }

    /// Fetch catalog and card for `person_id` and replace the snapshot.
    ///
    /// Returns `ClientError::Superseded` if another load began while this one was
    /// waiting on the backend; the newer load's result is the one kept.
    pub async fn load_view(
        &self,
        person_id: PersonId,
        category: Option<&str>,
    ) -> ClientResult<Arc<ViewState>> {
        let generation = self.view.begin();
        let category = category
            .map(str::to_string)
            .unwrap_or_else(|| self.config.category().to_string());

        let loaded = async {
            let catalog = self.client.list_vaccines().await?;
            let card = self.client.vaccination_card(person_id).await?;
            Ok::<_, ClientError>(ViewState::new(category, catalog.into(), card))
        }
        .await;
        let state = self.end_session_on_401(loaded)?;

        self.view
            .commit(generation, state)
            .ok_or(ClientError::Superseded)
    }

    /// Reload the person currently shown, keeping the category.
    pub async fn reload(&self) -> ClientResult<Arc<ViewState>> {
        let current = self.current_view()?;
        self.load_view(current.person().id, Some(current.category()))
            .await
    }

    /// Show the current card through another category. No network call.
    pub fn switch_category(&self, category: &str) -> ClientResult<Arc<ViewState>> {
        let current = self.current_view()?;
        let generation = self.view.begin();
        self.view
            .commit(generation, current.with_category(category.trim()))
            .ok_or(ClientError::Superseded)
    }

    /// Validate locally, submit the dose and reload the card.
    pub async fn register_dose(
        &self,
        vaccine_name: &str,
        slot_label: &str,
        applied_on: NaiveDate,
    ) -> ClientResult<Arc<ViewState>> {
        let view = self.current_view()?;

        let slot = DoseSlot::from_label(slot_label)
            .ok_or_else(|| ClientError::UnknownSlot(slot_label.to_string()))?;
        let vaccine = view
            .vaccine_by_name(vaccine_name)
            .ok_or_else(|| ClientError::UnknownVaccine(vaccine_name.to_string()))?;

        let applied = view.applied_slots(&vaccine.name);
        if let Verdict::Reject(reason) = self.validator.validate(&applied, slot.label()) {
            return Err(ClientError::DoseSequence(reason));
        }

        let payload = NewVaccination {
            person_id: view.person().id,
            vaccine_id: vaccine.id,
            dose: slot.label().to_string(),
            applied_on,
        };
        let created = self.client.create_vaccination(&payload).await;
        self.end_session_on_401(created)?;

        self.reload().await
    }

    /// Delete one recorded dose and reload the card.
    pub async fn delete_dose(&self, record_id: VaccinationId) -> ClientResult<Arc<ViewState>> {
        let deleted = self.client.delete_vaccination(record_id).await;
        self.end_session_on_401(deleted)?;
        self.reload().await
    }

    /// A 401 from any backend call drops the snapshot along with the token.
    fn end_session_on_401<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            if e.requires_login() {
                self.view.clear();
            }
        }
        result
    }

    /// Forget the session and the snapshot.
    pub fn logout(&self) -> ClientResult<()> {
        self.view.clear();
        self.client.logout()
    }

    pub fn screen_table(&self, view: &ViewState, options: TableOptions) -> String {
        render_table(&view.grid(), &self.config, options)
    }

    pub fn export_csv(&self, view: &ViewState) -> CsvExport {
        CsvExport {
            file_name: file_name(view.person()),
            contents: to_csv(&view.grid(), view.person(), &self.config),
        }
    }

    pub fn export_csv_to(&self, view: &ViewState, dir: &Path) -> ClientResult<PathBuf> {
        Ok(write_csv(dir, &view.grid(), view.person(), &self.config)?)
    }
}
