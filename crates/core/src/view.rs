//! The operator's current view: one immutable snapshot, replaced wholesale.
//!
//! A reload calls [`ViewCell::begin`] before it starts fetching and
//! [`ViewCell::commit`] when the responses are in. Only the most recently begun
//! load may commit, so a slow response for a person the operator has already
//! switched away from is dropped instead of overwriting the newer view.

use crate::{CardProjector, Grid, Person, VaccinationCard, VaccineCatalogEntry};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Token identifying one view load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Everything the card screen shows, captured at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    category: String,
    person: Person,
    catalog: Arc<[VaccineCatalogEntry]>,
    card: VaccinationCard,
}

impl ViewState {
    pub fn new(
        category: impl Into<String>,
        catalog: Arc<[VaccineCatalogEntry]>,
        card: VaccinationCard,
    ) -> Self {
        Self {
            category: category.into(),
            person: card.person.clone(),
            catalog,
            card,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn catalog(&self) -> &[VaccineCatalogEntry] {
        &self.catalog
    }

    pub fn card(&self) -> &VaccinationCard {
        &self.card
    }

    /// Same data viewed through another category.
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self.clone()
        }
    }

    pub fn grid(&self) -> Grid {
        CardProjector::project_card(&self.catalog, &self.category, &self.card)
    }

    /// Raw labels already recorded for `vaccine_name` on this card.
    pub fn applied_slots(&self, vaccine_name: &str) -> BTreeSet<String> {
        self.card.applied_slots(vaccine_name)
    }

    /// Catalog entry for `vaccine_name`, preferring the current category.
    pub fn vaccine_by_name(&self, vaccine_name: &str) -> Option<&VaccineCatalogEntry> {
        self.catalog
            .iter()
            .find(|e| e.name == vaccine_name && e.category == self.category)
            .or_else(|| self.catalog.iter().find(|e| e.name == vaccine_name))
    }

    /// Distinct categories present in the catalog, in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.catalog
            .iter()
            .map(|e| e.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

#[derive(Debug, Default)]
struct Inner {
    latest: u64,
    current: Option<Arc<ViewState>>,
}

/// Holder of the current snapshot and of the latest issued generation.
#[derive(Debug, Default)]
pub struct ViewCell {
    inner: Mutex<Inner>,
}

impl ViewCell {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a load. Every earlier generation is superseded.
    pub fn begin(&self) -> Generation {
        let mut inner = self.lock();
        inner.latest += 1;
        Generation(inner.latest)
    }

    pub fn is_latest(&self, generation: Generation) -> bool {
        self.lock().latest == generation.0
    }

    /// Install `state` if `generation` is still the latest one.
    ///
    /// Returns the installed snapshot, or `None` if the load was superseded.
    pub fn commit(&self, generation: Generation, state: ViewState) -> Option<Arc<ViewState>> {
        let mut inner = self.lock();
        if inner.latest != generation.0 {
            tracing::warn!(
                generation = generation.0,
                latest = inner.latest,
                "discarding superseded view load"
            );
            return None;
        }
        let state = Arc::new(state);
        inner.current = Some(state.clone());
        tracing::info!(
            generation = generation.0,
            person = %state.person().id,
            category = state.category(),
            "view committed"
        );
        Some(state)
    }

    pub fn current(&self) -> Option<Arc<ViewState>> {
        self.lock().current.clone()
    }

    /// Drop the snapshot and supersede any load still in flight.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.current = None;
    }
}
