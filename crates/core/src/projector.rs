//! Projection of a person's registrations onto the fixed vaccine × dose grid.
//!
//! The projection is a pure function of its inputs. The screen table
//! ([`crate::table`]) and the CSV exporter ([`crate::csv`]) both consume the
//! resulting [`Grid`] and never look at the raw registrations themselves.

use crate::constants::{APPLIED_LABEL, MISSED_LABEL};
use crate::slots::{default_slot_labels, display_label, DoseSlot};
use crate::{CardConfig, VaccinationCard, VaccineCatalogEntry, VaccineRegistration};
use cartao_types::VaccinationId;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Application status shown in a populated cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoseStatus {
    Applied,
    Missed,
}

/// One cell of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled {
        status: DoseStatus,
        /// Always `None` for [`DoseStatus::Missed`].
        date: Option<NaiveDate>,
        record_id: VaccinationId,
    },
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled { .. })
    }

    pub fn record_id(&self) -> Option<VaccinationId> {
        match self {
            Cell::Filled { record_id, .. } => Some(*record_id),
            Cell::Empty => None,
        }
    }

    /// Text shown for the cell by both serializers: empty, `Aplicada: <date>` or
    /// `Faltoso`.
    pub fn text(&self, config: &CardConfig) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Filled {
                status: DoseStatus::Missed,
                ..
            } => MISSED_LABEL.to_string(),
            Cell::Filled {
                status: DoseStatus::Applied,
                date: Some(date),
                ..
            } => format!("{APPLIED_LABEL}: {}", config.format_date(*date)),
            Cell::Filled {
                status: DoseStatus::Applied,
                date: None,
                ..
            } => APPLIED_LABEL.to_string(),
        }
    }
}

/// One row: a dose slot and a cell per column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridRow {
    pub slot_label: String,
    pub cells: Vec<Cell>,
}

impl GridRow {
    pub fn display_label(&self) -> String {
        display_label(&self.slot_label)
    }
}

/// Vaccine names as columns, dose slots as rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl Grid {
    /// Cell at (`slot_label`, `vaccine_name`), if both coordinates exist.
    pub fn cell(&self, slot_label: &str, vaccine_name: &str) -> Option<&Cell> {
        let column = self.columns.iter().position(|c| c == vaccine_name)?;
        self.rows
            .iter()
            .find(|row| row.slot_label == slot_label)
            .and_then(|row| row.cells.get(column))
    }

    /// Coordinates of every populated cell, row-major.
    pub fn populated(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.cells
                    .iter()
                    .zip(&self.columns)
                    .filter(|(cell, _)| cell.is_filled())
                    .map(move |(_, column)| (row.slot_label.as_str(), column.as_str()))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.cells.iter().all(|cell| !cell.is_filled()))
    }
}

/// Stateless projector; kept as a type so callers can name the operation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardProjector;

impl CardProjector {
    /// Build the grid.
    ///
    /// - columns are the catalog entries of `category`, in catalog order, without
    ///   repeated names
    /// - rows are `dose_slots`, in the given order
    /// - registrations are indexed by vaccine name, a later duplicate replacing an
    ///   earlier one
    /// - within a registration the first record whose label equals the row label
    ///   fills the cell
    pub fn project<S: AsRef<str>>(
        catalog: &[VaccineCatalogEntry],
        category: &str,
        registrations: &[VaccineRegistration],
        dose_slots: &[S],
    ) -> Grid {
        let mut seen = HashSet::new();
        let columns: Vec<String> = catalog
            .iter()
            .filter(|entry| entry.category == category)
            .filter(|entry| seen.insert(entry.name.as_str()))
            .map(|entry| entry.name.clone())
            .collect();

        let by_name: HashMap<&str, &VaccineRegistration> = registrations
            .iter()
            .map(|registration| (registration.vaccine_name.as_str(), registration))
            .collect();

        let rows = dose_slots
            .iter()
            .map(|slot| {
                let slot_label = slot.as_ref();
                let cells = columns
                    .iter()
                    .map(|column| project_cell(by_name.get(column.as_str()), slot_label))
                    .collect();
                GridRow {
                    slot_label: slot_label.to_string(),
                    cells,
                }
            })
            .collect();

        Grid { columns, rows }
    }

    /// Project a loaded card with the default dose slots.
    pub fn project_card(
        catalog: &[VaccineCatalogEntry],
        category: &str,
        card: &VaccinationCard,
    ) -> Grid {
        Self::project(
            catalog,
            category,
            &card.registrations,
            &default_slot_labels(),
        )
    }
}

fn project_cell(registration: Option<&&VaccineRegistration>, slot_label: &str) -> Cell {
    let Some(dose) = registration.and_then(|r| r.dose_for(slot_label)) else {
        return Cell::Empty;
    };

    if dose.slot().is_some_and(DoseSlot::is_missed) {
        Cell::Filled {
            status: DoseStatus::Missed,
            date: None,
            record_id: dose.id,
        }
    } else {
        Cell::Filled {
            status: DoseStatus::Applied,
            date: Some(dose.applied_on),
            record_id: dose.id,
        }
    }
}
