//! Dose slots: the fixed row identities of a vaccination card.
//!
//! The raw label ([`DoseSlot::label`]) is what the backend stores in `dose_aplicada`
//! and is the comparison key everywhere. The display label is for presentation only.

use std::fmt;

/// One row of the vaccination card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DoseSlot {
    First,
    Second,
    Third,
    Booster,
    FirstBooster,
    SecondBooster,
    Single,
    Bcg,
    Missed,
    Fourth,
    Fifth,
}

impl DoseSlot {
    /// Card row order.
    pub const ALL: [DoseSlot; 11] = [
        DoseSlot::First,
        DoseSlot::Second,
        DoseSlot::Third,
        DoseSlot::Booster,
        DoseSlot::FirstBooster,
        DoseSlot::SecondBooster,
        DoseSlot::Single,
        DoseSlot::Bcg,
        DoseSlot::Missed,
        DoseSlot::Fourth,
        DoseSlot::Fifth,
    ];

    /// Raw label as exchanged with the backend.
    pub const fn label(self) -> &'static str {
        match self {
            DoseSlot::First => "1a Dose",
            DoseSlot::Second => "2a Dose",
            DoseSlot::Third => "3a Dose",
            DoseSlot::Booster => "Reforco",
            DoseSlot::FirstBooster => "1a Reforco",
            DoseSlot::SecondBooster => "2a Reforco",
            DoseSlot::Single => "Dose Unica",
            DoseSlot::Bcg => "BCG",
            DoseSlot::Missed => "Faltoso",
            DoseSlot::Fourth => "4a Dose",
            DoseSlot::Fifth => "5a Dose",
        }
    }

    /// Parse an exact raw label. No trimming or case folding.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }

    /// Presentation form of the label (`"1a Dose"` -> `"1ª Dose"`).
    pub fn display_label(self) -> String {
        display_label(self.label())
    }

    pub fn is_missed(self) -> bool {
        matches!(self, DoseSlot::Missed)
    }
}

impl fmt::Display for DoseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw labels of all slots, in card row order.
pub fn default_slot_labels() -> Vec<String> {
    DoseSlot::ALL
        .iter()
        .map(|slot| slot.label().to_string())
        .collect()
}

/// Substitute ordinal and accented forms in a raw label.
///
/// Unknown labels pass through the same substitutions, so a label the backend
/// introduces later still gets a sensible presentation.
pub fn display_label(raw: &str) -> String {
    raw.replacen("a Dose", "ª Dose", 1)
        .replacen("a Reforco", "º Reforço", 1)
        .replacen("Unica", "Única", 1)
}
