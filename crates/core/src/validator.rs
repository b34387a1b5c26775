//! Local dose-sequence rules.
//!
//! The rules give the operator immediate feedback before a vaccination is submitted.
//! They are advisory: the backend remains the record of authority and may accept or
//! refuse a dose independently.

use crate::slots::DoseSlot;
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Why a candidate dose was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    FirstDoseRequired,
    SecondDoseRequired,
    PriorDoseRequired,
    FirstBoosterRequired,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectReason::FirstDoseRequired => "1st dose required first",
            RejectReason::SecondDoseRequired => "2nd dose required first",
            RejectReason::PriorDoseRequired => "a prior dose required",
            RejectReason::FirstBoosterRequired => "booster 1 required first",
        };
        f.write_str(message)
    }
}

impl std::error::Error for RejectReason {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(self) -> bool {
        matches!(self, Verdict::Accept)
    }

    /// `Ok(())` on accept, so callers can use `?`.
    pub fn into_result(self) -> Result<(), RejectReason> {
        match self {
            Verdict::Accept => Ok(()),
            Verdict::Reject(reason) => Err(reason),
        }
    }
}

/// A candidate slot and the slots of which at least one must already be recorded.
#[derive(Clone, Copy, Debug)]
pub struct SequenceRule {
    pub candidate: DoseSlot,
    pub predecessors: &'static [DoseSlot],
    pub reason: RejectReason,
}

/// Slots missing from this table have no precondition.
pub const SEQUENCE_RULES: &[SequenceRule] = &[
    SequenceRule {
        candidate: DoseSlot::Second,
        predecessors: &[DoseSlot::First],
        reason: RejectReason::FirstDoseRequired,
    },
    SequenceRule {
        candidate: DoseSlot::Third,
        predecessors: &[DoseSlot::Second],
        reason: RejectReason::SecondDoseRequired,
    },
    SequenceRule {
        candidate: DoseSlot::FirstBooster,
        predecessors: &[
            DoseSlot::First,
            DoseSlot::Second,
            DoseSlot::Third,
            DoseSlot::Single,
            DoseSlot::Bcg,
        ],
        reason: RejectReason::PriorDoseRequired,
    },
    SequenceRule {
        candidate: DoseSlot::SecondBooster,
        predecessors: &[DoseSlot::FirstBooster],
        reason: RejectReason::FirstBoosterRequired,
    },
];

#[derive(Clone, Copy, Debug)]
pub struct DoseSequenceValidator {
    rules: &'static [SequenceRule],
}

impl Default for DoseSequenceValidator {
    fn default() -> Self {
        Self {
            rules: SEQUENCE_RULES,
        }
    }
}

impl DoseSequenceValidator {
    /// Decide whether `candidate` may be recorded given the raw labels already
    /// recorded for the same person and vaccine.
    pub fn validate<S>(&self, applied_slots: &BTreeSet<S>, candidate: &str) -> Verdict
    where
        S: Borrow<str> + Ord,
    {
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.candidate.label() == candidate)
        else {
            return Verdict::Accept;
        };

        let satisfied = rule
            .predecessors
            .iter()
            .any(|predecessor| applied_slots.contains(predecessor.label()));

        if satisfied {
            Verdict::Accept
        } else {
            tracing::debug!(candidate, reason = %rule.reason, "dose sequence rejected");
            Verdict::Reject(rule.reason)
        }
    }
}

/// [`DoseSequenceValidator::validate`] with the default rule table.
pub fn validate<S>(applied_slots: &BTreeSet<S>, candidate: &str) -> Verdict
where
    S: Borrow<str> + Ord,
{
    DoseSequenceValidator::default().validate(applied_slots, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(labels: &[&'static str]) -> BTreeSet<&'static str> {
        labels.iter().copied().collect()
    }

    #[test]
    fn second_dose_requires_first() {
        assert_eq!(
            validate(&applied(&[]), "2a Dose"),
            Verdict::Reject(RejectReason::FirstDoseRequired)
        );
        assert_eq!(validate(&applied(&["1a Dose"]), "2a Dose"), Verdict::Accept);
    }

    #[test]
    fn third_dose_requires_second() {
        assert_eq!(
            validate(&applied(&["1a Dose"]), "3a Dose"),
            Verdict::Reject(RejectReason::SecondDoseRequired)
        );
        assert_eq!(validate(&applied(&["2a Dose"]), "3a Dose"), Verdict::Accept);
    }

    #[test]
    fn first_booster_accepts_any_primary_dose() {
        for prior in ["1a Dose", "2a Dose", "3a Dose", "Dose Unica", "BCG"] {
            assert_eq!(
                validate(&applied(&[prior]), "1a Reforco"),
                Verdict::Accept,
                "prior dose {prior}"
            );
        }
        assert_eq!(
            validate(&applied(&["Reforco", "Faltoso"]), "1a Reforco"),
            Verdict::Reject(RejectReason::PriorDoseRequired)
        );
    }

    #[test]
    fn second_booster_requires_first_booster() {
        assert_eq!(
            validate(&applied(&["1a Dose", "2a Dose"]), "2a Reforco"),
            Verdict::Reject(RejectReason::FirstBoosterRequired)
        );
        assert_eq!(validate(&applied(&["1a Reforco"]), "2a Reforco"), Verdict::Accept);
    }

    #[test]
    fn slots_without_rules_are_always_accepted() {
        for candidate in ["1a Dose", "Reforco", "Dose Unica", "BCG", "Faltoso", "4a Dose", "5a Dose", "Outra"] {
            assert_eq!(validate(&applied(&[]), candidate), Verdict::Accept);
        }
    }

    #[test]
    fn accepts_owned_string_sets() {
        let slots: BTreeSet<String> = ["Dose Unica".to_string()].into_iter().collect();
        assert!(validate(&slots, "1a Reforco").is_accept());
    }

    #[test]
    fn verdict_is_repeatable() {
        let slots = applied(&["1a Dose"]);
        let first = validate(&slots, "3a Dose");
        for _ in 0..3 {
            assert_eq!(validate(&slots, "3a Dose"), first);
        }
    }

    #[test]
    fn reject_messages_are_readable() {
        assert_eq!(RejectReason::FirstDoseRequired.to_string(), "1st dose required first");
        assert_eq!(RejectReason::PriorDoseRequired.to_string(), "a prior dose required");
        assert_eq!(
            Verdict::Reject(RejectReason::FirstBoosterRequired).into_result(),
            Err(RejectReason::FirstBoosterRequired)
        );
    }
}
