use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalog::{InventoryCatalog, TypeStatus};
use crate::error::AllocationIssue;
use crate::model::{AllocationEntry, EquipmentType, SourceItem};
use crate::rules::{AllocationRuleSet, Discipline, CARDINALITY_PRIORITY};

/// Sums are compared with this slack so that integer inputs carried as
/// floats never fail on representation noise.
const SUM_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Result of one validation pass, as consumed by the presentation layer.
///
/// Serializes to `{"ok":true}` or
/// `{"ok":false,"errorCode":"...","errorParams":{...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Ok,
    Rejected(AllocationIssue),
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn issue(&self) -> Option<&AllocationIssue> {
        match self {
            Self::Ok => None,
            Self::Rejected(issue) => Some(issue),
        }
    }
}

impl<T> From<Result<T, AllocationIssue>> for Verdict {
    fn from(result: Result<T, AllocationIssue>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(issue) => Self::Rejected(issue),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ok => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("ok", &true)?;
                map.end()
            }
            Self::Rejected(issue) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("errorCode", issue.code())?;
                map.serialize_entry("errorParams", &issue.params())?;
                map.end()
            }
        }
    }
}

/// Allocation that passed every check. Only the engine can build one, and
/// it is the only allocation input the payload builder accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAllocation {
    entries: Vec<AllocationEntry>,
}

impl ValidatedAllocation {
    /// Nonzero entries, grouped by type in catalog order.
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Checks that can run as soon as an import result is opened: every imported
/// type has local equipment, and enough of it.
pub fn preflight(catalog: &InventoryCatalog, rules: &AllocationRuleSet) -> Result<(), AllocationIssue> {
    for equipment_type in CARDINALITY_PRIORITY {
        if catalog.status(equipment_type) == TypeStatus::MissingTargets {
            return Err(AllocationIssue::MissingTargetEquipment { equipment_type });
        }
    }

    for equipment_type in CARDINALITY_PRIORITY {
        let sources = catalog.sources(equipment_type);
        let targets = catalog.targets(equipment_type);
        if sources.is_empty() {
            continue;
        }
        if rules.required_slots(equipment_type, sources) > targets.len() {
            return Err(AllocationIssue::InsufficientTargetCardinality {
                equipment_type,
                source_count: sources.len(),
                target_count: targets.len(),
            });
        }
    }

    Ok(())
}

/// Run the full ordered check sequence for a commit.
///
/// Stops at the first failing check. `entries` is read as a snapshot and not
/// retained.
pub fn commit(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    entries: &[AllocationEntry],
) -> Result<ValidatedAllocation, AllocationIssue> {
    let result = run_checks(catalog, rules, entries);
    match &result {
        Ok(validated) => log::debug!("commit accepted: {} nonzero entries", validated.len()),
        Err(issue) => log::warn!("commit rejected: {issue}"),
    }
    result
}

/// Discriminated form of [`commit`] for the presentation layer.
pub fn validate(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    entries: &[AllocationEntry],
) -> Verdict {
    commit(catalog, rules, entries).into()
}

fn run_checks(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    entries: &[AllocationEntry],
) -> Result<ValidatedAllocation, AllocationIssue> {
    preflight(catalog, rules)?;

    let mut accepted = Vec::new();
    for equipment_type in EquipmentType::ALL {
        if catalog.status(equipment_type) != TypeStatus::Active {
            // Orphan and absent types have no editable fields.
            continue;
        }

        let effective = effective_entries(catalog, rules, equipment_type, entries);
        check_references(catalog, equipment_type, &effective)?;
        check_partitions(catalog, rules, equipment_type, &effective)?;

        log::debug!("{equipment_type}: {} nonzero entries accepted", effective.len());
        accepted.extend(effective);
    }

    Ok(ValidatedAllocation { entries: accepted })
}

/// Nonzero entries of one type. An auto-filled type is read-only, so its
/// pre-filled pairing replaces whatever the caller supplied.
fn effective_entries(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    equipment_type: EquipmentType,
    entries: &[AllocationEntry],
) -> Vec<AllocationEntry> {
    if let Some(filled) = rules.auto_fill(catalog, equipment_type) {
        return if filled.is_nonzero() { vec![filled] } else { Vec::new() };
    }

    entries
        .iter()
        .filter(|e| e.equipment_type == equipment_type && e.is_nonzero())
        .cloned()
        .collect()
}

fn check_references(
    catalog: &InventoryCatalog,
    equipment_type: EquipmentType,
    entries: &[AllocationEntry],
) -> Result<(), AllocationIssue> {
    for entry in entries {
        if catalog.source(equipment_type, &entry.source_item_name).is_none() {
            return Err(AllocationIssue::UnknownSourceItem {
                equipment_type,
                source_item_name: entry.source_item_name.clone(),
            });
        }
        let same_type = catalog
            .target(&entry.target_slot_id)
            .is_some_and(|slot| slot.equipment_type == equipment_type);
        if !same_type {
            return Err(AllocationIssue::UnknownTargetSlot {
                equipment_type,
                target_slot_id: entry.target_slot_id.clone(),
            });
        }
    }
    Ok(())
}

/// Per-item partition check. The pool of available slots is shared by all
/// items of the type: a slot consumed by one item is gone for the next.
fn check_partitions(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    equipment_type: EquipmentType,
    entries: &[AllocationEntry],
) -> Result<(), AllocationIssue> {
    let mut available: HashSet<&str> = catalog
        .targets(equipment_type)
        .iter()
        .map(|t| t.id.as_str())
        .collect();

    for item in catalog.sources(equipment_type) {
        let mapped: Vec<&AllocationEntry> = entries
            .iter()
            .filter(|e| e.source_item_name == item.name)
            .collect();

        for entry in &mapped {
            if !available.remove(entry.target_slot_id.as_str()) {
                let slot_name = catalog
                    .target(&entry.target_slot_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| entry.target_slot_name.clone());
                return Err(AllocationIssue::TargetSlotReused {
                    equipment_type,
                    slot_name,
                });
            }
        }

        check_item(rules, item, &mapped)?;
    }

    Ok(())
}

fn check_item(
    rules: &AllocationRuleSet,
    item: &SourceItem,
    mapped: &[&AllocationEntry],
) -> Result<(), AllocationIssue> {
    let equipment_type = item.equipment_type;
    let expected = rules.expected_total(item);
    let actual: f64 = mapped.iter().map(|e| e.value).sum();

    if (actual - expected).abs() > SUM_EPSILON {
        return Err(AllocationIssue::AllocationSumMismatch {
            equipment_type,
            source_item_name: item.name.clone(),
            expected,
            actual,
        });
    }

    if mapped.iter().any(|e| e.value.fract() != 0.0) {
        return Err(AllocationIssue::NonIntegerAllocation { equipment_type });
    }

    let upper = match rules.discipline(equipment_type) {
        Discipline::Percentage => 100.0,
        Discipline::Count => f64::from(item.count),
    };
    if let Some(entry) = mapped.iter().find(|e| e.value < 0.0 || e.value > upper) {
        return Err(AllocationIssue::AllocationOutOfRange {
            equipment_type,
            source_item_name: item.name.clone(),
            value: entry.value,
        });
    }

    Ok(())
}
