use serde::Serialize;

use crate::catalog::{InventoryCatalog, TypeStatus};
use crate::engine::Verdict;
use crate::model::{AllocationEntry, EquipmentType};
use crate::rules::{AllocationRuleSet, Discipline};

/// Why a field cannot be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    /// Some imported type has no local equipment; nothing can be allocated.
    MissingTargets,
    /// Local equipment of a type the import does not mention.
    OrphanTargets,
    /// The type has fewer local slots than its imported items need.
    InsufficientTargets,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FieldState {
    Editable { value: f64 },
    ReadOnly { value: f64 },
    Disabled { reason: DisabledReason },
}

/// One input cell of the allocation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationField {
    pub equipment_type: EquipmentType,
    pub discipline: Discipline,
    /// `None` for orphan-type placeholders.
    pub source_item_name: Option<String>,
    pub target_slot_id: String,
    pub target_slot_name: String,
    #[serde(flatten)]
    pub state: FieldState,
}

/// Every allocation input the form shows, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldLayout {
    pub fields: Vec<AllocationField>,
}

/// Lay out the allocation table for a freshly opened import result.
pub fn field_layout(catalog: &InventoryCatalog, rules: &AllocationRuleSet) -> FieldLayout {
    let form_disabled = catalog
        .types_present()
        .into_iter()
        .any(|t| catalog.status(t) == TypeStatus::MissingTargets);

    let mut fields = Vec::new();
    for equipment_type in EquipmentType::ALL {
        let discipline = rules.discipline(equipment_type);
        let targets = catalog.targets(equipment_type);

        match catalog.status(equipment_type) {
            TypeStatus::Absent | TypeStatus::MissingTargets => {}
            TypeStatus::Orphan => {
                fields.extend(targets.iter().map(|slot| AllocationField {
                    equipment_type,
                    discipline,
                    source_item_name: None,
                    target_slot_id: slot.id.clone(),
                    target_slot_name: slot.name.clone(),
                    state: FieldState::Disabled {
                        reason: DisabledReason::OrphanTargets,
                    },
                }));
            }
            TypeStatus::Active => {
                let short = rules.is_short(catalog, equipment_type);
                let filled = rules.auto_fill(catalog, equipment_type);
                for item in catalog.sources(equipment_type) {
                    for slot in targets {
                        let state = if form_disabled {
                            FieldState::Disabled {
                                reason: DisabledReason::MissingTargets,
                            }
                        } else if short {
                            FieldState::Disabled {
                                reason: DisabledReason::InsufficientTargets,
                            }
                        } else {
                            match &filled {
                                Some(entry) => FieldState::ReadOnly { value: entry.value },
                                None => FieldState::Editable { value: 0.0 },
                            }
                        };
                        fields.push(AllocationField {
                            equipment_type,
                            discipline,
                            source_item_name: Some(item.name.clone()),
                            target_slot_id: slot.id.clone(),
                            target_slot_name: slot.name.clone(),
                            state,
                        });
                    }
                }
            }
        }
    }

    FieldLayout { fields }
}

impl FieldLayout {
    /// Initial entry set: one entry per read-only (auto-filled) field.
    pub fn seed_entries(&self) -> Vec<AllocationEntry> {
        self.fields
            .iter()
            .filter_map(|f| match (f.state, &f.source_item_name) {
                (FieldState::ReadOnly { value }, Some(source)) => Some(AllocationEntry {
                    source_item_name: source.clone(),
                    target_slot_id: f.target_slot_id.clone(),
                    target_slot_name: f.target_slot_name.clone(),
                    equipment_type: f.equipment_type,
                    value,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn editable_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.state, FieldState::Editable { .. }))
            .count()
    }

    /// Whether the whole form is locked because a type has no local slots.
    pub fn all_disabled(&self) -> bool {
        !self.fields.is_empty()
            && self
                .fields
                .iter()
                .all(|f| matches!(f.state, FieldState::Disabled { .. }))
    }

    /// The commit control is enabled only when the form is usable and the
    /// last validation passed.
    pub fn commit_enabled(&self, verdict: &Verdict) -> bool {
        !self.all_disabled() && verdict.is_ok()
    }
}
