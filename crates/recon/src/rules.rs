use serde::Serialize;

use crate::catalog::InventoryCatalog;
use crate::model::{AllocationEntry, EquipmentType, SourceItem};

/// How an imported item is apportioned across local slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Values are whole percentages summing to 100.
    Percentage,
    /// Values are whole unit counts summing to the item's `Count`.
    Count,
}

/// Order in which types are checked during pre-flight. When several types are
/// short at once, the first one here is the one reported.
pub const CARDINALITY_PRIORITY: [EquipmentType; 6] = [
    EquipmentType::Generator,
    EquipmentType::Load,
    EquipmentType::Ev,
    EquipmentType::Storage,
    EquipmentType::Solar,
    EquipmentType::Wind,
];

/// Fixed per-type allocation table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationRuleSet;

impl AllocationRuleSet {
    pub fn standard() -> Self {
        Self
    }

    pub fn discipline(&self, equipment_type: EquipmentType) -> Discipline {
        match equipment_type {
            EquipmentType::Load
            | EquipmentType::Ev
            | EquipmentType::Storage
            | EquipmentType::Solar => Discipline::Percentage,
            EquipmentType::Generator | EquipmentType::Wind => Discipline::Count,
        }
    }

    /// Total the nonzero entries of one item must add up to.
    pub fn expected_total(&self, item: &SourceItem) -> f64 {
        match self.discipline(item.equipment_type) {
            Discipline::Percentage => 100.0,
            Discipline::Count => f64::from(item.count),
        }
    }

    /// Minimum number of local slots a type needs before allocation can start.
    ///
    /// Count-type units each occupy one local instance, so the requirement is
    /// the larger of the item count and the total unit count.
    pub fn required_slots(&self, equipment_type: EquipmentType, items: &[SourceItem]) -> usize {
        match self.discipline(equipment_type) {
            Discipline::Percentage => items.len(),
            Discipline::Count => {
                let units: usize = items.iter().map(|i| i.count as usize).sum();
                items.len().max(units)
            }
        }
    }

    /// Whether a type with imported items has fewer local slots than
    /// [`required_slots`](Self::required_slots) demands. Such a type can never
    /// pass pre-flight.
    pub fn is_short(&self, catalog: &InventoryCatalog, equipment_type: EquipmentType) -> bool {
        let sources = catalog.sources(equipment_type);
        !sources.is_empty()
            && catalog.targets(equipment_type).len() < self.required_slots(equipment_type, sources)
    }

    /// Pre-filled read-only pairing for a type with exactly one item and one
    /// slot. A short type gets none: its single Count group of several units
    /// does not fit one slot.
    pub fn auto_fill(
        &self,
        catalog: &InventoryCatalog,
        equipment_type: EquipmentType,
    ) -> Option<AllocationEntry> {
        if self.is_short(catalog, equipment_type) {
            return None;
        }
        match (catalog.sources(equipment_type), catalog.targets(equipment_type)) {
            ([item], [slot]) => Some(AllocationEntry::new(item, slot, self.expected_total(item))),
            _ => None,
        }
    }
}
