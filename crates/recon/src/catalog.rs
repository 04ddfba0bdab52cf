use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{EquipmentType, SourceItem, TargetSlot};

/// How a type participates in one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeStatus {
    /// Neither imported items nor local slots.
    Absent,
    /// Local slots exist but nothing was imported; fields stay disabled.
    Orphan,
    /// Imported items exist but the local model has no slot of this type.
    MissingTargets,
    /// Both sides present; allocation is checked.
    Active,
}

/// Imported items and local slots, grouped by equipment type.
///
/// Rebuilt whenever an import result is opened; the engine only reads it.
/// Within each group, records keep the order they were supplied in.
#[derive(Debug, Clone, Default)]
pub struct InventoryCatalog {
    sources: BTreeMap<EquipmentType, Vec<SourceItem>>,
    targets: BTreeMap<EquipmentType, Vec<TargetSlot>>,
}

impl InventoryCatalog {
    pub fn new(
        sources: impl IntoIterator<Item = SourceItem>,
        targets: impl IntoIterator<Item = TargetSlot>,
    ) -> Result<Self, ReconError> {
        let mut catalog = Self::default();

        let mut names: HashSet<(EquipmentType, String)> = HashSet::new();
        for item in sources {
            if !names.insert((item.equipment_type, item.name.clone())) {
                return Err(ReconError::DuplicateSourceItem {
                    equipment_type: item.equipment_type,
                    name: item.name,
                });
            }
            catalog.sources.entry(item.equipment_type).or_default().push(item);
        }

        let mut ids: HashSet<String> = HashSet::new();
        for slot in targets {
            if !ids.insert(slot.id.clone()) {
                return Err(ReconError::DuplicateTargetSlot { id: slot.id });
            }
            catalog.targets.entry(slot.equipment_type).or_default().push(slot);
        }

        log::debug!(
            "catalog: {} source item(s), {} target slot(s)",
            catalog.sources.values().map(Vec::len).sum::<usize>(),
            ids.len()
        );

        Ok(catalog)
    }

    pub fn sources(&self, equipment_type: EquipmentType) -> &[SourceItem] {
        self.sources.get(&equipment_type).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn targets(&self, equipment_type: EquipmentType) -> &[TargetSlot] {
        self.targets.get(&equipment_type).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn source(&self, equipment_type: EquipmentType, name: &str) -> Option<&SourceItem> {
        self.sources(equipment_type).iter().find(|s| s.name == name)
    }

    pub fn target(&self, id: &str) -> Option<&TargetSlot> {
        self.targets.values().flatten().find(|t| t.id == id)
    }

    pub fn status(&self, equipment_type: EquipmentType) -> TypeStatus {
        match (
            self.sources(equipment_type).is_empty(),
            self.targets(equipment_type).is_empty(),
        ) {
            (true, true) => TypeStatus::Absent,
            (true, false) => TypeStatus::Orphan,
            (false, true) => TypeStatus::MissingTargets,
            (false, false) => TypeStatus::Active,
        }
    }

    /// Types with at least one record on either side, in catalog order.
    pub fn types_present(&self) -> Vec<EquipmentType> {
        EquipmentType::ALL
            .into_iter()
            .filter(|t| self.status(*t) != TypeStatus::Absent)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }
}
