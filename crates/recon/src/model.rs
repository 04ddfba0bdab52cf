use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Equipment types
// ---------------------------------------------------------------------------

/// Equipment category shared by the imported result and the one-line model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EquipmentType {
    Load,
    Ev,
    Storage,
    Solar,
    Wind,
    Generator,
}

impl EquipmentType {
    /// All variants in catalog order.
    pub const ALL: [EquipmentType; 6] = [
        Self::Load,
        Self::Ev,
        Self::Storage,
        Self::Solar,
        Self::Wind,
        Self::Generator,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Ev => "EV",
            Self::Storage => "STORAGE",
            Self::Solar => "SOLAR",
            Self::Wind => "WIND",
            Self::Generator => "GENERATOR",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EquipmentType {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| ReconError::UnknownEquipmentType(tag.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Imported + local records
// ---------------------------------------------------------------------------

/// One equipment group from the imported analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceItem {
    pub name: String,
    pub equipment_type: EquipmentType,
    pub capacity: f64,
    pub count: u32,
    pub units: String,
    pub group_index: i64,
}

/// One equipment instance already present in the local model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetSlot {
    pub id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
}

// ---------------------------------------------------------------------------
// Allocation entries
// ---------------------------------------------------------------------------

/// A proposed (source item → target slot) pairing with its value.
///
/// Self-describing: every entry carries its own type, source name and target
/// identity, so a collection of entries never depends on index alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationEntry {
    pub source_item_name: String,
    pub target_slot_id: String,
    pub target_slot_name: String,
    pub equipment_type: EquipmentType,
    pub value: f64,
}

impl AllocationEntry {
    pub fn new(source: &SourceItem, target: &TargetSlot, value: f64) -> Self {
        Self {
            source_item_name: source.name.clone(),
            target_slot_id: target.id.clone(),
            target_slot_name: target.name.clone(),
            equipment_type: target.equipment_type,
            value,
        }
    }

    /// Zero-valued entries are inert: they never take part in any check.
    pub fn is_nonzero(&self) -> bool {
        self.value != 0.0
    }

    /// Identity of the field this entry was typed into.
    pub fn same_field(&self, other: &AllocationEntry) -> bool {
        self.equipment_type == other.equipment_type
            && self.source_item_name == other.source_item_name
            && self.target_slot_id == other.target_slot_id
    }
}
