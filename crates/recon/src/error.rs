use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::EquipmentType;

/// Operational failures: bad config, unreadable input, malformed catalog.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Job file parsed but is inconsistent.
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    #[error("unknown equipment type: {0}")]
    UnknownEquipmentType(String),
    /// Two target slots share an id anywhere in the catalog.
    #[error("target slot id '{id}' appears more than once")]
    DuplicateTargetSlot { id: String },
    /// Two source items of one type share a name.
    #[error("{equipment_type}: source item '{name}' appears more than once")]
    DuplicateSourceItem { equipment_type: EquipmentType, name: String },
    #[error("{input}: missing column '{column}'")]
    MissingColumn { input: String, column: String },
    #[error("{input}, record {record}: cannot parse {field} '{value}'")]
    FieldParse {
        input: String,
        record: usize,
        field: String,
        value: String,
    },
    #[error("IO error: {0}")]
    Io(String),
}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Maximum accepted profile name length, in characters.
pub const PROFILE_NAME_MAX: usize = 120;

/// Domain outcome of a rejected commit, schedule edit or profile check.
///
/// Always returned, never raised: the caller shows exactly one of these to
/// the user and re-validates after the next edit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationIssue {
    #[error("{equipment_type}: the imported result has equipment the one-line model does not have")]
    MissingTargetEquipment { equipment_type: EquipmentType },

    #[error("{equipment_type}: {source_count} imported item(s) but only {target_count} local slot(s)")]
    InsufficientTargetCardinality {
        equipment_type: EquipmentType,
        source_count: usize,
        target_count: usize,
    },

    #[error("{equipment_type}: no imported item named '{source_item_name}'")]
    UnknownSourceItem {
        equipment_type: EquipmentType,
        source_item_name: String,
    },

    #[error("{equipment_type}: no local slot with id '{target_slot_id}'")]
    UnknownTargetSlot {
        equipment_type: EquipmentType,
        target_slot_id: String,
    },

    #[error("{equipment_type}: '{slot_name}' is assigned to more than one imported item")]
    TargetSlotReused {
        equipment_type: EquipmentType,
        slot_name: String,
    },

    #[error("{equipment_type}: allocations for '{source_item_name}' sum to {actual}, expected {expected}")]
    AllocationSumMismatch {
        equipment_type: EquipmentType,
        source_item_name: String,
        expected: f64,
        actual: f64,
    },

    #[error("{equipment_type}: allocations must be whole numbers")]
    NonIntegerAllocation { equipment_type: EquipmentType },

    #[error("{equipment_type}: allocation {value} for '{source_item_name}' is out of range")]
    AllocationOutOfRange {
        equipment_type: EquipmentType,
        source_item_name: String,
        value: f64,
    },

    #[error("this month/day type/hour combination is already in the schedule")]
    DuplicateDateRow,

    #[error("select an hour before adding the row")]
    MissingHourSelection,

    #[error("month {month} / hour {hour} is not a valid schedule selector")]
    InvalidScheduleRow { month: u8, hour: u8 },

    #[error("add at least one schedule row")]
    EmptySchedule,

    #[error("profile name is required")]
    ProfileNameRequired,

    #[error("profile name is {length} characters, at most {max} allowed")]
    ProfileNameTooLong { length: usize, max: usize },
}

impl AllocationIssue {
    /// Stable machine-readable code, used as `errorCode`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTargetEquipment { .. } => "MissingTargetEquipment",
            Self::InsufficientTargetCardinality { .. } => "InsufficientTargetCardinality",
            Self::UnknownSourceItem { .. } => "UnknownSourceItem",
            Self::UnknownTargetSlot { .. } => "UnknownTargetSlot",
            Self::TargetSlotReused { .. } => "TargetSlotReused",
            Self::AllocationSumMismatch { .. } => "AllocationSumMismatch",
            Self::NonIntegerAllocation { .. } => "NonIntegerAllocation",
            Self::AllocationOutOfRange { .. } => "AllocationOutOfRange",
            Self::DuplicateDateRow => "DuplicateDateRow",
            Self::MissingHourSelection => "MissingHourSelection",
            Self::InvalidScheduleRow { .. } => "InvalidScheduleRow",
            Self::EmptySchedule => "EmptySchedule",
            Self::ProfileNameRequired => "ProfileNameRequired",
            Self::ProfileNameTooLong { .. } => "ProfileNameTooLong",
        }
    }

    /// Parameters for message templating, used as `errorParams`.
    pub fn params(&self) -> Value {
        match self {
            Self::MissingTargetEquipment { equipment_type }
            | Self::NonIntegerAllocation { equipment_type } => {
                json!({ "type": equipment_type })
            }
            Self::InsufficientTargetCardinality {
                equipment_type,
                source_count,
                target_count,
            } => json!({
                "type": equipment_type,
                "sourceCount": source_count,
                "targetCount": target_count,
            }),
            Self::UnknownSourceItem {
                equipment_type,
                source_item_name,
            } => json!({ "type": equipment_type, "sourceItemName": source_item_name }),
            Self::UnknownTargetSlot {
                equipment_type,
                target_slot_id,
            } => json!({ "type": equipment_type, "targetSlotId": target_slot_id }),
            Self::TargetSlotReused {
                equipment_type,
                slot_name,
            } => json!({ "type": equipment_type, "slotName": slot_name }),
            Self::AllocationSumMismatch {
                equipment_type,
                source_item_name,
                expected,
                actual,
            } => json!({
                "type": equipment_type,
                "sourceItemName": source_item_name,
                "expected": expected,
                "actual": actual,
            }),
            Self::AllocationOutOfRange {
                equipment_type,
                source_item_name,
                value,
            } => json!({
                "type": equipment_type,
                "sourceItemName": source_item_name,
                "value": value,
            }),
            Self::InvalidScheduleRow { month, hour } => json!({ "month": month, "hour": hour }),
            Self::ProfileNameTooLong { length, max } => json!({ "length": length, "max": max }),
            Self::DuplicateDateRow
            | Self::MissingHourSelection
            | Self::EmptySchedule
            | Self::ProfileNameRequired => json!({}),
        }
    }

    /// Issues raised by the schedule editor or profile metadata rather than
    /// the allocation table.
    pub fn is_profile_issue(&self) -> bool {
        matches!(
            self,
            Self::DuplicateDateRow
                | Self::MissingHourSelection
                | Self::InvalidScheduleRow { .. }
                | Self::EmptySchedule
                | Self::ProfileNameRequired
                | Self::ProfileNameTooLong { .. }
        )
    }
}

/// Serializes as `{"errorCode": ..., "errorParams": {...}}`, the same pair a
/// rejected verdict carries.
impl Serialize for AllocationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("errorCode", self.code())?;
        map.serialize_entry("errorParams", &self.params())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_mismatch_params() {
        let issue = AllocationIssue::AllocationSumMismatch {
            equipment_type: EquipmentType::Storage,
            source_item_name: "Battery1".into(),
            expected: 100.0,
            actual: 90.0,
        };
        assert_eq!(issue.code(), "AllocationSumMismatch");
        let p = issue.params();
        assert_eq!(p["type"], "STORAGE");
        assert_eq!(p["sourceItemName"], "Battery1");
        assert_eq!(p["expected"], 100.0);
        assert_eq!(p["actual"], 90.0);
        assert!(issue.to_string().contains("sum to 90"));
    }

    #[test]
    fn unit_variants_have_empty_params() {
        assert_eq!(AllocationIssue::DuplicateDateRow.params(), json!({}));
        assert!(AllocationIssue::DuplicateDateRow.is_profile_issue());
        assert!(!AllocationIssue::NonIntegerAllocation {
            equipment_type: EquipmentType::Wind
        }
        .is_profile_issue());
    }

    #[test]
    fn recon_error_display() {
        let err = ReconError::DuplicateSourceItem {
            equipment_type: EquipmentType::Solar,
            name: "PV1".into(),
        };
        assert_eq!(err.to_string(), "SOLAR: source item 'PV1' appears more than once");
    }

    #[test]
    fn issue_serializes_code_and_params() {
        let issue = AllocationIssue::ProfileNameTooLong { length: 121, max: 120 };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "errorCode": "ProfileNameTooLong",
                "errorParams": { "length": 121, "max": 120 },
            })
        );
    }
}
