use serde::Serialize;

use crate::engine::ValidatedAllocation;
use crate::error::{AllocationIssue, PROFILE_NAME_MAX};
use crate::model::EquipmentType;
use crate::schedule::{Schedule, ScheduleRow};

/// Identifies the optimization result the profile is imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub project_id: String,
    pub result_id: String,
}

/// One allocated (local node ← imported item) share.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationRecord {
    pub one_line_node_name: String,
    #[serde(rename = "GISTechName")]
    pub gis_tech_name: String,
    pub node_type: EquipmentType,
    pub allocation_percentage: f64,
}

/// Submission body handed to the backing store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfilePayload {
    pub optimization_project_id: String,
    pub optimization_project_result_id: String,
    pub name: String,
    pub dates: Vec<ScheduleRow>,
    pub allocation: Vec<AllocationRecord>,
}

/// Required, at most [`PROFILE_NAME_MAX`] characters. Returns the trimmed name.
pub fn validate_profile_name(name: &str) -> Result<&str, AllocationIssue> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AllocationIssue::ProfileNameRequired);
    }
    let length = trimmed.chars().count();
    if length > PROFILE_NAME_MAX {
        return Err(AllocationIssue::ProfileNameTooLong {
            length,
            max: PROFILE_NAME_MAX,
        });
    }
    Ok(trimmed)
}

/// Assemble the submission payload from a validated allocation.
pub fn build_payload(
    project: &ProjectRef,
    name: &str,
    schedule: &Schedule,
    validated: &ValidatedAllocation,
) -> Result<ProfilePayload, AllocationIssue> {
    let name = validate_profile_name(name)?;
    if schedule.is_empty() {
        return Err(AllocationIssue::EmptySchedule);
    }

    let allocation: Vec<AllocationRecord> = validated
        .entries()
        .iter()
        .filter(|e| e.is_nonzero())
        .map(|e| AllocationRecord {
            one_line_node_name: e.target_slot_name.clone(),
            gis_tech_name: e.source_item_name.clone(),
            node_type: e.equipment_type,
            allocation_percentage: e.value,
        })
        .collect();

    log::debug!(
        "payload '{name}': {} date row(s), {} allocation record(s)",
        schedule.len(),
        allocation.len()
    );

    Ok(ProfilePayload {
        optimization_project_id: project.project_id.clone(),
        optimization_project_result_id: project.result_id.clone(),
        name: name.to_string(),
        dates: schedule.rows().to_vec(),
        allocation,
    })
}
