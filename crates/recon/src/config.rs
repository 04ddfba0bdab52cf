use serde::Deserialize;

use crate::error::ReconError;
use crate::schedule::ScheduleRowDraft;

// ---------------------------------------------------------------------------
// Top-level job
// ---------------------------------------------------------------------------

/// An allocation job: which imported result, which CSV exports, which
/// schedule. Parsed from a `*.alloc.toml` file.
#[derive(Debug, Deserialize)]
pub struct AllocationJob {
    /// Profile name submitted with the payload.
    pub name: String,
    pub project_id: String,
    pub result_id: String,
    pub sources: SourceInput,
    pub targets: TargetInput,
    #[serde(default)]
    pub entries: Option<EntryInput>,
    #[serde(default)]
    pub schedule: Vec<ScheduleRowDraft>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceInput {
    pub file: String,
    #[serde(default)]
    pub columns: SourceColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub name: String,
    pub equipment_type: String,
    pub capacity: String,
    pub count: String,
    pub units: String,
    pub group_index: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            equipment_type: "Type".into(),
            capacity: "Capacity".into(),
            count: "Count".into(),
            units: "Units".into(),
            group_index: "GroupIndex".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetInput {
    pub file: String,
    #[serde(default)]
    pub columns: TargetColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetColumns {
    pub id: String,
    pub name: String,
    pub equipment_type: String,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            id: "Id".into(),
            name: "Name".into(),
            equipment_type: "Type".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub file: String,
    #[serde(default)]
    pub columns: EntryColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntryColumns {
    pub source_item_name: String,
    pub target_slot_id: String,
    pub equipment_type: String,
    pub value: String,
}

impl Default for EntryColumns {
    fn default() -> Self {
        Self {
            source_item_name: "SourceItemName".into(),
            target_slot_id: "TargetSlotId".into(),
            equipment_type: "EquipmentType".into(),
            value: "Value".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the payload JSON, relative to the job file.
    #[serde(default)]
    pub payload: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AllocationJob {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let job: AllocationJob =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        job.validate()?;
        Ok(job)
    }

    /// Structural checks only. Profile name and schedule rules are domain
    /// checks and are reported as allocation issues later.
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.project_id.trim().is_empty() {
            return Err(ReconError::ConfigValidation("project_id must not be empty".into()));
        }
        if self.result_id.trim().is_empty() {
            return Err(ReconError::ConfigValidation("result_id must not be empty".into()));
        }

        let mut files = vec![("sources", &self.sources.file), ("targets", &self.targets.file)];
        if let Some(ref entries) = self.entries {
            files.push(("entries", &entries.file));
        }
        for (input, file) in files {
            if file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{input}: file must not be empty")));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "Summer peak"
project_id = "proj-42"
result_id = "res-7"

[sources]
file = "sources.csv"

[targets]
file = "targets.csv"
"#;

    #[test]
    fn parse_minimal_with_default_columns() {
        let job = AllocationJob::from_toml(MINIMAL).unwrap();
        assert_eq!(job.name, "Summer peak");
        assert_eq!(job.sources.columns.count, "Count");
        assert_eq!(job.targets.columns.id, "Id");
        assert!(job.entries.is_none());
        assert!(job.schedule.is_empty());
        assert!(job.output.payload.is_none());
    }

    #[test]
    fn parse_full() {
        let input = format!(
            r#"{MINIMAL}
[sources.columns]
name = "tech_name"
count = "units_installed"

[entries]
file = "entries.csv"

[entries.columns]
value = "pct"

[[schedule]]
month = 1
day_type = 200
hour = 5

[[schedule]]
month = 7
day_type = 100

[output]
payload = "out/payload.json"
"#
        );
        let job = AllocationJob::from_toml(&input).unwrap();
        assert_eq!(job.sources.columns.name, "tech_name");
        assert_eq!(job.sources.columns.capacity, "Capacity");
        let entries = job.entries.unwrap();
        assert_eq!(entries.columns.value, "pct");
        assert_eq!(entries.columns.target_slot_id, "TargetSlotId");
        assert_eq!(job.schedule.len(), 2);
        assert_eq!(job.schedule[0].hour, Some(5));
        assert_eq!(job.schedule[1].hour, None);
        assert_eq!(job.output.payload.as_deref(), Some("out/payload.json"));
    }

    #[test]
    fn reject_blank_project() {
        let input = MINIMAL.replace("proj-42", " ");
        let err = AllocationJob::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn reject_blank_entries_file() {
        let input = format!("{MINIMAL}\n[entries]\nfile = \"\"\n");
        let err = AllocationJob::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("entries: file"));
    }

    #[test]
    fn reject_missing_targets_table() {
        let input = r#"
name = "x"
project_id = "p"
result_id = "r"

[sources]
file = "s.csv"
"#;
        let err = AllocationJob::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
