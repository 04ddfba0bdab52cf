use std::sync::Arc;

use crate::catalog::InventoryCatalog;
use crate::engine::{self, Verdict};
use crate::error::AllocationIssue;
use crate::layout::{field_layout, FieldLayout};
use crate::model::AllocationEntry;
use crate::payload::{build_payload, ProfilePayload, ProjectRef};
use crate::rules::AllocationRuleSet;
use crate::schedule::{Schedule, ScheduleRowDraft};

/// Snapshot of one import-and-allocate interaction.
///
/// Every edit returns a new session; nothing is mutated in place. Dropping a
/// session is all a cancel needs.
#[derive(Debug, Clone)]
pub struct ImportSession {
    project: ProjectRef,
    catalog: Arc<InventoryCatalog>,
    rules: AllocationRuleSet,
    layout: Arc<FieldLayout>,
    entries: Vec<AllocationEntry>,
    schedule: Schedule,
    profile_name: String,
}

impl ImportSession {
    /// Open a session over a freshly built catalog. Entries start out as the
    /// auto-filled pairings.
    pub fn open(project: ProjectRef, catalog: InventoryCatalog, rules: AllocationRuleSet) -> Self {
        let layout = field_layout(&catalog, &rules);
        let entries = layout.seed_entries();
        log::debug!(
            "session opened for result {}: {} field(s), {} pre-filled",
            project.result_id,
            layout.fields.len(),
            entries.len()
        );
        Self {
            project,
            catalog: Arc::new(catalog),
            rules,
            layout: Arc::new(layout),
            entries,
            schedule: Schedule::new(),
            profile_name: String::new(),
        }
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    pub fn catalog(&self) -> &InventoryCatalog {
        &self.catalog
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Record an edit of one field, replacing any earlier value for it.
    pub fn with_entry(&self, entry: AllocationEntry) -> Self {
        let mut entries: Vec<AllocationEntry> = self
            .entries
            .iter()
            .filter(|e| !e.same_field(&entry))
            .cloned()
            .collect();
        entries.push(entry);
        Self {
            entries,
            ..self.clone()
        }
    }

    pub fn with_entries(&self, entries: impl IntoIterator<Item = AllocationEntry>) -> Self {
        entries
            .into_iter()
            .fold(self.clone(), |session, entry| session.with_entry(entry))
    }

    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            profile_name: name.into(),
            ..self.clone()
        }
    }

    pub fn append_schedule_row(&self, draft: ScheduleRowDraft) -> Result<Self, AllocationIssue> {
        let schedule = self.schedule.append(draft)?;
        Ok(Self {
            schedule,
            ..self.clone()
        })
    }

    pub fn remove_schedule_row(&self, index: usize) -> Self {
        Self {
            schedule: self.schedule.remove(index),
            ..self.clone()
        }
    }

    pub fn preflight(&self) -> Verdict {
        engine::preflight(&self.catalog, &self.rules).into()
    }

    pub fn validate(&self) -> Verdict {
        engine::validate(&self.catalog, &self.rules, &self.entries)
    }

    pub fn commit_enabled(&self) -> bool {
        self.layout.commit_enabled(&self.validate())
    }

    /// Validate the allocation, then assemble the payload.
    pub fn submit_payload(&self) -> Result<ProfilePayload, AllocationIssue> {
        let validated = engine::commit(&self.catalog, &self.rules, &self.entries)?;
        build_payload(&self.project, &self.profile_name, &self.schedule, &validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{item, slot};
    use crate::layout::{DisabledReason, FieldState};
    use crate::model::EquipmentType;

    fn open() -> ImportSession {
        let catalog = InventoryCatalog::new(
            vec![item(EquipmentType::Storage, "Battery1", 1), item(EquipmentType::Solar, "PV", 1)],
            vec![
                slot(EquipmentType::Storage, "Batt-A"),
                slot(EquipmentType::Storage, "Batt-B"),
                slot(EquipmentType::Solar, "pv-1"),
            ],
        )
        .unwrap();
        ImportSession::open(
            ProjectRef {
                project_id: "p".into(),
                result_id: "r".into(),
            },
            catalog,
            AllocationRuleSet::standard(),
        )
    }

    fn battery_entry(slot_id: &str, value: f64) -> AllocationEntry {
        AllocationEntry::new(
            &item(EquipmentType::Storage, "Battery1", 1),
            &slot(EquipmentType::Storage, slot_id),
            value,
        )
    }

    #[test]
    fn open_seeds_auto_fill() {
        let s = open();
        assert_eq!(s.entries().len(), 1);
        assert_eq!(s.entries()[0].equipment_type, EquipmentType::Solar);
        assert!(s.preflight().is_ok());
        assert!(!s.validate().is_ok());
    }

    #[test]
    fn short_count_group_layout_agrees_with_verdict() {
        let catalog = InventoryCatalog::new(
            vec![item(EquipmentType::Wind, "WT", 4)],
            vec![slot(EquipmentType::Wind, "w1")],
        )
        .unwrap();
        let s = ImportSession::open(
            ProjectRef {
                project_id: "p".into(),
                result_id: "r".into(),
            },
            catalog,
            AllocationRuleSet::standard(),
        );

        assert_eq!(
            s.layout().fields[0].state,
            FieldState::Disabled {
                reason: DisabledReason::InsufficientTargets
            }
        );
        assert!(s.entries().is_empty());
        let shortage = Verdict::Rejected(AllocationIssue::InsufficientTargetCardinality {
            equipment_type: EquipmentType::Wind,
            source_count: 1,
            target_count: 1,
        });
        assert_eq!(s.preflight(), shortage);
        assert_eq!(s.validate(), shortage);
        assert!(!s.commit_enabled());
    }

    #[test]
    fn edits_return_new_sessions() {
        let s0 = open();
        let s1 = s0.with_entry(battery_entry("Batt-A", 100.0));
        assert_eq!(s0.entries().len(), 1);
        assert_eq!(s1.entries().len(), 2);
        assert!(s1.validate().is_ok());
        assert!(s1.commit_enabled());
    }

    #[test]
    fn re_editing_a_field_replaces_it() {
        let s = open()
            .with_entry(battery_entry("Batt-A", 30.0))
            .with_entry(battery_entry("Batt-A", 60.0))
            .with_entry(battery_entry("Batt-B", 40.0));
        assert_eq!(s.entries().len(), 3);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn full_flow_to_payload() {
        let s = open()
            .with_entries([battery_entry("Batt-A", 60.0), battery_entry("Batt-B", 40.0)])
            .named("Winter base")
            .append_schedule_row(ScheduleRowDraft::new(1, 200, Some(5)))
            .unwrap()
            .append_schedule_row(ScheduleRowDraft::new(2, 200, Some(5)))
            .unwrap();
        let payload = s.submit_payload().unwrap();
        assert_eq!(payload.name, "Winter base");
        assert_eq!(payload.dates.len(), 2);
        assert_eq!(payload.allocation.len(), 3);
    }

    #[test]
    fn submit_reports_first_problem() {
        let s = open().named("x");
        assert!(matches!(
            s.submit_payload(),
            Err(AllocationIssue::AllocationSumMismatch { .. })
        ));

        let s = s.with_entry(battery_entry("Batt-A", 100.0));
        assert_eq!(s.submit_payload(), Err(AllocationIssue::EmptySchedule));

        let s = s.named("");
        assert_eq!(s.submit_payload(), Err(AllocationIssue::ProfileNameRequired));
    }

    #[test]
    fn duplicate_schedule_row_keeps_previous_session() {
        let s = open()
            .append_schedule_row(ScheduleRowDraft::new(1, 200, Some(5)))
            .unwrap();
        let err = s
            .append_schedule_row(ScheduleRowDraft::new(1, 200, Some(5)))
            .unwrap_err();
        assert_eq!(err, AllocationIssue::DuplicateDateRow);
        assert_eq!(s.schedule().len(), 1);
        assert_eq!(s.remove_schedule_row(0).schedule().len(), 0);
    }
}
