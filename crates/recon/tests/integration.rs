use std::path::PathBuf;

use oneline_recon::catalog::TypeStatus;
use oneline_recon::config::AllocationJob;
use oneline_recon::layout::FieldState;
use oneline_recon::loader::{load_entries, load_source_items, load_target_slots};
use oneline_recon::{
    AllocationIssue, AllocationRuleSet, EquipmentType, ImportSession, InventoryCatalog, ProjectRef,
    Verdict,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Load the plant job, optionally swapping the entries file.
fn open_plant(entries_file: Option<&str>) -> (AllocationJob, ImportSession) {
    let job = AllocationJob::from_toml(&read_fixture("plant.alloc.toml")).unwrap();
    let items = load_source_items(&read_fixture(&job.sources.file), &job.sources.columns).unwrap();
    let slots = load_target_slots(&read_fixture(&job.targets.file), &job.targets.columns).unwrap();
    let catalog = InventoryCatalog::new(items, slots).unwrap();

    let entry_input = job.entries.clone().unwrap();
    let file = entries_file.unwrap_or(&entry_input.file);
    let entries = load_entries(&read_fixture(file), &entry_input.columns, &catalog).unwrap();

    let mut session = ImportSession::open(
        ProjectRef {
            project_id: job.project_id.clone(),
            result_id: job.result_id.clone(),
        },
        catalog,
        AllocationRuleSet::standard(),
    )
    .with_entries(entries)
    .named(job.name.clone());
    for draft in &job.schedule {
        session = session.append_schedule_row(*draft).unwrap();
    }
    (job, session)
}

// -------------------------------------------------------------------------
// Full job
// -------------------------------------------------------------------------

#[test]
fn plant_job_validates() {
    let (_, session) = open_plant(None);
    assert_eq!(session.preflight(), Verdict::Ok);
    assert_eq!(session.validate(), Verdict::Ok);
    assert!(session.commit_enabled());
}

#[test]
fn plant_job_payload() {
    let (job, session) = open_plant(None);
    let payload = session.submit_payload().unwrap();

    assert_eq!(payload.name, job.name);
    assert_eq!(payload.optimization_project_id, "proj-42");
    assert_eq!(payload.optimization_project_result_id, "res-7");
    assert_eq!(payload.dates.len(), 2);
    assert_eq!(payload.dates[1].hour_value, 18);

    // 2 load + 2 storage + 1 auto-filled solar + 3 generator; G4=0 is dropped.
    assert_eq!(payload.allocation.len(), 8);
    let types: Vec<_> = payload.allocation.iter().map(|r| r.node_type).collect();
    assert_eq!(types[0], EquipmentType::Load);
    assert_eq!(types[4], EquipmentType::Solar);
    assert!(payload.allocation.iter().all(|r| r.one_line_node_name != "G4"));

    let solar = &payload.allocation[4];
    assert_eq!(solar.one_line_node_name, "PV-Roof");
    assert_eq!(solar.gis_tech_name, "Rooftop PV");
    assert_eq!(solar.allocation_percentage, 100.0);
}

#[test]
fn plant_job_layout() {
    let (_, session) = open_plant(None);
    let layout = session.layout();

    let ev: Vec<_> = layout
        .fields
        .iter()
        .filter(|f| f.equipment_type == EquipmentType::Ev)
        .collect();
    assert_eq!(ev.len(), 1);
    assert!(matches!(ev[0].state, FieldState::Disabled { .. }));

    let solar: Vec<_> = layout
        .fields
        .iter()
        .filter(|f| f.equipment_type == EquipmentType::Solar)
        .collect();
    assert_eq!(solar[0].state, FieldState::ReadOnly { value: 100.0 });

    // load 1x2 + storage 1x2 + generator 1x4
    assert_eq!(layout.editable_count(), 8);
    assert_eq!(session.catalog().status(EquipmentType::Ev), TypeStatus::Orphan);
}

#[test]
fn short_storage_split_rejected() {
    let (_, session) = open_plant(Some("entries-short.csv"));
    assert_eq!(
        session.validate(),
        Verdict::Rejected(AllocationIssue::AllocationSumMismatch {
            equipment_type: EquipmentType::Storage,
            source_item_name: "Battery1".into(),
            expected: 100.0,
            actual: 90.0,
        })
    );
    assert!(!session.commit_enabled());
    assert!(session.submit_payload().is_err());
}

#[test]
fn verdict_json_for_presentation_layer() {
    let (_, session) = open_plant(Some("entries-short.csv"));
    let v = serde_json::to_value(session.validate()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "ok": false,
            "errorCode": "AllocationSumMismatch",
            "errorParams": {
                "type": "STORAGE",
                "sourceItemName": "Battery1",
                "expected": 100.0,
                "actual": 90.0,
            }
        })
    );
}

#[test]
fn fixing_an_entry_revalidates_clean() {
    let (_, session) = open_plant(Some("entries-short.csv"));
    let fixed = {
        let mut entry = session
            .entries()
            .iter()
            .find(|e| e.target_slot_id == "bt-b")
            .cloned()
            .unwrap();
        entry.value = 40.0;
        session.with_entry(entry)
    };
    assert_eq!(fixed.validate(), Verdict::Ok);
    // The earlier session is untouched.
    assert!(!session.validate().is_ok());
}

// -------------------------------------------------------------------------
// Pre-flight
// -------------------------------------------------------------------------

#[test]
fn import_with_unknown_local_type() {
    let items = load_source_items(
        "Name,Type,Count\nFarm,WIND,2\nFeeder,LOAD,1\n",
        &Default::default(),
    )
    .unwrap();
    let slots = load_target_slots("Id,Name,Type\nl1,L1,LOAD\n", &Default::default()).unwrap();
    let catalog = InventoryCatalog::new(items, slots).unwrap();
    let session = ImportSession::open(
        ProjectRef {
            project_id: "p".into(),
            result_id: "r".into(),
        },
        catalog,
        AllocationRuleSet::standard(),
    );

    assert_eq!(
        session.preflight(),
        Verdict::Rejected(AllocationIssue::MissingTargetEquipment {
            equipment_type: EquipmentType::Wind
        })
    );
    assert!(session.layout().all_disabled());
    assert!(!session.commit_enabled());
}
