use serde::Serialize;

use crate::catalog::{InventoryCatalog, TypeStatus};
use crate::engine::Verdict;
use crate::layout::FieldLayout;
use crate::model::{AllocationEntry, EquipmentType};
use crate::rules::{AllocationRuleSet, Discipline};

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub job_name: String,
    pub engine_version: String,
    pub checked_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub equipment_type: EquipmentType,
    pub discipline: Discipline,
    pub status: TypeStatus,
    pub source_items: usize,
    pub target_slots: usize,
    pub nonzero_entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationSummary {
    pub source_items: usize,
    pub target_slots: usize,
    pub nonzero_entries: usize,
    pub editable_fields: usize,
    pub types: Vec<TypeSummary>,
}

/// Everything `olrecon validate --json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub meta: ReportMeta,
    pub verdict: Verdict,
    pub summary: AllocationSummary,
    pub fields: FieldLayout,
}

/// Per-type counts over the catalog and the current entries.
pub fn compute_summary(
    catalog: &InventoryCatalog,
    rules: &AllocationRuleSet,
    layout: &FieldLayout,
    entries: &[AllocationEntry],
) -> AllocationSummary {
    let types: Vec<TypeSummary> = catalog
        .types_present()
        .into_iter()
        .map(|t| TypeSummary {
            equipment_type: t,
            discipline: rules.discipline(t),
            status: catalog.status(t),
            source_items: catalog.sources(t).len(),
            target_slots: catalog.targets(t).len(),
            nonzero_entries: entries
                .iter()
                .filter(|e| e.equipment_type == t && e.is_nonzero())
                .count(),
        })
        .collect();

    AllocationSummary {
        source_items: types.iter().map(|t| t.source_items).sum(),
        target_slots: types.iter().map(|t| t.target_slots).sum(),
        nonzero_entries: types.iter().map(|t| t.nonzero_entries).sum(),
        editable_fields: layout.editable_count(),
        types,
    }
}

impl AllocationReport {
    pub fn new(
        job_name: &str,
        verdict: Verdict,
        summary: AllocationSummary,
        fields: FieldLayout,
    ) -> Self {
        Self {
            meta: ReportMeta {
                job_name: job_name.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                checked_at: chrono::Utc::now().to_rfc3339(),
            },
            verdict,
            summary,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{item, slot};
    use crate::layout::field_layout;

    #[test]
    fn summary_counts() {
        let battery = item(EquipmentType::Storage, "B", 1);
        let a = slot(EquipmentType::Storage, "a");
        let b = slot(EquipmentType::Storage, "b");
        let catalog = InventoryCatalog::new(
            vec![battery.clone()],
            vec![a.clone(), b.clone(), slot(EquipmentType::Wind, "w")],
        )
        .unwrap();
        let rules = AllocationRuleSet::standard();
        let layout = field_layout(&catalog, &rules);
        let entries = vec![
            AllocationEntry::new(&battery, &a, 100.0),
            AllocationEntry::new(&battery, &b, 0.0),
        ];

        let summary = compute_summary(&catalog, &rules, &layout, &entries);
        assert_eq!(summary.source_items, 1);
        assert_eq!(summary.target_slots, 3);
        assert_eq!(summary.nonzero_entries, 1);
        assert_eq!(summary.editable_fields, 2);
        assert_eq!(summary.types.len(), 2);
        assert_eq!(summary.types[1].status, TypeStatus::Orphan);
        assert_eq!(summary.types[1].discipline, Discipline::Count);
    }

    #[test]
    fn report_json_shape() {
        let catalog = InventoryCatalog::default();
        let rules = AllocationRuleSet::standard();
        let layout = field_layout(&catalog, &rules);
        let summary = compute_summary(&catalog, &rules, &layout, &[]);
        let report = AllocationReport::new("Empty", Verdict::Ok, summary, layout);

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["meta"]["job_name"], "Empty");
        assert_eq!(v["verdict"]["ok"], true);
        assert_eq!(v["summary"]["types"], serde_json::json!([]));
        assert!(v["meta"]["checked_at"].as_str().unwrap().contains('T'));
    }
}
