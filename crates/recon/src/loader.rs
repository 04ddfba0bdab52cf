//! CSV loaders for the three exports an allocation job reads.

use std::str::FromStr;

use csv::StringRecord;

use crate::catalog::InventoryCatalog;
use crate::config::{EntryColumns, SourceColumns, TargetColumns};
use crate::error::ReconError;
use crate::model::{AllocationEntry, EquipmentType, SourceItem, TargetSlot};

/// Header-indexed view over one CSV export.
struct Table {
    input: &'static str,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table {
    fn read(input: &'static str, csv_data: &str) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            input,
            headers,
            records,
        })
    }

    fn column(&self, name: &str) -> Result<usize, ReconError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn {
                input: self.input.into(),
                column: name.into(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn parse<T: FromStr>(
        &self,
        record: &StringRecord,
        row: usize,
        idx: usize,
    ) -> Result<T, ReconError> {
        let raw = record.get(idx).unwrap_or("");
        raw.parse().map_err(|_| ReconError::FieldParse {
            input: self.input.into(),
            record: row,
            field: self.headers[idx].clone(),
            value: raw.into(),
        })
    }

    fn text(record: &StringRecord, idx: usize) -> String {
        record.get(idx).unwrap_or("").to_string()
    }
}

/// Imported source items. Blank capacity/group cells read as 0.
pub fn load_source_items(csv_data: &str, columns: &SourceColumns) -> Result<Vec<SourceItem>, ReconError> {
    let table = Table::read("sources", csv_data)?;
    let name_idx = table.column(&columns.name)?;
    let type_idx = table.column(&columns.equipment_type)?;
    let count_idx = table.column(&columns.count)?;
    let capacity_idx = table.optional_column(&columns.capacity);
    let units_idx = table.optional_column(&columns.units);
    let group_idx = table.optional_column(&columns.group_index);

    let mut items = Vec::with_capacity(table.records.len());
    for (row, record) in table.records.iter().enumerate() {
        let row = row + 1;
        let capacity = match capacity_idx {
            Some(i) if !record.get(i).unwrap_or("").is_empty() => table.parse(record, row, i)?,
            _ => 0.0,
        };
        let group_index = match group_idx {
            Some(i) if !record.get(i).unwrap_or("").is_empty() => table.parse(record, row, i)?,
            _ => 0,
        };

        items.push(SourceItem {
            name: Table::text(record, name_idx),
            equipment_type: table.parse(record, row, type_idx)?,
            capacity,
            count: table.parse(record, row, count_idx)?,
            units: units_idx.map(|i| Table::text(record, i)).unwrap_or_default(),
            group_index,
        });
    }

    log::debug!("loaded {} source item(s)", items.len());
    Ok(items)
}

/// Local equipment instances from the one-line model export.
pub fn load_target_slots(csv_data: &str, columns: &TargetColumns) -> Result<Vec<TargetSlot>, ReconError> {
    let table = Table::read("targets", csv_data)?;
    let id_idx = table.column(&columns.id)?;
    let name_idx = table.column(&columns.name)?;
    let type_idx = table.column(&columns.equipment_type)?;

    let mut slots = Vec::with_capacity(table.records.len());
    for (row, record) in table.records.iter().enumerate() {
        slots.push(TargetSlot {
            id: Table::text(record, id_idx),
            name: Table::text(record, name_idx),
            equipment_type: table.parse(record, row + 1, type_idx)?,
        });
    }

    log::debug!("loaded {} target slot(s)", slots.len());
    Ok(slots)
}

/// Allocation values typed so far. Target names come from the catalog; an
/// id the catalog does not know keeps the id as its name and is reported by
/// the engine.
pub fn load_entries(
    csv_data: &str,
    columns: &EntryColumns,
    catalog: &InventoryCatalog,
) -> Result<Vec<AllocationEntry>, ReconError> {
    let table = Table::read("entries", csv_data)?;
    let source_idx = table.column(&columns.source_item_name)?;
    let target_idx = table.column(&columns.target_slot_id)?;
    let type_idx = table.column(&columns.equipment_type)?;
    let value_idx = table.column(&columns.value)?;

    let mut entries = Vec::with_capacity(table.records.len());
    for (row, record) in table.records.iter().enumerate() {
        let row = row + 1;
        let target_slot_id = Table::text(record, target_idx);
        let target_slot_name = catalog
            .target(&target_slot_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| target_slot_id.clone());
        let value = match record.get(value_idx).unwrap_or("") {
            "" => 0.0,
            _ => table.parse(record, row, value_idx)?,
        };
        let equipment_type: EquipmentType = table.parse(record, row, type_idx)?;

        entries.push(AllocationEntry {
            source_item_name: Table::text(record, source_idx),
            target_slot_id,
            target_slot_name,
            equipment_type,
            value,
        });
    }

    log::debug!("loaded {} allocation entries", entries.len());
    Ok(entries)
}
