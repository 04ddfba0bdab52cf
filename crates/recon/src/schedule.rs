use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::error::AllocationIssue;

/// One time selector in a submitted profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleRow {
    pub month_number: u8,
    pub day_type: u16,
    pub hour_value: u8,
}

impl ScheduleRow {
    /// Human label, e.g. `January / day type 200 / 05:00`.
    pub fn label(&self) -> String {
        let month = Month::try_from(self.month_number)
            .map(|m| m.name().to_string())
            .unwrap_or_else(|_| format!("month {}", self.month_number));
        format!("{month} / day type {} / {:02}:00", self.day_type, self.hour_value)
    }
}

/// Row under construction in the schedule editor; the hour may still be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ScheduleRowDraft {
    pub month: u8,
    pub day_type: u16,
    #[serde(default)]
    pub hour: Option<u8>,
}

impl ScheduleRowDraft {
    pub fn new(month: u8, day_type: u16, hour: Option<u8>) -> Self {
        Self { month, day_type, hour }
    }
}

/// Ordered, duplicate-free list of schedule rows.
///
/// Edits never modify a schedule in place; each returns the next value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `draft` as a new last row.
    pub fn append(&self, draft: ScheduleRowDraft) -> Result<Schedule, AllocationIssue> {
        let hour = draft.hour.ok_or(AllocationIssue::MissingHourSelection)?;

        if Month::try_from(draft.month).is_err() || hour > 23 {
            return Err(AllocationIssue::InvalidScheduleRow {
                month: draft.month,
                hour,
            });
        }

        let row = ScheduleRow {
            month_number: draft.month,
            day_type: draft.day_type,
            hour_value: hour,
        };
        if self.rows.contains(&row) {
            return Err(AllocationIssue::DuplicateDateRow);
        }

        let mut rows = self.rows.clone();
        rows.push(row);
        Ok(Schedule { rows })
    }

    /// Drop the row at `index`; an out-of-range index leaves the schedule as is.
    pub fn remove(&self, index: usize) -> Schedule {
        let mut rows = self.rows.clone();
        if index < rows.len() {
            rows.remove(index);
        }
        Schedule { rows }
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<ScheduleRowDraft>> for Schedule {
    type Error = AllocationIssue;

    fn try_from(drafts: Vec<ScheduleRowDraft>) -> Result<Self, Self::Error> {
        drafts
            .into_iter()
            .try_fold(Schedule::new(), |schedule, draft| schedule.append(draft))
    }
}
