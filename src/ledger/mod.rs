//! Local attendance ledger.
//!
//! The ledger is the client-local collection of attendance snapshots, one
//! per `(class, date)` pair. Saving is an upsert keyed on that pair; every
//! save rewrites the whole persisted collection. The admin dashboard reads
//! it through the aggregation functions in [`crate::summary`].

pub mod store;

use std::path::PathBuf;

use anyhow::Result;

use crate::models::{AttendanceSnapshot, AttendanceStatus, Student};
use crate::summary::{self, AttendanceTotals, ClassSummary};

pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};

/// One per-student row produced by [`AttendanceLedger::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentAttendanceRow {
    pub class_name: String,
    pub date: String,
    pub student_id: i64,
    pub student_name: String,
    pub roll_number: String,
    pub status: AttendanceStatus,
}

pub struct AttendanceLedger {
    store: Box<dyn LedgerStore>,
}

impl AttendanceLedger {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Ledger persisted to a single JSON file at `path`.
    pub fn open(path: PathBuf) -> Self {
        Self::new(Box::new(FileLedgerStore::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryLedgerStore::new()))
    }

    /// All snapshots, oldest save first.
    pub fn entries(&self) -> Result<Vec<AttendanceSnapshot>> {
        self.store.load_all()
    }

    /// Upsert by exact `(class, date)` string equality. An existing entry is
    /// replaced in position; otherwise the snapshot is appended. The date
    /// key is not normalized: producers writing a different date format
    /// create a distinct key.
    pub fn save_snapshot(&self, snapshot: AttendanceSnapshot) -> Result<()> {
        let mut entries = self.store.load_all()?;
        let existing = entries
            .iter()
            .position(|e| e.class_name == snapshot.class_name && e.date == snapshot.date);
        match existing {
            Some(i) => entries[i] = snapshot,
            None => entries.push(snapshot),
        }
        self.store.save_all(&entries)
    }

    /// Filter by exact class and/or date, then flatten to per-student rows
    /// keeping those whose name (case-insensitive) or roll number contains
    /// the query. An empty query keeps every row.
    pub fn search(
        &self,
        class_name: Option<&str>,
        date: Option<&str>,
        query: &str,
    ) -> Result<Vec<StudentAttendanceRow>> {
        let query_lower = query.to_lowercase();
        let rows = self
            .store
            .load_all()?
            .into_iter()
            .filter(|s| class_name.map_or(true, |c| s.class_name == c))
            .filter(|s| date.map_or(true, |d| s.date == d))
            .flat_map(|snapshot| {
                let class_name = snapshot.class_name;
                let date = snapshot.date;
                snapshot
                    .records
                    .into_iter()
                    .map(move |r| StudentAttendanceRow {
                        class_name: class_name.clone(),
                        date: date.clone(),
                        student_id: r.student_id,
                        student_name: r.student_name,
                        roll_number: r.roll_number,
                        status: r.status,
                    })
            })
            .filter(|row| {
                query.is_empty()
                    || row.student_name.to_lowercase().contains(&query_lower)
                    || row.roll_number.contains(query)
            })
            .collect();
        Ok(rows)
    }

    /// Per-class summary view over the latest snapshot per class.
    pub fn summarize_by_class(
        &self,
        class_names: &[&str],
        roster: &[Student],
    ) -> Result<Vec<ClassSummary>> {
        Ok(summary::summarize_by_class(
            &self.store.load_all()?,
            class_names,
            roster,
        ))
    }

    /// Global totals over every snapshot, historical included.
    pub fn global_totals(&self) -> Result<AttendanceTotals> {
        Ok(summary::global_totals(&self.store.load_all()?))
    }
}
