//! Attendance aggregation for the admin dashboard.
//!
//! Two views with deliberately different scope:
//!
//! - [`summarize_by_class`] surfaces only the latest snapshot per class;
//!   older snapshots for that class stay in the ledger but are ignored.
//! - [`global_totals`] sums present/absent across every snapshot, historical
//!   included.
//!
//! The asymmetry is a product decision, not an oversight: the per-class view
//! answers "how did the class do last time", the global view answers "how
//! many attendances were ever recorded".

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{class_size, AttendanceSnapshot, Student};

/// Per-class dashboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    pub class_name: String,
    pub total_students: usize,
    pub present: usize,
    pub absent: usize,
    /// Rounded percentage, 0 for an empty class.
    pub attendance_rate: u32,
    /// `None` when the class has no snapshot yet.
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    pub present: usize,
    pub absent: usize,
}

/// Rounded present percentage. Zero for an empty roster, never NaN.
pub fn attendance_rate(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (present as f64 / total as f64 * 100.0).round() as u32
}

/// The snapshot with the latest parsed date for a class. Non-ISO date keys
/// sort earliest, so a well-formed snapshot always beats a malformed one.
pub fn latest_for_class<'a>(
    snapshots: &'a [AttendanceSnapshot],
    class_name: &str,
) -> Option<&'a AttendanceSnapshot> {
    snapshots
        .iter()
        .filter(|s| s.class_name == class_name)
        .max_by_key(|s| s.parsed_date().unwrap_or(NaiveDate::MIN))
}

/// One summary row per class in `class_names`, in the given order. Classes
/// without a snapshot fall back to the student directory for their roster
/// size, with zero counts and no last-updated marker.
pub fn summarize_by_class(
    snapshots: &[AttendanceSnapshot],
    class_names: &[&str],
    roster: &[Student],
) -> Vec<ClassSummary> {
    class_names
        .iter()
        .map(|&class_name| match latest_for_class(snapshots, class_name) {
            Some(snapshot) => {
                let present = snapshot.present_count();
                let total = snapshot.records.len();
                ClassSummary {
                    class_name: class_name.to_string(),
                    total_students: total,
                    present,
                    absent: total - present,
                    attendance_rate: attendance_rate(present, total),
                    last_updated: Some(snapshot.saved_at),
                }
            }
            None => ClassSummary {
                class_name: class_name.to_string(),
                total_students: class_size(roster, class_name),
                present: 0,
                absent: 0,
                attendance_rate: 0,
                last_updated: None,
            },
        })
        .collect()
}

/// Present/absent totals across all snapshots, not just the latest per class.
pub fn global_totals(snapshots: &[AttendanceSnapshot]) -> AttendanceTotals {
    snapshots.iter().fold(AttendanceTotals::default(), |acc, s| {
        AttendanceTotals {
            present: acc.present + s.present_count(),
            absent: acc.absent + s.absent_count(),
        }
    })
}
