use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-student attendance status for one class session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
        }
    }
}

/// One student's row inside a snapshot.
/// `student_id` is the key within a snapshot; producers are expected not to
/// repeat it, but the ledger does not enforce that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "studentId")]
    pub student_id: i64,
    #[serde(rename = "studentName")]
    pub student_name: String,
    #[serde(rename = "rollNumber")]
    pub roll_number: String,
    pub status: AttendanceStatus,
}

/// One saved attendance-taking event for a class on a date.
///
/// The ledger holds exactly one snapshot per `(class, date)` pair; saving a
/// second snapshot for the same pair replaces the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSnapshot {
    #[serde(rename = "class")]
    pub class_name: String,
    /// Raw date key, expected to be ISO `YYYY-MM-DD`. Compared by string
    /// equality when upserting; producers using another format create a
    /// distinct key.
    pub date: String,
    pub records: Vec<AttendanceRecord>,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl AttendanceSnapshot {
    pub fn new(class_name: impl Into<String>, date: impl Into<String>, records: Vec<AttendanceRecord>) -> Self {
        Self {
            class_name: class_name.into(),
            date: date.into(),
            records,
            saved_at: Utc::now(),
        }
    }

    pub fn present_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count()
    }

    pub fn absent_count(&self) -> usize {
        self.records.len() - self.present_count()
    }

    /// Parse the date key as an ISO date. Returns `None` for non-ISO keys,
    /// which sort earliest when picking the most recent snapshot.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            student_id: id,
            student_name: format!("Student {}", id),
            roll_number: id.to_string(),
            status,
        }
    }

    #[test]
    fn test_present_and_absent_counts() {
        let snap = AttendanceSnapshot::new(
            "10-A",
            "2026-02-01",
            vec![
                record(1, AttendanceStatus::Present),
                record(2, AttendanceStatus::Absent),
                record(3, AttendanceStatus::Present),
            ],
        );
        assert_eq!(snap.present_count(), 2);
        assert_eq!(snap.absent_count(), 1);
    }

    #[test]
    fn test_parsed_date() {
        let snap = AttendanceSnapshot::new("10-A", "2026-02-01", vec![]);
        assert_eq!(
            snap.parsed_date(),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );

        let odd = AttendanceSnapshot::new("10-A", "02/01/2026", vec![]);
        assert_eq!(odd.parsed_date(), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AttendanceStatus::Present).unwrap();
        assert_eq!(json, r#""present""#);
        let status: AttendanceStatus = serde_json::from_str(r#""absent""#).unwrap();
        assert_eq!(status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_snapshot_wire_field_names() {
        let snap = AttendanceSnapshot::new("9-A", "2026-02-01", vec![record(1, AttendanceStatus::Present)]);
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["class"], "9-A");
        assert!(value["savedAt"].is_string());
        assert_eq!(value["records"][0]["studentId"], 1);
        assert_eq!(value["records"][0]["rollNumber"], "1");
    }
}
