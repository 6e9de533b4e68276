use serde::{Deserialize, Serialize};

/// A student directory entry as returned by the roster endpoints.
/// Used as the fallback roster size when a class has no attendance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    #[serde(rename = "rollNumber")]
    pub roll_number: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

/// Number of directory entries assigned to a class.
pub fn class_size(roster: &[Student], class_name: &str) -> usize {
    roster.iter().filter(|s| s.class_name == class_name).count()
}
