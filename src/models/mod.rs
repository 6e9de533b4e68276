//! Data models for Rollbook entities.
//!
//! This module contains the data structures shared by the API client and
//! the attendance ledger:
//!
//! - `AttendanceSnapshot`, `AttendanceRecord`, `AttendanceStatus`: one saved
//!   attendance-taking event and its per-student rows
//! - `Student`: directory entries used as the roster fallback

pub mod attendance;
pub mod student;

pub use attendance::{AttendanceRecord, AttendanceSnapshot, AttendanceStatus};
pub use student::{class_size, Student};
