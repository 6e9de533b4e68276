//! Rollbook core - the client data layer for the Rollbook school
//! management application.
//!
//! Two cooperating mechanisms live here:
//!
//! - A session-aware HTTP client ([`api::ApiClient`]) that resolves its
//!   bearer token from two-tier session storage ([`auth::AuthVault`]) on
//!   every request, classifies failures for the UI, and tears the session
//!   down on an authentication failure.
//! - A local attendance ledger ([`ledger::AttendanceLedger`]) holding one
//!   snapshot per `(class, date)`, consumed by the aggregation views in
//!   [`summary`].
//!
//! Presentation concerns (rendering, dialogs, charts, navigation) live in
//! the UI layers built on top of this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod models;
pub mod summary;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthVault, SessionData};
pub use config::Config;
pub use ledger::AttendanceLedger;
pub use models::{AttendanceRecord, AttendanceSnapshot, AttendanceStatus, Student};
pub use summary::{AttendanceTotals, ClassSummary};
