//! Application configuration management.
//!
//! This module resolves the API base URL and the local data directory used
//! for the durable session tier and the attendance ledger file.
//!
//! The base URL comes from the `ROLLBOOK_API_URL` environment variable
//! (with `.env` support) and defaults to the local development backend.

use std::path::PathBuf;

use anyhow::Result;

/// Application name used for data directory paths
const APP_NAME: &str = "rollbook";

/// Environment variable selecting the API base URL
const API_URL_ENV: &str = "ROLLBOOK_API_URL";

/// Local development backend, used when the env var is unset
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Ledger file name inside the data directory
const LEDGER_FILE: &str = "attendance.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
}

impl Config {
    /// Resolve configuration from the environment, loading a `.env` file
    /// when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let api_base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self { api_base_url }
    }

    /// Platform data directory for this app. Holds the durable session file
    /// and the attendance ledger.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn ledger_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(LEDGER_FILE))
    }
}
