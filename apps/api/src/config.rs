use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

pub const DEFAULT_PROFILE_SHEET: &str = "면담 데이터";
pub const DEFAULT_INTERVIEW_SHEET: &str = "직원면담";
const DEFAULT_COACHING_TIMEOUT_SECS: u64 = 90;

/// Where the profile table and the interview log live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sheets {
        spreadsheet_id: String,
        access_token: String,
        profile_sheet: String,
        interview_sheet: String,
    },
    Postgres {
        database_url: String,
    },
    Memory {
        seed_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Sheets,
    Postgres,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheets" => Ok(BackendKind::Sheets),
            "postgres" => Ok(BackendKind::Postgres),
            "memory" => Ok(BackendKind::Memory),
            other => bail!("STORE_BACKEND must be one of sheets, postgres, memory (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub store: StoreBackend,
    pub coaching_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let kind: BackendKind = or_default("STORE_BACKEND", "sheets").parse()?;
        let store = match kind {
            BackendKind::Sheets => StoreBackend::Sheets {
                spreadsheet_id: require("SHEETS_SPREADSHEET_ID")?,
                access_token: require("SHEETS_ACCESS_TOKEN")?,
                profile_sheet: or_default("PROFILE_SHEET", DEFAULT_PROFILE_SHEET),
                interview_sheet: or_default("INTERVIEW_SHEET", DEFAULT_INTERVIEW_SHEET),
            },
            BackendKind::Postgres => StoreBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            BackendKind::Memory => StoreBackend::Memory {
                seed_path: get("MEMORY_SEED_PATH").map(PathBuf::from),
            },
        };

        let timeout_secs = match get("COACHING_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("COACHING_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_COACHING_TIMEOUT_SECS,
        };

        Ok(Config {
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            store,
            coaching_timeout: Duration::from_secs(timeout_secs),
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
