//! CLI command implementations.

pub mod orders;
pub mod seed;

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use clementine_admin::backend::AdminClient;
use clementine_core::provider::StoreError;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend call failed.
    #[error("Backend error: {0}")]
    Store(#[from] StoreError),

    /// Input file could not be read.
    #[error("Cannot read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input file could not be parsed.
    #[error("Cannot parse {path}: {source}")]
    ParseFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid order status argument.
    #[error("Invalid status: {0}. Valid: pending, processing, shipped, delivered, cancelled")]
    InvalidStatus(String),
}

/// Build the backend client from `BACKEND_BASE_URL` and
/// `BACKEND_ADMIN_API_KEY`.
pub fn backend_client() -> Result<AdminClient, CliError> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("BACKEND_BASE_URL")
        .map_err(|_| CliError::MissingEnvVar("BACKEND_BASE_URL"))?;
    let api_key = std::env::var("BACKEND_ADMIN_API_KEY")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("BACKEND_ADMIN_API_KEY"))?;

    Ok(AdminClient::from_parts(
        base_url,
        &api_key,
        Duration::from_secs(10),
    )?)
}
