//! Schema generation error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid Kubernetes version: {0}")]
    InvalidVersion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Api { status: u16, url: String },

    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("openapi2jsonschema failed for {version} (exit code {code}): {output}")]
    GeneratorFailed {
        version: String,
        code: i64,
        output: String,
    },

    #[error("Output directory must be a relative path inside the working directory: {0}")]
    InvalidOutput(PathBuf),

    #[error("{failed} of {total} versions failed to generate")]
    Incomplete { failed: usize, total: usize },

    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
