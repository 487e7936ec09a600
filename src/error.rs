//! # Error Handling
//!
//! This module defines the centralized error type for `confgen`. It uses the
//! `thiserror` library to describe every failure the library can surface to
//! a caller.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all library errors. Each variant carries the
//!   context needed to act on it (the repository, the path, the command).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Only a few of these errors end a run. Failures that belong to a single
//! search path or a single repository are caught where they happen and
//! reported as values (see `mirror::MirrorOutcome` and
//! `orchestrator::SyncReport`). What propagates up to the binary is:
//!
//! - Configuration file I/O and parsing errors.
//! - Missing credentials when a clone is actually required.
//! - Failure to enumerate the hosting organization.
//!
//! Messages never include access tokens; URLs are redacted with
//! `git::redact_url` before they reach an error.

use thiserror::Error;

/// Main error type for confgen operations
#[derive(Error, Debug)]
pub enum Error {
    /// The tool settings file could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The IDE configuration file is malformed or could not be written.
    #[error("IDE configuration error for {path}: {message}")]
    IdeConfig { path: String, message: String },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// A Git command did not finish within the configured timeout.
    #[error("Git command timed out after {seconds}s in {dir}: {command}")]
    GitTimeout {
        command: String,
        dir: String,
        seconds: u64,
    },

    /// The hosting service could not list an organization's repositories.
    #[error("Hosting API error for {org}: {message}")]
    Hosting { org: String, message: String },

    /// No access token is available but a network call requires one.
    #[error("Credentials unavailable: {message}")]
    Credentials { message: String },

    /// The worker pool for parallel clones could not be started.
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// A mirror location could not be populated.
    #[error("Mirror error: {src} -> {dst}: {message}")]
    Mirror {
        src: String,
        dst: String,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// An HTTP client error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
