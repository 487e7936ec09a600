//! Access tokens for the hosting service.
//!
//! The token is handed to the code that needs it through a
//! [`CredentialProvider`] rather than read from process-wide state. A
//! missing token is only an error once something asks for it.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Supplies the hosting-service access token on demand.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Result<String>;
}

/// A token known up front, e.g. from `--token` or the environment.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenFileContents {
    gh_token: Option<String>,
}

/// Reads `{"gh_token": "..."}` from a per-user JSON file, at most once.
#[derive(Debug)]
pub struct TokenFile {
    path: PathBuf,
    cached: OnceLock<std::result::Result<String, String>>,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> std::result::Result<String, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let contents: TokenFileContents = serde_json::from_str(&content)
            .map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;
        match contents.gh_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(format!("no gh_token in {}", path.display())),
        }
    }
}

impl CredentialProvider for TokenFile {
    fn token(&self) -> Result<String> {
        self.cached
            .get_or_init(|| Self::load(&self.path))
            .clone()
            .map_err(|message| Error::Credentials { message })
    }
}
