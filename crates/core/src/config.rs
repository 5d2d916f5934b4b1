//! Core runtime configuration.
//!
//! [`CoreConfig`] is built once at startup from the process
//! environment and then shared read-only across services. Fields are
//! private so every consumer goes through the validated accessors.

use std::path::{Path, PathBuf};

use crate::constants::MIN_ADMIN_TOKEN_LEN;
use crate::error::{HcmsError, HcmsResult};

/// Validated runtime configuration for the core services.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Directory that holds content-addressed lab result attachments.
    upload_dir: PathBuf,
    /// Bearer token that authenticates the bootstrap admin account.
    admin_token: String,
}

impl CoreConfig {
    /// Creates a new configuration.
    ///
    /// The upload directory must already exist; callers are expected
    /// to create it before constructing the config. The admin token is
    /// trimmed and must meet the minimum length.
    pub fn new(upload_dir: PathBuf, admin_token: String) -> HcmsResult<Self> {
        if !upload_dir.is_dir() {
            return Err(HcmsError::Validation(format!(
                "Upload directory does not exist or is not a directory: {}",
                upload_dir.display()
            )));
        }
        let admin_token = admin_token_from_value(Some(admin_token))?;
        Ok(Self {
            upload_dir,
            admin_token,
        })
    }

    /// Directory that holds lab result attachments.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Bearer token of the bootstrap admin account.
    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }
}

/// Normalises and validates an admin token taken from the environment.
///
/// The token is required, gets surrounding whitespace trimmed, and must
/// be at least [`MIN_ADMIN_TOKEN_LEN`] characters long after trimming.
pub fn admin_token_from_value(value: Option<String>) -> HcmsResult<String> {
    let Some(raw) = value else {
        return Err(HcmsError::Validation(
            "Admin token is required but was not provided".to_string(),
        ));
    };
    let token = raw.trim();
    if token.is_empty() {
        return Err(HcmsError::Validation(
            "Admin token must not be empty".to_string(),
        ));
    }
    if token.len() < MIN_ADMIN_TOKEN_LEN {
        return Err(HcmsError::Validation(format!(
            "Admin token must be at least {MIN_ADMIN_TOKEN_LEN} characters long"
        )));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token() -> String {
        "an-acceptably-long-admin-token".to_string()
    }

    #[test]
    fn config_accepts_existing_directory_and_valid_token() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = CoreConfig::new(dir.path().to_path_buf(), token())
            .expect("Config should be accepted");
        assert_eq!(config.upload_dir(), dir.path());
        assert_eq!(config.admin_token(), token());
    }

    #[test]
    fn config_rejects_missing_directory() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let missing = dir.path().join("nope");
        let result = CoreConfig::new(missing, token());
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[test]
    fn config_trims_the_admin_token() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = CoreConfig::new(
            dir.path().to_path_buf(),
            format!("  {}  ", token()),
        )
        .expect("Config should be accepted");
        assert_eq!(config.admin_token(), token());
    }

    #[test]
    fn admin_token_must_be_present() {
        let result = admin_token_from_value(None);
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[test]
    fn admin_token_must_meet_minimum_length() {
        let result = admin_token_from_value(Some("short".to_string()));
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }
}
