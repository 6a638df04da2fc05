//! SEC requester identity and download directory.
//!
//! SEC EDGAR requires every client to declare a name and contact email in its
//! User-Agent. Both are validated before any request is made.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::config::{IngestConfig, SEC_EDGAR_EMAIL_VAR, SEC_EDGAR_NAME_VAR};
use crate::errors::IngestError;

lazy_static! {
    /// One `@`, non-empty local part, dotted domain of non-empty labels,
    /// alphabetic TLD of at least two letters.
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
            .expect("Invalid regex pattern");
}

/// Validate the requester name. Blank counts as missing.
pub fn validate_company_name(name: Option<&str>) -> Result<String, IngestError> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Ok(name.to_string()),
        None => {
            error!("{} environment variable required", SEC_EDGAR_NAME_VAR);
            Err(IngestError::MissingCredential {
                var: SEC_EDGAR_NAME_VAR.to_string(),
            })
        }
    }
}

/// Validate the requester email address.
pub fn validate_email_address(email: Option<&str>) -> Result<String, IngestError> {
    let Some(email) = email else {
        error!("{} environment variable required", SEC_EDGAR_EMAIL_VAR);
        return Err(IngestError::MissingCredential {
            var: SEC_EDGAR_EMAIL_VAR.to_string(),
        });
    };

    let email = email.trim();
    if !EMAIL_REGEX.is_match(email) {
        error!("Invalid email address in {}: {:?}", SEC_EDGAR_EMAIL_VAR, email);
        return Err(IngestError::InvalidConfig {
            var: SEC_EDGAR_EMAIL_VAR.to_string(),
            message: format!("invalid email address {:?}", email),
        });
    }

    Ok(email.to_string())
}

/// Validated requester identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecEdgarCredentials {
    pub name: String,
    pub email: String,
}

impl SecEdgarCredentials {
    pub fn new(name: Option<&str>, email: Option<&str>) -> Result<Self, IngestError> {
        Ok(Self {
            name: validate_company_name(name)?,
            email: validate_email_address(email)?,
        })
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self, IngestError> {
        Self::new(
            config.sec_edgar_name.as_deref(),
            config.sec_edgar_email.as_deref(),
        )
    }

    /// `"{name} {email}"`, the format SEC asks for.
    pub fn user_agent(&self) -> String {
        format!("{} {}", self.name, self.email)
    }
}

/// Create the download directory (and parents) if needed.
pub fn ensure_download_dir(path: &Path) -> Result<PathBuf, IngestError> {
    if !path.exists() {
        debug!("Creating download directory {}", path.display());
    }
    std::fs::create_dir_all(path).map_err(|source| IngestError::DownloadDir {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path.to_path_buf())
}
