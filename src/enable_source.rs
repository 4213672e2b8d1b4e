//! Locating the enable document at configuration-load time.
//!
//! An enable document is handed to a process either as a file path or as
//! inline JSON, through two environment variables. Supplying both is a
//! configuration error; supplying neither means the process runs on its
//! capabilities file alone.

use serde_json::Value;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const ENABLE_PATH_ENV: &str = "CAPGEN_ENABLE_PATH";
pub const ENABLE_JSON_ENV: &str = "CAPGEN_ENABLE_JSON";

#[derive(Debug, Error)]
pub enum EnableSourceError {
    #[error("CAPGEN_ENABLE_PATH and CAPGEN_ENABLE_JSON cannot both be set")]
    Conflicting,
    #[error("CAPGEN_ENABLE_JSON is not valid UTF-8")]
    NotUnicode,
    #[error("reading enable file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing enable document from {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the enable document comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnableSource {
    Absent,
    Path(PathBuf),
    Inline(String),
}

impl EnableSource {
    /// Resolve from `CAPGEN_ENABLE_PATH` / `CAPGEN_ENABLE_JSON`.
    pub fn from_env() -> Result<Self, EnableSourceError> {
        let json = match env::var(ENABLE_JSON_ENV) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => return Err(EnableSourceError::NotUnicode),
        };
        Self::from_vars(env::var_os(ENABLE_PATH_ENV), json)
    }

    /// Resolve from already-read variable values. Empty values count as unset.
    pub fn from_vars(
        path: Option<OsString>,
        json: Option<String>,
    ) -> Result<Self, EnableSourceError> {
        let path = path.filter(|p| !p.is_empty());
        let json = json.filter(|j| !j.trim().is_empty());
        match (path, json) {
            (Some(_), Some(_)) => Err(EnableSourceError::Conflicting),
            (Some(path), None) => Ok(EnableSource::Path(PathBuf::from(path))),
            (None, Some(json)) => Ok(EnableSource::Inline(json)),
            (None, None) => Ok(EnableSource::Absent),
        }
    }

    /// The parsed enable document, or `None` when no source is configured.
    pub fn read(&self) -> Result<Option<Value>, EnableSourceError> {
        match self {
            EnableSource::Absent => Ok(None),
            EnableSource::Path(path) => {
                let data = fs::read_to_string(path).map_err(|source| EnableSourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                let value = serde_json::from_str(&data).map_err(|source| {
                    EnableSourceError::Parse {
                        origin: path.display().to_string(),
                        source,
                    }
                })?;
                Ok(Some(value))
            }
            EnableSource::Inline(json) => {
                let value =
                    serde_json::from_str(json).map_err(|source| EnableSourceError::Parse {
                        origin: ENABLE_JSON_ENV.to_string(),
                        source,
                    })?;
                Ok(Some(value))
            }
        }
    }
}
