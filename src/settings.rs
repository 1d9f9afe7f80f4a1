//! Process-wide configuration: company profile, bank details, suppliers and
//! output locations. Loaded once at startup and never mutated.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{InvoiceError, Result};
use crate::model::{BankDetails, CompanyProfile, Supplier};

/// Profile compiled into the binary, used when no settings file exists.
pub const DEFAULT_PROFILE: &str = include_str!("../profile.toml");

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_logo_path")]
    pub logo_path: PathBuf,
    pub company: CompanyProfile,
    #[serde(default)]
    pub bank: BankDetails,
    pub suppliers: Vec<Supplier>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("invoices")
}

fn default_logo_path() -> PathBuf {
    PathBuf::from("logo/Black logo.png")
}

/// Where the active settings came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsSource {
    Embedded,
    File(PathBuf),
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::Embedded => write!(f, "built-in profile"),
            SettingsSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;

        if settings.suppliers.is_empty() {
            return Err(InvoiceError::Config("at least one supplier is required".to_string()));
        }
        if settings.company.name.trim().is_empty() {
            return Err(InvoiceError::Config("company name is required".to_string()));
        }
        for (index, supplier) in settings.suppliers.iter_mut().enumerate() {
            supplier.id = index + 1;
        }
        Ok(settings)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_PROFILE)
    }

    /// Reads `explicit` if given, otherwise the user settings file if it
    /// exists, otherwise the built-in profile.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, SettingsSource)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => user_settings_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading settings");
                let content = fs::read_to_string(&path).map_err(|e| {
                    InvoiceError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                let settings = Self::from_toml(&content)?;
                Ok((settings, SettingsSource::File(path)))
            }
            None => Ok((Self::embedded()?, SettingsSource::Embedded)),
        }
    }

    /// Looks up a supplier by its 1-based id.
    pub fn supplier(&self, id: usize) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }
}

pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "invoice-generator", "app")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Writes the built-in profile to the user settings path unless a file is
/// already there. Returns the path either way.
pub fn init_user_settings() -> Result<PathBuf> {
    let path = user_settings_path()
        .ok_or_else(|| InvoiceError::Config("no home directory found".to_string()))?;

    if path.exists() {
        debug!(path = %path.display(), "settings file already present");
        return Ok(path);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, DEFAULT_PROFILE)?;
    info!(path = %path.display(), "wrote default settings");
    Ok(path)
}
