//! Run configuration.
//!
//! Secrets come from a dotenv-style key/value file; everything else has a
//! hardcoded default that the same file may override. The resulting
//! [`RunConfig`] is built once at startup and only ever borrowed.
//!
//! | Key               | Required | Default                              |
//! |-------------------|----------|--------------------------------------|
//! | `DB_PASSWORD`     | yes      | --                                   |
//! | `EMAIL_USER`      | yes      | --                                   |
//! | `EMAIL_PASSWORD`  | yes      | --                                   |
//! | `APP_NAME`        | no       | `PromotionPipeline`                  |
//! | `DATA_DIR`        | no       | `data`                               |
//! | `LOG_DIR`         | no       | `logs`                               |
//! | `OLD_WORKBOOK`    | no       | `Promotion_data.xlsx`                |
//! | `NEW_WORKBOOK`    | no       | `Promotion_new_data.xlsx`            |
//! | `DATABASE_URL`    | no       | `postgres://localhost:5432/datahub`  |
//! | `DB_USER`         | no       | `postgres`                           |
//! | `DB_TABLE`        | no       | `promotion_table`                    |
//! | `WRITE_MODE`      | no       | `overwrite`                          |
//! | `SMTP_HOST`       | no       | `smtp.gmail.com`                     |
//! | `SMTP_PORT`       | no       | `587`                                |
//! | `EMAIL_TO`        | no       | value of `EMAIL_USER`                |
//! | `SALES_TOLERANCE` | no       | `0.01`                               |

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::types::WriteMode;
use crate::validation::DEFAULT_SALES_TOLERANCE;

/// Config file read when `PROMOFLOW_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "config.env";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "PROMOFLOW_CONFIG";

const DEFAULT_APP_NAME: &str = "PromotionPipeline";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_OLD_WORKBOOK: &str = "Promotion_data.xlsx";
const DEFAULT_NEW_WORKBOOK: &str = "Promotion_new_data.xlsx";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/datahub";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_TABLE: &str = "promotion_table";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Input, output and log locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PathConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub old_workbook: String,
    pub new_workbook: String,
}

impl PathConfig {
    pub fn old_workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.old_workbook)
    }

    pub fn new_workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.new_workbook)
    }

    /// Directory the converted delimited files are written to.
    pub fn csv_dir(&self) -> PathBuf {
        self.data_dir.join("csv")
    }
}

/// Relational sink connection settings.
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub table: String,
    pub write_mode: WriteMode,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("table", &self.table)
            .field("write_mode", &self.write_mode)
            .finish()
    }
}

/// SMTP settings for the status notification.
#[derive(Clone, PartialEq)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// STARTTLS submission port.
    pub smtp_port: u16,
    pub user: String,
    pub password: String,
    pub to: String,
}

impl EmailConfig {
    /// Name of the first credential that is blank, if any.
    pub fn missing_credential(&self) -> Option<&'static str> {
        [
            ("user", &self.user),
            ("password", &self.password),
            ("to", &self.to),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .finish()
    }
}

/// Tunables for the advisory checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    pub sales_tolerance: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            sales_tolerance: DEFAULT_SALES_TOLERANCE,
        }
    }
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Immutable configuration shared by every stage of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub app_name: String,
    pub paths: PathConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    pub validation: ValidationPolicy,
}

impl RunConfig {
    /// Resolve the config file path from `PROMOFLOW_CONFIG`, falling back
    /// to `config.env` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Read a key/value file and build the configuration from it.
    ///
    /// The process environment is left untouched.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let file_err = |source| CoreError::ConfigFile {
            path: path.to_path_buf(),
            source,
        };
        let values = dotenvy::from_path_iter(path)
            .map_err(file_err)?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(file_err)?;
        Self::from_values(&values)
    }

    /// Build the configuration from already-parsed key/value pairs.
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self, CoreError> {
        let get = |key: &str| values.get(key).map(String::as_str);
        let required = |key: &'static str| get(key).ok_or(CoreError::MissingKey(key));
        let or_default =
            |key: &str, default: &str| get(key).unwrap_or(default).to_string();

        let db_password = required("DB_PASSWORD")?.to_string();
        let email_user = required("EMAIL_USER")?.to_string();
        let email_password = required("EMAIL_PASSWORD")?.to_string();

        let write_mode = match get("WRITE_MODE") {
            Some(raw) => raw.parse().map_err(|reason| CoreError::InvalidValue {
                key: "WRITE_MODE",
                value: raw.to_string(),
                reason,
            })?,
            None => WriteMode::default(),
        };

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| CoreError::InvalidValue {
                    key: "SMTP_PORT",
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_SMTP_PORT,
        };

        let sales_tolerance = match get("SALES_TOLERANCE") {
            Some(raw) => parse_tolerance(raw)?,
            None => DEFAULT_SALES_TOLERANCE,
        };

        let to = get("EMAIL_TO")
            .map(str::to_string)
            .unwrap_or_else(|| email_user.clone());

        Ok(Self {
            app_name: or_default("APP_NAME", DEFAULT_APP_NAME),
            paths: PathConfig {
                data_dir: PathBuf::from(or_default("DATA_DIR", DEFAULT_DATA_DIR)),
                log_dir: PathBuf::from(or_default("LOG_DIR", DEFAULT_LOG_DIR)),
                old_workbook: or_default("OLD_WORKBOOK", DEFAULT_OLD_WORKBOOK),
                new_workbook: or_default("NEW_WORKBOOK", DEFAULT_NEW_WORKBOOK),
            },
            database: DatabaseConfig {
                url: or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
                user: or_default("DB_USER", DEFAULT_DB_USER),
                password: db_password,
                table: or_default("DB_TABLE", DEFAULT_DB_TABLE),
                write_mode,
            },
            email: EmailConfig {
                smtp_host: or_default("SMTP_HOST", DEFAULT_SMTP_HOST),
                smtp_port,
                user: email_user,
                password: email_password,
                to,
            },
            validation: ValidationPolicy { sales_tolerance },
        })
    }
}

fn parse_tolerance(raw: &str) -> Result<f64, CoreError> {
    let invalid = |reason: String| CoreError::InvalidValue {
        key: "SALES_TOLERANCE",
        value: raw.to_string(),
        reason,
    };
    let value = raw.trim().parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("must be a finite, non-negative number".into()));
    }
    Ok(value)
}
