//! Application settings loaded from config.toml
//!
//! Every field has a built-in default so a partial (or absent) file is valid.
//! The values here seed new invoices, items and transactions, bound uploads and
//! name the default account created at migration time.

use crate::entities::{InvoiceStatus, InvoiceType};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const CONFIG_PATH_ENV: &str = "FAKTURA_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Defaults applied to new invoices and items
    pub invoice: InvoiceDefaults,
    /// Upload limits and location
    pub storage: StorageSettings,
    /// Bookkeeping defaults
    pub accounting: AccountingSettings,
}

/// Defaults applied to new invoices and their items
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InvoiceDefaults {
    /// Days between date of issue and due date
    pub due_date_days: i64,
    /// Initial status
    pub status: InvoiceStatus,
    /// Initial document type
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    /// Whether the seller is a VAT payer
    pub includes_vat: bool,
    /// VAT rate in percent
    pub vat: f64,
    /// ISO currency code, also used for transactions
    pub currency: String,
    /// Discount in percent
    pub discount: f64,
    /// Quantity for items created without one
    pub item_quantity: u32,
}

impl Default for InvoiceDefaults {
    fn default() -> Self {
        Self {
            due_date_days: 14,
            status: InvoiceStatus::Draft,
            invoice_type: InvoiceType::Invoice,
            includes_vat: false,
            vat: 20.0,
            currency: "EUR".to_string(),
            discount: 0.0,
            item_quantity: 1,
        }
    }
}

/// Where uploads go and how big they may be
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Root directory for uploaded documents
    pub media_root: PathBuf,
    /// Maximum upload size in megabytes
    pub max_file_size_upload: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            max_file_size_upload: 10,
        }
    }
}

impl StorageSettings {
    /// Maximum upload size in bytes.
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_upload.saturating_mul(1024 * 1024)
    }
}

/// Bookkeeping defaults
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountingSettings {
    /// Title of the account transactions fall back to; empty disables seeding
    pub default_account: String,
}

impl Default for AccountingSettings {
    fn default() -> Self {
        Self {
            default_account: "Personal".to_string(),
        }
    }
}

impl AccountingSettings {
    /// The configured default account title, if any.
    #[must_use]
    pub fn default_account(&self) -> Option<&str> {
        let title = self.default_account.trim();
        (!title.is_empty()).then_some(title)
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type or an unknown enum variant
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$FAKTURA_CONFIG`, or from ./config.toml.
///
/// An explicitly named file must exist. When the variable is unset and
/// ./config.toml is absent the built-in defaults are used.
pub fn load_default_config() -> Result<Settings> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return load_config(path);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        tracing::info!("No {DEFAULT_CONFIG_PATH} found, using built-in defaults");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [invoice]
            due_date_days = 30
            status = "final"
            type = "proforma"
            includes_vat = true
            vat = 23.0
            currency = "CZK"
            discount = 5.0
            item_quantity = 2

            [storage]
            media_root = "/var/lib/faktura"
            max_file_size_upload = 25

            [accounting]
            default_account = "Business"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.invoice.due_date_days, 30);
        assert_eq!(settings.invoice.status, InvoiceStatus::Final);
        assert_eq!(settings.invoice.invoice_type, InvoiceType::Proforma);
        assert!(settings.invoice.includes_vat);
        assert_eq!(settings.invoice.vat, 23.0);
        assert_eq!(settings.invoice.currency, "CZK");
        assert_eq!(settings.invoice.discount, 5.0);
        assert_eq!(settings.invoice.item_quantity, 2);
        assert_eq!(settings.storage.media_root, PathBuf::from("/var/lib/faktura"));
        assert_eq!(settings.storage.max_upload_bytes(), 25 * 1024 * 1024);
        assert_eq!(settings.accounting.default_account(), Some("Business"));
    }

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let toml_str = r#"
            [invoice]
            type = "credit note"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.invoice.invoice_type, InvoiceType::Credit);
        assert_eq!(settings.invoice.due_date_days, 14);
        assert_eq!(settings.invoice.currency, "EUR");
        assert_eq!(settings.storage, StorageSettings::default());
        assert_eq!(settings.accounting.default_account(), Some("Personal"));
    }

    #[test]
    fn test_empty_default_account_disables_seeding() {
        let settings: Settings = toml::from_str("[accounting]\ndefault_account = \"  \"").unwrap();
        assert_eq!(settings.accounting.default_account(), None);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: std::result::Result<Settings, _> =
            toml::from_str("[invoice]\nstatus = \"sent\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/faktura/config.toml");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[invoice]\nvat = 10.0\n").unwrap();

        let settings = load_config(&path).unwrap();
        assert_eq!(settings.invoice.vat, 10.0);
    }
}
