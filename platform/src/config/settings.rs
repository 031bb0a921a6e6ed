// Application settings: locale, notification timings, search debounce, pagination,
// export, fetch and storage options. Missing keys in a user file fall back to defaults.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use shared::formatting::LocaleFormat;

use crate::error::PlatformError;

const DEFAULT_CONFIG: &str = include_str!("../../assets/config/default.json");

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub version: String,
    pub locale: LocaleSettings,
    pub notifications: NotificationSettings,
    pub search: SearchSettings,
    pub pagination: PaginationSettings,
    pub export: ExportSettings,
    pub fetch: FetchSettings,
    pub storage: StorageSettings,
    pub page: PageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocaleSettings {
    pub tag: String,
    pub currency_symbol: String,
    pub thousands_separator: String, // Should be char, but JSON string is easier
    pub decimal_separator: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NotificationSettings {
    pub enter_delay_ms: u64,
    pub display_ms: u64,
    pub exit_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PaginationSettings {
    pub items_per_page: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub default_filename: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    pub error_message: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file backing the key/value store; in-memory storage when absent.
    pub file: Option<PathBuf>,
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PageSettings {
    pub date_field_id: String,
    pub card_classes: Vec<String>,
    pub card_stagger_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl AppSettings {
    /// Parses the default.json bundled into the binary.
    pub fn load_default() -> Result<Self, PlatformError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PlatformError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), version = %settings.version, "Loaded settings file");
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self, PlatformError> {
        let settings: AppSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), PlatformError> {
        single_char(&self.locale.thousands_separator, "locale.thousands_separator")?;
        single_char(&self.locale.decimal_separator, "locale.decimal_separator")?;
        if self.locale.thousands_separator == self.locale.decimal_separator {
            return Err(PlatformError::ConfigError(
                "locale separators must differ".to_string(),
            ));
        }
        if self.pagination.items_per_page == 0 {
            return Err(PlatformError::ConfigError(
                "pagination.items_per_page must be positive".to_string(),
            ));
        }
        if self.export.default_filename.trim().is_empty() {
            return Err(PlatformError::ConfigError(
                "export.default_filename must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Number/date conventions for the formatters.
    pub fn locale_format(&self) -> LocaleFormat {
        let base = LocaleFormat::es_cl();
        let thousands = self
            .locale
            .thousands_separator
            .chars()
            .next()
            .unwrap_or(base.thousands_separator);
        let decimal = self
            .locale
            .decimal_separator
            .chars()
            .next()
            .unwrap_or(base.decimal_separator);
        LocaleFormat {
            tag: self.locale.tag.clone(),
            currency_symbol: self.locale.currency_symbol.clone(),
            ..base.with_separators(thousands, decimal)
        }
    }
}

fn single_char(value: &str, field: &str) -> Result<char, PlatformError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(PlatformError::ConfigError(format!(
            "{} must be a single character, got '{}'",
            field, value
        ))),
    }
}

impl NotificationSettings {
    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }

    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }
}

impl SearchSettings {
    pub fn debounce_wait(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl PageSettings {
    pub fn card_stagger(&self) -> Duration {
        Duration::from_millis(self.card_stagger_ms)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            locale: LocaleSettings::default(),
            notifications: NotificationSettings::default(),
            search: SearchSettings::default(),
            pagination: PaginationSettings::default(),
            export: ExportSettings::default(),
            fetch: FetchSettings::default(),
            storage: StorageSettings::default(),
            page: PageSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            tag: "es-CL".to_string(),
            currency_symbol: "$".to_string(),
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enter_delay_ms: 100,
            display_ms: 3000,
            exit_ms: 300,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            items_per_page: shared::pagination::DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_filename: "data.csv".to_string(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            error_message: "Error al cargar los datos. Por favor, intenta nuevamente.".to_string(),
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            date_field_id: "fecha".to_string(),
            card_classes: vec!["stat-card".to_string(), "feature-card".to_string()],
            card_stagger_ms: 50,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
