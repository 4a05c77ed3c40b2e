use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

use crate::runs::ClassifierMode;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub classifier: ClassifierConfig,
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Mailbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Defaults for new runs plus how to reach the external classifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub default_mode: ClassifierMode,
    pub default_use_filter: bool,
    pub default_async_mode: bool,
    pub default_max_concurrency: u32,
    pub max_concurrency_limit: u32,
    pub allowed_file_types: Vec<String>,
    pub output_directory: String,
    pub timeout_secs: Option<u64>,
    pub command: Option<CommandConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_mode: ClassifierMode::Both,
            default_use_filter: true,
            default_async_mode: true,
            default_max_concurrency: 20,
            max_concurrency_limit: 50,
            allowed_file_types: vec!["csv".to_string(), "xlsx".to_string()],
            output_directory: "./output".to_string(),
            timeout_secs: None,
            command: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sr_id_column: String,
    pub ground_truth_category_column: String,
    pub predicted_opening_column: String,
    pub predicted_category_column: String,
    pub special_categories: Vec<String>,
    pub result_marker: String,
    pub result_extensions: Vec<String>,
    pub labels: OpeningLabels,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sr_id_column: "sr_id".to_string(),
            ground_truth_category_column: "quickfill".to_string(),
            predicted_opening_column: "predicted_opening".to_string(),
            predicted_category_column: "predicted_quickfill".to_string(),
            special_categories: Vec::new(),
            result_marker: "_result".to_string(),
            result_extensions: vec!["csv".to_string(), "xlsx".to_string()],
            labels: OpeningLabels::default(),
        }
    }
}

/// Label strings the classifier writes into the predicted opening column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OpeningLabels {
    pub creation: String,
    pub archive: String,
    pub review: String,
}

impl Default for OpeningLabels {
    fn default() -> Self {
        Self {
            creation: "SR Creation".to_string(),
            archive: "Archive".to_string(),
            review: "Review".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
    pub max_history_items: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "mailbench.db".to_string(),
            max_history_items: 100,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from("Mailbench")
}

/// Reads `<name>.toml` (optional) and `MAILBENCH__*` environment overrides.
pub fn load_configuration_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(
            Environment::with_prefix("MAILBENCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
