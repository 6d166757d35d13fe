use crate::config::validate_provider;
use crate::domain::model::CustomRegion;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::default_regions;
use crate::utils::error::{Result, TimelineError};
use crate::utils::validation::{validate_required_field, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// 自訂矩形；有設定時取代內建清單
    pub regions: Option<Vec<CustomRegion>>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: Option<String>,
    pub years: Option<String>,
    pub preferred_country: Option<String>,
    /// Quoted `"YYYY-MM-DD"`.
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_timeline")]
    pub timeline: String,
    #[serde(default = "default_boundaries")]
    pub boundaries: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeline: default_timeline(),
            boundaries: default_boundaries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output")]
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    pub summary: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output(),
            formats: default_formats(),
            summary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn default_timeline() -> String {
    "Timeline.json".to_string()
}

fn default_boundaries() -> String {
    "boundaries.json".to_string()
}

fn default_output() -> String {
    "output.json".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TimelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TimelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})；未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TimelineError::ConfigError {
            message: format!("environment pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_required_field("run.years", &self.run.years)?;
        validate_provider(self)?;

        if let Some(regions) = &self.regions {
            for region in regions {
                crate::utils::validation::validate_non_empty_string("regions.name", &region.name)?;
                crate::utils::validation::validate_range("regions.lat1", region.lat1, -90.0, 90.0)?;
                crate::utils::validation::validate_range("regions.lat2", region.lat2, -90.0, 90.0)?;
                crate::utils::validation::validate_range("regions.lng1", region.lng1, -180.0, 180.0)?;
                crate::utils::validation::validate_range("regions.lng2", region.lng2, -180.0, 180.0)?;
            }
        }
        Ok(())
    }

    pub fn run_name(&self) -> &str {
        self.run.name.as_deref().unwrap_or("country-days")
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn years(&self) -> &str {
        self.run.years.as_deref().unwrap_or_default()
    }

    fn preferred_country(&self) -> Option<&str> {
        self.run.preferred_country.as_deref()
    }

    fn input_path(&self) -> &str {
        &self.input.timeline
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn boundaries_path(&self) -> &str {
        &self.input.boundaries
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn summary_path(&self) -> Option<&str> {
        self.output.summary.as_deref()
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.run.as_of
    }

    fn custom_regions(&self) -> Vec<CustomRegion> {
        self.regions.clone().unwrap_or_else(default_regions)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
