pub mod cli;
pub mod toml_config;

use crate::domain::model::CustomRegion;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::{default_regions, parse_years};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "country-days"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Turn a location history export into a per-day country timeline")
)]
pub struct CliConfig {
    #[cfg_attr(
        feature = "cli",
        arg(short, long, help = "Comma-separated list of years or ranges (e.g. '2014,2016-2018')")
    )]
    pub years: String,

    #[cfg_attr(feature = "cli", arg(short, long, default_value = "Timeline.json"))]
    pub input: String,

    #[cfg_attr(feature = "cli", arg(short, long, default_value = "output.json"))]
    pub output: String,

    #[cfg_attr(
        feature = "cli",
        arg(short, long, help = "Country to keep when a day is ambiguous")
    )]
    pub preferred_country: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(short, long, default_value = "boundaries.json", help = "GeoJSON country borders")
    )]
    pub boundaries: String,

    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ',', default_value = "json"))]
    pub formats: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Also write the summary as JSON to this file"))]
    pub summary: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Treat this date (YYYY-MM-DD) as today when trimming future days")
    )]
    pub as_of: Option<NaiveDate>,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn years(&self) -> &str {
        &self.years
    }

    fn preferred_country(&self) -> Option<&str> {
        self.preferred_country.as_deref()
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn boundaries_path(&self) -> &str {
        &self.boundaries
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn summary_path(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    fn custom_regions(&self) -> Vec<CustomRegion> {
        default_regions()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    // 年份格式錯誤要在讀檔之前就擋下
    parse_years(config.years())?;

    validation::validate_path("input", config.input_path())?;
    validation::validate_file_extension("input", config.input_path(), &["json"])?;
    validation::validate_path("output", config.output_path())?;
    validation::validate_path("boundaries", config.boundaries_path())?;
    validation::validate_output_formats("formats", config.output_formats())?;

    if let Some(summary) = config.summary_path() {
        validation::validate_path("summary", summary)?;
    }
    if let Some(country) = config.preferred_country() {
        validation::validate_non_empty_string("preferred_country", country)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TimelineError;

    fn cli_config(years: &str) -> CliConfig {
        CliConfig {
            years: years.to_string(),
            input: "Timeline.json".to_string(),
            output: "output.json".to_string(),
            preferred_country: None,
            boundaries: "boundaries.json".to_string(),
            formats: vec!["json".to_string()],
            summary: None,
            as_of: None,
            verbose: false,
            json_logs: false,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(cli_config("2014,2016-2018").validate().is_ok());
    }

    #[test]
    fn test_bad_years_fail_validation() {
        assert!(matches!(
            cli_config("2018-2016").validate(),
            Err(TimelineError::InvalidYearRange { .. })
        ));
    }

    #[test]
    fn test_blank_preferred_country_fails_validation() {
        let mut config = cli_config("2020");
        config.preferred_country = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_fails_validation() {
        let mut config = cli_config("2020");
        config.formats = vec!["xml".to_string()];
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_command_line() {
        let config = CliConfig::try_parse_from([
            "country-days",
            "-y",
            "2019-2020",
            "-p",
            "Spain",
            "--formats",
            "json,csv",
            "--as-of",
            "2020-06-30",
        ])
        .unwrap();

        assert_eq!(config.years, "2019-2020");
        assert_eq!(config.input, "Timeline.json");
        assert_eq!(config.preferred_country.as_deref(), Some("Spain"));
        assert_eq!(config.formats, vec!["json", "csv"]);
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2020, 6, 30));
    }
}
