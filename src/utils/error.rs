use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid year range '{expression}': {reason}")]
    InvalidYearRange { expression: String, reason: String },

    #[error("Malformed timeline input: {message}")]
    MalformedInput { message: String },

    #[error("Reverse geocoding failed: {message}")]
    GeocoderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Geocoding,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl TimelineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidYearRange { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::MalformedInput { .. } => ErrorCategory::Input,
            Self::GeocoderError { .. } => ErrorCategory::Geocoding,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Geocoding => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidYearRange { .. } => {
                "Use comma-separated years or inclusive ranges, e.g. '2014,2016-2018'"
            }
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::ConfigError { .. } => "Check the command line flags or the TOML config file",
            Self::SerializationError(_) | Self::MalformedInput { .. } => {
                "Make sure the input is an unmodified location history export (Timeline.json)"
            }
            Self::GeocoderError { .. } => {
                "Check that the boundaries file is a valid GeoJSON FeatureCollection"
            }
            Self::IoError(_) => "Check that the input exists and the output directory is writable",
            Self::CsvError(_) => "Retry without the csv output format",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the location history: {}", self),
            ErrorCategory::Geocoding => format!("Could not classify a location: {}", self),
            ErrorCategory::Output => format!("Could not read or write a file: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;
