use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("XML parsing error: {message}")]
    XmlError { message: String },

    #[error("Failed to fetch page for {accession}: {message}")]
    FetchError { accession: String, message: String },

    #[error("Malformed population diversity table: {field_count} fields do not split into rows of {expected_width}")]
    MalformedTableError {
        expected_width: usize,
        field_count: usize,
    },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::FetchError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::XmlError { .. } => ErrorCategory::Parsing,
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::DatabaseError(_) => {
                ErrorCategory::Storage
            }
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::MalformedTableError { .. } | EtlError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity and the API endpoint, then retry",
            EtlError::FetchError { .. } => {
                "Check that the accession names an existing page on the wiki"
            }
            EtlError::XmlError { .. } => "The export returned by the API could not be read; retry later",
            EtlError::MalformedTableError { .. } => {
                "Run without strict tables to accept truncated diversity rows"
            }
            EtlError::DatabaseError(_) => {
                "Check that the database file is writable and was created with the setup command"
            }
            EtlError::CsvError(_) => {
                "Genotype files must be tab-delimited: rsid, chromosome, position, genotype"
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check file permissions and available disk space"
            }
            EtlError::SerializationError(_) => "Unexpected response shape from the API",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Review the configuration file or command-line flags",
            EtlError::ProcessingError { .. } => "Inspect the input data for unexpected values",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) => "Could not reach the annotation wiki".to_string(),
            EtlError::FetchError { accession, .. } => {
                format!("No usable page was returned for {}", accession)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            EtlError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
