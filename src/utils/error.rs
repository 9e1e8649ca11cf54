use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkingError {
    #[error("No free slot of class {class} is available")]
    ResourceExhausted { class: u32 },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Capacity,
    Caller,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ParkingError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ResourceExhausted { .. } => ErrorCategory::Capacity,
            Self::InvalidArgument { .. } | Self::InvalidState { .. } => ErrorCategory::Caller,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 嚴重程度決定 CLI 的退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Capacity => ErrorSeverity::Medium,
            ErrorCategory::Caller | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Only capacity shortages go away on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ResourceExhausted { .. } => {
                "Wait for a vehicle of the same class to leave, then try again"
            }
            Self::InvalidArgument { .. } => {
                "Only release tickets issued by this facility, and release each ticket once"
            }
            Self::InvalidState { .. } => "Release the ticket before asking for its fare",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "Report this as a bug together with the input file",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the facility configuration file and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ResourceExhausted { class } => {
                format!("The facility is full for vehicles of size {}", class)
            }
            Self::InvalidArgument { reason } => format!("Ticket rejected: {}", reason),
            Self::InvalidState { reason } => format!("Fare not available: {}", reason),
            Self::IoError(e) => format!("Could not read input: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParkingError>;
