use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Transport error: {message}")]
    TransportError { message: String },

    #[error("Relay channel error: {message}")]
    ChannelError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("User not found: {username} on {platform}")]
    NotFound { platform: String, username: String },

    #[error("Username {username} is already tracked on {platform}")]
    DuplicateUsername { platform: String, username: String },

    #[error("Unknown platform: {name}")]
    UnknownPlatform { name: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Username store unavailable: {message}")]
    StoreUnavailable { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Relay,
    Data,
    Input,
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

impl ViewerError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::ChannelError {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportError { .. } | Self::ApiError(_) => ErrorCategory::Network,
            Self::ChannelError { .. } => ErrorCategory::Relay,
            Self::ParseError { .. } | Self::NotFound { .. } | Self::SerializationError(_) => {
                ErrorCategory::Data
            }
            Self::DuplicateUsername { .. }
            | Self::UnknownPlatform { .. }
            | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::StoreUnavailable { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Relay => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::TransportError { .. } | Self::ApiError(_) => {
                "Check your network connection and that the remote service is reachable"
            }
            Self::ChannelError { .. } => {
                "The fetch executor stopped responding; restart the command or raise relay.timeout_seconds"
            }
            Self::ParseError { .. } | Self::SerializationError(_) => {
                "The remote service returned an unexpected response shape; check the configured API URL"
            }
            Self::NotFound { .. } => "Check the spelling of the username",
            Self::DuplicateUsername { .. } => "The username is already in the list; nothing to do",
            Self::UnknownPlatform { .. } => "Use one of: github, leetcode, gfg",
            Self::ValidationError { .. } => "Provide a non-empty value",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file and try again",
            Self::IoError(_) => "Check that the storage directory exists and is writable",
            Self::StoreUnavailable { .. } => {
                "Repair or remove the saved usernames file (platforms.json) and try again"
            }
        }
    }

    /// The bare diagnostic shown inline next to a username, without the
    /// error-kind prefix of `Display`.
    pub fn detail(&self) -> String {
        match self {
            Self::TransportError { message }
            | Self::ChannelError { message }
            | Self::ParseError { message } => message.clone(),
            Self::NotFound { .. } => "User not found".to_string(),
            other => other.to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { platform, username } => {
                format!("No {} user named '{}' was found", platform, username)
            }
            Self::DuplicateUsername { platform, username } => {
                format!("'{}' is already saved for {}", username, platform)
            }
            Self::ChannelError { message } => format!("Could not reach the fetch executor: {}", message),
            Self::IoError(e) => format!("Storage failure: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
