use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure a comparison run can hit maps to exactly one kind. Kinds are
/// grouped the same way the run is: configuration, fetching, comparison.
/// Each kind has a stable `ERR_*` code used in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    MissingEnv,
    InvalidConfig,

    // Fetch (in-process client)
    Auth,
    Transport,
    NotFound,
    UpstreamStatus,
    RawDataUnavailable,

    // Fetch (external process)
    ExternalProcess,
    EmptyOutput,
    InvalidPayload,
    Io,

    // Comparison
    Mismatch,

    // Run control
    Cancelled,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MissingEnv => "ERR_MISSING_ENV",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Auth => "ERR_AUTH",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UpstreamStatus => "ERR_UPSTREAM_STATUS",
            ExErrorKind::RawDataUnavailable => "ERR_RAW_DATA_UNAVAILABLE",
            ExErrorKind::ExternalProcess => "ERR_EXTERNAL_PROCESS",
            ExErrorKind::EmptyOutput => "ERR_EMPTY_OUTPUT",
            ExErrorKind::InvalidPayload => "ERR_INVALID_PAYLOAD",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Mismatch => "ERR_MISMATCH",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for the kinds raised while resolving configuration
    pub fn is_config(&self) -> bool {
        matches!(self, ExErrorKind::MissingEnv | ExErrorKind::InvalidConfig)
    }

    /// True for the kinds raised while fetching either payload
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Auth
                | ExErrorKind::Transport
                | ExErrorKind::NotFound
                | ExErrorKind::UpstreamStatus
                | ExErrorKind::RawDataUnavailable
                | ExErrorKind::ExternalProcess
                | ExErrorKind::EmptyOutput
                | ExErrorKind::InvalidPayload
                | ExErrorKind::Io
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus enough context (operation, subject, captured
/// process output) to print a useful message at the CLI boundary.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    subject: Option<String>,
    message: String,
    detail: Option<String>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            subject: None,
            message: String::new(),
            detail: None,
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the thing the error is about (env var name, clan tag, file path)
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach verbatim output (captured stderr, unparseable stdout)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the subject, if any
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the verbatim detail, if any
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}]", self.code())?;
        } else {
            write!(f, "[{}] {}", self.code(), self.message)?;
        }
        if let Some(op) = &self.op {
            write!(f, " (op: {})", op)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised while resolving run configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required environment variable is unset or blank
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: String },

    /// A `.env` file exists but could not be read
    #[error("Failed to load .env file: {message}")]
    DotEnv { message: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::MissingEnv { name } => ExError::new(ExErrorKind::MissingEnv)
                .with_op("resolve_config")
                .with_subject(name)
                .with_message(message),
            ConfigError::DotEnv { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("load_dotenv")
                .with_message(message),
        }
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}
