use thiserror::Error;

/// Errors that can occur while collecting and interpreting dataset counters
#[derive(Debug, Error)]
pub enum ZfsError {
    /// The host OS has no counter source implementation
    #[error("Unsupported platform: {os} has no ZFS dataset counter source")]
    UnsupportedPlatform { os: String },

    /// Pool-level fetch failure (pool absent, counter interface unreachable)
    #[error("Failed to collect counters for pool '{pool}': {reason}")]
    Collection { pool: String, reason: String },

    /// Command execution failed
    #[error("Command failed: {command} {args:?}")]
    CommandError {
        command: String,
        args: Vec<String>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File system operation failed
    #[error("Filesystem {operation} failed for path: {path}")]
    FilesystemError {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Timeout occurred during operation
    #[error("{operation} timed out after {timeout:?}")]
    TimeoutError {
        operation: String,
        timeout: std::time::Duration,
    },

    /// A requested dataset name does not start with a pool
    #[error("Invalid dataset name '{name}': missing pool name")]
    InvalidDataset { name: String },

    /// A requested dataset name could not be compiled into a matcher
    #[error("Invalid dataset pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ZfsError {
    /// Create an unsupported platform error
    pub fn unsupported_platform(os: &str) -> Self {
        ZfsError::UnsupportedPlatform { os: os.to_string() }
    }

    /// Create an invalid dataset name error
    pub fn invalid_dataset(name: &str) -> Self {
        ZfsError::InvalidDataset {
            name: name.to_string(),
        }
    }

    /// Create a pool-level collection error
    pub fn collection(pool: &str, reason: &str) -> Self {
        ZfsError::Collection {
            pool: pool.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a command error
    pub fn command_error(command: &str, args: &[&str], message: &str) -> Self {
        ZfsError::CommandError {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            source: message.to_string().into(),
        }
    }

    /// Create a filesystem error
    pub fn filesystem_error(
        path: &str,
        operation: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ZfsError::FilesystemError {
            path: path.to_string(),
            operation: operation.to_string(),
            source: source.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout_error(operation: &str, timeout: std::time::Duration) -> Self {
        ZfsError::TimeoutError {
            operation: operation.to_string(),
            timeout,
        }
    }
}

/// Result type alias for ZFS operations
pub type ZfsResult<T> = Result<T, ZfsError>;
