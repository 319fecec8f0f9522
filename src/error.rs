use thiserror::Error;

/// Main error type for the recovery tool
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Memory mapping error: {0}")]
    Mmap(String),

    #[error("known plaintext too short: {len} bytes, the exact attack needs at least {required}")]
    InsufficientPlaintext { len: usize, required: usize },

    #[error("no alignment found: exhausted {offsets_tried} candidate offsets without a witness match")]
    KeyNotFound { offsets_tried: usize },

    #[error("no files loaded from corpus folder: {folder}")]
    EmptyCorpus { folder: String },

    #[error("no keyword list for language tag: {0}")]
    UnknownLanguage(String),

    #[error("keyword worker failed on {keyword:?}: {reason}")]
    WorkerFailure { keyword: String, reason: String },

    #[error("container format error in {file}: {reason}")]
    Container { file: String, reason: String },

    #[error("malformed key file {file}: {reason}")]
    KeyFormat { file: String, reason: String },
}

/// Result type alias for recovery operations
pub type Result<T> = std::result::Result<T, RecoveryError>;
