use thiserror::Error;

/// Everything that can go wrong in a check. Every variant is reported as
/// `[UNKNOWN]` with exit code 3; a monitoring poller must never see a
/// crash exit code or a silently wrong OK.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not implemented: {0}")]
    Unsupported(String),

    #[error("no supported package manager found on remote host")]
    NoPackageManager,

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;
