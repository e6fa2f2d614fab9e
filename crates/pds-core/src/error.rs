use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdsError {
    InvalidArgument(String),
}

impl PdsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PdsError::InvalidArgument(msg.into())
    }
}

impl fmt::Display for PdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdsError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for PdsError {}

pub type Result<T> = std::result::Result<T, PdsError>;
