use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidData(String),
    InvalidConfig(String),
    InvalidShape(String),
    /// No reveal mask with both a hidden hit and a hidden miss could be drawn.
    NoValidMask { attempts: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Error::NoValidMask { attempts } => write!(
                f,
                "no valid mask: no hidden hit and hidden miss after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for Error {}
