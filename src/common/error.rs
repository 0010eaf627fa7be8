use std::fmt;

#[derive(Debug)]
pub enum Error {
    Gpu(String),
    UnsupportedFormat(String),
    InvalidConfig(String),
    Mismatch {
        x: u32,
        y: u32,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Gpu(msg) => write!(f, "GPU error: {}", msg),
            Error::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Mismatch {
                x,
                y,
                expected,
                actual,
            } => write!(
                f,
                "pixel mismatch at ({}, {}): expected {} != actual {}",
                x, y, expected, actual
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
