use std::path::PathBuf;

/// The error taxonomy shared by all three pipeline stages.
///
/// Every fallible operation in this crate returns one of these four kinds;
/// binaries wrap them in `anyhow` at the `main` boundary so the full context
/// chain (file paths, offending tokens) reaches stderr.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// `std::io::Error` with no associated path (stdin/stdout, or a path already
/// folded into the message) still needs a conversion for the `?` operator.
impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            path: PathBuf::from("<stream>"),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
