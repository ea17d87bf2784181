use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the uploader pipeline.
///
/// `Authentication` is always fatal. `Parse` and `Connection` are fatal
/// for a course listing but only fail a single level when they occur while
/// fetching that level's words. `Synthesis` and `Upload` fail one word.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("connection to Memrise failed: {0}")]
    Connection(String),

    #[error("unexpected response from Memrise: {0}")]
    Parse(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio upload failed: {0}")]
    Upload(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Errors after which the run cannot continue at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::Config(_))
    }

    /// Short label used in summaries and structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Authentication(_) => "authentication",
            Error::Connection(_) => "connection",
            Error::Parse(_) => "parse",
            Error::Synthesis(_) => "synthesis",
            Error::Upload(_) => "upload",
            Error::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(Error::Authentication("403".into()).is_fatal());
        assert!(!Error::Parse("no table".into()).is_fatal());
        assert!(!Error::Upload("500".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let e = Error::Synthesis("quota exceeded".into());
        assert_eq!(e.to_string(), "speech synthesis failed: quota exceeded");
        assert_eq!(e.kind(), "synthesis");
    }
}
