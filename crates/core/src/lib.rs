//! Core shared types and errors (loader-agnostic).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of a mesh load. A load either completes or fails as a
/// whole; callers can match on the variant to tell I/O problems apart
/// from malformed input.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line number in the offending file.
        line: usize,
        message: String,
    },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
