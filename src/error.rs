// Error types for source opening, dialect validation and header/cell lookup.
//
// The scanner itself has no failure states; everything here is raised either
// by the outer collaborators or at the point of lookup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened or its size could not be read.
    #[error("can't open file, path: {}, error: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The input file was opened but could not be memory-mapped.
    #[error("can't mmap file, path: {}, error: {source}", path.display())]
    Mapping {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `index_of` did not find a header cell with this name.
    #[error("column does not exist: {0}")]
    ColumnNotFound(String),
    /// A row has fewer cells than the requested index.
    #[error("row has fewer cells than desired: index {index}, row has {count}")]
    FieldIndexOutOfRange { index: usize, count: usize },
    /// Header lookup on an input with no rows at all.
    #[error("input has no header row")]
    MissingHeader,
    #[error("invalid dialect: {0}")]
    InvalidDialect(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = Error::SourceOpen {
            path: PathBuf::from("inputs/non_existent.csv"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let msg = err.to_string();
        assert!(msg.contains("inputs/non_existent.csv"), "{msg}");

        let err = Error::FieldIndexOutOfRange { index: 4, count: 3 };
        assert_eq!(
            err.to_string(),
            "row has fewer cells than desired: index 4, row has 3"
        );

        assert_eq!(
            Error::ColumnNotFound("price".into()).to_string(),
            "column does not exist: price"
        );
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error as _;

        let err = Error::Mapping {
            path: PathBuf::from("x.csv"),
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }
}
