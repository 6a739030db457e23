//! Book repository contract shared by every backend.
//!
//! # Responsibility
//! - Define the capability set the facade delegates to.
//! - Translate backend-specific failures into one typed error.
//!
//! # Invariants
//! - Lookups compare identifiers by exact string equality.
//! - `save` and `delete` never create rows; an unknown id is `NotFound`.

use crate::config::BackendKind;
use crate::db::DbError;
use crate::filter::PriceFilter;
use crate::model::book::{Book, BookId, Books};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and lookups.
#[derive(Debug)]
pub enum RepoError {
    /// Snapshot path resolution, read or write failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Snapshot content is not a valid catalog document.
    Codec {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Relational backend failure.
    Db(DbError),
    NotFound(BookId),
    /// Operation the active backend does not provide.
    NotImplemented(&'static str),
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "catalog file `{}`: {source}", path.display())
            }
            Self::Codec { path, source } => {
                write!(f, "invalid catalog document `{}`: {source}", path.display())
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "can't find the book with id `{id}`"),
            Self::NotImplemented(operation) => {
                write!(f, "{operation} is not implemented for this backend")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::NotImplemented(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for catalog persistence.
pub trait BookRepository {
    /// Which persistence strategy this repository implements.
    fn backend(&self) -> BackendKind;

    fn find_all(&self) -> RepoResult<Books>;

    /// Returns `NotFound` when no book has `id`.
    fn find_by_id(&self, id: &str) -> RepoResult<Book>;

    fn create(&self, book: &Book) -> RepoResult<()>;

    /// Replaces the stored record carrying `book.id`.
    fn save(&self, book: &Book) -> RepoResult<()>;

    /// Removes the stored record carrying `book.id`.
    fn delete(&self, book: &Book) -> RepoResult<()>;

    /// Whether `filter_by_price` is available on this backend.
    fn supports_price_filter(&self) -> bool {
        true
    }

    /// Scans the whole catalog, keeping collection order.
    fn filter_by_price(&self, filter: &PriceFilter) -> RepoResult<Books> {
        Ok(filter.apply(self.find_all()?))
    }

    /// Releases any connection held between calls.
    fn close(&self) -> RepoResult<()> {
        Ok(())
    }
}
