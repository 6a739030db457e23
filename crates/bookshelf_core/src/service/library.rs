//! Catalog facade.
//!
//! # Responsibility
//! - Provide the public CRUD and price-filter entry points.
//! - Validate candidates, assign identifiers and merge partial updates.
//! - Delegate persistence to the repository chosen at construction.
//!
//! # Invariants
//! - Invalid candidates are rejected before an id is assigned or storage is
//!   touched.
//! - `change_book` never alters the identifier.
//! - Patches are validated before the target is looked up.
//! - Filter expressions are parsed before any collection scan, after the
//!   backend is confirmed to support filtering.
//! - The repository is closed after every call, whatever the outcome.

use crate::config::{BackendKind, LibraryConfig};
use crate::filter::{FilterParseError, PriceFilter};
use crate::model::book::{Book, BookId, BookPatch, BookValidationError, Books, NewBook};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use crate::repo::file_repo::JsonFileBookRepository;
use crate::repo::sqlite_repo::SqliteBookRepository;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Facade-level error taxonomy.
#[derive(Debug)]
pub enum LibraryError {
    /// Creation candidate or patch carries a missing or invalid field.
    Validation(BookValidationError),
    NotFound(BookId),
    FilterParse(FilterParseError),
    /// The active backend does not provide the requested operation.
    NotImplemented(&'static str),
    /// File I/O, document decoding or relational backend failure.
    Repo(RepoError),
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "not all fields are populated: {err}"),
            Self::NotFound(id) => write!(f, "can't find the book with id `{id}`"),
            Self::FilterParse(err) => write!(f, "{err}"),
            Self::NotImplemented(operation) => {
                write!(f, "{operation} is not implemented for this backend")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::FilterParse(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::NotImplemented(_) => None,
        }
    }
}

impl From<BookValidationError> for LibraryError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FilterParseError> for LibraryError {
    fn from(value: FilterParseError) -> Self {
        Self::FilterParse(value)
    }
}

impl From<RepoError> for LibraryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::NotImplemented(operation) => Self::NotImplemented(operation),
            other => Self::Repo(other),
        }
    }
}

/// Book catalog bound to one backend for its whole lifetime.
pub struct Library {
    repo: Box<dyn BookRepository + Send + Sync>,
}

impl Library {
    /// Builds the backend described by `config`.
    ///
    /// # Errors
    /// - File backend: the path cannot be made absolute, or
    ///   `create_if_missing` fails to write the empty catalog.
    pub fn open(config: &LibraryConfig) -> LibraryResult<Self> {
        let library = match config.backend {
            BackendKind::File if config.create_if_missing => Self::with_repository(
                JsonFileBookRepository::create_if_missing(&config.storage_path)?,
            ),
            BackendKind::File => {
                Self::with_repository(JsonFileBookRepository::new(&config.storage_path)?)
            }
            BackendKind::Sqlite => {
                Self::with_repository(SqliteBookRepository::new(&config.storage_path))
            }
        };
        info!(
            "event=library_open module=service status=ok backend={} path={}",
            config.backend,
            config.storage_path.display()
        );
        Ok(library)
    }

    /// Wraps an already constructed repository.
    pub fn with_repository(repo: impl BookRepository + Send + Sync + 'static) -> Self {
        Self {
            repo: Box::new(repo),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.repo.backend()
    }

    /// Returns the complete current catalog.
    pub fn get_books(&self) -> LibraryResult<Books> {
        let books = self.finish(self.repo.find_all())?;
        debug!(
            "event=books_list module=service status=ok backend={} count={}",
            self.backend_kind(),
            books.len()
        );
        Ok(books)
    }

    /// Validates `candidate`, assigns a new id and stores it.
    ///
    /// Returns the assigned id.
    pub fn create_book(&self, candidate: NewBook) -> LibraryResult<BookId> {
        let book = candidate.into_book()?;
        self.finish(self.repo.create(&book))?;
        info!(
            "event=book_create module=service status=ok backend={} id={}",
            self.backend_kind(),
            book.id
        );
        Ok(book.id)
    }

    pub fn get_book(&self, id: &str) -> LibraryResult<Book> {
        self.finish(self.repo.find_by_id(id))
    }

    /// Removes exactly the book carrying `id`.
    pub fn remove_book(&self, id: &str) -> LibraryResult<()> {
        let result = self
            .repo
            .find_by_id(id)
            .and_then(|book| self.repo.delete(&book));
        self.finish(result)?;
        info!(
            "event=book_remove module=service status=ok backend={} id={id}",
            self.backend_kind()
        );
        Ok(())
    }

    /// Merges `patch` into the book carrying `id`.
    ///
    /// Absent, zero and empty patch fields leave the stored value untouched.
    /// Supplied values must satisfy the same rules as creation.
    pub fn change_book(&self, id: &str, patch: &BookPatch) -> LibraryResult<()> {
        patch.validate()?;
        let result = self.repo.find_by_id(id).and_then(|mut book| {
            book.apply_patch(patch);
            self.repo.save(&book)
        });
        self.finish(result)?;
        info!(
            "event=book_change module=service status=ok backend={} id={id}",
            self.backend_kind()
        );
        Ok(())
    }

    /// Returns books whose price satisfies `expr`, in catalog order.
    ///
    /// # Errors
    /// - `NotImplemented` on the SQLite backend, before `expr` is looked at.
    /// - `FilterParse` for malformed expressions, before storage is read.
    pub fn price_filter(&self, expr: &str) -> LibraryResult<Books> {
        if !self.repo.supports_price_filter() {
            return Err(LibraryError::NotImplemented("price filter"));
        }
        let filter = PriceFilter::parse(expr)?;
        let books = self.finish(self.repo.filter_by_price(&filter))?;
        debug!(
            "event=books_filter module=service status=ok backend={} filter={filter} count={}",
            self.backend_kind(),
            books.len()
        );
        Ok(books)
    }

    /// Releases any connection the backend holds.
    pub fn close(&self) -> LibraryResult<()> {
        self.repo.close().map_err(LibraryError::from)
    }

    /// Closes the repository and surfaces the operation error first.
    fn finish<T>(&self, result: RepoResult<T>) -> LibraryResult<T> {
        let closed = self.repo.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}
