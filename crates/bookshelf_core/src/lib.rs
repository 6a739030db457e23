//! Book catalog storage core.
//! One facade (`Library`) over a JSON snapshot file or a SQLite database.

pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BackendKind, LibraryConfig};
pub use filter::{Comparator, FilterParseError, PriceFilter};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{Book, BookId, BookPatch, BookValidationError, Books, NewBook};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult};
pub use repo::file_repo::JsonFileBookRepository;
pub use repo::sqlite_repo::SqliteBookRepository;
pub use service::library::{Library, LibraryError, LibraryResult};
