//! SQLite book repository.
//!
//! # Responsibility
//! - Provide the relational backend behind `BookRepository`.
//! - Keep SQL details and row decoding inside this module.
//!
//! # Invariants
//! - A connection is opened lazily and held only until `close()`.
//! - Each statement is atomic on its own; multi-statement facade operations
//!   are not wrapped in a transaction.
//! - Price filtering is not provided here.

use crate::config::BackendKind;
use crate::db::{open_db, DbError};
use crate::filter::PriceFilter;
use crate::model::book::{Book, Books};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    pages,
    price,
    genres
FROM books";

/// SQLite-backed book repository.
pub struct SqliteBookRepository {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteBookRepository {
    /// Records the database path; nothing is opened until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = match guard.take() {
            Some(conn) => conn,
            None => open_db(&self.path)?,
        };
        f(guard.insert(conn))
    }
}

impl BookRepository for SqliteBookRepository {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn find_all(&self) -> RepoResult<Books> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY rowid ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut books = Vec::new();
            while let Some(row) = rows.next()? {
                books.push(parse_book_row(row)?);
            }
            Ok(books)
        })
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Book> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
            let row = stmt
                .query_row([id], |row| Ok(parse_book_row(row)))
                .optional()?;
            match row {
                Some(book) => Ok(book?),
                None => Err(RepoError::NotFound(id.to_string())),
            }
        })
    }

    fn create(&self, book: &Book) -> RepoResult<()> {
        let genres = encode_genres(book)?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO books (id, title, pages, price, genres)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![book.id, book.title, book.pages, book.price, genres],
            )?;
            Ok(())
        })
    }

    fn save(&self, book: &Book) -> RepoResult<()> {
        let genres = encode_genres(book)?;
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE books
                 SET
                    title = ?1,
                    pages = ?2,
                    price = ?3,
                    genres = ?4
                 WHERE id = ?5;",
                params![book.title, book.pages, book.price, genres, book.id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(book.id.clone()));
            }
            Ok(())
        })
    }

    fn delete(&self, book: &Book) -> RepoResult<()> {
        self.with_connection(|conn| {
            let changed = conn.execute("DELETE FROM books WHERE id = ?1;", [&book.id])?;
            if changed == 0 {
                return Err(RepoError::NotFound(book.id.clone()));
            }
            Ok(())
        })
    }

    fn supports_price_filter(&self) -> bool {
        false
    }

    fn filter_by_price(&self, _filter: &PriceFilter) -> RepoResult<Books> {
        Err(RepoError::NotImplemented("price filter"))
    }

    fn close(&self) -> RepoResult<()> {
        let taken = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(conn) = taken {
            conn.close().map_err(|(_, err)| RepoError::from(err))?;
            debug!("event=db_close module=repo status=ok");
        }
        Ok(())
    }
}

fn encode_genres(book: &Book) -> RepoResult<String> {
    serde_json::to_string(&book.genres).map_err(|err| {
        RepoError::Db(DbError::InvalidRow(format!(
            "cannot encode genres for book `{}`: {err}",
            book.id
        )))
    })
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: String = row.get("id")?;

    let pages_raw: i64 = row.get("pages")?;
    let pages = u32::try_from(pages_raw).map_err(|_| {
        DbError::InvalidRow(format!("invalid pages value `{pages_raw}` for book `{id}`"))
    })?;

    let genres_text: String = row.get("genres")?;
    let genres: Vec<String> = serde_json::from_str(&genres_text).map_err(|err| {
        DbError::InvalidRow(format!("invalid genres `{genres_text}` for book `{id}`: {err}"))
    })?;

    Ok(Book {
        title: row.get("title")?,
        pages,
        price: row.get("price")?,
        genres,
        id,
    })
}
