use bookshelf_core::db::schema::books_table_exists;
use bookshelf_core::db::{open_db, open_db_in_memory, DbError};
use bookshelf_core::{
    BackendKind, Book, BookPatch, BookRepository, Books, Library, LibraryConfig, LibraryError,
    NewBook, RepoError, RepoResult, SqliteBookRepository,
};
use std::sync::Arc;
use tempfile::TempDir;

fn sqlite_library(dir: &TempDir) -> Library {
    Library::open(&LibraryConfig::sqlite(dir.path().join("books.db"))).unwrap()
}

#[test]
fn open_db_creates_books_table() {
    let conn = open_db_in_memory().unwrap();
    assert!(books_table_exists(&conn).unwrap());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");
    drop(open_db(&path).unwrap());
    let reopened = open_db(&path).unwrap();
    assert!(books_table_exists(&reopened).unwrap());
}

#[test]
fn create_get_change_remove_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);
    assert_eq!(library.backend_kind(), BackendKind::Sqlite);

    let id = library
        .create_book(NewBook::new("Dune", 412, 9.99, ["scifi", "classic"]))
        .unwrap();
    let loaded = library.get_book(&id).unwrap();
    assert_eq!(loaded.title, "Dune");
    assert_eq!(loaded.genres, vec!["scifi", "classic"]);

    library.change_book(&id, &BookPatch::price(15.0)).unwrap();
    let changed = library.get_book(&id).unwrap();
    assert_eq!(changed.price, 15.0);
    assert_eq!(changed.title, "Dune");
    assert_eq!(changed.pages, 412);
    assert_eq!(changed.genres, loaded.genres);

    library.remove_book(&id).unwrap();
    assert!(library.get_books().unwrap().is_empty());
    assert!(matches!(
        library.get_book(&id),
        Err(LibraryError::NotFound(missing)) if missing == id
    ));
}

#[test]
fn patch_with_zero_fields_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);
    let id = library
        .create_book(NewBook::new("Hyperion", 482, 12.5, ["scifi"]))
        .unwrap();
    let before = library.get_book(&id).unwrap();

    let patch = BookPatch {
        title: Some(String::new()),
        pages: Some(0),
        price: None,
        genres: Some(Vec::new()),
    };
    library.change_book(&id, &patch).unwrap();

    assert_eq!(library.get_book(&id).unwrap(), before);
}

#[test]
fn validation_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);

    let err = library
        .create_book(NewBook::new("", 10, 1.0, ["x"]))
        .unwrap_err();
    assert!(matches!(err, LibraryError::Validation(_)));
    assert!(library.get_books().unwrap().is_empty());
}

#[test]
fn unknown_ids_return_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);
    library
        .create_book(NewBook::new("Dune", 412, 9.99, ["scifi"]))
        .unwrap();

    assert!(matches!(
        library.remove_book("missing"),
        Err(LibraryError::NotFound(_))
    ));
    assert!(matches!(
        library.change_book("missing", &BookPatch::price(1.0)),
        Err(LibraryError::NotFound(_))
    ));
    assert_eq!(library.get_books().unwrap().len(), 1);
}

#[test]
fn books_are_listed_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);
    let ids: Vec<String> = ["c", "a", "b"]
        .into_iter()
        .map(|title| {
            library
                .create_book(NewBook::new(title, 1, 1.0, ["g"]))
                .unwrap()
        })
        .collect();

    let listed: Vec<String> = library
        .get_books()
        .unwrap()
        .into_iter()
        .map(|book| book.id)
        .collect();
    assert_eq!(listed, ids);
}

#[test]
fn price_filter_is_not_implemented_for_any_expression() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);

    for expr in [">10", "=5", "abc", ""] {
        assert!(
            matches!(
                library.price_filter(expr),
                Err(LibraryError::NotImplemented(_))
            ),
            "`{expr}` should be rejected by the backend"
        );
    }
}

#[test]
fn invalid_patch_values_are_rejected_before_reaching_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let library = sqlite_library(&dir);
    let id = library
        .create_book(NewBook::new("Dune", 412, 9.99, ["scifi"]))
        .unwrap();
    let before = library.get_book(&id).unwrap();

    for patch in [
        BookPatch::price(f64::NAN),
        BookPatch::price(f64::INFINITY),
        BookPatch::price(-5.0),
        BookPatch::title("   "),
    ] {
        let err = library.change_book(&id, &patch).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)), "{patch:?}: {err}");
    }

    assert_eq!(library.get_book(&id).unwrap(), before);
}

/// Lets a test keep a handle on the repository the facade owns.
struct SharedRepository(Arc<SqliteBookRepository>);

impl BookRepository for SharedRepository {
    fn backend(&self) -> BackendKind {
        self.0.backend()
    }

    fn find_all(&self) -> RepoResult<Books> {
        self.0.find_all()
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Book> {
        self.0.find_by_id(id)
    }

    fn create(&self, book: &Book) -> RepoResult<()> {
        self.0.create(book)
    }

    fn save(&self, book: &Book) -> RepoResult<()> {
        self.0.save(book)
    }

    fn delete(&self, book: &Book) -> RepoResult<()> {
        self.0.delete(book)
    }

    fn supports_price_filter(&self) -> bool {
        self.0.supports_price_filter()
    }

    fn close(&self) -> RepoResult<()> {
        self.0.close()
    }
}

#[test]
fn repository_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteBookRepository::new(dir.path().join("books.db"));

    repo.find_all().unwrap();
    assert!(repo.is_connected());
    repo.close().unwrap();
    assert!(!repo.is_connected());
    repo.close().unwrap();
}

#[test]
fn facade_releases_connection_after_each_call() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(SqliteBookRepository::new(dir.path().join("books.db")));
    let library = Library::with_repository(SharedRepository(Arc::clone(&repo)));

    let id = library
        .create_book(NewBook::new("Dune", 412, 9.99, ["scifi"]))
        .unwrap();
    assert!(!repo.is_connected(), "connection held after create_book");

    assert!(library.get_book("missing").is_err());
    assert!(!repo.is_connected(), "connection held after failed get_book");

    library.change_book(&id, &BookPatch::price(15.0)).unwrap();
    assert!(!repo.is_connected(), "connection held after change_book");

    library.get_books().unwrap();
    assert!(!repo.is_connected(), "connection held after get_books");

    library.remove_book(&id).unwrap();
    assert!(!repo.is_connected(), "connection held after remove_book");

    assert!(library.remove_book(&id).is_err());
    assert!(!repo.is_connected(), "connection held after failed remove_book");
}

#[test]
fn corrupt_genres_column_is_a_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");
    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO books (id, title, pages, price, genres)
         VALUES ('bad', 'Broken', 10, 1.0, 'not json');",
        [],
    )
    .unwrap();
    drop(conn);

    let library = Library::open(&LibraryConfig::sqlite(&path)).unwrap();
    let err = library.get_book("bad").unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Repo(RepoError::Db(DbError::InvalidRow(_)))
    ));
}
