//! JSON snapshot repository.
//!
//! # Responsibility
//! - Persist the whole catalog as one pretty-printed JSON document.
//! - Implement every mutation as load, mutate in memory, save.
//!
//! # Invariants
//! - Collection order is insertion order and survives save/reload.
//! - A save replaces the file through a same-directory temp file and rename,
//!   so readers see either the old or the new document.
//! - There is no locking: concurrent writers race and the last save wins.

use crate::config::BackendKind;
use crate::model::book::{Book, Books};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";
const TEMP_PREFIX: &str = ".bookshelf-";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed book repository.
#[derive(Debug, Clone)]
pub struct JsonFileBookRepository {
    path: PathBuf,
}

impl JsonFileBookRepository {
    /// Resolves `path` to an absolute path once; the file is not touched.
    pub fn new(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path).map_err(RepoError::io(path))?;
        Ok(Self { path })
    }

    /// Like `new`, but writes an empty catalog when the file does not exist.
    pub fn create_if_missing(path: impl AsRef<Path>) -> RepoResult<Self> {
        let repo = Self::new(path)?;
        let exists = repo
            .path
            .try_exists()
            .map_err(RepoError::io(&repo.path))?;
        if !exists {
            repo.save_all(&[])?;
        }
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the complete catalog.
    ///
    /// A `null` document is read as an empty catalog.
    pub fn load(&self) -> RepoResult<Books> {
        let bytes = fs::read(&self.path).map_err(RepoError::io(&self.path))?;
        let books: Option<Books> =
            serde_json::from_slice(&bytes).map_err(|source| RepoError::Codec {
                path: self.path.clone(),
                source,
            })?;
        Ok(books.unwrap_or_default())
    }

    /// Serializes `books` and replaces the file in full.
    pub fn save_all(&self, books: &[Book]) -> RepoResult<()> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        books
            .serialize(&mut serializer)
            .map_err(|source| RepoError::Codec {
                path: self.path.clone(),
                source,
            })?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(RepoError::io(dir))?;
        temp.write_all(&buffer)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(RepoError::io(temp.path()))?;
        set_catalog_permissions(temp.as_file()).map_err(RepoError::io(temp.path()))?;
        temp.persist(&self.path)
            .map_err(|err| RepoError::io(&self.path)(err.error))?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_catalog_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_catalog_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Linear scan for the position of `id`.
///
/// Ids are unique, so the first match is the only one.
pub fn wanted_index(id: &str, books: &[Book]) -> RepoResult<usize> {
    books
        .iter()
        .position(|book| book.id == id)
        .ok_or_else(|| RepoError::NotFound(id.to_string()))
}

impl BookRepository for JsonFileBookRepository {
    fn backend(&self) -> BackendKind {
        BackendKind::File
    }

    fn find_all(&self) -> RepoResult<Books> {
        self.load()
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Book> {
        let mut books = self.load()?;
        let index = wanted_index(id, &books)?;
        Ok(books.swap_remove(index))
    }

    fn create(&self, book: &Book) -> RepoResult<()> {
        let mut books = self.load()?;
        books.push(book.clone());
        self.save_all(&books)
    }

    fn save(&self, book: &Book) -> RepoResult<()> {
        let mut books = self.load()?;
        let index = wanted_index(&book.id, &books)?;
        books[index] = book.clone();
        self.save_all(&books)
    }

    fn delete(&self, book: &Book) -> RepoResult<()> {
        let mut books = self.load()?;
        let index = wanted_index(&book.id, &books)?;
        books.remove(index);
        self.save_all(&books)
    }
}

#[cfg(test)]
mod tests {
    use super::{wanted_index, JsonFileBookRepository};
    use crate::model::book::{Book, NewBook};
    use crate::repo::book_repo::RepoError;

    fn sample(title: &str, price: f64) -> Book {
        NewBook::new(title, 100, price, ["fiction"])
            .into_book()
            .unwrap()
    }

    #[test]
    fn wanted_index_finds_first_match() {
        let books = vec![sample("a", 1.0), sample("b", 2.0)];
        assert_eq!(wanted_index(&books[1].id, &books).unwrap(), 1);
        assert!(matches!(
            wanted_index("missing", &books),
            Err(RepoError::NotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn saved_document_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileBookRepository::new(dir.path().join("books.json")).unwrap();
        let book = Book {
            id: "id-1".to_string(),
            title: "Dune".to_string(),
            pages: 412,
            price: 9.99,
            genres: vec!["scifi".to_string()],
        };
        repo.save_all(&[book]).unwrap();

        let text = std::fs::read_to_string(repo.path()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\": \"id-1\",\n"));
        assert!(text.contains("\"genres\": [\n            \"scifi\"\n        ]"));
    }

    #[test]
    fn null_document_reads_as_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, "null").unwrap();

        let repo = JsonFileBookRepository::new(&path).unwrap();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileBookRepository::new(dir.path().join("books.json")).unwrap();
        repo.save_all(&[sample("a", 1.0)]).unwrap();
        repo.save_all(&[sample("b", 2.0)]).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("books.json")]);
    }
}
