//! Facade construction options.
//!
//! Loading these values from files or the environment is left to the
//! embedding application; the structs only derive serde so it can.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Persistence strategy used for every call of one `Library`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Whole-document JSON snapshot.
    #[default]
    File,
    /// SQLite database.
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// JSON snapshot path or SQLite database path, depending on `backend`.
    pub storage_path: PathBuf,
    #[serde(default)]
    pub backend: BackendKind,
    /// File backend only: write an empty catalog when the path is missing.
    #[serde(default)]
    pub create_if_missing: bool,
}

impl LibraryConfig {
    pub fn file(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            backend: BackendKind::File,
            create_if_missing: false,
        }
    }

    pub fn sqlite(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            backend: BackendKind::Sqlite,
            create_if_missing: false,
        }
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}
