//! Book domain model.
//!
//! # Responsibility
//! - Define the catalog record persisted by every backend.
//! - Provide creation candidates and partial-update patches.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes afterwards.
//! - A stored book has a non-empty title, `pages > 0`, `price > 0` and at
//!   least one genre.
//!
//! # See also
//! - `crate::service::library::Library::create_book`

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque catalog identifier.
///
/// Generated ids are v4 UUID strings, but persisted catalogs may carry any
/// non-empty text, so comparisons are plain string equality.
pub type BookId = String;

/// Ordered collection of books.
pub type Books = Vec<Book>;

/// Canonical catalog record.
///
/// Field order matches the persisted snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub pages: u32,
    pub price: f64,
    pub genres: Vec<String>,
}

impl Book {
    /// Builds a stored record from a validated candidate and its new id.
    fn from_candidate(id: BookId, candidate: NewBook) -> Self {
        Self {
            id,
            title: candidate.title,
            pages: candidate.pages,
            price: candidate.price,
            genres: candidate.genres,
        }
    }

    /// Overwrites every field the patch carries; the id is left untouched.
    ///
    /// Returns whether any field was applied.
    pub fn apply_patch(&mut self, patch: &BookPatch) -> bool {
        let mut changed = false;
        if let Some(price) = patch.price.filter(|price| *price != 0.0) {
            self.price = price;
            changed = true;
        }
        if let Some(title) = patch.title.as_ref().filter(|title| !title.is_empty()) {
            self.title = title.clone();
            changed = true;
        }
        if let Some(pages) = patch.pages.filter(|pages| *pages != 0) {
            self.pages = pages;
            changed = true;
        }
        if let Some(genres) = patch.genres.as_ref().filter(|genres| !genres.is_empty()) {
            self.genres = genres.clone();
            changed = true;
        }
        changed
    }
}

/// Creation candidate: a book without an identifier yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub pages: u32,
    pub price: f64,
    pub genres: Vec<String>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        pages: u32,
        price: f64,
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            pages,
            price,
            genres: genres.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks the "must be present" constraints in a fixed order:
    /// genres, pages, price, title.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.genres.is_empty() {
            return Err(BookValidationError::MissingGenres);
        }
        if self.pages == 0 {
            return Err(BookValidationError::MissingPages);
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(BookValidationError::InvalidPrice(self.price));
        }
        if self.title.trim().is_empty() {
            return Err(BookValidationError::MissingTitle);
        }
        Ok(())
    }

    /// Validates the candidate and assigns a fresh v4 identifier.
    pub fn into_book(self) -> Result<Book, BookValidationError> {
        self.validate()?;
        Ok(Book::from_candidate(Uuid::new_v4().to_string(), self))
    }
}

/// Partial update for an existing book.
///
/// `None`, zero and empty values all mean "leave the stored field as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub pages: Option<u32>,
    pub price: Option<f64>,
    pub genres: Option<Vec<String>>,
}

impl BookPatch {
    /// Checks the fields `apply_patch` would write against the creation rules.
    ///
    /// Skipped fields (`None`, zero, empty) are not checked.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if let Some(price) = self.price.filter(|price| *price != 0.0) {
            if !price.is_finite() || price < 0.0 {
                return Err(BookValidationError::InvalidPrice(price));
            }
        }
        if let Some(title) = self.title.as_ref().filter(|title| !title.is_empty()) {
            if title.trim().is_empty() {
                return Err(BookValidationError::MissingTitle);
            }
        }
        Ok(())
    }

    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Rejection reasons for creation candidates and patches.
#[derive(Debug, Clone, PartialEq)]
pub enum BookValidationError {
    MissingGenres,
    MissingPages,
    /// Zero, negative or non-finite price.
    InvalidPrice(f64),
    MissingTitle,
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGenres => write!(f, "book must have at least one genre"),
            Self::MissingPages => write!(f, "book page count must be greater than zero"),
            Self::InvalidPrice(price) => {
                write!(f, "book price must be a positive number, got {price}")
            }
            Self::MissingTitle => write!(f, "book title cannot be empty"),
        }
    }
}

impl Error for BookValidationError {}
