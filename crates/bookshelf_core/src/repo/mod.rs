//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the catalog capability contract (`BookRepository`).
//! - Isolate JSON snapshot and SQLite details from the facade.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `NotImplemented`)
//!   in addition to I/O and DB transport errors.

pub mod book_repo;
pub mod file_repo;
pub mod sqlite_repo;
