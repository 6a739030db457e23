//! Catalog domain model.
//!
//! # Responsibility
//! - Define canonical data structures shared by the facade and backends.
//!
//! # Invariants
//! - Every stored record is identified by a unique, non-empty `BookId`.

pub mod book;
