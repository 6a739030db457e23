//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the public catalog API.
//! - Keep callers decoupled from the chosen storage backend.

pub mod library;
