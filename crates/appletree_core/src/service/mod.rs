//! Core use-case services.
//!
//! # Responsibility
//! - Run input validation before repository mutations and list queries.
//! - Expose the caller-facing error surface (`ServiceError`).
//! - Keep boundary layers decoupled from storage details.

pub mod school_service;
