//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage and notification calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod entry_store;
