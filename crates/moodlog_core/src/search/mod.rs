//! Entry search entry points.
//!
//! # Responsibility
//! - Keep keyword matching rules inside core so every UI filters the same way.

pub mod keyword;
