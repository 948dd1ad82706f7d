//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate loading, validation, reduction and rendering into
//!   use-case level APIs.
//! - Keep the CLI decoupled from file layout and write ordering.

pub mod check_service;
pub mod export_service;
