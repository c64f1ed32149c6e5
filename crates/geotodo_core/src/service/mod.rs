//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into UI-facing operations.
//! - Keep UI layers decoupled from storage details.

pub mod task_list;
